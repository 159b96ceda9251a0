use actix_web::{web, HttpResponse, Responder};

use crate::{
    handlers::{decode_handler, encode_handler, visitor_handler},
    types::{AppState, HealthStatus, ResponsePayload},
};

// Handler function for the root route "/"
async fn index() -> impl Responder {
    let welcome_message = ResponsePayload {
        status: 200,
        message: String::from("Welcome and have a great time!"),
    };

    HttpResponse::Ok().json(welcome_message)
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let uptime = data.start_time.elapsed().as_secs();

    let status = HealthStatus {
        status: String::from("OK"),
        version: data.version.clone(),
        uptime_seconds: uptime,
    };

    HttpResponse::Ok().json(status)
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    cfg.service(
        web::scope("/api/codec")
            .route("/encode/{id}", web::get().to(encode_handler))
            .route("/decode/{token}", web::get().to(decode_handler)),
    );
    cfg.route("/api/visitor", web::get().to(visitor_handler));
}
