use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    http::header::{HeaderName, HeaderValue},
    middleware::Next,
    Error,
};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Tags every response with a request id, reusing the caller's when present
///
/// Mounted with `actix_web::middleware::from_fn`.
pub async fn request_id(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let id = match req.headers().get(&X_REQUEST_ID) {
        Some(value) => value.clone(),
        None => HeaderValue::from_str(&Uuid::new_v4().to_string())
            .map_err(ErrorInternalServerError)?,
    };

    let mut res = next.call(req).await?;
    res.headers_mut().insert(X_REQUEST_ID, id);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use actix_web::{middleware::from_fn, test, web, App, HttpResponse};

    use super::*;

    fn header_of<B>(res: &ServiceResponse<B>) -> String {
        res.headers()
            .get(&X_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap()
    }

    #[actix_web::test]
    async fn test_each_request_gets_its_own_id() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(request_id))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let second = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        let first = header_of(&first);
        let second = header_of(&second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[actix_web::test]
    async fn test_caller_request_id_is_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(request_id))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((X_REQUEST_ID, "trace-42"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(header_of(&res), "trace-42");
    }
}
