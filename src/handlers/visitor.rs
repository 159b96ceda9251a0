use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::{models::VisitorId, types::Result};

/// Report the visitor identity resolved for this request
pub async fn visitor_handler(visitor: VisitorId) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(json!({
        "data": visitor,
        "message": "Successfully resolved visitor",
    })))
}
