use actix_web::{web, HttpResponse, Responder};
use log::debug;
use serde_json::json;

use crate::{models::TokenDto, types::Result, utils::codec};

/// Encode a numeric id into its public token
pub async fn encode_handler(id: web::Path<i64>) -> Result<impl Responder> {
    let id = id.into_inner();
    let token = codec::encode(id)?;
    debug!("Encoded id {} as '{}'", id, token);

    Ok(HttpResponse::Ok().json(json!({
        "data": TokenDto { id, token },
        "message": "Successfully encoded id",
    })))
}

/// Decode a public token back into its numeric id
pub async fn decode_handler(token: web::Path<String>) -> Result<impl Responder> {
    let token = token.into_inner();
    let id = codec::decode(&token)?;
    debug!("Decoded '{}' as id {}", token, id);

    Ok(HttpResponse::Ok().json(json!({
        "data": TokenDto { id, token },
        "message": "Successfully decoded token",
    })))
}
