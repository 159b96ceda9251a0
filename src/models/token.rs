// src/models/token.rs - Codec DTOs
use serde::{Deserialize, Serialize};

/// A numeric id paired with its public token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDto {
    pub id: i64,
    pub token: String,
}
