pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod types;
pub mod utils;

pub use errors::AppError;
pub use utils::codec::{decode, encode};
