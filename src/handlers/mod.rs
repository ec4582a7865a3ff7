pub mod chat;

use actix_web::HttpResponse;
use serde_json::json;

use crate::config::{SERVICE_NAME, SERVICE_VERSION};

pub async fn main() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome to {}", SERVICE_NAME),
        "version": SERVICE_VERSION
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME
    }))
}
