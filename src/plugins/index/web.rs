use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

pub(crate) fn routes() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Json<Value> {
    Json(json!({
        "app": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "clock": chrono::Utc::now(),
    }))
}
