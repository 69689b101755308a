//! `GET /healthcheck`: liveness only, no store access.

use serde_json::{Value, json};

use crate::envelope::ApiResponse;

pub async fn handler() -> ApiResponse<Value> {
  ApiResponse::ok(json!({ "status": "OK" }), "health check passed")
}
