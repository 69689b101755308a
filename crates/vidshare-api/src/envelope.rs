//! The success envelope: `{statusCode, data, message, success: true}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// A successful handler result, wrapped on the way out.
#[derive(Debug)]
pub struct ApiResponse<T> {
  pub status:  StatusCode,
  pub data:    T,
  pub message: String,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T, message: impl Into<String>) -> Self {
    Self { status: StatusCode::OK, data, message: message.into() }
  }

  pub fn created(data: T, message: impl Into<String>) -> Self {
    Self { status: StatusCode::CREATED, data, message: message.into() }
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
  status_code: u16,
  data:        &'a T,
  message:     &'a str,
  success:     bool,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
  fn into_response(self) -> Response {
    let body = Envelope {
      status_code: self.status.as_u16(),
      data:        &self.data,
      message:     &self.message,
      success:     self.status.as_u16() < 400,
    };
    (self.status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;

  #[tokio::test]
  async fn envelope_shape() {
    let resp = ApiResponse::created(json!({ "id": 7 }), "made it").into_response();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
      body,
      json!({
        "statusCode": 201,
        "data": { "id": 7 },
        "message": "made it",
        "success": true,
      })
    );
  }
}
