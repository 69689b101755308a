//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the API as the error envelope:
//! `{statusCode, message, success: false, errors: [...]}`.

use axum::{
  Json,
  extract::{
    multipart::{MultipartError, MultipartRejection},
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use vidshare_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

impl ApiError {
  /// Lift any backend error into the domain error.
  pub fn store<E: Into<CoreError>>(e: E) -> Self { Self(e.into()) }

  pub fn status(&self) -> StatusCode {
    match &self.0 {
      CoreError::InvalidIdentifier(_)
      | CoreError::InvalidOperation(_)
      | CoreError::MissingField(_) => StatusCode::BAD_REQUEST,
      CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
      CoreError::NotFound(_) => StatusCode::NOT_FOUND,
      CoreError::Conflict(_) => StatusCode::CONFLICT,
      CoreError::UpstreamFailure(_)
      | CoreError::Serialization(_)
      | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// The message shown to the client. Internal failures are not described.
  fn public_message(&self) -> String {
    match &self.0 {
      CoreError::Serialization(_) | CoreError::Store(_) => {
        "internal server error".to_owned()
      }
      other => other.to_string(),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(CoreError::InvalidOperation(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self(CoreError::InvalidOperation(rejection.body_text()))
  }
}

impl From<MultipartRejection> for ApiError {
  fn from(rejection: MultipartRejection) -> Self {
    Self(CoreError::InvalidOperation(rejection.body_text()))
  }
}

impl From<MultipartError> for ApiError {
  fn from(e: MultipartError) -> Self {
    Self(CoreError::InvalidOperation(format!("malformed multipart body: {}", e.body_text())))
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
  status_code: u16,
  message:     String,
  success:     bool,
  errors:      Vec<String>,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
    } else {
      tracing::debug!(kind = self.0.kind(), error = %self.0, "request rejected");
    }

    let message = self.public_message();
    let body = ErrorEnvelope {
      status_code: status.as_u16(),
      errors:      vec![message.clone()],
      message,
      success:     false,
    };
    (status, Json(body)).into_response()
  }
}
