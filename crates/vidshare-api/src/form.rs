//! Request body readers that reject with the error envelope.

use std::collections::HashMap;

use axum::extract::{FromRequest, FromRequestParts, Multipart, multipart::MultipartRejection};
use vidshare_core::media::Upload;

use crate::error::ApiError;

/// [`axum::Json`] whose rejection is an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`axum::extract::Query`] whose rejection is an [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// A fully buffered multipart body: text fields and file parts by name.
///
/// A file part with no bytes counts as absent.
#[derive(Debug, Default)]
pub struct Form {
  text:  HashMap<String, String>,
  files: HashMap<String, Upload>,
}

impl Form {
  pub async fn read(
    multipart: Result<Multipart, MultipartRejection>,
  ) -> Result<Self, ApiError> {
    let mut multipart = multipart?;
    let mut form = Self::default();

    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };

      if field.file_name().is_some() {
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        if !bytes.is_empty() {
          form.files.insert(name, Upload { file_name, content_type, bytes: bytes.to_vec() });
        }
      } else {
        form.text.insert(name, field.text().await?);
      }
    }

    Ok(form)
  }

  /// Take the text field `name`.
  pub fn text(&mut self, name: &str) -> Option<String> { self.text.remove(name) }

  /// Take the file part `name`.
  pub fn file(&mut self, name: &str) -> Option<Upload> { self.files.remove(name) }
}
