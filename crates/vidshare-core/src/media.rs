//! The media-hosting collaborator.
//!
//! Uploaded files are handed to a [`MediaHost`] which returns a hosted
//! reference. Hosts are external systems; the core only depends on this trait.

use std::future::Future;

/// What kind of asset an upload is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  Image,
  Video,
}

impl MediaKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Image => "image",
      Self::Video => "video",
    }
  }
}

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name:    Option<String>,
  pub content_type: Option<String>,
  pub bytes:        Vec<u8>,
}

impl Upload {
  /// Lower-cased extension of the original file name, if any.
  pub fn extension(&self) -> Option<String> {
    let name = self.file_name.as_deref()?;
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
      .then_some(ext)
  }
}

/// The host's answer to a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedAsset {
  /// Public reference stored on the resource.
  pub url:      String,
  /// Playback length in seconds, when the host can determine it.
  pub duration: Option<f64>,
}

/// A media host. Failures surface as `UpstreamFailure`.
pub trait MediaHost: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn upload(
    &self,
    kind: MediaKind,
    upload: Upload,
  ) -> impl Future<Output = Result<HostedAsset, Self::Error>> + Send + '_;

  /// Remove a previously hosted asset. Used for best-effort cleanup.
  fn remove<'a>(
    &'a self,
    url: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn upload(name: Option<&str>) -> Upload {
    Upload {
      file_name:    name.map(str::to_owned),
      content_type: None,
      bytes:        vec![],
    }
  }

  #[test]
  fn extension_is_lowercased() {
    assert_eq!(upload(Some("Clip.MP4")).extension().as_deref(), Some("mp4"));
  }

  #[test]
  fn suspicious_extensions_are_dropped() {
    assert_eq!(upload(Some("x.tar/../../etc")).extension(), None);
    assert_eq!(upload(Some("noext")).extension(), None);
    assert_eq!(upload(Some("trailing.")).extension(), None);
    assert_eq!(upload(None).extension(), None);
  }
}
