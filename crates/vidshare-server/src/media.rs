//! A [`MediaHost`] that keeps uploads on local disk.
//!
//! Files land at `<root>/<kind>/<uuid>[.<ext>]` and are served by the binary
//! under `/media`, so the hosted reference is
//! `<public_base_url>/media/<kind>/<file>`. The host cannot probe playback
//! length; videos fall back to the duration the client supplied.

use std::{io, path::PathBuf};

use uuid::Uuid;
use vidshare_core::media::{HostedAsset, MediaHost, MediaKind, Upload};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
  #[error("media i/o failed: {0}")]
  Io(#[from] io::Error),
  #[error("not a locally hosted asset: {0}")]
  Foreign(String),
}

#[derive(Debug, Clone)]
pub struct LocalMediaHost {
  root:            PathBuf,
  public_base_url: String,
}

impl LocalMediaHost {
  pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
    Self {
      root:            root.into(),
      public_base_url: public_base_url.trim_end_matches('/').to_owned(),
    }
  }

  pub fn root(&self) -> &std::path::Path { &self.root }

  fn url_for(&self, kind: MediaKind, file: &str) -> String {
    format!("{}/media/{}/{file}", self.public_base_url, kind.as_str())
  }

  /// The file behind a hosted URL, provided it names one of ours.
  pub fn path_for(&self, url: &str) -> Option<PathBuf> {
    let rest = url
      .strip_prefix(self.public_base_url.as_str())?
      .strip_prefix("/media/")?;
    let (kind, file) = rest.split_once('/')?;
    if kind != MediaKind::Image.as_str() && kind != MediaKind::Video.as_str() {
      return None;
    }
    let well_formed = !file.is_empty()
      && !file.starts_with('.')
      && file.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    well_formed.then(|| self.root.join(kind).join(file))
  }
}

impl MediaHost for LocalMediaHost {
  type Error = MediaError;

  async fn upload(&self, kind: MediaKind, upload: Upload) -> Result<HostedAsset, MediaError> {
    let stem = Uuid::new_v4().simple().to_string();
    let file = match upload.extension() {
      Some(ext) => format!("{stem}.{ext}"),
      None => stem,
    };

    let dir = self.root.join(kind.as_str());
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&file), &upload.bytes).await?;
    tracing::debug!(kind = kind.as_str(), %file, bytes = upload.bytes.len(), "stored upload");

    Ok(HostedAsset { url: self.url_for(kind, &file), duration: None })
  }

  async fn remove(&self, url: &str) -> Result<(), MediaError> {
    let path = self
      .path_for(url)
      .ok_or_else(|| MediaError::Foreign(url.to_owned()))?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
