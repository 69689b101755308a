//! Runtime wiring for the vidshare `server` binary: the deserialised
//! configuration and a local-disk media host.

pub mod media;

use std::path::PathBuf;

use chrono::Duration;
use serde::Deserialize;
use vidshare_api::{ApiConfig, AuthConfig};

pub use media::LocalMediaHost;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VIDSHARE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  #[serde(default = "default_store_path")]
  pub store_path:             PathBuf,
  #[serde(default = "default_media_dir")]
  pub media_dir:              PathBuf,
  /// Scheme and authority clients use to reach `/media`.
  #[serde(default = "default_public_base_url")]
  pub public_base_url:        String,
  #[serde(default = "default_access_ttl")]
  pub access_token_ttl_secs:  u32,
  #[serde(default = "default_refresh_ttl")]
  pub refresh_token_ttl_secs: u32,
  #[serde(default = "default_max_upload")]
  pub max_upload_bytes:       usize,
  #[serde(default = "default_max_page_size")]
  pub max_page_size:          u32,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/vidshare/vidshare.db") }
fn default_media_dir() -> PathBuf { PathBuf::from("~/.local/share/vidshare/media") }
fn default_public_base_url() -> String { "http://127.0.0.1:8000".to_owned() }
fn default_access_ttl() -> u32 { 86_400 }
fn default_refresh_ttl() -> u32 { 864_000 }
fn default_max_upload() -> usize { 64 * 1024 * 1024 }
fn default_max_page_size() -> u32 { 100 }

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("{0} must be greater than zero")]
  NotPositive(&'static str),
}

impl ServerConfig {
  /// The limits handed to the API router.
  pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
    let positive = |name: &'static str, secs: u32| {
      if secs == 0 {
        Err(ConfigError::NotPositive(name))
      } else {
        Ok(Duration::seconds(i64::from(secs)))
      }
    };
    if self.max_page_size == 0 {
      return Err(ConfigError::NotPositive("max_page_size"));
    }
    if self.max_upload_bytes == 0 {
      return Err(ConfigError::NotPositive("max_upload_bytes"));
    }

    Ok(ApiConfig {
      auth:             AuthConfig {
        access_token_ttl:  positive("access_token_ttl_secs", self.access_token_ttl_secs)?,
        refresh_token_ttl: positive("refresh_token_ttl_secs", self.refresh_token_ttl_secs)?,
      },
      max_page_size:    self.max_page_size,
      max_upload_bytes: self.max_upload_bytes,
    })
  }
}
