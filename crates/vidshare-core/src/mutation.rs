//! The ownership-gated mutation engine.
//!
//! Every write to an existing content resource goes through [`load_owned`]:
//! the resource must exist and its owner must be the acting identity,
//! compared by id. Writes that depend on an external upload perform the upload
//! *after* the ownership check and *before* anything is persisted, so a failed
//! upload leaves the store untouched.

use chrono::Utc;

use crate::{
  Error, Result,
  content::{Content, Video},
  id::{UserId, VideoId},
  media::{HostedAsset, MediaHost, MediaKind, Upload},
  patch::{Patch, PublishToggle},
  store::{ContentStore, lift},
};

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Resolve `id` and verify that `actor` owns it.
pub async fn load_owned<S, R>(store: &S, actor: UserId, id: R::Id) -> Result<R>
where
  S: ContentStore<R>,
  R: Content,
{
  let resource = store
    .get(id)
    .await
    .map_err(lift)?
    .ok_or_else(|| Error::NotFound(format!("{} not found", R::KIND)))?;

  if resource.owner() != actor {
    tracing::debug!(kind = %R::KIND, %id, %actor, "ownership check failed");
    return Err(Error::Forbidden(format!(
      "you are not allowed to modify this {}",
      R::KIND
    )));
  }

  Ok(resource)
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Apply `patch` to a resource owned by `actor` and persist it.
///
/// A patch that changes nothing is not written.
pub async fn mutate<S, R, P>(store: &S, actor: UserId, id: R::Id, patch: P) -> Result<R>
where
  S: ContentStore<R>,
  R: Content,
  P: Patch<R>,
{
  let mut resource = load_owned::<S, R>(store, actor, id).await?;
  if patch.apply(&mut resource) {
    resource.touch(Utc::now());
    store.update(&resource).await.map_err(lift)?;
  }
  Ok(resource)
}

/// Like [`mutate`], but first uploads `upload` (if any) and lets `build` fold
/// the hosted reference into the patch.
///
/// The upload happens after the ownership check. If it fails, nothing is
/// written. If the final write fails, the fresh asset is discarded again.
pub async fn mutate_with_asset<S, M, R, P, F>(
  store: &S,
  media: &M,
  actor: UserId,
  id: R::Id,
  kind: MediaKind,
  upload: Option<Upload>,
  build: F,
) -> Result<R>
where
  S: ContentStore<R>,
  M: MediaHost,
  R: Content,
  P: Patch<R>,
  F: FnOnce(Option<&HostedAsset>) -> P + Send,
{
  let mut resource = load_owned::<S, R>(store, actor, id).await?;

  let asset = match upload {
    Some(upload) => Some(host(media, kind, upload).await?),
    None => None,
  };

  if build(asset.as_ref()).apply(&mut resource) {
    resource.touch(Utc::now());
    if let Err(e) = store.update(&resource).await {
      if let Some(asset) = &asset {
        discard(media, &asset.url).await;
      }
      return Err(lift(e));
    }
  }

  Ok(resource)
}

/// Negate the publication flag of a video owned by `actor`.
pub async fn toggle_publish<S>(store: &S, actor: UserId, id: VideoId) -> Result<Video>
where
  S: ContentStore<Video>,
{
  mutate::<S, Video, _>(store, actor, id, PublishToggle).await
}

/// Delete a resource owned by `actor`. Returns the deleted resource.
pub async fn remove<S, R>(store: &S, actor: UserId, id: R::Id) -> Result<R>
where
  S: ContentStore<R>,
  R: Content,
{
  let resource = load_owned::<S, R>(store, actor, id).await?;
  if !store.delete(id).await.map_err(lift)? {
    return Err(Error::NotFound(format!("{} not found", R::KIND)));
  }
  Ok(resource)
}

/// Delete a video owned by `actor` and discard its hosted assets.
pub async fn remove_video<S, M>(
  store: &S,
  media: &M,
  actor: UserId,
  id: VideoId,
) -> Result<Video>
where
  S: ContentStore<Video>,
  M: MediaHost,
{
  let video = remove::<S, Video>(store, actor, id).await?;
  discard(media, &video.video_file).await;
  discard(media, &video.thumbnail).await;
  Ok(video)
}

// ─── Creation ────────────────────────────────────────────────────────────────

/// The parts of a video upload request. Every field is required; they are
/// optional here so that validation reports all of them uniformly.
#[derive(Debug, Clone, Default)]
pub struct NewVideoForm {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub video_file:  Option<Upload>,
  pub thumbnail:   Option<Upload>,
  /// Client-reported length, used when the host cannot tell.
  pub duration:    Option<f64>,
}

/// Validate, upload the video and its thumbnail, then create the record.
pub async fn publish_video<S, M>(
  store: &S,
  media: &M,
  actor: UserId,
  form: NewVideoForm,
) -> Result<Video>
where
  S: ContentStore<Video>,
  M: MediaHost,
{
  let title = non_blank(form.title);
  let description = non_blank(form.description);
  let video_file = form.video_file.filter(|u| !u.bytes.is_empty());
  let thumbnail = form.thumbnail.filter(|u| !u.bytes.is_empty());

  let (Some(title), Some(description), Some(video_file), Some(thumbnail)) =
    (title, description, video_file, thumbnail)
  else {
    return Err(Error::MissingField(
      "all fields (title, description, videoFile, thumbnail) are required"
        .to_owned(),
    ));
  };

  let video_asset = host(media, MediaKind::Video, video_file).await?;
  let thumb_asset = match host(media, MediaKind::Image, thumbnail).await {
    Ok(a) => a,
    Err(e) => {
      discard(media, &video_asset.url).await;
      return Err(e);
    }
  };

  let duration = video_asset.duration.or(form.duration).unwrap_or(0.0);
  let video = Video::new(
    actor,
    title,
    description,
    video_asset.url,
    thumb_asset.url,
    duration,
  );

  if let Err(e) = store.insert(&video).await {
    discard(media, &video.video_file).await;
    discard(media, &video.thumbnail).await;
    return Err(lift(e));
  }

  tracing::info!(video = %video.video_id, owner = %actor, "video published");
  Ok(video)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Trimmed `value`, or `MissingField` naming `field`.
pub fn required(field: &str, value: Option<String>) -> Result<String> {
  non_blank(value).ok_or_else(|| Error::MissingField(format!("{field} is required")))
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Upload through `media`, mapping failures to `UpstreamFailure`.
pub async fn host<M: MediaHost>(
  media: &M,
  kind: MediaKind,
  upload: Upload,
) -> Result<HostedAsset> {
  media.upload(kind, upload).await.map_err(|e| {
    tracing::error!(kind = kind.as_str(), error = %e, "media upload failed");
    Error::UpstreamFailure(format!("{} upload failed", kind.as_str()))
  })
}

/// Best-effort removal of a hosted asset.
pub async fn discard<M: MediaHost>(media: &M, url: &str) {
  if let Err(e) = media.remove(url).await {
    tracing::warn!(%url, error = %e, "failed to discard hosted asset");
  }
}
