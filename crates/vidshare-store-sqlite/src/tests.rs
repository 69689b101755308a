//! Integration tests for `SqliteStore` against an in-memory database, plus
//! the toggle and mutation engines running on top of it.

use std::sync::Mutex;

use chrono::{Duration, Utc};
use vidshare_core::{
  content::{Comment, Tweet, Video},
  id::{UserId, VideoId},
  identity::{NewUser, RefreshCredential, Session, User},
  media::{HostedAsset, MediaHost, MediaKind, Upload},
  mutation::{self, NewVideoForm},
  page::{PageRequest, SortField, SortOrder, VideoQuery},
  patch::{TextPatch, VideoPatch},
  relationship::{RelationKind, Target, Toggled},
  store::{Catalog, ContentStore, IdentityStore, RelationshipStore},
  toggle,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, handle: &str) -> User {
  let user = NewUser {
    username:      handle.to_owned(),
    email:         format!("{handle}@example.com"),
    full_name:     format!("{handle} Example"),
    avatar:        format!("http://media.test/{handle}.png"),
    cover_image:   None,
    password_hash: "not-a-real-hash".to_owned(),
  }
  .into_user();
  s.create_user(&user).await.unwrap();
  user
}

async fn video(s: &SqliteStore, owner: UserId, title: &str) -> Video {
  let video = Video::new(
    owner,
    title.to_owned(),
    format!("about {title}"),
    format!("http://media.test/{title}.mp4"),
    format!("http://media.test/{title}.jpg"),
    12.5,
  );
  s.insert(&video).await.unwrap();
  video
}

async fn get_video(s: &SqliteStore, id: VideoId) -> Option<Video> {
  ContentStore::<Video>::get(s, id).await.unwrap()
}

/// Records every removal so tests can assert which assets were discarded.
#[derive(Default)]
struct RecordingMedia {
  removed:    Mutex<Vec<String>>,
  fail_image: bool,
}

impl MediaHost for RecordingMedia {
  type Error = std::io::Error;

  async fn upload(
    &self,
    kind: MediaKind,
    upload: Upload,
  ) -> Result<HostedAsset, Self::Error> {
    if self.fail_image && kind == MediaKind::Image {
      return Err(std::io::Error::other("host unavailable"));
    }
    Ok(HostedAsset {
      url:      format!("http://media.test/{}/{}", kind.as_str(), upload.bytes.len()),
      duration: (kind == MediaKind::Video).then_some(42.0),
    })
  }

  async fn remove(&self, url: &str) -> Result<(), Self::Error> {
    self.removed.lock().unwrap().push(url.to_owned());
    Ok(())
  }
}

fn upload(bytes: &[u8]) -> Upload {
  Upload {
    file_name:    Some("clip.bin".to_owned()),
    content_type: None,
    bytes:        bytes.to_vec(),
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let alice = user(&s, "Alice").await;
  assert_eq!(alice.username, "alice");

  let by_id = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "alice@example.com");
  assert_eq!(by_id.password_hash, "not-a-real-hash");

  let by_handle = s.find_user(Some("  ALICE "), None).await.unwrap().unwrap();
  assert_eq!(by_handle.user_id, alice.user_id);

  let by_email = s
    .find_user(None, Some("Alice@Example.com"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_email.user_id, alice.user_id);

  assert!(s.find_user(Some(""), Some("  ")).await.unwrap().is_none());
  assert!(s.find_user(Some("bob"), None).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_handle_or_email_is_a_conflict() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let mut twin = alice.clone();
  twin.user_id = UserId::new();
  twin.email = "other@example.com".to_owned();
  let err: vidshare_core::Error = s.create_user(&twin).await.unwrap_err().into();
  assert!(matches!(err, vidshare_core::Error::Conflict(_)), "{err:?}");

  let mut same_email = alice.clone();
  same_email.user_id = UserId::new();
  same_email.username = "alice2".to_owned();
  let err: vidshare_core::Error = s.create_user(&same_email).await.unwrap_err().into();
  assert!(matches!(err, vidshare_core::Error::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn update_user_round_trips_refresh_credential() {
  let s = store().await;
  let mut alice = user(&s, "alice").await;

  let expires_at = Utc::now() + Duration::days(10);
  alice.full_name = "Alice Liddell".to_owned();
  alice.refresh = Some(RefreshCredential { token_hash: "abc".to_owned(), expires_at });
  s.update_user(&alice).await.unwrap();

  let loaded = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(loaded.full_name, "Alice Liddell");
  let refresh = loaded.refresh.unwrap();
  assert_eq!(refresh.token_hash, "abc");
  assert_eq!(
    refresh.expires_at.timestamp_micros(),
    expires_at.timestamp_micros()
  );

  let by_refresh = s.find_user_by_refresh("abc").await.unwrap().unwrap();
  assert_eq!(by_refresh.user_id, alice.user_id);

  alice.refresh = None;
  s.update_user(&alice).await.unwrap();
  assert!(s.get_user(alice.user_id).await.unwrap().unwrap().refresh.is_none());
  assert!(s.find_user_by_refresh("abc").await.unwrap().is_none());
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
  let s = store().await;
  let ghost = NewUser {
    username:      "ghost".to_owned(),
    email:         "ghost@example.com".to_owned(),
    full_name:     "Ghost".to_owned(),
    avatar:        "http://media.test/ghost.png".to_owned(),
    cover_image:   None,
    password_hash: "x".to_owned(),
  }
  .into_user();
  let err: vidshare_core::Error = s.update_user(&ghost).await.unwrap_err().into();
  assert!(matches!(err, vidshare_core::Error::NotFound(_)));
}

#[tokio::test]
async fn sessions_can_be_revoked_except_one() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let now = Utc::now();

  for hash in ["one", "two", "three"] {
    s.create_session(&Session {
      token_hash: hash.to_owned(),
      user_id:    alice.user_id,
      issued_at:  now,
      expires_at: now + Duration::hours(1),
    })
    .await
    .unwrap();
  }

  let found = s.find_session("two").await.unwrap().unwrap();
  assert_eq!(found.user_id, alice.user_id);
  assert!(!found.is_expired(now));

  assert_eq!(s.revoke_sessions(alice.user_id, Some("two")).await.unwrap(), 2);
  assert!(s.find_session("one").await.unwrap().is_none());
  assert!(s.find_session("two").await.unwrap().is_some());

  assert_eq!(s.revoke_sessions(alice.user_id, None).await.unwrap(), 1);
  assert!(s.find_session("two").await.unwrap().is_none());
}

#[tokio::test]
async fn watch_history_is_most_recent_first_without_duplicates() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let first = video(&s, bob.user_id, "first").await;
  let second = video(&s, bob.user_id, "second").await;
  let now = Utc::now();

  s.record_watch(alice.user_id, first.video_id, now).await.unwrap();
  s.record_watch(alice.user_id, second.video_id, now + Duration::seconds(1))
    .await
    .unwrap();
  s.record_watch(alice.user_id, first.video_id, now + Duration::seconds(2))
    .await
    .unwrap();

  let history = s.watch_history(alice.user_id).await.unwrap();
  let ids: Vec<_> = history.iter().map(|l| l.video.video_id).collect();
  assert_eq!(ids, vec![first.video_id, second.video_id]);
  assert_eq!(history[0].owner.username, "bob");

  let loaded = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(loaded.watch_history, ids);
}

// ─── Content ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn content_insert_get_update() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let mut v = video(&s, alice.user_id, "cats").await;

  let loaded = get_video(&s, v.video_id).await.unwrap();
  assert_eq!(loaded.title, "cats");
  assert!(loaded.is_published);

  v.title = "more cats".to_owned();
  s.update(&v).await.unwrap();
  assert_eq!(get_video(&s, v.video_id).await.unwrap().title, "more cats");

  // Same id, different kind, is not visible.
  let as_tweet = ContentStore::<Tweet>::get(&s, v.video_id.as_uuid().into())
    .await
    .unwrap();
  assert!(as_tweet.is_none());
}

#[tokio::test]
async fn update_never_rolls_back_views() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let mut stale = video(&s, alice.user_id, "cats").await;

  assert_eq!(s.add_view(stale.video_id).await.unwrap(), Some(1));
  assert_eq!(s.add_view(stale.video_id).await.unwrap(), Some(2));

  stale.description = "edited from a stale copy".to_owned();
  s.update(&stale).await.unwrap();

  let loaded = get_video(&s, stale.video_id).await.unwrap();
  assert_eq!(loaded.views, 2);
  assert_eq!(loaded.description, "edited from a stale copy");

  assert_eq!(s.add_view(VideoId::new()).await.unwrap(), None);
}

#[tokio::test]
async fn deleting_a_video_cascades() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let v = video(&s, alice.user_id, "cats").await;

  let comment = Comment::new(v.video_id, bob.user_id, "nice".to_owned());
  s.insert(&comment).await.unwrap();
  toggle::toggle(&s, bob.user_id, Target::Video(v.video_id)).await.unwrap();
  toggle::toggle(&s, alice.user_id, Target::Comment(comment.comment_id))
    .await
    .unwrap();
  s.record_watch(bob.user_id, v.video_id, Utc::now()).await.unwrap();

  assert!(ContentStore::<Video>::delete(&s, v.video_id).await.unwrap());

  assert!(get_video(&s, v.video_id).await.is_none());
  assert!(
    ContentStore::<Comment>::get(&s, comment.comment_id)
      .await
      .unwrap()
      .is_none()
  );
  assert_eq!(
    s.count_by_target(RelationKind::VideoLike, v.video_id.into())
      .await
      .unwrap(),
    0
  );
  assert_eq!(
    s.count_by_target(RelationKind::CommentLike, comment.comment_id.into())
      .await
      .unwrap(),
    0
  );
  assert!(s.watch_history(bob.user_id).await.unwrap().is_empty());

  assert!(!ContentStore::<Video>::delete(&s, v.video_id).await.unwrap());
}

// ─── Toggle engine ───────────────────────────────────────────────────────────

#[tokio::test]
async fn like_toggles_on_then_off() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let v1 = video(&s, a1.user_id, "v1").await;
  let target = Target::Video(v1.video_id);

  let first = toggle::toggle(&s, a1.user_id, target).await.unwrap();
  assert_eq!(first, Toggled::Created);
  assert_eq!(
    s.count_by_target(RelationKind::VideoLike, v1.video_id.into())
      .await
      .unwrap(),
    1
  );
  assert!(toggle::holds(&s, a1.user_id, target).await.unwrap());

  let second = toggle::toggle(&s, a1.user_id, target).await.unwrap();
  assert_eq!(second, Toggled::Deleted);
  assert_eq!(
    s.count_by_target(RelationKind::VideoLike, v1.video_id.into())
      .await
      .unwrap(),
    0
  );
  assert!(!toggle::holds(&s, a1.user_id, target).await.unwrap());
}

#[tokio::test]
async fn like_kinds_are_independent() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let tweet = Tweet::new(alice.user_id, "hello".to_owned());
  s.insert(&tweet).await.unwrap();

  toggle::toggle(&s, alice.user_id, Target::Tweet(tweet.tweet_id))
    .await
    .unwrap();

  // The same uuid read as a video like is a different relationship.
  let as_video = Target::Video(tweet.tweet_id.as_uuid().into());
  assert!(!toggle::holds(&s, alice.user_id, as_video).await.unwrap());
  assert_eq!(
    s.count_by_actor(RelationKind::TweetLike, alice.user_id).await.unwrap(),
    1
  );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_settle_on_parity() {
  const TOGGLES: usize = 21;

  let s = store().await;
  let a1 = user(&s, "a1").await;
  let v1 = video(&s, a1.user_id, "v1").await;
  let target = Target::Video(v1.video_id);

  let tasks: Vec<_> = (0..TOGGLES)
    .map(|_| {
      let s = s.clone();
      let actor = a1.user_id;
      tokio::spawn(async move { toggle::toggle(&s, actor, target).await })
    })
    .collect();

  let mut created: i64 = 0;
  for task in tasks {
    if task.await.unwrap().unwrap().is_created() {
      created += 1;
    }
  }
  let deleted = TOGGLES as i64 - created;

  let count = s
    .count_by_target(RelationKind::VideoLike, v1.video_id.into())
    .await
    .unwrap();
  assert!(count <= 1);
  assert_eq!(count as usize, TOGGLES % 2);
  assert_eq!(created - deleted, 1);
  assert!(toggle::holds(&s, a1.user_id, target).await.unwrap());
}

#[tokio::test]
async fn self_subscription_is_rejected() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = toggle::toggle(&s, alice.user_id, Target::Channel(alice.user_id))
    .await
    .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::InvalidOperation(_)));
  assert_eq!(
    s.count_by_actor(RelationKind::Subscription, alice.user_id)
      .await
      .unwrap(),
    0
  );
}

#[tokio::test]
async fn subscriptions_are_listed_both_ways() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  toggle::toggle(&s, bob.user_id, Target::Channel(alice.user_id))
    .await
    .unwrap();
  toggle::toggle(&s, carol.user_id, Target::Channel(alice.user_id))
    .await
    .unwrap();
  toggle::toggle(&s, bob.user_id, Target::Channel(carol.user_id))
    .await
    .unwrap();

  let subscribers = s.subscribers(alice.user_id).await.unwrap();
  let mut names: Vec<_> = subscribers.iter().map(|p| p.username.as_str()).collect();
  names.sort_unstable();
  assert_eq!(names, ["bob", "carol"]);

  let channels = s.subscribed_channels(bob.user_id).await.unwrap();
  assert_eq!(channels.len(), 2);
  assert_eq!(
    s.count_by_target(RelationKind::Subscription, alice.user_id.into())
      .await
      .unwrap(),
    2
  );

  toggle::toggle(&s, bob.user_id, Target::Channel(alice.user_id))
    .await
    .unwrap();
  assert_eq!(s.subscribers(alice.user_id).await.unwrap().len(), 1);
}

// ─── Mutation engine ─────────────────────────────────────────────────────────

#[tokio::test]
async fn non_owner_cannot_delete() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  let v1 = video(&s, a1.user_id, "v1").await;

  let err = mutation::remove::<_, Video>(&s, a2.user_id, v1.video_id)
    .await
    .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::Forbidden(_)));
  assert!(get_video(&s, v1.video_id).await.is_some());

  let removed = mutation::remove::<_, Video>(&s, a1.user_id, v1.video_id)
    .await
    .unwrap();
  assert_eq!(removed.video_id, v1.video_id);
  assert!(get_video(&s, v1.video_id).await.is_none());
}

#[tokio::test]
async fn missing_resource_is_not_found() {
  let s = store().await;
  let a1 = user(&s, "a1").await;

  let err = mutation::mutate::<_, Video, _>(
    &s,
    a1.user_id,
    VideoId::new(),
    VideoPatch { title: Some("x".to_owned()), ..Default::default() },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::NotFound(_)));
}

#[tokio::test]
async fn publish_toggle_twice_restores_flag() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let v1 = video(&s, a1.user_id, "v1").await;

  let once = mutation::toggle_publish(&s, a1.user_id, v1.video_id).await.unwrap();
  assert!(!once.is_published);
  assert!(!get_video(&s, v1.video_id).await.unwrap().is_published);

  let twice = mutation::toggle_publish(&s, a1.user_id, v1.video_id).await.unwrap();
  assert!(twice.is_published);
  assert!(get_video(&s, v1.video_id).await.unwrap().is_published);
}

#[tokio::test]
async fn text_patch_edits_owned_tweet_only() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  let tweet = Tweet::new(a1.user_id, "first".to_owned());
  s.insert(&tweet).await.unwrap();

  let err = mutation::mutate::<_, Tweet, _>(
    &s,
    a2.user_id,
    tweet.tweet_id,
    TextPatch { content: Some("hijacked".to_owned()) },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::Forbidden(_)));

  let edited = mutation::mutate::<_, Tweet, _>(
    &s,
    a1.user_id,
    tweet.tweet_id,
    TextPatch { content: Some("edited".to_owned()) },
  )
  .await
  .unwrap();
  assert_eq!(edited.content, "edited");
  assert!(edited.updated_at >= tweet.updated_at);

  let listed = s.list_tweets(a1.user_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].content, "edited");
}

#[tokio::test]
async fn publish_video_uses_hosted_duration() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let media = RecordingMedia::default();

  let v = mutation::publish_video(&s, &media, a1.user_id, NewVideoForm {
    title:       Some("  cats ".to_owned()),
    description: Some("a video".to_owned()),
    video_file:  Some(upload(b"video-bytes")),
    thumbnail:   Some(upload(b"jpg")),
    duration:    Some(1.0),
  })
  .await
  .unwrap();

  assert_eq!(v.title, "cats");
  assert_eq!(v.duration, 42.0);
  assert_eq!(v.views, 0);
  assert!(v.is_published);
  assert!(get_video(&s, v.video_id).await.is_some());
}

#[tokio::test]
async fn publish_video_requires_every_field() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let media = RecordingMedia::default();

  let err = mutation::publish_video(&s, &media, a1.user_id, NewVideoForm {
    title:       Some("cats".to_owned()),
    description: Some("   ".to_owned()),
    video_file:  Some(upload(b"video-bytes")),
    thumbnail:   Some(upload(b"jpg")),
    duration:    None,
  })
  .await
  .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::MissingField(_)));
  assert!(media.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_thumbnail_discards_uploaded_video() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let media = RecordingMedia { fail_image: true, ..Default::default() };

  let err = mutation::publish_video(&s, &media, a1.user_id, NewVideoForm {
    title:       Some("cats".to_owned()),
    description: Some("a video".to_owned()),
    video_file:  Some(upload(b"video-bytes")),
    thumbnail:   Some(upload(b"jpg")),
    duration:    None,
  })
  .await
  .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::UpstreamFailure(_)));

  let removed = media.removed.lock().unwrap();
  assert_eq!(removed.as_slice(), ["http://media.test/video/11"]);

  let page = s.list_videos(&VideoQuery::default()).await.unwrap();
  assert_eq!(page.total_docs, 0);
}

#[tokio::test]
async fn thumbnail_replacement_is_gated_before_upload() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  let v1 = video(&s, a1.user_id, "v1").await;
  let media = RecordingMedia { fail_image: true, ..Default::default() };

  // The upload would fail, but the ownership check fails first.
  let err = mutation::mutate_with_asset::<_, _, Video, _, _>(
    &s,
    &media,
    a2.user_id,
    v1.video_id,
    MediaKind::Image,
    Some(upload(b"png")),
    |asset| VideoPatch {
      thumbnail: asset.map(|a| a.url.clone()),
      ..Default::default()
    },
  )
  .await
  .unwrap_err();
  assert!(matches!(err, vidshare_core::Error::Forbidden(_)));

  let media = RecordingMedia::default();
  let edited = mutation::mutate_with_asset::<_, _, Video, _, _>(
    &s,
    &media,
    a1.user_id,
    v1.video_id,
    MediaKind::Image,
    Some(upload(b"png")),
    |asset| VideoPatch {
      title: Some("renamed".to_owned()),
      thumbnail: asset.map(|a| a.url.clone()),
      ..Default::default()
    },
  )
  .await
  .unwrap();
  assert_eq!(edited.title, "renamed");
  assert_eq!(edited.thumbnail, "http://media.test/image/3");
}

#[tokio::test]
async fn remove_video_discards_assets() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let v1 = video(&s, a1.user_id, "v1").await;
  let media = RecordingMedia::default();

  mutation::remove_video(&s, &media, a1.user_id, v1.video_id)
    .await
    .unwrap();

  let removed = media.removed.lock().unwrap();
  assert_eq!(removed.as_slice(), [v1.video_file.as_str(), v1.thumbnail.as_str()]);
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn published_only_listing_hides_unpublished() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let public = video(&s, a1.user_id, "public").await;
  let hidden = video(&s, a1.user_id, "hidden").await;
  mutation::toggle_publish(&s, a1.user_id, hidden.video_id)
    .await
    .unwrap();

  let page = s
    .list_videos(&VideoQuery { published_only: true, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total_docs, 1);
  assert_eq!(page.docs[0].video.video_id, public.video_id);
  assert_eq!(page.docs[0].owner.username, "a1");

  let all = s.list_videos(&VideoQuery::default()).await.unwrap();
  assert_eq!(all.total_docs, 2);
}

#[tokio::test]
async fn listing_filters_sorts_and_pages() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  for (title, views) in [("cat one", 3), ("dog", 9), ("cat two", 1), ("Cat three", 5)] {
    let v = video(&s, a1.user_id, title).await;
    for _ in 0..views {
      s.add_view(v.video_id).await.unwrap();
    }
  }
  video(&s, a2.user_id, "cat elsewhere").await;

  let query = VideoQuery {
    title: Some("CAT".to_owned()),
    owner: Some(a1.user_id),
    sort: SortField::Views,
    order: SortOrder::Asc,
    page: PageRequest { page: 1, limit: 2 },
    ..Default::default()
  };
  let first = s.list_videos(&query).await.unwrap();
  let titles: Vec<_> = first.docs.iter().map(|l| l.video.title.as_str()).collect();
  assert_eq!(titles, ["cat two", "cat one"]);
  assert_eq!(first.total_docs, 3);
  assert_eq!(first.total_pages, 2);
  assert!(first.has_next_page);
  assert_eq!(first.next_page, Some(2));
  assert!(!first.has_prev_page);

  let second = s
    .list_videos(&VideoQuery { page: PageRequest { page: 2, limit: 2 }, ..query })
    .await
    .unwrap();
  assert_eq!(second.docs.len(), 1);
  assert_eq!(second.docs[0].video.title, "Cat three");
  assert_eq!(second.docs[0].video.views, 5);
  assert!(!second.has_next_page);
  assert_eq!(second.prev_page, Some(1));
}

#[tokio::test]
async fn title_filter_treats_wildcards_literally() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  video(&s, a1.user_id, "100% cats").await;
  video(&s, a1.user_id, "100 cats").await;

  let page = s
    .list_videos(&VideoQuery { title: Some("0%".to_owned()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total_docs, 1);
  assert_eq!(page.docs[0].video.title, "100% cats");
}

#[tokio::test]
async fn title_filter_folds_non_ascii_case() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  video(&s, a1.user_id, "Über Katzen").await;
  video(&s, a1.user_id, "ÉTÉ summer").await;
  video(&s, a1.user_id, "plain").await;

  for (needle, expected) in [
    ("über", "Über Katzen"),
    ("ÜBER", "Über Katzen"),
    ("été", "ÉTÉ summer"),
  ] {
    let page = s
      .list_videos(&VideoQuery { title: Some(needle.to_owned()), ..Default::default() })
      .await
      .unwrap();
    assert_eq!(page.total_docs, 1, "{needle}");
    assert_eq!(page.docs[0].video.title, expected);
  }

  // Renaming refreshes the folded title.
  let renamed = s
    .list_videos(&VideoQuery { title: Some("plain".to_owned()), ..Default::default() })
    .await
    .unwrap();
  let mut v = renamed.docs[0].video.clone();
  v.title = "Ärger im Paradies".to_owned();
  s.update(&v).await.unwrap();
  let page = s
    .list_videos(&VideoQuery { title: Some("ÄRGER".to_owned()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total_docs, 1);
}

#[tokio::test]
async fn liked_videos_hide_others_unpublished() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  let mine = video(&s, a1.user_id, "mine").await;
  let theirs = video(&s, a2.user_id, "theirs").await;

  toggle::toggle(&s, a1.user_id, Target::Video(mine.video_id)).await.unwrap();
  toggle::toggle(&s, a1.user_id, Target::Video(theirs.video_id))
    .await
    .unwrap();
  assert_eq!(s.liked_videos(a1.user_id).await.unwrap().len(), 2);

  mutation::toggle_publish(&s, a2.user_id, theirs.video_id)
    .await
    .unwrap();
  mutation::toggle_publish(&s, a1.user_id, mine.video_id)
    .await
    .unwrap();

  let liked = s.liked_videos(a1.user_id).await.unwrap();
  assert_eq!(liked.len(), 1);
  assert_eq!(liked[0].video.video_id, mine.video_id);
}

#[tokio::test]
async fn comments_are_paged_newest_first() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let v = video(&s, a1.user_id, "v").await;
  let other = video(&s, a1.user_id, "other").await;
  let base = Utc::now();

  for i in 0..5 {
    let mut c = Comment::new(v.video_id, a1.user_id, format!("comment {i}"));
    c.created_at = base + Duration::seconds(i);
    c.updated_at = c.created_at;
    s.insert(&c).await.unwrap();
  }
  s.insert(&Comment::new(other.video_id, a1.user_id, "elsewhere".to_owned()))
    .await
    .unwrap();

  let page = s
    .list_comments(v.video_id, PageRequest { page: 1, limit: 2 })
    .await
    .unwrap();
  assert_eq!(page.total_docs, 5);
  assert_eq!(page.total_pages, 3);
  let contents: Vec<_> = page.docs.iter().map(|l| l.comment.content.as_str()).collect();
  assert_eq!(contents, ["comment 4", "comment 3"]);
  assert_eq!(page.docs[0].owner.user_id, a1.user_id);
}

#[tokio::test]
async fn tweets_are_listed_newest_first() {
  let s = store().await;
  let a1 = user(&s, "a1").await;
  let a2 = user(&s, "a2").await;
  let base = Utc::now();

  for i in 0..3 {
    let mut t = Tweet::new(a1.user_id, format!("tweet {i}"));
    t.created_at = base + Duration::seconds(i);
    s.insert(&t).await.unwrap();
  }
  s.insert(&Tweet::new(a2.user_id, "not mine".to_owned()))
    .await
    .unwrap();

  let tweets = s.list_tweets(a1.user_id).await.unwrap();
  let contents: Vec<_> = tweets.iter().map(|t| t.content.as_str()).collect();
  assert_eq!(contents, ["tweet 2", "tweet 1", "tweet 0"]);
}
