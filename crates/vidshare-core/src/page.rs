//! Listing parameters and the paginated result window.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, id::UserId};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ─── Request ─────────────────────────────────────────────────────────────────

/// A 1-based page number and a page size, both positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u32,
  pub limit: u32,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, limit: DEFAULT_PAGE_SIZE } }
}

impl PageRequest {
  /// Parse caller-supplied `page` / `limit` strings. Absent values take the
  /// defaults; `limit` is clamped to `max_limit`.
  pub fn parse(
    page: Option<&str>,
    limit: Option<&str>,
    max_limit: u32,
  ) -> Result<Self> {
    let page = match page {
      Some(p) => parse_positive("page", p)?,
      None => 1,
    };
    let limit = match limit {
      Some(l) => parse_positive("limit", l)?,
      None => DEFAULT_PAGE_SIZE,
    };
    Ok(Self { page, limit: limit.min(max_limit.max(1)) })
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
  }
}

fn parse_positive(name: &str, raw: &str) -> Result<u32> {
  match raw.trim().parse::<u32>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(Error::InvalidOperation(format!(
      "{name} must be a positive integer, got {raw:?}"
    ))),
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// Fields a video listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
  #[default]
  CreatedAt,
  UpdatedAt,
  Views,
  Duration,
  Title,
}

impl SortField {
  /// Accepts the camelCase payload key of the field.
  pub fn parse(raw: &str) -> Result<Self> {
    match raw.trim() {
      "createdAt" => Ok(Self::CreatedAt),
      "updatedAt" => Ok(Self::UpdatedAt),
      "views" => Ok(Self::Views),
      "duration" => Ok(Self::Duration),
      "title" => Ok(Self::Title),
      other => Err(Error::InvalidOperation(format!(
        "cannot sort by {other:?}; expected one of createdAt, updatedAt, views, duration, title"
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  /// `"asc"` sorts ascending; anything else (or nothing) sorts descending.
  pub fn parse(raw: Option<&str>) -> Self {
    match raw {
      Some("asc") => Self::Asc,
      _ => Self::Desc,
    }
  }
}

// ─── Video query ─────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::Catalog::list_videos`].
#[derive(Debug, Clone, Default)]
pub struct VideoQuery {
  /// Case-insensitive substring match on the title.
  pub title:          Option<String>,
  pub owner:          Option<UserId>,
  /// When `true`, unpublished videos are never returned.
  pub published_only: bool,
  pub sort:           SortField,
  pub order:          SortOrder,
  pub page:           PageRequest,
}

// ─── Result window ───────────────────────────────────────────────────────────

/// A bounded window of results plus total-count metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub docs:          Vec<T>,
  pub total_docs:    u64,
  pub limit:         u32,
  pub page:          u32,
  pub total_pages:   u64,
  pub has_prev_page: bool,
  pub has_next_page: bool,
  pub prev_page:     Option<u32>,
  pub next_page:     Option<u32>,
}

impl<T> Page<T> {
  pub fn new(docs: Vec<T>, total_docs: u64, request: PageRequest) -> Self {
    let limit = u64::from(request.limit.max(1));
    let total_pages = total_docs.div_ceil(limit);
    let page = request.page;
    let has_prev_page = page > 1;
    let has_next_page = u64::from(page) < total_pages;
    Self {
      docs,
      total_docs,
      limit: request.limit,
      page,
      total_pages,
      has_prev_page,
      has_next_page,
      prev_page: has_prev_page.then(|| page - 1),
      next_page: has_next_page.then(|| page + 1),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_when_absent() {
    let req = PageRequest::parse(None, None, 100).unwrap();
    assert_eq!(req, PageRequest { page: 1, limit: DEFAULT_PAGE_SIZE });
    assert_eq!(req.offset(), 0);
  }

  #[test]
  fn zero_and_garbage_are_rejected() {
    assert!(matches!(
      PageRequest::parse(Some("0"), None, 100),
      Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
      PageRequest::parse(None, Some("ten"), 100),
      Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
      PageRequest::parse(Some("-2"), None, 100),
      Err(Error::InvalidOperation(_))
    ));
  }

  #[test]
  fn limit_is_clamped() {
    let req = PageRequest::parse(Some("3"), Some("500"), 50).unwrap();
    assert_eq!(req.limit, 50);
    assert_eq!(req.offset(), 100);
  }

  #[test]
  fn page_metadata() {
    let page = Page::new(vec![1, 2], 5, PageRequest { page: 2, limit: 2 });
    assert_eq!(page.total_pages, 3);
    assert!(page.has_prev_page);
    assert!(page.has_next_page);
    assert_eq!(page.prev_page, Some(1));
    assert_eq!(page.next_page, Some(3));

    let last = Page::new(vec![5], 5, PageRequest { page: 3, limit: 2 });
    assert!(!last.has_next_page);
    assert_eq!(last.next_page, None);

    let empty: Page<u8> = Page::new(vec![], 0, PageRequest::default());
    assert_eq!(empty.total_pages, 0);
    assert!(!empty.has_prev_page && !empty.has_next_page);
  }

  #[test]
  fn sort_field_is_whitelisted() {
    assert_eq!(SortField::parse("views").unwrap(), SortField::Views);
    assert!(matches!(
      SortField::parse("password"),
      Err(Error::InvalidOperation(_))
    ));
  }

  #[test]
  fn sort_order_defaults_descending() {
    assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
    assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Desc);
    assert_eq!(SortOrder::parse(Some(" asc")), SortOrder::Desc);
    assert_eq!(SortOrder::parse(Some("up")), SortOrder::Desc);
    assert_eq!(SortOrder::parse(None), SortOrder::Desc);
  }
}
