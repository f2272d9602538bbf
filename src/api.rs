use futures::future::join_all;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::video::{Video, VideoRecord};

/// Why a read against the backend produced no usable video list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The catalog answered, but with an empty or non-array body.
  #[error("the catalog is empty")]
  EmptyCatalog,
  /// Transport error, non-success status or an unparseable body.
  #[error("fetch failed: {0}")]
  FetchFailed(String),
  /// The search answer lacks a `results` list.
  #[error("search returned no result list")]
  NoSearchResults,
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    ApiError::FetchFailed(e.to_string())
  }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
  video_id: Option<String>,
}

/// Read side of the backend REST API.
#[derive(Debug, Clone)]
pub struct VideoApi {
  pub(crate) http: Client,
  base_url: String,
}

impl VideoApi {
  pub fn new(base_url: &str) -> Self {
    Self::with_client(Client::new(), base_url)
  }

  pub fn with_client(http: Client, base_url: &str) -> Self {
    Self { http, base_url: base_url.trim_end_matches('/').to_string() }
  }

  pub(crate) fn endpoint(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path)
  }

  async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
    let response = self.http.get(url).send().await?.error_for_status()?;
    Ok(response.json::<Value>().await?)
  }

  /// Fetch the full catalog.
  pub async fn list_videos(&self) -> Result<Vec<Video>, ApiError> {
    let body = self.get_json(&self.endpoint("videos")).await?;
    let records = match body {
      Value::Array(records) if !records.is_empty() => records,
      _ => return Err(ApiError::EmptyCatalog),
    };

    let total = records.len();
    let videos: Vec<Video> = records
      .into_iter()
      .filter_map(|record| match serde_json::from_value::<VideoRecord>(record) {
        Ok(record) => Some(Video::from(record)),
        Err(e) => {
          warn!(err = %e, "skipping malformed video record");
          None
        }
      })
      .collect();
    if videos.is_empty() {
      return Err(ApiError::FetchFailed(format!("all {} video records were malformed", total)));
    }
    info!(count = videos.len(), skipped = total - videos.len(), "catalog loaded");
    Ok(videos)
  }

  /// Fetch one video by id.
  pub async fn get_video(&self, video_id: &str) -> Result<Video, ApiError> {
    let body = self.get_json(&self.endpoint(&format!("videos/{}", video_id))).await?;
    let record: VideoRecord =
      serde_json::from_value(body).map_err(|e| ApiError::FetchFailed(format!("malformed video record: {}", e)))?;
    if record.video_id.as_deref().is_none_or(str::is_empty) {
      return Err(ApiError::FetchFailed(format!("no video record for id {}", video_id)));
    }
    Ok(record.into())
  }

  /// Search, then resolve every hit to a full record.
  ///
  /// Detail fetches run concurrently and are joined; a hit whose detail fetch fails is dropped
  /// instead of failing the whole search. Order follows the search ranking.
  pub async fn search_videos(&self, query: &str) -> Result<Vec<Video>, ApiError> {
    let mut url = Url::parse(&self.endpoint("search")).map_err(|e| ApiError::FetchFailed(e.to_string()))?;
    url.query_pairs_mut().append_pair("query", query);

    let body = self.get_json(url.as_str()).await?;
    let Some(Value::Array(results)) = body.get("results") else {
      return Err(ApiError::NoSearchResults);
    };

    let ids: Vec<String> = results
      .iter()
      .filter_map(|hit| serde_json::from_value::<SearchHit>(hit.clone()).ok())
      .filter_map(|hit| hit.video_id)
      .filter(|id| !id.is_empty())
      .collect();
    debug!(query = %query, hits = results.len(), ids = ids.len(), "search answered");

    let details = join_all(ids.iter().map(|id| self.get_video(id))).await;
    let videos: Vec<Video> = details
      .into_iter()
      .zip(&ids)
      .filter_map(|(detail, id)| match detail {
        Ok(video) => Some(video),
        Err(e) => {
          warn!(video_id = %id, err = %e, "dropping search hit, detail fetch failed");
          None
        }
      })
      .collect();
    info!(query = %query, count = videos.len(), "search resolved");
    Ok(videos)
  }
}
