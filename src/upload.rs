use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::VideoApi;

pub const UPLOAD_FAILED: &str = "Upload failed. Try again.";
pub const UPLOAD_ERROR: &str = "Error occurred. Try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
  /// The backend accepted the request but did not hand back an id.
  #[error("upload response carried no video id")]
  MissingVideoId,
  /// Reading the file or talking to the backend failed.
  #[error("upload request failed: {0}")]
  Request(String),
}

impl UploadError {
  /// Message shown inline on the upload form.
  pub fn user_message(&self) -> &'static str {
    match self {
      UploadError::MissingVideoId => UPLOAD_FAILED,
      UploadError::Request(_) => UPLOAD_ERROR,
    }
  }
}

impl From<reqwest::Error> for UploadError {
  fn from(e: reqwest::Error) -> Self {
    UploadError::Request(e.to_string())
  }
}

/// Everything the upload form submits.
#[derive(Debug, Clone)]
pub struct UploadRequest {
  pub title: String,
  pub description: String,
  pub file: PathBuf,
}

/// Best-effort content type from the file extension.
fn video_mime(path: &Path) -> &'static str {
  let ext = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
  match ext.as_deref() {
    Some("mp4" | "m4v") => "video/mp4",
    Some("mov") => "video/quicktime",
    Some("webm") => "video/webm",
    Some("mkv") => "video/x-matroska",
    Some("avi") => "video/x-msvideo",
    _ => "application/octet-stream",
  }
}

impl VideoApi {
  /// Post the file and its metadata, then start analysis without waiting on it.
  ///
  /// Returns the id the backend assigned. Analysis failures never affect the result.
  pub async fn upload_video(&self, request: &UploadRequest) -> Result<String, UploadError> {
    let bytes = tokio::fs::read(&request.file)
      .await
      .map_err(|e| UploadError::Request(format!("failed to read {}: {}", request.file.display(), e)))?;
    let file_name =
      request.file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "video".to_string());
    info!(file = %request.file.display(), size = bytes.len(), "uploading video");

    let part = Part::bytes(bytes).file_name(file_name).mime_str(video_mime(&request.file))?;
    let form = Form::new()
      .text("title", request.title.clone())
      .text("description", request.description.clone())
      .part("file", part);

    let response = self.http.post(self.endpoint("upload")).multipart(form).send().await?.error_for_status()?;
    let body: Value = response.json().await?;
    let video_id = body
      .get("video_id")
      .and_then(Value::as_str)
      .filter(|id| !id.is_empty())
      .map(str::to_string)
      .ok_or(UploadError::MissingVideoId)?;

    info!(video_id = %video_id, "upload accepted");
    self.trigger_analysis(video_id.clone());
    Ok(video_id)
  }

  /// Ask the backend to analyze a freshly uploaded video. Fire-and-forget: errors are logged only.
  pub fn trigger_analysis(&self, video_id: String) -> JoinHandle<()> {
    let api = self.clone();
    tokio::spawn(async move {
      let url = api.endpoint(&format!("analyze/{}", video_id));
      match api.http.post(&url).send().await.and_then(|r| r.error_for_status()) {
        Ok(_) => info!(video_id = %video_id, "analysis started"),
        Err(e) => warn!(video_id = %video_id, err = %e, "analysis trigger failed"),
      }
    })
  }
}
