use serde::Deserialize;

use crate::constants::constants;

pub const UNTITLED: &str = "Untitled Video";
pub const NO_DESCRIPTION: &str = "No description available";

/// A playable video with its metadata, as displayed by the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
  pub video_id: String,
  pub title: String,
  pub ai_generated_title: Option<String>,
  pub description: String,
  pub ai_generated_description: Option<String>,
  pub streaming_url: String,
  /// Ordered; the backend may repeat a label.
  pub tags: Vec<String>,
  pub explicit_content: bool,
  pub transcription: Option<String>,
}

/// A video record exactly as the backend sends it. Every field is optional and may be `null`.
///
/// The backend's raw `explicit_content` (a list of per-frame detections once a video is analysed) is not
/// read; the gallery only needs the `explicit_content_detected` summary.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
  pub video_id: Option<String>,
  pub title: Option<String>,
  pub ai_generated_title: Option<String>,
  pub description: Option<String>,
  pub ai_generated_description: Option<String>,
  pub streaming_url: Option<String>,
  pub s3_url: Option<String>,
  pub tags: Option<Vec<String>>,
  pub explicit_content_detected: Option<bool>,
  pub transcription: Option<String>,
}

/// Treat `""` the same as a missing field.
fn present(field: Option<String>) -> Option<String> {
  field.filter(|s| !s.is_empty())
}

impl From<VideoRecord> for Video {
  fn from(record: VideoRecord) -> Self {
    Self {
      video_id: record.video_id.unwrap_or_default(),
      title: present(record.title).unwrap_or_else(|| UNTITLED.to_string()),
      ai_generated_title: present(record.ai_generated_title),
      description: present(record.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
      ai_generated_description: present(record.ai_generated_description),
      streaming_url: present(record.streaming_url).or(present(record.s3_url)).unwrap_or_default(),
      tags: record.tags.unwrap_or_default(),
      explicit_content: record.explicit_content_detected.unwrap_or(false),
      transcription: present(record.transcription),
    }
  }
}

impl Video {
  /// Whether the gallery draws a card for this video.
  pub fn is_playable(&self) -> bool {
    !self.title.is_empty() && !self.streaming_url.is_empty()
  }
}

/// The fixed placeholder set shown when no authoritative data is available.
pub fn fallback_videos() -> Vec<Video> {
  constants().fallback_videos.clone()
}
