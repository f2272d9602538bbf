//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so there is no runtime file I/O.
//! Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use crate::video::Video;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub default_api_url: String,
  pub debounce_ms: u64,

  // Player panel excerpts
  pub description_word_limit: usize,
  pub transcription_word_limit: usize,
  pub transcription_excerpt_words: usize,
  pub card_tag_limit: usize,

  pub fallback_videos: Vec<Video>,
}

impl Constants {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the first test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
