//! Text shaping for the gallery views: excerpts, tag badges, card visibility.

use crate::constants::constants;
use crate::video::Video;

/// A possibly shortened body of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
  pub text: String,
  /// Whether a "Read More" hint should follow the text.
  pub truncated: bool,
}

/// Keep the first `keep` words once `text` runs past `limit` words.
pub fn excerpt(text: &str, limit: usize, keep: usize) -> Excerpt {
  let words: Vec<&str> = text.split_whitespace().collect();
  if words.len() > limit {
    Excerpt { text: format!("{}...", words[..keep.min(words.len())].join(" ")), truncated: true }
  } else {
    Excerpt { text: text.to_string(), truncated: false }
  }
}

pub fn description_excerpt(text: &str) -> Excerpt {
  let limit = constants().description_word_limit;
  excerpt(text, limit, limit)
}

/// Transcriptions are cut harder than descriptions once they run long.
pub fn transcription_excerpt(text: &str) -> Excerpt {
  let c = constants();
  excerpt(text, c.transcription_word_limit, c.transcription_excerpt_words)
}

/// Tags drawn on a card and the overflow badge, if any.
///
/// The badge counts `len - 4`, one less than the number of hidden tags. Kept as the gallery has
/// always shown it.
pub fn card_tags(tags: &[String]) -> (&[String], Option<String>) {
  let limit = constants().card_tag_limit;
  if tags.len() > limit {
    (&tags[..limit], Some(format!("+{}", tags.len() - (limit + 1))))
  } else {
    (tags, None)
  }
}

/// Indices into `videos` of the cards the gallery draws.
pub fn visible_indices(videos: &[Video]) -> Vec<usize> {
  videos.iter().enumerate().filter(|(_, v)| v.is_playable()).map(|(i, _)| i).collect()
}
