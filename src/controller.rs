//! Search and selection view-state.
//!
//! [`Controller::handle`] is a pure transition from an [`Event`] to a list of [`Effect`]s. It never
//! touches the network or a clock: the runtime in `app.rs` executes effects and feeds their outcomes
//! back as events.
//!
//! Every keystroke and every mount bumps a monotonic generation. Debounce timers and fetches are
//! tagged with the generation that issued them, and anything reporting back with an older tag is
//! dropped, so the last query always wins.

use std::time::Duration;
use tracing::debug;

use crate::api::ApiError;
use crate::video::{Video, fallback_videos};

pub const NO_VIDEOS_FOUND: &str = "No videos found. Displaying default videos.";
pub const ERROR_FETCHING_VIDEOS: &str = "Error fetching videos. Displaying default videos.";
pub const NO_SEARCH_RESULTS: &str = "No search results found.";
pub const ERROR_FETCHING_RESULTS: &str = "Error fetching search results.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  /// Showing the full catalog or the fallback set.
  #[default]
  Idle,
  /// A debounce timer is pending.
  Typing,
  /// A search request is in flight.
  Searching,
  ShowingResults,
  Error,
}

#[derive(Debug)]
pub enum Event {
  Mount,
  QueryChanged(String),
  DebounceElapsed { generation: u64 },
  CatalogLoaded { request: u64, result: Result<Vec<Video>, ApiError> },
  SearchCompleted { request: u64, result: Result<Vec<Video>, ApiError> },
  /// Index into `SearchState::videos`.
  Select(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  FetchCatalog { request: u64 },
  Search { request: u64, query: String },
  /// Replaces any pending timer.
  ScheduleDebounce { generation: u64, delay: Duration },
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
  pub query: String,
  pub videos: Vec<Video>,
  pub selected: Option<Video>,
  pub error: Option<String>,
  pub phase: Phase,
  generation: u64,
}

impl SearchState {
  fn fall_back(&mut self, message: &str) {
    self.videos = fallback_videos();
    self.error = Some(message.to_string());
    self.phase = Phase::Error;
  }
}

pub struct Controller {
  state: SearchState,
  debounce: Duration,
}

impl Controller {
  pub fn new(debounce: Duration) -> Self {
    Self { state: SearchState::default(), debounce }
  }

  pub fn state(&self) -> &SearchState {
    &self.state
  }

  pub fn handle(&mut self, event: Event) -> Vec<Effect> {
    let state = &mut self.state;
    match event {
      Event::Mount => {
        state.generation += 1;
        state.query.clear();
        state.selected = None;
        state.error = None;
        state.phase = Phase::Idle;
        vec![Effect::FetchCatalog { request: state.generation }]
      }
      Event::QueryChanged(query) => {
        state.generation += 1;
        state.query = query;
        state.phase = Phase::Typing;
        vec![Effect::ScheduleDebounce { generation: state.generation, delay: self.debounce }]
      }
      Event::DebounceElapsed { generation } => {
        if generation != state.generation {
          debug!(generation, current = state.generation, "stale debounce ignored");
          return Vec::new();
        }
        let query = state.query.trim();
        if query.is_empty() {
          state.phase = Phase::Idle;
          vec![Effect::FetchCatalog { request: generation }]
        } else {
          state.phase = Phase::Searching;
          vec![Effect::Search { request: generation, query: query.to_string() }]
        }
      }
      Event::CatalogLoaded { request, result } => {
        if request != state.generation {
          debug!(request, current = state.generation, "stale catalog response dropped");
          return Vec::new();
        }
        match result {
          Ok(videos) => {
            state.videos = videos;
            state.error = None;
            state.phase = Phase::Idle;
          }
          Err(ApiError::EmptyCatalog) => state.fall_back(NO_VIDEOS_FOUND),
          Err(_) => state.fall_back(ERROR_FETCHING_VIDEOS),
        }
        Vec::new()
      }
      Event::SearchCompleted { request, result } => {
        if request != state.generation {
          debug!(request, current = state.generation, "stale search response dropped");
          return Vec::new();
        }
        match result {
          Ok(videos) => {
            state.videos = videos;
            state.error = None;
            state.phase = Phase::ShowingResults;
          }
          Err(ApiError::NoSearchResults) => {
            state.error = Some(NO_SEARCH_RESULTS.to_string());
            state.phase = Phase::ShowingResults;
          }
          Err(_) => state.fall_back(ERROR_FETCHING_RESULTS),
        }
        Vec::new()
      }
      Event::Select(index) => {
        if let Some(video) = state.videos.get(index) {
          state.selected = Some(video.clone());
        }
        Vec::new()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DEBOUNCE: Duration = Duration::from_millis(500);

  fn video(id: &str, title: &str) -> Video {
    Video {
      video_id: id.to_string(),
      title: title.to_string(),
      ai_generated_title: None,
      description: "desc".to_string(),
      ai_generated_description: None,
      streaming_url: format!("https://cdn.example/{}.m3u8", id),
      tags: Vec::new(),
      explicit_content: false,
      transcription: None,
    }
  }

  fn request_of(effects: &[Effect]) -> u64 {
    match effects {
      [Effect::FetchCatalog { request }] | [Effect::Search { request, .. }] => *request,
      other => panic!("expected a single fetch effect, got {:?}", other),
    }
  }

  /// Mount and answer the catalog fetch.
  fn mounted(result: Result<Vec<Video>, ApiError>) -> Controller {
    let mut c = Controller::new(DEBOUNCE);
    let request = request_of(&c.handle(Event::Mount));
    c.handle(Event::CatalogLoaded { request, result });
    c
  }

  /// Type a query and let its debounce fire; returns the resulting effects.
  fn type_and_wait(c: &mut Controller, query: &str) -> Vec<Effect> {
    let effects = c.handle(Event::QueryChanged(query.to_string()));
    let [Effect::ScheduleDebounce { generation, .. }] = effects.as_slice() else {
      panic!("expected a debounce, got {:?}", effects);
    };
    c.handle(Event::DebounceElapsed { generation: *generation })
  }

  #[test]
  fn mount_fetches_catalog() {
    let mut c = Controller::new(DEBOUNCE);
    let effects = c.handle(Event::Mount);
    assert!(matches!(effects.as_slice(), [Effect::FetchCatalog { .. }]));
    assert_eq!(c.state().phase, Phase::Idle);
  }

  #[test]
  fn catalog_success_populates_list_and_selection_round_trips() {
    let mut c = mounted(Ok(vec![video("1", "Only One")]));
    assert_eq!(c.state().videos.len(), 1);
    assert_eq!(c.state().videos[0].title, "Only One");
    assert_eq!(c.state().error, None);

    c.handle(Event::Select(0));
    let selected = c.state().selected.as_ref().unwrap();
    assert_eq!(selected.title, "Only One");
    assert_eq!(selected.streaming_url, "https://cdn.example/1.m3u8");
    assert_eq!(c.state().phase, Phase::Idle);
  }

  #[test]
  fn empty_catalog_shows_fallback_with_no_videos_message() {
    let c = mounted(Err(ApiError::EmptyCatalog));
    assert_eq!(c.state().videos, fallback_videos());
    assert_eq!(c.state().error.as_deref(), Some(NO_VIDEOS_FOUND));
    assert_eq!(c.state().phase, Phase::Error);
  }

  #[test]
  fn unreachable_backend_shows_fallback_with_error_message() {
    let c = mounted(Err(ApiError::FetchFailed("connection refused".into())));
    assert_eq!(c.state().videos.len(), 2);
    assert_eq!(c.state().videos, fallback_videos());
    assert_eq!(c.state().error.as_deref(), Some(ERROR_FETCHING_VIDEOS));
    assert_ne!(NO_VIDEOS_FOUND, ERROR_FETCHING_VIDEOS);
  }

  #[test]
  fn keystroke_schedules_debounce_and_types() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    let effects = c.handle(Event::QueryChanged("f".into()));
    assert!(matches!(effects.as_slice(), [Effect::ScheduleDebounce { delay: DEBOUNCE, .. }]));
    assert_eq!(c.state().phase, Phase::Typing);
    assert_eq!(c.state().query, "f");
  }

  #[test]
  fn only_last_keystroke_debounce_fires() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    let first = c.handle(Event::QueryChanged("fa".into()));
    let [Effect::ScheduleDebounce { generation: stale, .. }] = first.as_slice() else { panic!() };
    let stale = *stale;
    let second = c.handle(Event::QueryChanged("faith".into()));
    let [Effect::ScheduleDebounce { generation: latest, .. }] = second.as_slice() else { panic!() };
    let latest = *latest;

    assert!(c.handle(Event::DebounceElapsed { generation: stale }).is_empty());
    assert_eq!(c.state().phase, Phase::Typing);
    let effects = c.handle(Event::DebounceElapsed { generation: latest });
    assert!(matches!(effects.as_slice(), [Effect::Search { query, .. }] if query == "faith"));
  }

  #[test]
  fn blank_query_refetches_catalog_instead_of_searching() {
    for query in ["", "   ", "\t"] {
      let mut c = mounted(Ok(vec![video("1", "a")]));
      let effects = type_and_wait(&mut c, query);
      assert!(matches!(effects.as_slice(), [Effect::FetchCatalog { .. }]), "query {:?}", query);
      assert_eq!(c.state().phase, Phase::Idle);
    }
  }

  #[test]
  fn search_query_is_trimmed() {
    let mut c = mounted(Ok(Vec::new()));
    let effects = type_and_wait(&mut c, "  faith ");
    assert!(matches!(effects.as_slice(), [Effect::Search { query, .. }] if query == "faith"));
    assert_eq!(c.state().phase, Phase::Searching);
  }

  #[test]
  fn search_success_replaces_list() {
    let mut c = mounted(Err(ApiError::FetchFailed("down".into())));
    let request = request_of(&type_and_wait(&mut c, "faith"));
    c.handle(Event::SearchCompleted { request, result: Ok(vec![video("2", "Godly Ambition")]) });

    assert_eq!(c.state().phase, Phase::ShowingResults);
    assert_eq!(c.state().videos.len(), 1);
    assert_eq!(c.state().videos[0].video_id, "2");
    assert_eq!(c.state().error, None);
  }

  #[test]
  fn search_without_results_keeps_prior_list() {
    let catalog = vec![video("1", "a"), video("3", "c")];
    let mut c = mounted(Ok(catalog.clone()));
    let request = request_of(&type_and_wait(&mut c, "zzz"));
    c.handle(Event::SearchCompleted { request, result: Err(ApiError::NoSearchResults) });

    assert_eq!(c.state().videos, catalog);
    assert_eq!(c.state().error.as_deref(), Some(NO_SEARCH_RESULTS));
  }

  #[test]
  fn search_failure_falls_back() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    let request = request_of(&type_and_wait(&mut c, "faith"));
    c.handle(Event::SearchCompleted { request, result: Err(ApiError::FetchFailed("timeout".into())) });

    assert_eq!(c.state().phase, Phase::Error);
    assert_eq!(c.state().videos, fallback_videos());
    assert_eq!(c.state().error.as_deref(), Some(ERROR_FETCHING_RESULTS));
  }

  #[test]
  fn stale_search_response_is_dropped() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    let old = request_of(&type_and_wait(&mut c, "fa"));
    let new = request_of(&type_and_wait(&mut c, "faith"));
    assert!(new > old);

    c.handle(Event::SearchCompleted { request: new, result: Ok(vec![video("2", "new")]) });
    c.handle(Event::SearchCompleted { request: old, result: Ok(vec![video("9", "old")]) });
    assert_eq!(c.state().videos, vec![video("2", "new")]);
  }

  #[test]
  fn keystroke_invalidates_in_flight_search() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    let request = request_of(&type_and_wait(&mut c, "fa"));
    c.handle(Event::QueryChanged("fai".into()));
    c.handle(Event::SearchCompleted { request, result: Ok(vec![video("9", "old")]) });

    assert_eq!(c.state().videos, vec![video("1", "a")]);
    assert_eq!(c.state().phase, Phase::Typing);
  }

  #[test]
  fn stale_catalog_never_overwrites_search_results() {
    let mut c = Controller::new(DEBOUNCE);
    let catalog_request = request_of(&c.handle(Event::Mount));
    let search_request = request_of(&type_and_wait(&mut c, "faith"));
    c.handle(Event::SearchCompleted { request: search_request, result: Ok(vec![video("2", "hit")]) });
    c.handle(Event::CatalogLoaded { request: catalog_request, result: Err(ApiError::EmptyCatalog) });

    assert_eq!(c.state().videos, vec![video("2", "hit")]);
    assert_eq!(c.state().error, None);
  }

  #[test]
  fn selection_survives_list_replacement() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    c.handle(Event::Select(0));
    let request = request_of(&type_and_wait(&mut c, "b"));
    c.handle(Event::SearchCompleted { request, result: Ok(vec![video("2", "b")]) });
    assert_eq!(c.state().selected.as_ref().map(|v| v.video_id.as_str()), Some("1"));

    c.handle(Event::Select(0));
    assert_eq!(c.state().selected.as_ref().map(|v| v.video_id.as_str()), Some("2"));
  }

  #[test]
  fn out_of_range_selection_is_ignored() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    c.handle(Event::Select(5));
    assert!(c.state().selected.is_none());
  }

  #[test]
  fn remount_resets_query_and_selection() {
    let mut c = mounted(Ok(vec![video("1", "a")]));
    c.handle(Event::Select(0));
    c.handle(Event::QueryChanged("abc".into()));
    c.handle(Event::Mount);
    assert!(c.state().query.is_empty());
    assert!(c.state().selected.is_none());
    assert_eq!(c.state().phase, Phase::Idle);
  }
}
