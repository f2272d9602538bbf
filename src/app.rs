use ratatui::widgets::ListState;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::VideoApi;
use crate::config::{Config, Settings};
use crate::controller::{Controller, Effect, Event, SearchState};
use crate::input::TextInput;
use crate::player::VideoPlayer;
use crate::theme::{THEMES, Theme};
use crate::upload::{UploadError, UploadRequest};
use crate::video::Video;
use crate::view::visible_indices;

pub const UPLOADING: &str = "Uploading...";
pub const UPLOAD_SUCCESS: &str = "Video uploaded successfully!";
pub const MISSING_FIELDS: &str = "Please fill in title, description and file.";

/// Which page is on screen: the gallery (`/`) or the upload form (`/upload`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Gallery,
  Upload,
}

/// Keyboard focus within the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadField {
  #[default]
  Title,
  Description,
  File,
}

impl UploadField {
  pub const ALL: [UploadField; 3] = [UploadField::Title, UploadField::Description, UploadField::File];

  pub fn label(self) -> &'static str {
    match self {
      UploadField::Title => "Title",
      UploadField::Description => "Description",
      UploadField::File => "Video file",
    }
  }

  pub fn next(self) -> Self {
    match self {
      UploadField::Title => UploadField::Description,
      UploadField::Description => UploadField::File,
      UploadField::File => UploadField::Title,
    }
  }

  pub fn prev(self) -> Self {
    match self {
      UploadField::Title => UploadField::File,
      UploadField::Description => UploadField::Title,
      UploadField::File => UploadField::Description,
    }
  }

  pub fn is_last(self) -> bool {
    self == UploadField::File
  }
}

#[derive(Debug, Default)]
pub struct UploadForm {
  pub title: TextInput,
  pub description: TextInput,
  /// Path of the local video file.
  pub file: TextInput,
  pub focus: UploadField,
  pub message: Option<String>,
  pub in_flight: bool,
}

impl UploadForm {
  pub fn field_mut(&mut self, field: UploadField) -> &mut TextInput {
    match field {
      UploadField::Title => &mut self.title,
      UploadField::Description => &mut self.description,
      UploadField::File => &mut self.file,
    }
  }

  pub fn focused_mut(&mut self) -> &mut TextInput {
    self.field_mut(self.focus)
  }

  /// All three fields are required.
  pub fn request(&self) -> Option<UploadRequest> {
    let title = self.title.value.trim();
    let description = self.description.value.trim();
    let file = self.file.value.trim();
    if title.is_empty() || description.is_empty() || file.is_empty() {
      return None;
    }
    Some(UploadRequest { title: title.to_string(), description: description.to_string(), file: PathBuf::from(file) })
  }
}

pub struct App {
  pub screen: Screen,
  pub mode: AppMode,
  pub theme_index: usize,
  pub controller: Controller,
  pub search: TextInput,
  pub list_state: ListState,
  /// Indices into the controller's video list of the cards on screen.
  pub visible: Vec<usize>,
  pub upload: UploadForm,
  pub player: VideoPlayer,
  /// Informational message that outlives a screen change (upload success, playback errors).
  pub notice: Option<String>,
  pub should_quit: bool,
  api: VideoApi,
  events_tx: mpsc::UnboundedSender<Event>,
  events_rx: mpsc::UnboundedReceiver<Event>,
  debounce_handle: Option<JoinHandle<()>>,
  upload_rx: Option<oneshot::Receiver<Result<String, UploadError>>>,
}

impl App {
  pub fn new(settings: &Settings, theme_index: usize) -> Self {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::Gallery,
      mode: AppMode::Input,
      theme_index: theme_index.min(THEMES.len() - 1),
      controller: Controller::new(settings.debounce),
      search: TextInput::default(),
      list_state: ListState::default(),
      visible: Vec::new(),
      upload: UploadForm::default(),
      player: VideoPlayer::default(),
      notice: None,
      should_quit: false,
      api: VideoApi::new(&settings.api_url),
      events_tx,
      events_rx,
      debounce_handle: None,
      upload_rx: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index]
  }

  pub fn state(&self) -> &SearchState {
    self.controller.state()
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  // --- Controller plumbing ---

  /// Feed one event to the controller and run whatever it asks for.
  pub fn dispatch(&mut self, event: Event) {
    let effects = self.controller.handle(event);
    self.refresh_visible();
    for effect in effects {
      self.execute(effect);
    }
  }

  fn execute(&mut self, effect: Effect) {
    let tx = self.events_tx.clone();
    match effect {
      Effect::FetchCatalog { request } => {
        debug!(request, "fetching catalog");
        let api = self.api.clone();
        tokio::spawn(async move {
          let result = api.list_videos().await;
          if let Err(ref e) = result {
            warn!(err = %e, "catalog fetch failed");
          }
          let _ = tx.send(Event::CatalogLoaded { request, result });
        });
      }
      Effect::Search { request, query } => {
        info!(query = %query, request, "search triggered");
        let api = self.api.clone();
        tokio::spawn(async move {
          let result = api.search_videos(&query).await;
          if let Err(ref e) = result {
            warn!(query = %query, err = %e, "search failed");
          }
          let _ = tx.send(Event::SearchCompleted { request, result });
        });
      }
      Effect::ScheduleDebounce { generation, delay } => {
        if let Some(handle) = self.debounce_handle.take() {
          handle.abort();
        }
        self.debounce_handle = Some(tokio::spawn(async move {
          tokio::time::sleep(delay).await;
          let _ = tx.send(Event::DebounceElapsed { generation });
        }));
      }
    }
  }

  /// Rebuild the on-screen card list and keep the list selection inside it.
  fn refresh_visible(&mut self) {
    self.visible = visible_indices(&self.state().videos);
    if self.visible.is_empty() {
      self.list_state.select(None);
      if self.mode == AppMode::Results {
        self.mode = AppMode::Input;
      }
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(self.visible.len() - 1)));
    }
  }

  /// Drain finished background work. Called once per tick by the run loop.
  pub fn check_pending(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      self.dispatch(event);
    }

    if let Some(mut rx) = self.upload_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.finish_upload(result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.upload_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.finish_upload(Err(UploadError::Request("upload task ended unexpectedly".to_string())));
        }
      }
    }

    self.player.reap();
  }

  // --- Gallery ---

  pub fn mount(&mut self) {
    self.search.clear();
    self.mode = AppMode::Input;
    self.list_state.select(None);
    self.dispatch(Event::Mount);
  }

  pub fn on_query_edited(&mut self) {
    self.notice = None;
    self.dispatch(Event::QueryChanged(self.search.value.clone()));
  }

  /// Select the highlighted card. Returns the newly selected video.
  pub fn select_current(&mut self) -> Option<&Video> {
    let &index = self.visible.get(self.list_state.selected()?)?;
    self.dispatch(Event::Select(index));
    self.state().selected.as_ref()
  }

  pub async fn play_selected(&mut self) {
    let Some(video) = self.controller.state().selected.clone() else { return };
    match self.player.play(&video).await {
      Ok(()) => self.notice = None,
      Err(e) => {
        warn!(err = %e, "playback failed");
        self.notice = Some(format!("Playback error: {:#}", e));
      }
    }
  }

  // --- Navigation ---

  pub fn open_upload(&mut self) {
    info!("navigating to upload form");
    if let Some(handle) = self.debounce_handle.take() {
      handle.abort();
    }
    self.upload = UploadForm::default();
    self.notice = None;
    self.screen = Screen::Upload;
  }

  pub fn back_to_gallery(&mut self) {
    info!("navigating to gallery");
    self.screen = Screen::Gallery;
    self.mount();
  }

  // --- Upload ---

  pub fn submit_upload(&mut self) {
    if self.upload.in_flight {
      return;
    }
    let Some(request) = self.upload.request() else {
      self.upload.message = Some(MISSING_FIELDS.to_string());
      return;
    };
    self.upload.message = Some(UPLOADING.to_string());
    self.upload.in_flight = true;

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.upload_video(&request).await);
    });
    self.upload_rx = Some(rx);
  }

  pub fn finish_upload(&mut self, result: Result<String, UploadError>) {
    self.upload.in_flight = false;
    match result {
      Ok(video_id) => {
        info!(video_id = %video_id, "upload finished");
        self.upload = UploadForm::default();
        self.back_to_gallery();
        self.notice = Some(UPLOAD_SUCCESS.to_string());
      }
      Err(e) => {
        warn!(err = %e, "upload failed");
        self.upload.message = Some(e.user_message().to_string());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::controller::{ERROR_FETCHING_VIDEOS, Phase};
  use serde_json::json;
  use std::io::Write;
  use std::time::Duration;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn app_for(api_url: &str) -> App {
    App::new(&Settings { api_url: api_url.to_string(), debounce: Duration::from_millis(20) }, 0)
  }

  /// Tick the app until `done` holds, as the run loop would.
  async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..100 {
      app.check_pending();
      if done(app) {
        return;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("app did not settle");
  }

  fn type_query(app: &mut App, text: &str) {
    for c in text.chars() {
      app.search.edit(ratatui::crossterm::event::KeyCode::Char(c));
      app.on_query_edited();
    }
  }

  fn fill_form(app: &mut App, file: &str) {
    app.upload.title.value = "T".to_string();
    app.upload.description.value = "D".to_string();
    app.upload.file.value = file.to_string();
  }

  #[test]
  fn upload_fields_cycle() {
    let mut field = UploadField::default();
    for expected in [UploadField::Description, UploadField::File, UploadField::Title] {
      field = field.next();
      assert_eq!(field, expected);
    }
    assert_eq!(UploadField::Title.prev(), UploadField::File);
  }

  #[tokio::test]
  async fn mount_with_one_record_then_select() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
        "video_id": "1",
        "title": "Sunday Service",
        "description": "Full recording",
        "streaming_url": "https://cdn.example/1.m3u8",
        "tags": ["Faith"],
        "explicit_content_detected": false
      }])))
      .mount(&server)
      .await;

    let mut app = app_for(&server.uri());
    app.mount();
    settle(&mut app, |a| !a.state().videos.is_empty()).await;

    assert_eq!(app.visible, vec![0]);
    assert_eq!(app.state().videos[0].title, "Sunday Service");
    let selected = app.select_current().cloned().unwrap();
    assert_eq!(selected.title, "Sunday Service");
    assert_eq!(selected.description, "Full recording");
    assert_eq!(selected.streaming_url, "https://cdn.example/1.m3u8");
  }

  #[tokio::test]
  async fn unreachable_backend_shows_placeholders() {
    let mut app = app_for("http://127.0.0.1:9");
    app.mount();
    settle(&mut app, |a| a.state().phase == Phase::Error).await;

    assert_eq!(app.state().videos.len(), 2);
    assert_eq!(app.visible.len(), 2);
    assert_eq!(app.state().error.as_deref(), Some(ERROR_FETCHING_VIDEOS));
  }

  #[tokio::test]
  async fn typing_searches_once_after_pause() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/videos"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "video_id": "1", "streaming_url": "u1" }])))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/search"))
      .and(query_param("query", "faith"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [{ "video_id": "2" }] })))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/videos/2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "video_id": "2",
        "title": "Godly Ambition",
        "streaming_url": "u2"
      })))
      .mount(&server)
      .await;

    let mut app = app_for(&server.uri());
    app.mount();
    settle(&mut app, |a| !a.state().videos.is_empty()).await;

    type_query(&mut app, "faith");
    settle(&mut app, |a| a.state().phase == Phase::ShowingResults).await;

    assert_eq!(app.state().videos.len(), 1);
    assert_eq!(app.state().videos[0].video_id, "2");
    let searches = server.received_requests().await.unwrap().iter().filter(|r| r.url.path() == "/search").count();
    assert_eq!(searches, 1);
  }

  #[tokio::test]
  async fn missing_fields_block_submit() {
    let mut app = app_for("http://127.0.0.1:9");
    app.open_upload();
    app.upload.title.value = "T".to_string();
    app.submit_upload();
    assert_eq!(app.upload.message.as_deref(), Some(MISSING_FIELDS));
    assert!(!app.upload.in_flight);
  }

  #[tokio::test]
  async fn successful_upload_returns_to_gallery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/upload"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "video_id": "9" })))
      .mount(&server)
      .await;
    Mock::given(method("POST")).and(path("/analyze/9")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    file.write_all(b"frames").unwrap();

    let mut app = app_for(&server.uri());
    app.open_upload();
    fill_form(&mut app, &file.path().display().to_string());
    app.submit_upload();
    assert_eq!(app.upload.message.as_deref(), Some(UPLOADING));

    settle(&mut app, |a| a.screen == Screen::Gallery).await;
    assert_eq!(app.notice.as_deref(), Some(UPLOAD_SUCCESS));
    assert!(app.upload.title.value.is_empty());

    for _ in 0..50 {
      let seen = server.received_requests().await.unwrap_or_default();
      if seen.iter().any(|r| r.url.path() == "/analyze/9") {
        return;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("analysis was never requested");
  }

  #[tokio::test]
  async fn upload_without_id_stays_on_form() {
    let mut app = app_for("http://127.0.0.1:9");
    app.open_upload();
    fill_form(&mut app, "/tmp/clip.mp4");
    app.finish_upload(Err(UploadError::MissingVideoId));

    assert_eq!(app.screen, Screen::Upload);
    assert_eq!(app.upload.message.as_deref(), Some("Upload failed. Try again."));
    assert_eq!(app.upload.title.value, "T");
  }
}
