use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode, Screen};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// A single-line editable text field with a char-indexed cursor.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
  pub value: String,
  pub cursor: usize,
  /// Horizontal scroll offset in display columns, maintained by the renderer.
  pub scroll: usize,
}

impl TextInput {
  pub fn clear(&mut self) {
    self.value.clear();
    self.cursor = 0;
    self.scroll = 0;
  }

  /// Apply an editing key. Returns whether the value changed.
  pub fn edit(&mut self, code: KeyCode) -> bool {
    match code {
      KeyCode::Char(c) => {
        let byte_idx = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_idx, c);
        self.cursor += 1;
        true
      }
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
          return true;
        }
        false
      }
      KeyCode::Delete => {
        if self.cursor < self.value.chars().count() {
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
          return true;
        }
        false
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        false
      }
      KeyCode::Right => {
        if self.cursor < self.value.chars().count() {
          self.cursor += 1;
        }
        false
      }
      KeyCode::Home => {
        self.cursor = 0;
        false
      }
      KeyCode::End => {
        self.cursor = self.value.chars().count();
        false
      }
      _ => false,
    }
  }
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.player.stop().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  match app.screen {
    Screen::Gallery => {
      if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
        app.open_upload();
        return Ok(());
      }
      match app.mode {
        AppMode::Input => handle_input_key(app, key),
        AppMode::Results => handle_results_key(app, key).await.context("Failed to handle results key event")?,
      }
    }
    Screen::Upload => handle_upload_key(app, key),
  }
  Ok(())
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc => {
      if !app.search.value.is_empty() {
        app.search.clear();
        app.on_query_edited();
      } else if !app.visible.is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down | KeyCode::Tab | KeyCode::Enter => {
      if !app.visible.is_empty() {
        app.mode = AppMode::Results;
      }
    }
    code => {
      if app.search.edit(code) {
        app.on_query_edited();
      }
    }
  }
}

async fn handle_results_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter => {
      if app.select_current().is_some() {
        app.play_selected().await;
      }
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.visible.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.visible.len();
      if count > 0 {
        let i =
          app.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => {
      app.mode = AppMode::Input;
    }
    _ => {}
  }
  Ok(())
}

fn handle_upload_key(app: &mut App, key: event::KeyEvent) {
  if app.upload.in_flight {
    return;
  }
  match key.code {
    KeyCode::Esc => app.back_to_gallery(),
    KeyCode::Tab | KeyCode::Down => app.upload.focus = app.upload.focus.next(),
    KeyCode::BackTab | KeyCode::Up => app.upload.focus = app.upload.focus.prev(),
    KeyCode::Enter => {
      if app.upload.focus.is_last() {
        app.submit_upload();
      } else {
        app.upload.focus = app.upload.focus.next();
      }
    }
    code => {
      app.upload.focused_mut().edit(code);
    }
  }
}
