use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode, Screen, UploadField};
use crate::controller::Phase;
use crate::input::TextInput;
use crate::theme::Theme;
use crate::video::Video;
use crate::view::{Excerpt, card_tags, description_excerpt, transcription_excerpt};

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  match app.screen {
    Screen::Gallery => render_gallery(frame, app),
    Screen::Upload => render_upload(frame, app),
  }
}

fn render_gallery(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area, "Gallery");

  if app.state().selected.is_some() {
    let [list_area, player_area] =
      Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(main_area);
    render_videos(frame, app, list_area);
    render_player(frame, app, player_area);
  } else {
    render_videos(frame, app, main_area);
  }

  render_status(frame, app, status_area);
  let focused = app.mode == AppMode::Input;
  render_text_input(frame, theme, input_area, &mut app.search, " Search for a video ", focused);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect, page: &str) {
  let left = Line::from(vec![
    Span::styled(" ▶ VedStream ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("· {}", page), Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

/// A three-row card: title with explicit warning, up to three tags, spacer.
fn card_item(video: &Video, theme: &Theme, inner_w: usize, bg: Color, fg: Color) -> ListItem<'static> {
  let mut title_spans =
    vec![Span::styled(truncate_str(&video.title, inner_w), Style::default().fg(fg).add_modifier(Modifier::BOLD))];
  if video.explicit_content {
    title_spans.push(Span::styled("  ⚠ Explicit Content", Style::default().fg(theme.warning)));
  }

  let (tags, badge) = card_tags(&video.tags);
  let mut tag_spans: Vec<Span> = Vec::new();
  for tag in tags {
    tag_spans.push(Span::styled(format!(" {} ", tag), Style::default().fg(theme.tag_fg).bg(theme.tag_bg)));
    tag_spans.push(Span::raw(" "));
  }
  if let Some(badge) = badge {
    tag_spans.push(Span::styled(format!(" {} ", badge), Style::default().fg(theme.muted)));
  }

  ListItem::new(vec![Line::from(title_spans), Line::from(tag_spans), Line::from("")]).bg(bg)
}

fn render_videos(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let state = app.controller.state();

  let title = match state.phase {
    Phase::ShowingResults | Phase::Searching if !state.query.trim().is_empty() => {
      format!(" Results for '{}' ", state.query.trim())
    }
    _ => " Videos ".to_string(),
  };
  let block = rounded(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  if app.visible.is_empty() {
    let text = Paragraph::new(Line::from(Span::styled("No videos to show.", Style::default().fg(theme.muted))))
      .alignment(Alignment::Center)
      .block(block);
    frame.render_widget(text, area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected_row = app.list_state.selected();
  let items: Vec<ListItem> = app
    .visible
    .iter()
    .enumerate()
    .filter_map(|(row, &idx)| state.videos.get(idx).map(|video| (row, video)))
    .map(|(row, video)| {
      let is_selected = Some(row) == selected_row;
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if row % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      card_item(video, theme, inner_w, bg, fg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn excerpt_spans(excerpt: Excerpt, theme: &Theme) -> Vec<Span<'static>> {
  let mut spans = vec![Span::styled(excerpt.text, Style::default().fg(theme.fg))];
  if excerpt.truncated {
    spans.push(Span::styled(" Read More", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  }
  spans
}

fn labeled(label: &str, mut value: Vec<Span<'static>>, theme: &Theme) -> Line<'static> {
  let mut spans =
    vec![Span::styled(format!("{}: ", label), Style::default().fg(theme.muted).add_modifier(Modifier::BOLD))];
  spans.append(&mut value);
  Line::from(spans)
}

fn render_player(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let Some(video) = &app.state().selected else { return };

  let playing = app.player.source.as_deref() == Some(video.streaming_url.as_str());
  let heading = if playing { " Now Playing " } else { " Selected " };
  let block = rounded(theme)
    .title(Span::styled(heading, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .padding(Padding::horizontal(1));

  let bold_fg = Style::default().fg(theme.fg).add_modifier(Modifier::BOLD);
  let plain = |s: &str| vec![Span::styled(s.to_string(), Style::default().fg(theme.fg))];
  let mut lines = vec![
    Line::from(Span::styled(
      video.streaming_url.clone(),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
    Line::from(""),
    labeled("Title", vec![Span::styled(video.title.clone(), bold_fg)], theme),
    labeled("AI Generated Title", plain(video.ai_generated_title.as_deref().unwrap_or("")), theme),
    Line::from(""),
    labeled("Description", excerpt_spans(description_excerpt(&video.description), theme), theme),
    labeled(
      "AI Generated Description",
      excerpt_spans(description_excerpt(video.ai_generated_description.as_deref().unwrap_or("")), theme),
      theme,
    ),
  ];
  if video.explicit_content {
    lines.push(Line::from(Span::styled("⚠ Explicit Content", Style::default().fg(theme.warning))));
  }

  if !video.tags.is_empty() {
    lines.push(Line::from(""));
    let mut tag_spans = vec![Span::styled("Tags: ", Style::default().fg(theme.muted).add_modifier(Modifier::BOLD))];
    for tag in &video.tags {
      tag_spans.push(Span::styled(format!(" {} ", tag), Style::default().fg(theme.tag_fg).bg(theme.tag_bg)));
      tag_spans.push(Span::raw(" "));
    }
    lines.push(Line::from(tag_spans));
  }

  if let Some(transcription) = &video.transcription {
    lines.push(Line::from(""));
    let heading = Style::default().fg(theme.muted).add_modifier(Modifier::BOLD);
    lines.push(Line::from(Span::styled("📜 Transcription:", heading)));
    lines.push(Line::from(excerpt_spans(transcription_excerpt(transcription), theme)));
  }

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let state = app.state();
  let (text, style) = if state.phase == Phase::Searching {
    (format!(" ⏳ Searching '{}'…", state.query.trim()), Style::default().fg(theme.status))
  } else if let Some(err) = &state.error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(notice) = &app.notice {
    (format!(" ✓ {}", notice), Style::default().fg(theme.status))
  } else if let (true, Some(video)) = (app.player.is_playing(), &state.selected) {
    (format!(" ♪ Playing {}", video.title), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Adjust `input.scroll` so column `cursor_col` sits inside a window `inner_w` columns wide (at least 1).
fn scroll_to_cursor(input: &mut TextInput, cursor_col: usize, inner_w: usize) -> usize {
  let inner_w = inner_w.max(1);
  if cursor_col < input.scroll {
    input.scroll = cursor_col;
  } else if cursor_col >= input.scroll + inner_w {
    input.scroll = cursor_col + 1 - inner_w;
  }
  input.scroll
}

/// Draw a bordered single-line input, scrolling it horizontally to keep the cursor visible.
fn render_text_input(frame: &mut Frame, theme: &Theme, area: Rect, input: &mut TextInput, title: &str, focused: bool) {
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(title.to_string())
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4).max(1) as usize;
  let cursor_col = display_width(&input.value, input.cursor);
  let scroll = scroll_to_cursor(input, cursor_col, inner_w);
  let visible: String = input
    .value
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_upload(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  let [header_area, body_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());
  render_header(frame, theme, header_area, "Upload Video");

  let outer = rounded(theme)
    .title(Span::styled(" Upload Video ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .padding(Padding::uniform(1));
  let inner = outer.inner(body_area);
  frame.render_widget(outer, body_area);

  let [title_area, description_area, file_area, message_area] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Length(3),
    Constraint::Min(1),
  ])
  .areas(inner);

  let focus = app.upload.focus;
  let editable = !app.upload.in_flight;
  for (field, field_area) in UploadField::ALL.into_iter().zip([title_area, description_area, file_area]) {
    let title = format!(" {} ", field.label());
    render_text_input(frame, theme, field_area, app.upload.field_mut(field), &title, editable && field == focus);
  }

  if let Some(message) = &app.upload.message {
    let color = if app.upload.in_flight { theme.status } else { theme.fg };
    frame.render_widget(Paragraph::new(message.as_str()).style(Style::default().fg(color)), message_area);
  }

  render_footer(frame, app, footer_area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match (app.screen, app.mode) {
    (Screen::Gallery, AppMode::Input) => {
      let mut k = vec![("Type", "Search"), ("^u", "Upload"), ("^t", "Theme")];
      if is_playing {
        k.push(("^s", "Stop"));
      }
      if app.visible.is_empty() {
        k.push(("Esc", "Quit"));
      } else {
        k.push(("↓", "Videos"));
      }
      k
    }
    (Screen::Gallery, AppMode::Results) => {
      let mut k = vec![("Enter", "Play"), ("j/k", "Navigate"), ("^u", "Upload")];
      if is_playing {
        k.push(("^s", "Stop"));
      }
      k.push(("^t", "Theme"));
      k.push(("Esc", "Search"));
      k
    }
    (Screen::Upload, _) => {
      if app.upload.in_flight {
        vec![("^c", "Quit")]
      } else {
        vec![("Tab", "Next field"), ("Enter", "Next / Upload"), ("Esc", "Back")]
      }
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
