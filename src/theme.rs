use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub tag_fg: Color,
  pub tag_bg: Color,
  pub status: Color,
  pub error: Color,
  pub warning: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Dusk",
    bg: Color::Rgb(24, 24, 37),
    fg: Color::Rgb(205, 214, 244),
    accent: Color::Rgb(137, 180, 250),
    muted: Color::Rgb(127, 132, 156),
    border: Color::Rgb(69, 71, 90),
    highlight_fg: Color::Rgb(24, 24, 37),
    highlight_bg: Color::Rgb(137, 180, 250),
    stripe_bg: Color::Rgb(30, 30, 46),
    tag_fg: Color::Rgb(24, 24, 37),
    tag_bg: Color::Rgb(203, 166, 247),
    status: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    warning: Color::Rgb(250, 179, 135),
    key_fg: Color::Rgb(24, 24, 37),
    key_bg: Color::Rgb(127, 132, 156),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 244, 237),
    fg: Color::Rgb(87, 82, 121),
    accent: Color::Rgb(40, 105, 131),
    muted: Color::Rgb(152, 147, 165),
    border: Color::Rgb(206, 202, 205),
    highlight_fg: Color::Rgb(250, 244, 237),
    highlight_bg: Color::Rgb(40, 105, 131),
    stripe_bg: Color::Rgb(242, 233, 225),
    tag_fg: Color::Rgb(250, 244, 237),
    tag_bg: Color::Rgb(144, 122, 169),
    status: Color::Rgb(86, 148, 159),
    error: Color::Rgb(180, 99, 122),
    warning: Color::Rgb(215, 130, 126),
    key_fg: Color::Rgb(250, 244, 237),
    key_bg: Color::Rgb(152, 147, 165),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    tag_fg: Color::Black,
    tag_bg: Color::Magenta,
    status: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme named `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_by_name() {
    assert_eq!(theme_index(Some("Paper")), 1);
    assert_eq!(theme_index(Some("nope")), 0);
    assert_eq!(theme_index(None), 0);
  }
}
