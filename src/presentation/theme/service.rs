use super::adapter;
use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

/// Icon glyphs looked up by the navigation chrome.
#[derive(Debug, Clone, Copy)]
pub struct ThemeIcons {
    /// Back-button glyph.
    pub back: &'static str,
    /// Call-button glyph.
    pub call: &'static str,
    /// Marker shown next to attachment rows.
    pub attachment: &'static str,
}

impl Default for ThemeIcons {
    fn default() -> Self {
        Self {
            back: "‹",
            call: "✆",
            attachment: "⎙",
        }
    }
}

/// Colors and styles consumed by the chat widgets.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    /// Gray used for the status line and the avatar placeholder fill.
    pub gray_status: Color,
    pub title_style: Style,
    pub status_style: Style,
    /// Fill for the avatar slot while its image is loading or failed.
    pub placeholder_style: Style,
    pub selection_style: Style,
    pub dimmed_style: Style,
    pub base_style: Style,
    pub icons: ThemeIcons,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("Yellow", None)
    }
}

impl Theme {
    pub fn new(accent_color_str: &str, status_color_str: Option<&str>) -> Self {
        let accent = parse_color(accent_color_str);
        let status = status_color_str.map(parse_color);
        Self::from_color(accent, status)
    }

    #[must_use]
    pub fn from_color(accent: Color, status_color: Option<Color>) -> Self {
        let gray_status = status_color.unwrap_or(Color::Gray);

        let mut placeholder_hsl = adapter::to_hsl(gray_status);
        placeholder_hsl.l = 0.25;
        placeholder_hsl.s *= 0.4;
        let placeholder_bg = adapter::to_color(placeholder_hsl);

        let mut selection_hsl = adapter::to_hsl(accent);
        selection_hsl.l = 0.2;
        selection_hsl.s = 0.3;
        let selection_bg = adapter::to_color(selection_hsl);

        Self {
            accent,
            gray_status,
            title_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(gray_status),
            placeholder_style: Style::default().bg(placeholder_bg).fg(gray_status),
            selection_style: Style::default().bg(selection_bg).fg(Color::White),
            dimmed_style: Style::default().fg(Color::DarkGray),
            base_style: Style::default().fg(Color::Reset),
            icons: ThemeIcons::default(),
        }
    }
}

fn parse_color(s: &str) -> Color {
    if let Ok(c) = Color::from_str(s) {
        return c;
    }

    if s.starts_with('#')
        && let Ok((r, g, b)) = parse_hex_color(s)
    {
        return Color::Rgb(r, g, b);
    }

    match s.to_lowercase().as_str() {
        "orange" => Color::Indexed(208),
        _ => Color::Yellow,
    }
}

fn parse_hex_color(s: &str) -> Result<(u8, u8, u8), ()> {
    let s = s.trim_start_matches('#');

    if !s.is_ascii() {
        return Err(());
    }

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).map_err(|_| ())?;
        let g = u8::from_str_radix(&s[2..4], 16).map_err(|_| ())?;
        let b = u8::from_str_radix(&s[4..6], 16).map_err(|_| ())?;
        Ok((r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&format!("{}{}", &s[0..1], &s[0..1]), 16).map_err(|_| ())?;
        let g = u8::from_str_radix(&format!("{}{}", &s[1..2], &s[1..2]), 16).map_err(|_| ())?;
        let b = u8::from_str_radix(&format!("{}{}", &s[2..3], &s[2..3]), 16).map_err(|_| ())?;
        Ok((r, g, b))
    } else {
        Err(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Red", Color::Red; "named")]
    #[test_case("blue", Color::Blue; "named lowercase")]
    #[test_case("#FF0000", Color::Rgb(255, 0, 0); "hex")]
    #[test_case("#0f0", Color::Rgb(0, 255, 0); "short hex")]
    #[test_case("Orange", Color::Indexed(208); "orange fallback")]
    #[test_case("Invalid", Color::Yellow; "invalid falls back to yellow")]
    fn test_parse_color(input: &str, expected: Color) {
        assert_eq!(parse_color(input), expected);
    }

    #[test]
    fn test_status_color_override() {
        let theme = Theme::new("Yellow", Some("#888888"));
        assert_eq!(theme.gray_status, Color::Rgb(136, 136, 136));

        let default = Theme::new("Yellow", None);
        assert_eq!(default.gray_status, Color::Gray);
    }

    #[test]
    fn test_default_icons() {
        let theme = Theme::default();
        assert_eq!(theme.icons.back, "‹");
        assert_eq!(theme.icons.call, "✆");
    }
}
