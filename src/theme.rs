//! Theme colors, with optional hex overrides from the config file

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights
    pub danger: Color,           // Errors
    pub success: Color,          // Success toasts, action buttons
    pub info: Color,             // Informational toasts
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Secondary text
    pub bg_selected: Color,      // Selected row background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Page title
}

/// `[theme]` table in config.toml; each entry is `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        // Field greens and soil browns
        Self {
            accent: Color::Rgb(132, 204, 22),
            danger: Color::Rgb(239, 68, 68),
            success: Color::Rgb(22, 163, 74),
            info: Color::Rgb(96, 165, 250),
            text: Color::Rgb(229, 231, 235),
            text_dim: Color::Rgb(156, 163, 175),
            bg_selected: Color::Rgb(55, 65, 81),
            inactive: Color::Rgb(75, 85, 99),
            header: Color::Rgb(250, 204, 21),
        }
    }
}

impl Theme {
    /// Default palette with any valid overrides applied
    pub fn load(overrides: &ThemeOverrides) -> Self {
        let mut theme = Self::default();

        let apply = |slot: &mut Color, value: &Option<String>, name: &str| {
            if let Some(value) = value {
                match Self::parse_hex_color(value) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring invalid theme color {} = {:?}", name, value),
                }
            }
        };

        apply(&mut theme.accent, &overrides.accent, "accent");
        apply(&mut theme.danger, &overrides.danger, "danger");
        apply(&mut theme.success, &overrides.success, "success");
        apply(&mut theme.text, &overrides.text, "text");
        apply(&mut theme.text_dim, &overrides.text_dim, "text_dim");

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_overrides_apply_and_bad_values_fall_back() {
        let overrides = ThemeOverrides {
            accent: Some("#000000".to_string()),
            danger: Some("not-a-color".to_string()),
            ..Default::default()
        };
        let theme = Theme::load(&overrides);

        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, Theme::default().danger);
    }
}
