/// Light/dark theme selection
use iced::{Color, Theme};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Brand blue (#0077B6)
pub fn primary() -> Color {
    Color::from_rgb8(0x00, 0x77, 0xB6)
}

/// Error red (#EF4444)
pub fn error() -> Color {
    Color::from_rgb8(0xEF, 0x44, 0x44)
}

/// Muted gray for secondary text (#6B7280)
pub fn muted() -> Color {
    Color::from_rgb8(0x6B, 0x72, 0x80)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Light.toggled().toggled(), ThemeMode::Light);
    }

    #[test]
    fn test_maps_to_iced_theme() {
        assert_eq!(ThemeMode::Dark.theme(), Theme::Dark);
        assert_eq!(ThemeMode::Light.theme(), Theme::Light);
    }
}
