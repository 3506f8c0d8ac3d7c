//! Diff colours and hex parsing for the config file

use ratatui::style::Color;
use serde::Deserialize;

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Parse hex color string (e.g., "#2ecc71" or "2ecc71")
pub fn parse_hex(s: &str) -> Result<Rgb, String> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return Err(format!("invalid hex color: expected 6 characters, got '{s}'"));
    }

    let channel = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&s[range], 16)
            .map_err(|_| format!("invalid hex color: bad {name} component in '{s}'"))
    };
    Ok(Rgb {
        r: channel(0..2, "red")?,
        g: channel(2..4, "green")?,
        b: channel(4..6, "blue")?,
    })
}

/// Blend `fg` over `bg`; `amount` 1.0 is all `fg`
pub fn blend(fg: Rgb, bg: Rgb, amount: f32) -> Rgb {
    let mix = |f: u8, b: u8| (f as f32 * amount + b as f32 * (1.0 - amount)).round() as u8;
    Rgb {
        r: mix(fg.r, bg.r),
        g: mix(fg.g, bg.g),
        b: mix(fg.b, bg.b),
    }
}

/// Colour overrides from `[ui.colors]`, all hex strings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: Option<String>,
    pub text: Option<String>,
    pub muted: Option<String>,
    pub insert: Option<String>,
    pub delete: Option<String>,
    pub accent: Option<String>,
    pub comment: Option<String>,
}

/// Resolved colours used by the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub insert: Rgb,
    pub delete: Rgb,
    pub accent: Rgb,
    pub comment: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb { r: 0x1e, g: 0x22, b: 0x28 },
            text: Rgb { r: 0xd8, g: 0xde, b: 0xe9 },
            muted: Rgb { r: 0x6c, g: 0x76, b: 0x86 },
            insert: Rgb { r: 0xa3, g: 0xbe, b: 0x8c },
            delete: Rgb { r: 0xbf, g: 0x61, b: 0x6a },
            accent: Rgb { r: 0x88, g: 0xc0, b: 0xd0 },
            comment: Rgb { r: 0xeb, g: 0xcb, b: 0x8b },
        }
    }
}

impl Theme {
    /// Apply config overrides; bad values keep the default and are logged
    pub fn resolve(config: &ColorConfig) -> Self {
        let mut theme = Theme::default();
        let slots: [(&Option<String>, &mut Rgb); 7] = [
            (&config.background, &mut theme.background),
            (&config.text, &mut theme.text),
            (&config.muted, &mut theme.muted),
            (&config.insert, &mut theme.insert),
            (&config.delete, &mut theme.delete),
            (&config.accent, &mut theme.accent),
            (&config.comment, &mut theme.comment),
        ];
        for (value, slot) in slots {
            let Some(value) = value else {
                continue;
            };
            match parse_hex(value) {
                Ok(rgb) => *slot = rgb,
                Err(err) => log::warn!("ignoring colour override: {err}"),
            }
        }
        theme
    }

    /// Strong background of a changed line or span
    pub fn diff_bg(&self, insert: bool) -> Color {
        let base = if insert { self.insert } else { self.delete };
        blend(base, self.background, 0.45).into()
    }

    /// Weak background of an edited line around its intraline marks
    pub fn intraline_bg(&self, insert: bool) -> Color {
        let base = if insert { self.insert } else { self.delete };
        blend(base, self.background, 0.18).into()
    }

    pub fn active_bg(&self) -> Color {
        blend(self.muted, self.background, 0.3).into()
    }
}
