use anyhow::Result;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::config_dir;

pub fn hex_to_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 { return Color::Reset; }
    let r = u8::from_str_radix(&h[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&h[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&h[4..6], 16).unwrap_or(0);
    Color::Rgb(r, g, b)
}

/// Accent palettes: (name, 300, 500, 600 shades).
const ACCENTS: &[(&str, &str, &str, &str)] = &[
    ("indigo",  "#a5b4fc", "#6366f1", "#4f46e5"),
    ("rose",    "#fda4af", "#f43f5e", "#e11d48"),
    ("emerald", "#6ee7b7", "#10b981", "#059669"),
    ("amber",   "#fcd34d", "#f59e0b", "#d97706"),
    ("violet",  "#c4b5fd", "#8b5cf6", "#7c3aed"),
    ("sky",     "#7dd3fc", "#0ea5e9", "#0284c7"),
];

/// Swatch for a habit's colour name.
pub fn habit_color(name: &str) -> Color {
    hex_to_color(match name {
        "rose"    => "#f43f5e",
        "orange"  => "#f97316",
        "amber"   => "#f59e0b",
        "emerald" => "#10b981",
        "teal"    => "#14b8a6",
        "cyan"    => "#06b6d4",
        "violet"  => "#8b5cf6",
        "fuchsia" => "#d946ef",
        _         => "#6366f1",
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

fn default_border_style() -> String { "rounded".to_owned() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Accent name: indigo | rose | emerald | amber | violet | sky
    pub name: String,
    #[serde(default)]
    pub mode: ThemeMode,
    // Backgrounds
    pub bg_primary: String, pub bg_secondary: String, pub bg_popup: String,
    // Borders
    pub border_normal: String, pub border_focused: String,
    // Text
    pub text_primary: String, pub text_muted: String, pub text_accent: String,
    // Calendar cells
    pub today_bg: String, pub today_fg: String,
    pub completed_bg: String, pub completed_fg: String,
    pub weekend_fg: String,
    pub success: String, pub error: String,
    /// Border style: "rounded" | "double" | "thick" | "plain"
    #[serde(default = "default_border_style")]
    pub border_style: String,
}

impl ThemeConfig {
    /// Builds a theme from an accent palette name; unknown names use indigo.
    pub fn new(accent: &str, mode: ThemeMode) -> Self {
        let &(name, light, base, strong) = ACCENTS.iter()
            .find(|(n, ..)| *n == accent)
            .unwrap_or(&ACCENTS[0]);

        let (bg, bg2, popup, border, fg, muted) = match mode {
            ThemeMode::Dark  => ("#0f172a", "#1e293b", "#1e293b", "#334155", "#f1f5f9", "#94a3b8"),
            ThemeMode::Light => ("#f8fafc", "#ffffff", "#f1f5f9", "#e2e8f0", "#0f172a", "#64748b"),
        };
        let accent_text = if mode == ThemeMode::Dark { light } else { strong };

        Self {
            name: name.into(), mode,
            bg_primary: bg.into(), bg_secondary: bg2.into(), bg_popup: popup.into(),
            border_normal: border.into(), border_focused: base.into(),
            text_primary: fg.into(), text_muted: muted.into(), text_accent: accent_text.into(),
            today_bg: bg2.into(), today_fg: accent_text.into(),
            completed_bg: base.into(), completed_fg: "#ffffff".into(),
            weekend_fg: "#f43f5e".into(),
            success: "#10b981".into(), error: "#f43f5e".into(),
            border_style: default_border_style(),
        }
    }

    // ── Color accessors ───────────────────────────────────────────────────────
    pub fn bg(&self)            -> Color { hex_to_color(&self.bg_primary) }
    pub fn bg2(&self)           -> Color { hex_to_color(&self.bg_secondary) }
    pub fn popup_bg(&self)      -> Color { hex_to_color(&self.bg_popup) }
    pub fn border(&self)        -> Color { hex_to_color(&self.border_normal) }
    pub fn border_active(&self) -> Color { hex_to_color(&self.border_focused) }
    pub fn fg(&self)            -> Color { hex_to_color(&self.text_primary) }
    pub fn fg_dim(&self)        -> Color { hex_to_color(&self.text_muted) }
    pub fn accent(&self)        -> Color { hex_to_color(&self.text_accent) }
    pub fn weekend_color(&self) -> Color { hex_to_color(&self.weekend_fg) }
    pub fn success(&self)       -> Color { hex_to_color(&self.success) }
    pub fn error(&self)         -> Color { hex_to_color(&self.error) }

    pub fn today_highlight(&self)     -> (Color, Color) {
        (hex_to_color(&self.today_bg), hex_to_color(&self.today_fg))
    }
    pub fn completed_highlight(&self) -> (Color, Color) {
        (hex_to_color(&self.completed_bg), hex_to_color(&self.completed_fg))
    }
    /// Cursor cell: focused border colour behind the page background.
    pub fn selected_highlight(&self)  -> (Color, Color) {
        (self.border_active(), self.bg())
    }

    pub fn border_type(&self) -> BorderType {
        match self.border_style.as_str() {
            "double" => BorderType::Double,
            "thick"  => BorderType::Thick,
            "plain"  => BorderType::Plain,
            _        => BorderType::Rounded,
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────────
    pub fn load() -> Result<Self> {
        let path = theme_path();
        if path.exists() {
            Ok(toml::from_str(&std::fs::read_to_string(&path)?)?)
        } else {
            let t = ThemeConfig::default();
            t.save()?;
            Ok(t)
        }
    }

    pub fn save(&self) -> Result<()> {
        let dir = config_dir();
        std::fs::create_dir_all(&dir)?;
        std::fs::write(theme_path(), toml::to_string_pretty(self)?)?;
        Ok(())
    }

    // ── Theme catalogue ───────────────────────────────────────────────────────
    pub fn accent_names() -> Vec<&'static str> {
        ACCENTS.iter().map(|(n, ..)| *n).collect()
    }

    /// Same mode, next accent in the catalogue.
    pub fn next_accent(&self) -> Self {
        let names = Self::accent_names();
        let idx   = names.iter().position(|n| *n == self.name).unwrap_or(0);
        Self::new(names[(idx + 1) % names.len()], self.mode)
    }

    pub fn toggle_mode(&self) -> Self {
        let mode = match self.mode { ThemeMode::Dark => ThemeMode::Light, ThemeMode::Light => ThemeMode::Dark };
        Self::new(&self.name, mode)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self { Self::new("indigo", ThemeMode::Dark) }
}

fn theme_path() -> PathBuf { config_dir().join("theme.toml") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_cycle_wraps() {
        let mut t = ThemeConfig::default();
        for _ in 0..ThemeConfig::accent_names().len() { t = t.next_accent(); }
        assert_eq!(t.name, "indigo");
        assert_eq!(ThemeConfig::default().next_accent().name, "rose");
    }

    #[test]
    fn mode_toggle_keeps_accent() {
        let t = ThemeConfig::new("sky", ThemeMode::Dark).toggle_mode();
        assert_eq!(t.name, "sky");
        assert_eq!(t.mode, ThemeMode::Light);
        assert_eq!(t.completed_highlight().0, hex_to_color("#0ea5e9"));
    }

    #[test]
    fn unknown_accent_is_indigo() {
        assert_eq!(ThemeConfig::new("plaid", ThemeMode::Dark).name, "indigo");
        assert_eq!(habit_color("plaid"), hex_to_color("#6366f1"));
    }

    #[test]
    fn toml_round_trip() {
        let t = ThemeConfig::new("amber", ThemeMode::Light);
        let back: ThemeConfig = toml::from_str(&toml::to_string_pretty(&t).unwrap()).unwrap();
        assert_eq!(back.name, "amber");
        assert_eq!(back.mode, ThemeMode::Light);
        assert_eq!(hex_to_color(&back.text_accent), hex_to_color("#d97706"));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_color("#ff0080"), Color::Rgb(255, 0, 128));
        assert_eq!(hex_to_color("nope"), Color::Reset);
    }
}
