use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the stamp's location fields come from. Latitude in [-90, 90],
/// longitude in [-180, 180]; empty text fields are substituted by per-theme
/// placeholders at draw time.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct LocationRecord {
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationRecord {
    pub fn title_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        or_placeholder(&self.title, placeholder)
    }

    pub fn address_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        or_placeholder(&self.address, placeholder)
    }
}

pub fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Pre-formatted, locale-fixed display labels.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct TimeStamp {
    pub date_label: String,
    pub time_label: String,
}

impl TimeStamp {
    pub fn date_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        or_placeholder(&self.date_label, placeholder)
    }

    pub fn time_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        or_placeholder(&self.time_label, placeholder)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Theme1,
    Theme2,
    Precision,
    Custom,
}

impl Theme {
    /// Unrecognized selectors fall back to the default theme.
    pub fn parse(s: &str) -> Theme {
        match s {
            "theme2" => Theme::Theme2,
            "precision" | "themePrecision" => Theme::Precision,
            "custom" | "themeCustom" => Theme::Custom,
            _ => Theme::Theme1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapKind {
    Roadmap,
    Satellite,
}

impl MapKind {
    pub fn parse(s: &str) -> MapKind {
        match s {
            "satellite" | "sat" | "sat,skl" => MapKind::Satellite,
            _ => MapKind::Roadmap,
        }
    }
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}
fn default_bg_color() -> String {
    "#000000".to_string()
}
fn default_bg_opacity() -> f32 {
    0.6
}
fn default_anchor_x() -> f32 {
    50.0
}
fn default_anchor_y() -> f32 {
    90.0
}
fn default_font_size() -> f32 {
    30.0
}
fn default_show_map() -> bool {
    true
}

/// User-editable parameters for the custom theme.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct CustomConfig {
    #[serde(default)]
    pub title_override: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_bg_color")]
    pub background_color: String,
    /// 0.0..=1.0
    #[serde(default = "default_bg_opacity")]
    pub background_opacity: f32,
    /// Anchor position as a percentage of the canvas, 0..=100.
    #[serde(default = "default_anchor_x")]
    pub anchor_x: f32,
    #[serde(default = "default_anchor_y")]
    pub anchor_y: f32,
    /// Title size in design units (scaled by canvas width / 1000).
    #[serde(default = "default_font_size")]
    pub font_size_base: f32,
    #[serde(default = "default_show_map")]
    pub show_map: bool,
}

impl Default for CustomConfig {
    fn default() -> Self {
        Self {
            title_override: String::new(),
            text_color: default_text_color(),
            background_color: default_bg_color(),
            background_opacity: default_bg_opacity(),
            anchor_x: default_anchor_x(),
            anchor_y: default_anchor_y(),
            font_size_base: default_font_size(),
            show_map: default_show_map(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parse_falls_back_to_theme1() {
        assert_eq!(Theme::parse("theme2"), Theme::Theme2);
        assert_eq!(Theme::parse("themePrecision"), Theme::Precision);
        assert_eq!(Theme::parse("themeCustom"), Theme::Custom);
        assert_eq!(Theme::parse("theme1"), Theme::Theme1);
        assert_eq!(Theme::parse("does-not-exist"), Theme::Theme1);
        assert_eq!(Theme::parse(""), Theme::Theme1);
    }

    #[test]
    fn map_kind_parse() {
        assert_eq!(MapKind::parse("sat,skl"), MapKind::Satellite);
        assert_eq!(MapKind::parse("roadmap"), MapKind::Roadmap);
        assert_eq!(MapKind::parse("anything"), MapKind::Roadmap);
    }

    #[test]
    fn placeholders_kick_in_for_blank_fields() {
        let loc = LocationRecord {
            title: "  ".into(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
        };
        assert_eq!(loc.title_or("fallback"), "fallback");
        assert_eq!(loc.address_or("addr"), "addr");
        let loc2 = LocationRecord { title: "T".into(), ..loc };
        assert_eq!(loc2.title_or("fallback"), "T");
    }
}
