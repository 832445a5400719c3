use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::palette::{DEFAULT_HEX, Palette, STANDARD_HEXES};

const FIELD_BACKGROUND: &str = "#f9fafb";
const GUIDE_COLOR: &str = "#e5e7eb";
const MIDLINE_COLOR: &str = "#9ca3af";
const TOKEN_OUTLINE: &str = "#ffffff";
const LABEL_COLOR: &str = "#ffffff";
const ROUTE_FALLBACK: &str = "#1f2937";
const TOKEN_FALLBACK: &str = "#3b82f6";
const BALL_BADGE: &str = "/images/football.png";
const DECOY_BADGE: &str = "/images/football-decoy.png";

const GUIDE_WIDTH: f64 = 2.0;
const MIDLINE_WIDTH: f64 = 4.0;

const BUILTIN_STYLES: &[(&str, &str)] = &[
    ("classic", include_str!("../styles/classic.toml")),
    ("wristband", include_str!("../styles/wristband.toml")),
];

/// Colors, badges and weight multipliers used when drawing a play.
///
/// Every field is optional in a style file; anything left out keeps the
/// classic look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramStyle {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_guide_color")]
    pub guide_color: String,
    #[serde(default = "default_midline_color")]
    pub midline_color: String,
    #[serde(default = "default_guide_width")]
    pub guide_width: f64,
    #[serde(default = "default_midline_width")]
    pub midline_width: f64,

    #[serde(default = "default_token_outline")]
    pub token_outline_color: String,
    #[serde(default = "default_label_color")]
    pub label_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Stroke for routes whose player has no color at all.
    #[serde(default = "default_route_fallback")]
    pub route_fallback_color: String,
    /// Fill for tokens whose player has no color at all.
    #[serde(default = "default_token_fallback")]
    pub token_fallback_color: String,

    /// Multiplies route and token outline widths.
    #[serde(default = "default_scale")]
    pub stroke_scale: f64,
    /// Multiplies token radius, label size and icon size.
    #[serde(default = "default_scale")]
    pub shape_scale: f64,

    #[serde(default = "default_ball_href")]
    pub ball_href: String,
    #[serde(default = "default_decoy_href")]
    pub decoy_ball_href: String,

    /// Prepended to every marker id, for pages that mix styles.
    #[serde(default)]
    pub marker_prefix: String,
    #[serde(default = "default_palette_colors")]
    pub palette_colors: Vec<String>,
    #[serde(default = "default_palette_fallback")]
    pub palette_fallback: String,
}

fn default_background() -> String {
    FIELD_BACKGROUND.to_string()
}
fn default_guide_color() -> String {
    GUIDE_COLOR.to_string()
}
fn default_midline_color() -> String {
    MIDLINE_COLOR.to_string()
}
fn default_guide_width() -> f64 {
    GUIDE_WIDTH
}
fn default_midline_width() -> f64 {
    MIDLINE_WIDTH
}
fn default_token_outline() -> String {
    TOKEN_OUTLINE.to_string()
}
fn default_label_color() -> String {
    LABEL_COLOR.to_string()
}
fn default_font_family() -> String {
    "sans-serif".to_string()
}
fn default_route_fallback() -> String {
    ROUTE_FALLBACK.to_string()
}
fn default_token_fallback() -> String {
    TOKEN_FALLBACK.to_string()
}
fn default_scale() -> f64 {
    1.0
}
fn default_ball_href() -> String {
    BALL_BADGE.to_string()
}
fn default_decoy_href() -> String {
    DECOY_BADGE.to_string()
}
fn default_palette_colors() -> Vec<String> {
    STANDARD_HEXES.iter().map(|s| s.to_string()).collect()
}
fn default_palette_fallback() -> String {
    DEFAULT_HEX.to_string()
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self::classic()
    }
}

impl DiagramStyle {
    pub fn classic() -> Self {
        DiagramStyle {
            background_color: default_background(),
            guide_color: default_guide_color(),
            midline_color: default_midline_color(),
            guide_width: GUIDE_WIDTH,
            midline_width: MIDLINE_WIDTH,
            token_outline_color: default_token_outline(),
            label_color: default_label_color(),
            font_family: default_font_family(),
            route_fallback_color: default_route_fallback(),
            token_fallback_color: default_token_fallback(),
            stroke_scale: 1.0,
            shape_scale: 1.0,
            ball_href: default_ball_href(),
            decoy_ball_href: default_decoy_href(),
            marker_prefix: String::new(),
            palette_colors: default_palette_colors(),
            palette_fallback: default_palette_fallback(),
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, Error> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_STYLES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| Error::UnknownStyle {
                name: name.to_string(),
                available: Self::list_builtins().join(", "),
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_STYLES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let style: DiagramStyle = toml::from_str(content)?;
        Ok(style.sanitized())
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        let style: DiagramStyle = serde_yaml::from_str(content)?;
        Ok(style.sanitized())
    }

    /// Built-in name, or a `.toml`/`.yaml`/`.yml` file. Files with another
    /// extension are tried as TOML first, then YAML.
    pub fn load(name_or_path: &str) -> Result<Self, Error> {
        let path = Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("toml") => Self::from_toml(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_yaml(&content)),
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::from_hexes(
            self.palette_colors.iter().map(String::as_str),
            &self.palette_fallback,
        )
    }

    fn sanitized(mut self) -> Self {
        for (name, value) in [
            ("stroke_scale", &mut self.stroke_scale),
            ("shape_scale", &mut self.shape_scale),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                warn!(field = name, value = *value, "ignoring non-positive style scale");
                *value = 1.0;
            }
        }
        self
    }
}
