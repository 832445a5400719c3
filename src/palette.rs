//! Known player colors and the route-end markers bound to each.

use crate::xml::escape_xml;

/// The player colors the editor offers, without the leading `#`.
pub const STANDARD_HEXES: [&str; 9] = [
    "6366f1", "ef4444", "22c55e", "eab308", "ec4899", "06b6d4", "1f2937", "333333", "ffffff",
];

/// Dark marker used when a color is not in the table.
pub const DEFAULT_HEX: &str = "1f2937";

const MARKER_PREFIX: &str = "arrowhead";
const CIRCLE_MARKER_PREFIX: &str = "circlehead";

/// Shape drawn at the end of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Arrow,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Hex digits without `#`.
    pub hex: String,
    pub marker_id: String,
    pub circle_marker_id: String,
}

impl PaletteEntry {
    pub fn new(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#').to_string();
        Self {
            marker_id: format!("{}-{}", MARKER_PREFIX, hex),
            circle_marker_id: format!("{}-{}", CIRCLE_MARKER_PREFIX, hex),
            hex,
        }
    }

    pub fn marker(&self, shape: MarkerShape) -> &str {
        match shape {
            MarkerShape::Arrow => &self.marker_id,
            MarkerShape::Circle => &self.circle_marker_id,
        }
    }
}

/// Immutable color → marker table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
    pub default: PaletteEntry,
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of looking a player color up in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerChoice<'a> {
    pub entry: &'a PaletteEntry,
    pub fallback: bool,
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_HEXES.iter().map(|hex| PaletteEntry::new(hex)).collect(),
            default: PaletteEntry::new(DEFAULT_HEX),
        }
    }

    pub fn from_hexes<'a>(hexes: impl IntoIterator<Item = &'a str>, default: &str) -> Self {
        Self {
            entries: hexes.into_iter().map(PaletteEntry::new).collect(),
            default: PaletteEntry::new(default),
        }
    }

    /// Matches by exact hex after dropping one leading `#`.
    pub fn lookup(&self, color: &str) -> MarkerChoice<'_> {
        let hex = color.strip_prefix('#').unwrap_or(color);
        match self.entries.iter().find(|e| e.hex == hex) {
            Some(entry) => MarkerChoice {
                entry,
                fallback: false,
            },
            None => MarkerChoice {
                entry: &self.default,
                fallback: true,
            },
        }
    }

    /// Every marker the table can reference, entries first, each id once.
    pub fn markers(&self) -> Vec<&PaletteEntry> {
        let mut out: Vec<&PaletteEntry> = Vec::with_capacity(self.entries.len() + 1);
        for entry in self.entries.iter().chain(std::iter::once(&self.default)) {
            if !out.iter().any(|e| e.marker_id == entry.marker_id) {
                out.push(entry);
            }
        }
        out
    }

    /// `<defs>` block declaring one marker per palette color for each
    /// requested shape, arrowheads first. Ids are `<prefix><marker_id>` so
    /// several diagrams can share a page.
    pub fn marker_defs(&self, prefix: &str, shapes: &[MarkerShape]) -> String {
        let prefix = escape_xml(prefix);
        let mut svg = String::from("<defs>");
        for shape in [MarkerShape::Arrow, MarkerShape::Circle] {
            if !shapes.contains(&shape) {
                continue;
            }
            for entry in self.markers() {
                let id = escape_xml(entry.marker(shape));
                let hex = escape_xml(&entry.hex);
                svg.push_str(&match shape {
                    MarkerShape::Arrow => format!(
                        r##"<marker id="{}{}" markerWidth="6" markerHeight="6" refX="5" refY="5" orient="auto" markerUnits="strokeWidth" viewBox="0 0 10 10"><polygon points="0 0, 10 5, 0 10" fill="#{}" /></marker>"##,
                        prefix, id, hex
                    ),
                    MarkerShape::Circle => format!(
                        r##"<marker id="{}{}" markerWidth="6" markerHeight="6" refX="5" refY="5" markerUnits="strokeWidth" viewBox="0 0 10 10"><circle cx="5" cy="5" r="4" fill="#{}" /></marker>"##,
                        prefix, id, hex
                    ),
                });
            }
        }
        svg.push_str("</defs>");
        svg
    }
}
