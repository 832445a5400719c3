//! Flag football play diagrams: coordinate migration and SVG rendering.
//!
//! ```
//! use playsketch::{normalize, render, PlayRecord};
//!
//! let record = PlayRecord::from_json(
//!     r##"{"id": 1, "name": "Slant", "data": {"players": [{"x": 500, "y": 350, "label": "WR", "color": "#22c55e"}]}}"##,
//! ).unwrap();
//! let data = normalize(record.data.as_ref().unwrap());
//! let svg = render(&data, 400.0, 300.0);
//! assert!(svg.contains(r#"<circle cx="200" cy="150" r="6""#));
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub mod palette;
pub mod render;
pub mod style;
pub mod xml;

pub use error::Error;
pub use model::{
    Formation, Icon, IconKind, PlayData, PlayRecord, Player, RecordId, RouteEnd, RoutePoint,
    SegmentStyle,
};
pub use normalize::{CoordinateSpace, detect, normalize, normalize_record};
pub use palette::Palette;
pub use render::{PlayRenderer, render};
pub use style::DiagramStyle;

/// Stderr subscriber for the binaries; `RUST_LOG` picks the level and
/// defaults to warnings.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
