//! Writing rendered plays to disk as SVG, PNG or PDF.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};
use tracing::debug;

use crate::error::Error;
use crate::style::DiagramStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(Error::UnsupportedFormat(ext)),
        }
    }
}

/// Encodes `svg` in the format implied by `output`'s extension and writes it.
pub fn write_output(output: &Path, svg: &str, png_scale: f32) -> Result<OutputFormat, Error> {
    let format = OutputFormat::from_path(output)?;
    let bytes = match format {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Png => svg_to_png(svg, png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(svg)?,
    };
    std::fs::write(output, bytes).map_err(|e| Error::io(output, e))?;
    Ok(format)
}

/// Inlines badge images that exist under `base_dir` as data URIs so a
/// standalone file does not depend on the site's `/images` path. Hrefs that
/// do not resolve to a local file are left alone.
pub fn embed_local_badges(style: &DiagramStyle, base_dir: &Path) -> DiagramStyle {
    DiagramStyle {
        ball_href: embed_href(&style.ball_href, base_dir),
        decoy_ball_href: embed_href(&style.decoy_ball_href, base_dir),
        ..style.clone()
    }
}

fn embed_href(href: &str, base_dir: &Path) -> String {
    if href.starts_with("data:") || href.contains("://") {
        return href.to_string();
    }

    let path: PathBuf = base_dir.join(href.trim_start_matches('/'));
    let Some(mime) = mime_for(&path) else {
        debug!(href, "badge has no known image extension, keeping href");
        return href.to_string();
    };

    match std::fs::read(&path) {
        Ok(bytes) => format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "badge not found locally, keeping href");
            href.to_string()
        }
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, Error> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::InvalidScale(scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks(fontdb);
    }

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| Error::Svg(e.to_string()))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| Error::Png("failed to create pixmap".into()))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| Error::Png(e.to_string()))
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, Error> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }

    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(fontdb),
        ..Default::default()
    };

    let tree =
        svg2pdf::usvg::Tree::from_str(svg, &opts).map_err(|e| Error::Svg(e.to_string()))?;

    // Labels as paths: viewers without the font still show jersey codes.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| Error::Pdf(e.to_string()))
}

/// Token labels ask for `sans-serif`; point it at whatever sans face the
/// system has, or the first face found.
fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let sans = pick_sans_family(fontdb.faces().flat_map(|f| f.families.iter()));
    if let Some(family) = sans {
        fontdb.set_sans_serif_family(family);
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let sans = pick_sans_family(fontdb.faces().flat_map(|f| f.families.iter()));
    if let Some(family) = sans {
        fontdb.set_sans_serif_family(family);
    }
}

fn pick_sans_family<'a, L: 'a>(families: impl Iterator<Item = &'a (String, L)>) -> Option<String> {
    let mut first: Option<&String> = None;
    for (family, _) in families {
        if family.to_ascii_lowercase().contains("sans") {
            return Some(family.clone());
        }
        if first.is_none() {
            first = Some(family);
        }
    }
    first.cloned()
}
