use clap::Parser;
use playsketch::export::{OutputFormat, embed_local_badges, write_output};
use playsketch::model::parse_plays;
use playsketch::render::{DETAIL_SIZE, THUMBNAIL_SIZE};
use playsketch::{DiagramStyle, PlayRecord, PlayRenderer, normalize_record};
use std::path::PathBuf;

/// Render a flag football play to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "playsketch")]
#[command(version)]
#[command(about = "Render play records to SVG, PNG or PDF diagrams", long_about = None)]
struct Args {
    /// Input play JSON: one record, an array, or a playbook with `plays` (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Built-in style name (classic, wristband) or a TOML/YAML style file
    #[arg(short, long, value_name = "STYLE")]
    style: Option<String>,

    /// Play to render when the input holds several, by id or name
    #[arg(short, long, value_name = "PLAY")]
    play: Option<String>,

    /// Render at the detail size (800x600) instead of the thumbnail size (400x300)
    #[arg(long)]
    detail: bool,

    /// Canvas width in pixels (overrides the size preset)
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height in pixels (overrides the size preset)
    #[arg(long)]
    height: Option<f64>,

    /// Directory that badge hrefs such as /images/football.png resolve against
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Render coordinates as stored, without migrating legacy pixel records
    #[arg(long)]
    no_normalize: bool,
}

fn main() -> Result<(), String> {
    playsketch::init_logging();
    let args = Args::parse();

    let style = match args.style.as_deref() {
        Some(name) => DiagramStyle::load(name).map_err(|e| e.to_string())?,
        None => DiagramStyle::default(),
    };

    let text = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let plays = parse_plays(&text).map_err(|e| e.to_string())?;
    let record = select_play(&plays, args.play.as_deref())?;
    let record = if args.no_normalize {
        record.clone()
    } else {
        normalize_record(record)
    };

    let (preset_w, preset_h) = if args.detail { DETAIL_SIZE } else { THUMBNAIL_SIZE };
    let width = args.width.unwrap_or(preset_w);
    let height = args.height.unwrap_or(preset_h);
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(format!("Invalid canvas size: {}x{}", width, height));
    }

    let format = OutputFormat::from_path(&args.output).map_err(|e| e.to_string())?;

    // Standalone rasters cannot fetch site-relative badges, so inline them.
    let style = if format == OutputFormat::Svg && args.assets.is_none() {
        style
    } else {
        let base = args
            .assets
            .clone()
            .or_else(|| args.input.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        embed_local_badges(&style, &base)
    };

    let renderer = PlayRenderer::new(style).with_fixed_size();
    let svg = renderer.render_record(&record, width, height);
    if svg.is_empty() {
        return Err(format!(
            "Play {} \"{}\" has no player data to render",
            record.label(),
            record.display_name()
        ));
    }

    write_output(&args.output, &svg, args.png_scale).map_err(|e| e.to_string())?;
    let kind = match format {
        OutputFormat::Svg => "SVG",
        OutputFormat::Png => "PNG",
        OutputFormat::Pdf => "PDF",
    };
    eprintln!("{} saved to: {}", kind, args.output.display());

    Ok(())
}

fn select_play<'a>(plays: &'a [PlayRecord], wanted: Option<&str>) -> Result<&'a PlayRecord, String> {
    match wanted {
        Some(key) => plays
            .iter()
            .find(|p| p.label() == key || p.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| format!("No play matching '{}' in input", key)),
        None => {
            if plays.len() > 1 {
                eprintln!(
                    "Input holds {} plays; rendering the first (use --play to pick one)",
                    plays.len()
                );
            }
            plays.first().ok_or_else(|| "Input holds no plays".to_string())
        }
    }
}
