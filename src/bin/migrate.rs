use clap::Parser;
use playsketch::model::{parse_formations, parse_plays};
use playsketch::normalize::{Migration, Skip, migrate_formation, migrate_record};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Converts exported play or formation records from the old 1000x700 pixel
/// coordinates to the 100x70 percentage space
#[derive(Parser, Debug)]
#[command(name = "playsketch-migrate")]
#[command(version)]
#[command(about = "Migrate legacy pixel coordinates in exported plays or formations", long_about = None)]
struct Args {
    /// Exported records as JSON (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the replacement payloads, one `{id, data}` object per
    /// migrated record (`default_formation` with --formations)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Input holds formations rather than plays
    #[arg(long)]
    formations: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

struct Outcome {
    label: String,
    name: String,
    result: Result<Migration, Skip>,
}

fn main() -> Result<(), String> {
    playsketch::init_logging();
    let args = Args::parse();

    let text = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let (kind, outcomes) = if args.formations {
        let formations = parse_formations(&text).map_err(|e| e.to_string())?;
        let outcomes = formations
            .iter()
            .map(|f| Outcome {
                label: f.label(),
                name: f.display_name().to_string(),
                result: migrate_formation(f),
            })
            .collect::<Vec<_>>();
        ("formation", outcomes)
    } else {
        let plays = parse_plays(&text).map_err(|e| e.to_string())?;
        let outcomes = plays
            .iter()
            .map(|p| Outcome {
                label: p.label(),
                name: p.display_name().to_string(),
                result: migrate_record(p),
            })
            .collect::<Vec<_>>();
        ("play", outcomes)
    };

    eprintln!("Found {} {}s to check\n", outcomes.len(), kind);

    let mut patches: Vec<Value> = Vec::new();
    let mut skipped = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(migration) => {
                eprintln!("✓ Migrated {} {}: \"{}\"", kind, outcome.label, outcome.name);
                patches.push(patch_with_id(migration));
            }
            Err(Skip::NoPlayerData) => {
                eprintln!("Skipping {} {} - no player data", kind, outcome.label);
                skipped += 1;
            }
            Err(Skip::AlreadyCanonical) => {
                eprintln!("Skipping {} {} - already migrated", kind, outcome.label);
                skipped += 1;
            }
        }
    }

    eprintln!("\n=== Migration Complete ===");
    eprintln!("Migrated: {}", patches.len());
    eprintln!("Skipped: {}", skipped);
    eprintln!("Total: {}", outcomes.len());

    if args.dry_run {
        return Ok(());
    }

    let body = serde_json::to_string_pretty(&patches)
        .map_err(|e| format!("Failed to serialize payloads: {}", e))?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, body).map_err(|e| format!("Failed to write output: {}", e))?;
            eprintln!("Payloads saved to: {}", path.display());
        }
        None => println!("{}", body),
    }

    Ok(())
}

fn patch_with_id(migration: &Migration) -> Value {
    let mut patch = migration.to_patch();
    if let (Value::Object(map), Some(id)) = (&mut patch, &migration.id) {
        map.insert("id".to_string(), json!(id));
    }
    patch
}
