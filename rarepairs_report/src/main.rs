use clap::Parser;
use rarepairs::{table, DataFiles, Fandom, RelationshipRecord, ARCHIVE_URL};
use rarepairs_report::{deep_link, rarepairs, relationship_types, top_pairs, zero_pairs, Filter};
use std::{path::PathBuf, process};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Browse a scraped pairing table: top pairs, rarepairs and zeropairs.
#[derive(Debug, Parser)]
#[command(name = "rarepairs_report", version, about)]
struct Args {
    /// Table written by rarepairs_scrape, .csv or .parquet [default: ./relationships.csv]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Fandom config (TOML) used to build the search links. Defaults to Arcane.
    #[arg(short, long)]
    fandom: Option<PathBuf>,

    /// Relationship types to include, e.g. -t f/f -t f/m. Defaults to all of them.
    #[arg(short = 't', long = "type")]
    types: Vec<String>,

    /// Only pairings with this character
    #[arg(short, long)]
    character: Option<String>,

    /// Also include pairings of characters with themselves
    #[arg(long)]
    selfcest: bool,

    /// How many top pairs to show
    #[arg(short = 'n', long, default_value_t = 5)]
    top: usize,

    /// How many rarepairs to show. Ties with the last one are shown too.
    #[arg(short, long, default_value_t = 20)]
    rare: usize,

    #[arg(long, default_value = ARCHIVE_URL, hide = true)]
    base_url: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> rarepairs::Result<()> {
    let input = args.input.unwrap_or_else(|| DataFiles::new().relationships);
    let fandom = match &args.fandom {
        Some(path) => Fandom::load(path)?,
        None => Fandom::default(),
    };

    let records = table::read_relationships(&input)?;
    info!(rows = records.len(), types = ?relationship_types(&records), "loaded table");

    let mut filter = Filter::new().with_selfcest(args.selfcest);
    if !args.types.is_empty() {
        filter = filter.with_types(args.types);
    }
    if let Some(character) = args.character {
        filter = filter.with_character(character);
    }

    let rows = filter.apply(&records);
    if rows.is_empty() {
        println!("No pairings match those filters.");
        return Ok(());
    }

    println!("Top pairs");
    for record in top_pairs(&rows, args.top) {
        println!("  {}: {}", record.pair(), count_of(record));
    }

    println!("\nRarepairs");
    for record in rarepairs(&rows, args.rare) {
        println!(
            "  * {} ({})\n    {}",
            record.pair(),
            count_of(record),
            deep_link(&fandom, &args.base_url, record)
        );
    }

    println!("\nZeropairs");
    for record in zero_pairs(&rows) {
        println!("  * {}", record.pair());
    }

    Ok(())
}

fn count_of(record: &RelationshipRecord) -> u64 {
    record.count.unwrap_or_default()
}
