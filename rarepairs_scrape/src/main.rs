use clap::Parser;
use rarepairs::{enumerate_pairs, table, DataFiles, Fandom, ARCHIVE_URL};
use rarepairs_scrape::{ClientOptions, Collector, RetryPolicy, RunState, SearchClient};
use std::{path::PathBuf, process, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Count AO3 fics for every pairing of a fandom's characters.
///
/// Searches once per pair, characters with themselves included, pausing between searches to
/// stay inside the archive's rate limit. A roster of 46 takes 1081 searches, so expect a run to
/// take a while.
#[derive(Debug, Parser)]
#[command(name = "rarepairs_scrape", version, about)]
struct Args {
    /// Roster CSV with columns name, gender (f, m, other) [default: ./characters.csv]
    #[arg(short, long)]
    characters: Option<PathBuf>,

    /// Where to save the table, .csv or .parquet [default: ./relationships.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fandom config (TOML). Defaults to the built-in Arcane config.
    #[arg(short, long)]
    fandom: Option<PathBuf>,

    /// Seconds to wait between searches
    #[arg(short, long, default_value = "5", value_parser = parse_seconds)]
    sleep: Duration,

    /// Times to retry a rate-limited search before giving up
    #[arg(long, default_value_t = 7)]
    max_retries: u32,

    /// Base wait in seconds after a rate-limited search. Doubles each retry, up to two minutes.
    #[arg(long, default_value = "60", value_parser = parse_seconds)]
    backoff: Duration,

    #[arg(long, default_value = ARCHIVE_URL, hide = true)]
    base_url: String,

    /// AO3 username. Logged-in searches see more works.
    #[arg(long, env = "AO3_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "AO3_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{}", e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{} seconds: {}", s, e))
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> rarepairs_scrape::Result<()> {
    let mut files = DataFiles::new();
    if let Some(characters) = args.characters {
        files = files.with_characters(characters);
    }
    if let Some(output) = args.output {
        files = files.with_relationships(output);
    }

    let fandom = match &args.fandom {
        Some(path) => Fandom::load(path)?,
        None => Fandom::default(),
    };
    info!(fandom = fandom.name(), "using fandom");

    let roster = table::read_roster(&files.characters)?;
    let pairs = enumerate_pairs(&fandom, &roster);

    let retry = RetryPolicy::new()
        .with_max_retries(args.max_retries)
        .with_backoff_factor(args.backoff);
    let options = ClientOptions::new()
        .with_base_url(args.base_url)
        .with_retry(retry);
    let mut client = SearchClient::new(fandom, options)?;

    match (&args.username, &args.password) {
        (Some(username), Some(password)) => client.login(username, password)?,
        (None, None) => info!("no credentials given, searching anonymously"),
        _ => warn!("need both a username and a password to log in, searching anonymously"),
    }

    let mut collector = Collector::new(client).with_pacing(args.sleep);

    let report = collector.run(pairs, &files, |progress| {
        println!(
            "[{} of {}] {}: {}",
            progress.index,
            progress.total,
            progress.record.pair(),
            progress.record.count.unwrap_or_default()
        );
    })?;

    match report.state {
        RunState::Aborted => println!(
            "Rate limited after {} of {} pairs. Saved what we have to {}.\n\
             Try again with a longer --sleep (currently {}s).",
            report.records.len(),
            report.total,
            report.written_to.display(),
            args.sleep.as_secs_f64()
        ),
        _ => println!("Wrote {}", report.written_to.display()),
    }

    Ok(())
}
