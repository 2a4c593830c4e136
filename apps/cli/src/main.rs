//! Terminal drill runner for the vocatrain engine.
//!
//! Loads a catalog file, restores the progress snapshot when it still
//! matches the catalog, then loops: select an item, draw a mode the
//! terminal can render, judge the answer, reschedule, persist.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocatrain_core::{
    allowed_modes, from_csv, from_json, normalize, CatalogItem, Direction, ItemKind, Mode,
    Session, SessionFilters, Snapshot,
};

/// Modes a line-based terminal can render. Listening and pair-matching
/// modes need audio and a grid; per the gate's contract the caller simply
/// draws from the allowed set without them.
const CLI_MODES: &[Mode] = &[
    Mode::MultipleChoiceSourceToTarget,
    Mode::MultipleChoiceTargetToSource,
    Mode::FreeTextSourceToTarget,
    Mode::SentenceConstruction,
];

#[derive(Parser)]
#[command(name = "vocatrain", about = "Two-language vocabulary drilling in the terminal", version)]
struct Cli {
    /// Catalog file (.json or .csv)
    catalog: PathBuf,

    /// Progress snapshot file
    #[arg(long, default_value = "progress.json")]
    progress: PathBuf,

    /// Only present items that are due for review
    #[arg(long)]
    only_due: bool,

    /// Exclude single-word items
    #[arg(long)]
    no_words: bool,

    /// Exclude sentence items
    #[arg(long)]
    no_sentences: bool,

    /// Seed the RNG for a reproducible drill order
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show catalog and progress statistics
    Stats,
    /// Discard all recorded progress
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Stats) => show_stats(&cli),
        Some(Command::Reset) => reset(&cli.progress),
        None => drill(&cli),
    }
}

fn drill(cli: &Cli) -> Result<()> {
    let items = load_catalog(&cli.catalog)?;
    if items.is_empty() {
        bail!("catalog {} has no usable rows", cli.catalog.display());
    }

    let mut session = Session::with_snapshot(items, load_snapshot(&cli.progress));
    session.filters = SessionFilters {
        only_due: cli.only_due,
        include_words: !cli.no_words,
        include_sentences: !cli.no_sentences,
    };

    let mut rng: Box<dyn RngCore> = match cli.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    println!(
        "vocatrain — {} items loaded. Answer the prompts; 'q' quits.\n",
        session.items().len()
    );

    loop {
        let now = Utc::now();
        let item = match session.next_item(now, &mut *rng) {
            Ok(item) => item.clone(),
            Err(err) => {
                println!("{err}.");
                break;
            }
        };
        let mode = pick_cli_mode(&session, &item, &mut *rng)?;

        let was_correct = match present(&session, &item, mode, &mut *rng)? {
            Some(answer) => answer,
            None => break,
        };

        let interval = session
            .record_answer(&item.id, was_correct, mode, Utc::now())?
            .interval_days;
        if was_correct {
            println!("correct — next review in {interval} day(s)");
        } else {
            println!(
                "wrong — correct answer: {} (back in 12 hours)",
                item.target_text
            );
        }

        save_snapshot(&cli.progress, &session.snapshot(Utc::now()))?;

        let stats = session.stats(Utc::now());
        println!(
            "[{} items, {} unseen, {} due, streak sum {}]\n",
            stats.total, stats.unseen, stats.due, stats.streak_sum
        );
    }

    Ok(())
}

/// Uniform draw from the allowed modes this terminal can present.
fn pick_cli_mode(session: &Session, item: &CatalogItem, rng: &mut dyn RngCore) -> Result<Mode> {
    let record = session
        .progress()
        .get(&item.id)
        .with_context(|| format!("no progress record for {}", item.id))?;
    let renderable: Vec<Mode> = allowed_modes(record)
        .iter()
        .copied()
        .filter(|m| CLI_MODES.contains(m))
        .filter(|m| *m != Mode::SentenceConstruction || item.kind == ItemKind::Sentence)
        .collect();
    Ok(renderable
        .choose(rng)
        .copied()
        .unwrap_or(Mode::MultipleChoiceSourceToTarget))
}

/// Present one exercise. `Ok(None)` means the learner quit.
fn present(
    session: &Session,
    item: &CatalogItem,
    mode: Mode,
    rng: &mut dyn RngCore,
) -> Result<Option<bool>> {
    match mode {
        Mode::MultipleChoiceTargetToSource => {
            multiple_choice(session, item, Direction::TargetToSource, rng)
        }
        Mode::FreeTextSourceToTarget => free_text(session, item),
        Mode::SentenceConstruction => sentence_construction(item, rng),
        _ => multiple_choice(session, item, Direction::SourceToTarget, rng),
    }
}

fn multiple_choice(
    session: &Session,
    item: &CatalogItem,
    direction: Direction,
    rng: &mut dyn RngCore,
) -> Result<Option<bool>> {
    let (prompt, correct) = match direction {
        Direction::SourceToTarget => (&item.source_text, &item.target_text),
        Direction::TargetToSource => (&item.target_text, &item.source_text),
    };

    // Over-fetch, then dedupe on normalized text against the correct
    // answer and each other before cutting down to three.
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(normalize(correct));
    let mut options: Vec<String> = Vec::new();
    for distractor in session.distractors(item, 6, direction, rng) {
        if options.len() == 3 {
            break;
        }
        if seen.insert(normalize(&distractor.text)) {
            options.push(distractor.text);
        }
    }
    options.push(correct.clone());
    options.shuffle(rng);

    println!("Translate: {prompt}");
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }

    loop {
        let line = match read_line("> ")? {
            Some(line) => line,
            None => return Ok(None),
        };
        match line.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => {
                return Ok(Some(options[n - 1] == *correct));
            }
            _ => println!("enter a number between 1 and {}", options.len()),
        }
    }
}

fn free_text(session: &Session, item: &CatalogItem) -> Result<Option<bool>> {
    println!("Translate (free text): {}", item.source_text);
    let line = match read_line("> ")? {
        Some(line) => line,
        None => return Ok(None),
    };
    let outcome = session.check_answer(item, &line);
    if outcome.ok && outcome.distance > 0 {
        println!("accepted with {} typo(s)", outcome.distance);
    }
    Ok(Some(outcome.ok))
}

fn sentence_construction(item: &CatalogItem, rng: &mut dyn RngCore) -> Result<Option<bool>> {
    let mut tiles = item.target_tokens.clone();
    tiles.shuffle(rng);
    println!("Rebuild the sentence for: {}", item.source_text);
    println!("tiles: {}", tiles.join(" / "));
    let line = match read_line("> ")? {
        Some(line) => line,
        None => return Ok(None),
    };
    let expected = item.target_tokens.join(" ");
    Ok(Some(normalize(&line) == normalize(&expected)))
}

fn show_stats(cli: &Cli) -> Result<()> {
    let items = load_catalog(&cli.catalog)?;
    let session = Session::with_snapshot(items, load_snapshot(&cli.progress));
    let stats = session.stats(Utc::now());
    println!("items:      {}", stats.total);
    println!("unseen:     {}", stats.unseen);
    println!("due now:    {}", stats.due);
    println!("streak sum: {}", stats.streak_sum);
    Ok(())
}

fn reset(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            println!("progress cleared ({})", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            println!("no progress file at {}", path.display());
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("removing {}", path.display())),
    }
}

fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let items = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content)?,
        Some("csv") => from_csv(&content)?,
        _ => bail!(
            "unsupported catalog format: {} (expected .json or .csv)",
            path.display()
        ),
    };
    tracing::info!(count = items.len(), "catalog loaded");
    Ok(items)
}

fn load_snapshot(path: &Path) -> Option<Snapshot> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable progress snapshot");
            None
        }
    }
}

fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim().to_string();
    if line == "q" {
        return Ok(None);
    }
    Ok(Some(line))
}
