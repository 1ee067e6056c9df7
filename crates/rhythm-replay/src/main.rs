// rhythm-replay: replay a recorded input log against a pattern and report
// the resulting score.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rhythm_engine::{Accuracy, RhythmEngineOptions};
use rhythm_replay::{ReplayData, ReplayOutcome, read_pattern, run_replay};

#[derive(Parser, Debug)]
#[command(name = "rhythm-replay", about = "Replay recorded input against a pattern")]
struct Args {
    /// Pattern JSON file.
    #[arg(long)]
    pattern: PathBuf,

    /// Replay JSON file.
    #[arg(long)]
    replay: PathBuf,

    /// Engine options JSON file, overriding the options stored in the replay.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Tick interval in ms for an input log, overriding the replay's.
    #[arg(long)]
    tick_ms: Option<f64>,

    /// Log every judgement.
    #[arg(short, long)]
    verbose: bool,

    /// Print stats as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let pattern = read_pattern(&args.pattern)?;
    let mut replay = ReplayData::read(&args.replay)?;
    if let Some(path) = &args.options {
        replay.options = RhythmEngineOptions::read(path)?;
    }
    if let Some(tick_ms) = args.tick_ms {
        if replay.is_recorded_session() {
            log::warn!("--tick-ms has no effect on a recorded session");
        }
        replay.tick_ms = tick_ms;
    }
    if replay.is_recorded_session() {
        log::info!(
            "Replaying {} recorded actions against '{}' ({} notes)",
            replay.actions.len(),
            pattern.id,
            pattern.note_count()
        );
    } else {
        log::info!(
            "Replaying {} inputs against '{}' ({} notes)",
            replay.inputs.len(),
            pattern.id,
            pattern.note_count()
        );
    }

    let outcome = run_replay(pattern, &replay)?;
    if outcome.matches_recording(&replay) == Some(false) {
        log::warn!("Replay diverged from the recorded stats");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.stats)?);
    } else {
        print_summary(&outcome);
    }
    Ok(())
}

fn print_summary(outcome: &ReplayOutcome) {
    let stats = &outcome.stats;
    println!("State:     {:?}", outcome.final_state);
    if let Some(clear_type) = outcome.clear_type {
        println!("Clear:     {:?}", clear_type);
    }
    println!("Score:     {}", stats.score);
    println!("Accuracy:  {:.2}%", stats.accuracy);
    println!("Max combo: {}", stats.max_combo);
    for accuracy in Accuracy::ALL {
        println!("{:<10} {}", format!("{:?}:", accuracy), stats.count(accuracy));
    }
    println!("Early/Late: {}/{}", stats.early, stats.late);
    println!(
        "Judged:    {}/{} ({:.0}%)",
        stats.judged(),
        stats.total_notes,
        stats.progress * 100.0
    );
}
