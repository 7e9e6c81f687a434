//! Match Check CLI Tool
//!
//! Checks reported table tennis results against the scoring rules and
//! previews Elo rating changes without touching a ladder.
//!
//! Usage:
//!   cargo run --bin match-check -- --help
//!   cargo run --bin match-check set 11 9
//!   cargo run --bin match-check match --format 3 11-9 7-11 11-5
//!   cargo run --bin match-check counts --format 5 3 1
//!   cargo run --bin match-check elo 1200 1000 --k-factor 32
//!   cargo run --bin match-check --locale sv set 11 11

use anyhow::Result;
use clap::{Parser, Subcommand};
use pingpong_ladder::config::rating::DEFAULT_K_FACTOR;
use pingpong_ladder::rules::{
    parse_score, parse_set_score, validate_match, validate_set_counts, validate_set_score, Locale,
    RuleViolation,
};
use pingpong_ladder::types::{SetScore, SetTally, Side};
use pingpong_ladder::utils::format_rating_change;
use pingpong_ladder::{compute_rating_update, rating::expected_scores};
use tracing::debug;

#[derive(Parser)]
#[command(name = "match-check")]
#[command(about = "Check table tennis results against the scoring rules and preview Elo changes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Language of rule messages (en, sv)
    #[arg(long, global = true, default_value = "en")]
    locale: Locale,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single set score
    Set {
        /// Points of player 1
        #[arg(allow_hyphen_values = true)]
        score1: String,
        /// Points of player 2
        #[arg(allow_hyphen_values = true)]
        score2: String,
    },
    /// Check a match reported set by set, e.g. `11-9 7-11 11-5`
    Match {
        /// Best-of format (1, 3 or 5)
        #[arg(short, long, default_value = "3")]
        format: u32,
        /// Set scores written as `11-9`
        #[arg(required = true)]
        sets: Vec<String>,
    },
    /// Check a match reported as final set counts
    Counts {
        /// Best-of format (1, 3 or 5)
        #[arg(short, long, default_value = "3")]
        format: u32,
        /// Sets won by player 1
        #[arg(allow_hyphen_values = true)]
        sets_won1: String,
        /// Sets won by player 2
        #[arg(allow_hyphen_values = true)]
        sets_won2: String,
    },
    /// Preview the rating update after a win
    Elo {
        /// Winner's current rating
        #[arg(allow_hyphen_values = true)]
        winner: i64,
        /// Loser's current rating
        #[arg(allow_hyphen_values = true)]
        loser: i64,
        /// K-factor
        #[arg(short, long, default_value_t = DEFAULT_K_FACTOR)]
        k_factor: i64,
    },
}

fn parse_set_count(raw: &str) -> Result<i64, RuleViolation> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RuleViolation::NonIntegerSetCount)
}

fn check_set(score1: &str, score2: &str) -> Result<SetScore, RuleViolation> {
    let set = SetScore::new(parse_score(score1)?, parse_score(score2)?);
    validate_set_score(set.score1, set.score2)?;
    Ok(set)
}

fn check_match(format: u32, sets: &[String]) -> Result<SetTally, RuleViolation> {
    let set_scores = sets
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_set_score(raw).map_err(|reason| RuleViolation::InvalidSet {
                set: index + 1,
                reason: Box::new(reason),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_match(format, &set_scores)
}

fn check_counts(format: u32, sets_won1: &str, sets_won2: &str) -> Result<SetTally, RuleViolation> {
    validate_set_counts(
        format,
        parse_set_count(sets_won1)?,
        parse_set_count(sets_won2)?,
    )
}

fn describe_winner(tally: &SetTally) -> &'static str {
    match tally.winner() {
        Some(Side::Player1) => "player 1",
        Some(Side::Player2) => "player 2",
        None => "nobody",
    }
}

fn reject(violation: RuleViolation, locale: Locale) -> ! {
    eprintln!("❌ {}", violation.localized(locale));
    std::process::exit(1);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let locale = cli.locale;

    match cli.command {
        Commands::Set { score1, score2 } => match check_set(&score1, &score2) {
            Ok(set) => {
                let winner = if set.score1 > set.score2 {
                    "player 1"
                } else {
                    "player 2"
                };
                println!("✅ Valid set {} - won by {}", set, winner);
            }
            Err(violation) => reject(violation, locale),
        },

        Commands::Match { format, sets } => {
            debug!("Checking best of {} with {} sets", format, sets.len());
            match check_match(format, &sets) {
                Ok(tally) => println!(
                    "✅ Valid best of {}: {}-{} in sets, won by {}",
                    format,
                    tally.sets_won1,
                    tally.sets_won2,
                    describe_winner(&tally)
                ),
                Err(violation) => reject(violation, locale),
            }
        }

        Commands::Counts {
            format,
            sets_won1,
            sets_won2,
        } => match check_counts(format, &sets_won1, &sets_won2) {
            Ok(tally) => println!(
                "✅ Valid best of {}: {}-{} in sets, won by {}",
                format,
                tally.sets_won1,
                tally.sets_won2,
                describe_winner(&tally)
            ),
            Err(violation) => reject(violation, locale),
        },

        Commands::Elo {
            winner,
            loser,
            k_factor,
        } => {
            if k_factor <= 0 {
                eprintln!("❌ K-factor must be positive");
                std::process::exit(1);
            }

            let (expected, _) = expected_scores(winner, loser);
            let update = compute_rating_update(winner, loser, k_factor);

            println!("📈 Elo update (k-factor {})", k_factor);
            println!("   Winner's expected score: {:.3}", expected);
            println!(
                "   Winner: {} -> {} ({})",
                winner,
                update.winner_new,
                format_rating_change(update.winner_delta(winner))
            );
            println!(
                "   Loser:  {} -> {} ({})",
                loser,
                update.loser_new,
                format_rating_change(update.loser_delta(loser))
            );
        }
    }

    Ok(())
}
