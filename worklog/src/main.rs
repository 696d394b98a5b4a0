//! worklog - work-activity tracker
//!
//! Command-line front end over worklog-core: session control, per-save
//! snapshot recording, daily summaries, and Slack posting. The `watch`
//! command runs the long-lived loop that handles inactivity auto-stop and
//! the scheduled daily post.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use worklog_core::config::Config;
use worklog_core::dates::{self, day_bounds};
use worklog_core::measure::{count_lines, detect_language};
use worklog_core::slack::{AutoPoster, WebhookClient};
use worklog_core::stats::DailyAggregator;
use worklog_core::summary;
use worklog_core::types::FileEdit;
use worklog_core::{EditRecorder, SessionTracker, Store};

#[derive(Parser)]
#[command(name = "worklog", version, about = "Work-activity tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a work session (stops any running session first)
    Start,
    /// Stop the running work session
    Stop,
    /// Toggle the work session on or off
    Toggle,
    /// Show tracker state and today's totals
    Status,
    /// Record a save snapshot of a file
    Save {
        /// Path of the saved file
        path: PathBuf,
    },
    /// Show the daily summary
    Summary {
        /// Date to summarize (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show cached daily summaries for recent days
    History {
        /// Number of days to look back, including today
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Post the daily summary to the configured Slack webhook
    Post {
        /// Date to post (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete one day's sessions, snapshots, and cached stats
    Reset {
        /// Date to reset (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Run the long-lived loop: inactivity auto-stop and scheduled posting
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        worklog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let store = Arc::new(Store::open(&Config::database_path()));
    if !store.is_available() {
        eprintln!("warning: database unavailable, running without persistence");
    }

    match cli.command {
        Command::Start => cmd_start(&config, store),
        Command::Stop => cmd_stop(&config, store),
        Command::Toggle => cmd_toggle(&config, store),
        Command::Status => cmd_status(&config, store),
        Command::Save { path } => cmd_save(&config, store, &path),
        Command::Summary { date, json } => cmd_summary(&config, store, date, json),
        Command::History { days } => cmd_history(store, days),
        Command::Post { date } => cmd_post(&config, store, date).await,
        Command::Reset { date, yes } => cmd_reset(store, date, yes),
        Command::Watch => cmd_watch(&config, store).await,
    }
}

fn cmd_start(config: &Config, store: Arc<Store>) -> Result<()> {
    let mut tracker = SessionTracker::new(store, &config.tracker);
    let was_running = tracker.is_running();
    tracker.start().context("failed to start session")?;
    if was_running {
        println!("Restarted work session.");
    } else {
        println!("Started work session.");
    }
    Ok(())
}

fn cmd_stop(config: &Config, store: Arc<Store>) -> Result<()> {
    let mut tracker = SessionTracker::new(Arc::clone(&store), &config.tracker);
    match tracker.stop().context("failed to stop session")? {
        Some(stopped) => {
            invalidate_after_stop(&DailyAggregator::new(store), stopped.start_time)?;
            println!("Stopped after {}.", summary::format_duration(stopped.duration));
        }
        None => println!("No session running."),
    }
    Ok(())
}

/// Drop the cached rollup a closed session made stale.
///
/// A session belongs to the date it started on, so that date's cache is
/// the one holding the accrued-to-query-time value. Today's cache is also
/// dropped when the stop landed past midnight.
fn invalidate_after_stop(aggregator: &DailyAggregator, start_time: i64) -> Result<()> {
    let start_date = dates::local_date_of_epoch(start_time);
    aggregator.invalidate(&start_date)?;
    let today = dates::local_today();
    if today != start_date {
        aggregator.invalidate(&today)?;
    }
    Ok(())
}

fn cmd_toggle(config: &Config, store: Arc<Store>) -> Result<()> {
    let tracker = SessionTracker::new(Arc::clone(&store), &config.tracker);
    if tracker.is_running() {
        cmd_stop(config, store)
    } else {
        cmd_start(config, store)
    }
}

fn cmd_status(config: &Config, store: Arc<Store>) -> Result<()> {
    let tracker = SessionTracker::new(Arc::clone(&store), &config.tracker);
    if tracker.is_running() {
        println!("Session running for {}.", summary::format_duration(tracker.elapsed()));
    } else {
        println!("No session running.");
    }

    let today = dates::local_today();
    let stat = DailyAggregator::new(store).aggregate(&today)?;
    println!(
        "Today: {} worked, {} saves, {} files, +{} lines",
        summary::format_work_time(stat.work_time),
        stat.save_count,
        stat.file_count,
        stat.line_changes,
    );
    Ok(())
}

fn cmd_save(config: &Config, store: Arc<Store>, path: &std::path::Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let path_str = path.to_string_lossy();
    let language = detect_language(&path_str);
    let line_count = count_lines(&text, language);

    let mut tracker = SessionTracker::new(Arc::clone(&store), &config.tracker);
    let session_id = tracker.ensure_running_for_save();

    // previous snapshot of this file, for the delta shown to the user
    let previous = store
        .db()
        .ok()
        .and_then(|db| db.latest_edit_for_file(&path_str).ok().flatten());

    let recorder = EditRecorder::new(store);
    match recorder.record(&path_str, line_count, language, session_id)? {
        Some(_) => {
            let delta = previous
                .map(|p| line_count - p.line_count)
                .filter(|d| *d != 0)
                .map(|d| format!(", {:+} since last save", d))
                .unwrap_or_default();
            println!(
                "Recorded {} ({} lines{}{})",
                path.display(),
                line_count,
                language.map(|l| format!(", {}", l)).unwrap_or_default(),
                delta,
            );
        }
        None => println!("Save not recorded (no active session)."),
    }
    Ok(())
}

fn cmd_history(store: Arc<Store>, days: u32) -> Result<()> {
    let days = days.max(1);
    let today = dates::local_today();
    let start = dates::parse_date(&today)?
        .checked_sub_days(chrono::Days::new(u64::from(days - 1)))
        .context("date out of range")?
        .format("%Y-%m-%d")
        .to_string();

    let rows = DailyAggregator::new(store).history(&start, &today)?;
    if rows.is_empty() {
        println!("No cached activity between {} and {}.", start, today);
        return Ok(());
    }
    for stat in rows {
        println!(
            "{}  {:>7}  {} saves, {} files, +{} lines",
            stat.date,
            summary::format_work_time(stat.work_time),
            stat.save_count,
            stat.file_count,
            stat.line_changes,
        );
    }
    Ok(())
}

/// The day's raw snapshots, empty when the store is down.
fn edits_for_date(store: &Store, date: &str) -> Result<Vec<FileEdit>> {
    let (start, end) = day_bounds(date)?;
    match store.db() {
        Ok(db) => Ok(db.edits_in_range(start, end)?),
        Err(worklog_core::Error::StoreUnavailable) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn cmd_summary(config: &Config, store: Arc<Store>, date: Option<String>, json: bool) -> Result<()> {
    let date = match date {
        Some(d) => {
            dates::parse_date(&d).with_context(|| format!("invalid date {:?}", d))?;
            d
        }
        None => dates::local_today(),
    };

    let stat = DailyAggregator::new(Arc::clone(&store)).aggregate(&date)?;
    let edits = edits_for_date(&store, &date)?;

    if json {
        let snapshot = summary::panel_snapshot(&stat, &edits, &config.display);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let message = summary::webhook_message(&stat, &edits, &config.slack, &config.display);
        println!("{}", message);
    }
    Ok(())
}

async fn cmd_post(config: &Config, store: Arc<Store>, date: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(dates::local_today);
    let Some(url) = config.slack.webhook_url.as_deref() else {
        bail!("no webhook URL configured; set [slack].webhook_url in the config file");
    };

    let stat = DailyAggregator::new(Arc::clone(&store)).aggregate(&date)?;
    let edits = edits_for_date(&store, &date)?;
    let message = summary::webhook_message(&stat, &edits, &config.slack, &config.display);

    let client = WebhookClient::new(url).context("invalid webhook configuration")?;
    client.post_text(&message).await.context("failed to post summary")?;
    println!("Posted summary for {}.", date);
    Ok(())
}

fn cmd_reset(store: Arc<Store>, date: Option<String>, yes: bool) -> Result<()> {
    let date = date.unwrap_or_else(dates::local_today);
    if !yes {
        bail!(
            "this deletes all sessions, snapshots, and stats for {}; re-run with --yes to confirm",
            date
        );
    }

    DailyAggregator::new(store).reset_day(&date).context("failed to reset day")?;
    println!("Reset {}. A running session, if any, was kept.", date);
    Ok(())
}

async fn cmd_watch(config: &Config, store: Arc<Store>) -> Result<()> {
    let mut tracker = SessionTracker::new(Arc::clone(&store), &config.tracker);
    let aggregator = DailyAggregator::new(Arc::clone(&store));
    let mut poster = AutoPoster::new();

    let mut inactivity_tick = tokio::time::interval(Duration::from_secs(
        config.tracker.inactivity_check_interval_secs.max(1),
    ));
    let mut autopost_tick = tokio::time::interval(Duration::from_secs(60));
    // the first tick of an interval fires immediately; consume both
    inactivity_tick.tick().await;
    autopost_tick.tick().await;

    tracing::info!("Watch loop starting");
    println!("Watching (ctrl-c to exit).");

    loop {
        tokio::select! {
            _ = inactivity_tick.tick() => {
                if let Some(stopped) = tracker.check_inactivity() {
                    if let Err(e) = invalidate_after_stop(&aggregator, stopped.start_time) {
                        tracing::warn!(error = %e, "Cache invalidation after auto-stop failed");
                    }
                    println!("Session auto-stopped after inactivity.");
                }
            }
            _ = autopost_tick.tick() => {
                let now = chrono::Local::now();
                if poster.due(&config.slack, now) {
                    let date = dates::local_date_of(now);
                    match post_scheduled(config, &store, &aggregator, &date).await {
                        Ok(()) => {
                            poster.mark_posted(&date);
                            println!("Posted daily summary for {}.", date);
                        }
                        Err(e) => tracing::error!(error = %e, "Scheduled post failed"),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Watch loop shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn post_scheduled(
    config: &Config,
    store: &Store,
    aggregator: &DailyAggregator,
    date: &str,
) -> Result<()> {
    let Some(url) = config.slack.webhook_url.as_deref() else {
        bail!("no webhook URL configured");
    };
    let stat = aggregator.aggregate(date)?;
    let edits = edits_for_date(store, date)?;
    let message = summary::webhook_message(&stat, &edits, &config.slack, &config.display);
    let client = WebhookClient::new(url)?;
    client.post_text(&message).await?;
    Ok(())
}
