//! Summary presentation
//!
//! Two read-only views over one day's rollup: a structured snapshot for a
//! status panel (JSON-friendly) and a plain-text message for the Slack
//! webhook. Both honor the per-metric display toggles; a metric toggled off
//! is omitted, not zeroed.

use serde::Serialize;

use crate::config::{DisplayConfig, SlackConfig};
use crate::types::{DailyStat, FileEdit};

/// Files shown in the panel's edited-file list
pub const PANEL_FILE_LIMIT: usize = 10;
/// Files shown in the webhook message's file list
pub const WEBHOOK_FILE_LIMIT: usize = 3;

/// One language's share of the day's snapshot lines
#[derive(Debug, Clone, Serialize)]
pub struct LanguageShare {
    pub language: String,
    pub percent: u32,
}

/// One file's net change for the day
#[derive(Debug, Clone, Serialize)]
pub struct FileActivity {
    /// File name only, not the full path
    pub name: String,
    pub line_changes: i64,
}

/// Structured view of one day's activity for a status panel
#[derive(Debug, Serialize)]
pub struct DailySnapshot {
    pub date: String,
    pub work_time: Option<i64>,
    pub save_count: Option<i64>,
    pub file_count: Option<i64>,
    pub line_changes: Option<i64>,
    /// Sorted by share descending
    pub language_ratios: Option<Vec<LanguageShare>>,
    /// Top files by net change, descending
    pub file_list: Option<Vec<FileActivity>>,
    pub has_more_files: bool,
    pub total_files: usize,
    pub display: DisplayConfig,
}

/// Per-file net changes for the day, largest first.
///
/// Applies the same positive-delta rule as the rollup, but per file: within
/// one file's snapshots, each consecutive growth counts and shrinks are
/// ignored. Files whose net change is zero are still listed when they were
/// saved at all.
fn per_file_changes(edits: &[FileEdit]) -> Vec<FileActivity> {
    let mut order: Vec<&str> = Vec::new();
    let mut last_seen: std::collections::HashMap<&str, i64> = std::collections::HashMap::new();
    let mut changes: std::collections::HashMap<&str, i64> = std::collections::HashMap::new();

    for edit in edits {
        let path = edit.file_path.as_str();
        match last_seen.get(path) {
            Some(prev) => {
                let delta = edit.line_count - prev;
                if delta > 0 {
                    *changes.entry(path).or_insert(0) += delta;
                }
            }
            None => {
                order.push(path);
                changes.entry(path).or_insert(0);
            }
        }
        last_seen.insert(path, edit.line_count);
    }

    let mut list: Vec<FileActivity> = order
        .into_iter()
        .map(|path| FileActivity {
            name: file_name(path),
            line_changes: changes[path],
        })
        .collect();
    list.sort_by(|a, b| b.line_changes.cmp(&a.line_changes).then(a.name.cmp(&b.name)));
    list
}

/// The last path component, or the path itself when it has none.
fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Build the panel snapshot for one day.
pub fn panel_snapshot(stat: &DailyStat, edits: &[FileEdit], display: &DisplayConfig) -> DailySnapshot {
    let language_ratios = display.language_ratio.then(|| {
        let mut shares: Vec<LanguageShare> = stat
            .ratios()
            .into_iter()
            .map(|(language, percent)| LanguageShare { language, percent })
            .collect();
        shares.sort_by(|a, b| b.percent.cmp(&a.percent).then(a.language.cmp(&b.language)));
        shares
    });

    let all_files = per_file_changes(edits);
    let total_files = all_files.len();
    let file_list = display
        .file_list
        .then(|| all_files.into_iter().take(PANEL_FILE_LIMIT).collect::<Vec<_>>());

    DailySnapshot {
        date: stat.date.clone(),
        work_time: display.work_time.then_some(stat.work_time),
        save_count: display.save_count.then_some(stat.save_count),
        file_count: display.file_count.then_some(stat.file_count),
        line_changes: display.line_changes.then_some(stat.line_changes),
        language_ratios,
        file_list,
        has_more_files: display.file_list && total_files > PANEL_FILE_LIMIT,
        total_files,
        display: display.clone(),
    }
}

/// Format seconds of work time as `Xh Ym`, dropping the hour part when zero.
pub fn format_work_time(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Format seconds as `HH:MM:SS`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Build the plain-text webhook message for one day.
///
/// Sections follow the display toggles; the language breakdown is a
/// panel-only metric and never appears here. A day with nothing to report
/// still produces a well-formed message so the scheduled post never sends
/// an empty body.
pub fn webhook_message(
    stat: &DailyStat,
    edits: &[FileEdit],
    slack: &SlackConfig,
    display: &DisplayConfig,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("{}'s work log for {}", slack.display_name(), stat.date));
    lines.push("----------------------------------------".to_string());

    let mut reported_any = false;

    if display.work_time && stat.work_time > 0 {
        lines.push(format!("Work time: {}", format_work_time(stat.work_time)));
        reported_any = true;
    }
    if display.save_count && stat.save_count > 0 {
        let files = if display.file_count {
            format!(" across {} files", stat.file_count)
        } else {
            String::new()
        };
        lines.push(format!("Saves: {}{}", stat.save_count, files));
        reported_any = true;
    }
    if display.line_changes && stat.line_changes > 0 {
        lines.push(format!("Lines changed: +{}", stat.line_changes));
        reported_any = true;
    }
    if display.file_list {
        let files = per_file_changes(edits);
        if !files.is_empty() {
            lines.push("Files:".to_string());
            for file in files.iter().take(WEBHOOK_FILE_LIMIT) {
                lines.push(format!("  - {} (+{})", file.name, file.line_changes));
            }
            if files.len() > WEBHOOK_FILE_LIMIT {
                lines.push(format!("  ...and {} more", files.len() - WEBHOOK_FILE_LIMIT));
            }
            reported_any = true;
        }
    }

    if !reported_any {
        lines.push("No activity recorded today.".to_string());
    }

    if !slack.daily_comment.is_empty() {
        lines.push(String::new());
        lines.push(slack.daily_comment.clone());
    }

    lines.join("\n")
}
