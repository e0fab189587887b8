//! Telegram MarkdownV2 rendering of summaries.
//!
//! Each entry line shows its own truncated energy (`kcal * grams / 100`),
//! while the header and the left/over line use the day total, which is
//! truncated once after summing. The two may differ by a few kcal.

use crate::aggregator::{TodaySummary, WeeklySummary};
use foodbot_common::format_local_time;
use std::fmt::Write;

/// Escapes text placed inside a MarkdownV2 code span.
pub fn escape_code(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '`' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const fn mark(in_limit: bool) -> &'static str {
    if in_limit {
        "✅"
    } else {
        "❌"
    }
}

/// Renders today's entries with aligned columns and the remaining budget.
pub fn render_today(summary: &TodaySummary, timezone_offset_seconds: i32) -> String {
    if summary.reports.is_empty() {
        return "*You ate nothing so far\\.*".to_string();
    }

    let lines: Vec<(String, String)> = summary
        .reports
        .iter()
        .map(|report| {
            (
                format!(
                    "{}: {}",
                    format_local_time(report.timestamp, timezone_offset_seconds),
                    report.product_name
                ),
                format!("{} kcal", report.line_kcal()),
            )
        })
        .collect();

    let width = lines
        .iter()
        .map(|(begin, end)| begin.chars().count() + end.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "You ate today *{} kcal*:", summary.total_kcal);
    for (begin, end) in &lines {
        let pad = width - (begin.chars().count() + end.chars().count()) + 1;
        let _ = writeln!(out, "`{}{}`*{}*", escape_code(begin), " ".repeat(pad), end);
    }

    let limit = u64::from(summary.daily_limit_kcal);
    if summary.in_limit {
        let _ = writeln!(out, "\n✅ Still *{} kcal* left\\.", limit - summary.total_kcal);
    } else {
        let _ = writeln!(
            out,
            "\n❌ You ate *{} kcal* over the limit\\.",
            summary.total_kcal - limit
        );
    }
    out
}

/// Renders the trailing week, today first.
pub fn render_week(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your daily limit is *{} kcal*", summary.daily_limit_kcal);

    for (index, day) in summary.history.iter().enumerate() {
        if index == 0 {
            let _ = writeln!(out, "`{} Today:         ` *{} kcal*", mark(day.in_limit), day.kcal);
        } else {
            let _ = writeln!(
                out,
                "`{} {}:` *{} kcal*",
                mark(day.in_limit),
                escape_code(&day.label),
                day.kcal
            );
        }
    }
    out
}
