//! Terminal rendering of transcript entries.

use std::{
    io::{self, Write},
    sync::OnceLock,
};

use client_core::RenderSink;
use colored::Colorize;
use regex::Regex;
use shared::domain::{Classification, EntryId, TranscriptEntry};

fn block_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</?div[^>]*>").expect("static regex"))
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

/// Flattens rendered entry markup into terminal text. Block boundaries become
/// line breaks and every other tag is dropped.
pub fn html_to_text(html: &str) -> String {
    let broken = block_break().replace_all(html, "\n");
    let stripped = any_tag().replace_all(&broken, "");
    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct TerminalSink;

impl TerminalSink {
    fn print_entry(entry: &TranscriptEntry) -> String {
        let text = html_to_text(&entry.rendered_html);
        if entry.is_user() {
            return format!("{} {}", "you ›".cyan().bold(), text);
        }
        let label = "assistant ›".magenta().bold();
        let body = match entry.classification {
            Classification::Success => text.green().to_string(),
            Classification::Error => text.red().to_string(),
            Classification::Neutral => text,
        };
        format!("{label} {body}")
    }
}

impl RenderSink for TerminalSink {
    fn entry_added(&self, entry: &TranscriptEntry) {
        println!("{}", Self::print_entry(entry));
    }

    fn entries_removed(&self, removed: &[EntryId]) {
        println!(
            "{}",
            format!("({} messages cleared)", removed.len()).dimmed()
        );
    }

    fn scroll_to_end(&self) {
        let _ = io::stdout().flush();
    }
}
