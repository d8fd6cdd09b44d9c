use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{EventFormatter, HttpAssistantBackend, RequestDispatcher, ResponseNormalizer};
use colored::Colorize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
    task::JoinHandle,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{is_confirmation, parse_command, suggestion, ShellCommand, SUGGESTED_PROMPTS};
use config::{display_offset, load_settings, normalize_base_url, LoadedSettings, Settings};
use render::TerminalSink;

#[derive(Parser, Debug)]
#[command(about = "Chat with the scheduling assistant from a terminal")]
struct Args {
    /// Base URL of the assistant API (serves /api/message and /api/clear-history)
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
    /// Offset from UTC, in minutes, used to show event times
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,
    /// Send one message, print the reply and exit
    #[arg(long, short)]
    message: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_url {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = &self.log_filter {
            settings.log_filter = v.clone();
        }
        if let Some(v) = self.utc_offset_minutes {
            settings.display_utc_offset_minutes = v;
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let LoadedSettings {
        mut settings,
        warnings,
    } = load_settings();
    args.apply(&mut settings);
    init_tracing(&settings.log_filter);
    for warning in &warnings {
        warn!("{warning}");
    }

    let base_url = normalize_base_url(&settings.api_base_url);
    let backend = HttpAssistantBackend::new(&base_url)
        .with_context(|| format!("invalid assistant api url '{base_url}'"))?;
    let normalizer = ResponseNormalizer::new(EventFormatter::with_offset(display_offset(
        settings.display_utc_offset_minutes,
    )));
    let dispatcher =
        RequestDispatcher::for_session(Arc::new(backend), normalizer, Arc::new(TerminalSink));
    info!(api = %base_url, "assistant session started");

    if let Some(message) = args.message {
        dispatcher.submit(&message).await;
        return Ok(());
    }

    let typing_task = tokio::spawn(watch_typing(dispatcher.typing().subscribe()));
    let result = run_shell(&dispatcher).await;
    typing_task.abort();
    result
}

async fn run_shell(dispatcher: &RequestDispatcher) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
    print_help();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        in_flight.retain(|handle| !handle.is_finished());

        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Send(text) => in_flight.push(dispatcher.spawn_submit(text)),
            ShellCommand::TrySuggestion(index) => {
                if let Some(prompt) = suggestion(index) {
                    in_flight.push(dispatcher.spawn_submit(prompt.to_string()));
                }
            }
            ShellCommand::Suggestions => print_suggestions(),
            ShellCommand::ClearHistory => {
                print!("Are you sure you want to clear the chat history? [y/N] ");
                std::io::stdout().flush().context("failed to flush stdout")?;
                let answer = lines
                    .next_line()
                    .await
                    .context("failed to read stdin")?
                    .unwrap_or_default();
                if is_confirmation(&answer) {
                    in_flight.push(dispatcher.spawn_clear_history());
                } else {
                    println!("{}", "Clear cancelled.".dimmed());
                }
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => break,
            ShellCommand::Invalid(reason) => println!("{}", reason.yellow()),
        }
    }

    // Let replies still on the wire reach the transcript before exiting.
    drain_in_flight(in_flight).await;
    Ok(())
}

/// Waits for every dispatch task and returns how many of them died.
async fn drain_in_flight(in_flight: Vec<JoinHandle<()>>) -> usize {
    let mut failed = 0;
    for handle in in_flight {
        if let Err(err) = handle.await {
            error!(error = %err, "dispatch task failed");
            failed += 1;
        }
    }
    failed
}

async fn watch_typing(mut visible: watch::Receiver<bool>) {
    while visible.changed().await.is_ok() {
        if *visible.borrow_and_update() {
            println!("{}", "assistant is typing…".dimmed());
        }
    }
}

fn print_help() {
    println!(
        "{}",
        "Type a request, or /suggestions, /try <n>, /clear, /quit.".dimmed()
    );
}

fn print_suggestions() {
    println!("{}", "Example prompts:".bold());
    for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
        println!("  {:>2}. {prompt}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn draining_counts_tasks_that_panicked() {
        let handles = vec![
            tokio::spawn(async {}),
            tokio::spawn(async { panic!("dispatch blew up") }),
            tokio::spawn(async {}),
        ];
        assert_eq!(drain_in_flight(handles).await, 1);
    }

    #[tokio::test]
    async fn draining_nothing_is_a_no_op() {
        assert_eq!(drain_in_flight(Vec::new()).await, 0);
    }
}
