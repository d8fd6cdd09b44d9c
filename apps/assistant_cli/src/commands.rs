//! Shell commands typed at the prompt.

pub const SUGGESTED_PROMPTS: &[&str] = &[
    "Create me an meeting for the today at 5pm for the 60 minutes and title it as the board meeting",
    "Create me an meeting for the 20th march at 5pm for the 90 minutes and title it as the hr meeting",
    "Create me an meeting for the 8th march at 11 am for the 120 minutes and title it as the tech meeting",
    "Delete the last booked event",
    "Delete the event of 8th march 11am one",
    "Give me today's schedule",
    "Give me the available slots for today",
    "Give me available slots of 15th march",
    "Give me the schedule",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Send(String),
    ClearHistory,
    Suggestions,
    /// 1-based index into [`SUGGESTED_PROMPTS`].
    TrySuggestion(usize),
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ShellCommand::Send(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    match name.as_str() {
        "clear" => ShellCommand::ClearHistory,
        "suggestions" | "prompts" => ShellCommand::Suggestions,
        "try" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(index) if (1..=SUGGESTED_PROMPTS.len()).contains(&index) => {
                ShellCommand::TrySuggestion(index)
            }
            _ => ShellCommand::Invalid(format!(
                "usage: /try <1-{}>",
                SUGGESTED_PROMPTS.len()
            )),
        },
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command: /{other}")),
    }
}

pub fn suggestion(index: usize) -> Option<&'static str> {
    index
        .checked_sub(1)
        .and_then(|i| SUGGESTED_PROMPTS.get(i))
        .copied()
}

pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
