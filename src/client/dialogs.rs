//! Confirmation and text prompts used by [`TodoApp`](super::TodoApp).

use std::io::{BufRead, StdinLock, Stdout, Write};

use tracing::warn;

/// Answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(self) -> bool {
        self == Confirmation::Confirmed
    }
}

/// User decisions the client needs before acting.
pub trait Dialogs {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> Confirmation;

    /// Ask for text, offering `initial` as the current value. `None` means cancelled.
    fn prompt(&mut self, message: &str, initial: &str) -> Option<String>;
}

/// Dialogs with predetermined answers.
///
/// Used for non-interactive command lines (`delete --yes`, `edit <id> <text>`)
/// and in tests. Every question asked is recorded in `asked`.
#[derive(Debug, Clone)]
pub struct FixedDialogs {
    confirmation: Confirmation,
    answer: Option<String>,
    pub asked: Vec<String>,
}

impl FixedDialogs {
    pub fn new(confirmation: Confirmation, answer: Option<String>) -> Self {
        Self {
            confirmation,
            answer,
            asked: Vec::new(),
        }
    }

    /// Confirms everything and cancels every prompt.
    pub fn confirming() -> Self {
        Self::new(Confirmation::Confirmed, None)
    }

    /// Declines everything and cancels every prompt.
    pub fn declining() -> Self {
        Self::new(Confirmation::Declined, None)
    }

    /// Answers every prompt with `text`.
    pub fn answering(text: impl Into<String>) -> Self {
        Self::new(Confirmation::Declined, Some(text.into()))
    }
}

impl Dialogs for FixedDialogs {
    fn confirm(&mut self, message: &str) -> Confirmation {
        self.asked.push(message.to_string());
        self.confirmation
    }

    fn prompt(&mut self, message: &str, _initial: &str) -> Option<String> {
        self.asked.push(message.to_string());
        self.answer.clone()
    }
}

/// Line-based dialogs on a reader/writer pair, normally stdin/stdout.
pub struct TerminalDialogs<R, W> {
    input: R,
    output: W,
}

impl TerminalDialogs<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDialogs<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one line. `None` on end of input or I/O error.
    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{} ", question).and_then(|_| self.output.flush()) {
            warn!("Failed to write prompt: {}", e);
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Dialogs for TerminalDialogs<R, W> {
    fn confirm(&mut self, message: &str) -> Confirmation {
        match self.ask(&format!("{} [y/N]", message)) {
            Some(answer) if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") => {
                Confirmation::Confirmed
            }
            _ => Confirmation::Declined,
        }
    }

    fn prompt(&mut self, message: &str, initial: &str) -> Option<String> {
        // An empty line keeps the current value
        self.ask(&format!("{} [{}]", message, initial))
            .map(|answer| {
                if answer.trim().is_empty() {
                    initial.to_string()
                } else {
                    answer
                }
            })
    }
}
