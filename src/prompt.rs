//! Line-based operator interaction

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Where screens are shown and answers come from
pub trait Prompter {
    /// Show text to the operator
    fn say(&mut self, text: &str);

    /// Show `prompt` and read one line, without its line terminator
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Prompter over stdin/stdout
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn say(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text);
        let _ = self.output.flush();
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

/// Prompter fed from a queue of answers, recording everything shown
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: String,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: String::new(),
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, text: &str) {
        self.transcript.push_str(text);
        self.transcript.push('\n');
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.transcript.push_str(prompt);
        let answer = self.answers.pop_front().ok_or(Error::InputClosed)?;
        self.transcript.push_str(&answer);
        self.transcript.push('\n');
        Ok(answer)
    }
}

/// Ask until the answer is one of `options`, returning its index
pub fn choose<P: Prompter + ?Sized>(prompter: &mut P, options: &[&str]) -> Result<usize> {
    loop {
        let answer = prompter.ask(": ")?;
        if let Some(index) = options.iter().position(|o| *o == answer) {
            return Ok(index);
        }
        prompter.say(&format!("-> please enter {}", list_options(options)));
    }
}

/// Ask a y/n question until answered
pub fn confirm<P: Prompter + ?Sized>(prompter: &mut P) -> Result<bool> {
    Ok(choose(prompter, &["y", "n"])? == 0)
}

fn list_options(options: &[&str]) -> String {
    match options {
        [] => String::new(),
        [only] => only.to_string(),
        [a, b] => format!("{} or {}", a, b),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_prompter_strips_line_endings() {
        let input = b"first\r\nsecond\n" as &[u8];
        let mut out = Vec::new();
        let mut prompter = TerminalPrompter::new(input, &mut out);
        assert_eq!(prompter.ask("> ").unwrap(), "first");
        assert_eq!(prompter.ask("> ").unwrap(), "second");
        assert!(matches!(prompter.ask("> "), Err(Error::InputClosed)));
        drop(prompter);
        assert_eq!(String::from_utf8(out).unwrap(), "> > > ");
    }

    #[test]
    fn test_choose_reprompts_on_invalid_input() {
        let mut prompter = ScriptedPrompter::new(["5", "", "2"]);
        let answer = choose(&mut prompter, &["1", "2", "3", "4"]).unwrap();
        assert_eq!(answer, 1);
        assert_eq!(
            prompter
                .transcript()
                .matches("-> please enter 1, 2, 3, or 4")
                .count(),
            2
        );
    }

    #[test]
    fn test_confirm() {
        let mut prompter = ScriptedPrompter::new(["yes", "n"]);
        assert!(!confirm(&mut prompter).unwrap());
        assert!(prompter.transcript().contains("-> please enter y or n"));
    }

    #[test]
    fn test_scripted_runs_dry() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(matches!(confirm(&mut prompter), Err(Error::InputClosed)));
    }
}
