use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Result;

use super::filter_items;
use crate::environment::{
    ChoiceOptions, ChoicePrompt, FileDialog, Notifier, NotifyLevel, OpenDialogOptions,
    QuickPickItem, QuickPickOptions, SearchableList,
};

/// Line-oriented prompts over any reader and writer. A blank answer or end of input cancels.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    base_dir: PathBuf,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Relative paths typed into the file dialog resolve against `base_dir`.
    pub fn new(input: R, output: W, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            base_dir: base_dir.into(),
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let answer = line.trim();
        log::trace!("<- {answer:?}");
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    /// Ask for a 1-based index into `count` entries until the answer is usable.
    fn ask_index(&mut self, prompt: &str, count: usize) -> Result<Option<usize>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Enter a number between 1 and {count}")?,
            }
        }
    }

    fn expand(&self, answer: &str) -> PathBuf {
        let path = PathBuf::from(&*shellexpand::tilde(answer));
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> ChoicePrompt for TerminalPrompter<R, W> {
    fn choose(&mut self, options: &[String], config: &ChoiceOptions) -> Result<Option<usize>> {
        writeln!(self.output, "{}", config.placeholder)?;
        for (index, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", index + 1)?;
        }
        self.ask_index("> ", options.len())
    }
}

impl<R: BufRead, W: Write> FileDialog for TerminalPrompter<R, W> {
    fn open_file(&mut self, options: &OpenDialogOptions) -> Result<Option<PathBuf>> {
        let prompt = format!("{}: ", options.open_label);
        loop {
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(None);
            };
            let path = self.expand(&answer);

            let extension_allowed = options.filters.is_empty()
                || path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| options.filters.iter().any(|f| f == e));

            if path.is_file() && extension_allowed {
                return Ok(Some(path));
            }
            if path.is_dir() && options.can_select_folders {
                return Ok(Some(path));
            }
            writeln!(self.output, "Not an existing file: {}", path.display())?;
        }
    }
}

impl<R: BufRead, W: Write> SearchableList for TerminalPrompter<R, W> {
    fn pick(
        &mut self,
        items: &[QuickPickItem],
        options: &QuickPickOptions,
    ) -> Result<Option<usize>> {
        loop {
            let prompt = format!("{} (blank lists all, . cancels): ", options.placeholder);
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }
            let query = line.trim();
            if query == "." {
                return Ok(None);
            }

            let matches = filter_items(items, query, options.match_on_description);
            if matches.is_empty() {
                writeln!(self.output, "No matches for {query:?}")?;
                continue;
            }

            for (position, &index) in matches.iter().enumerate() {
                let item = &items[index];
                writeln!(
                    self.output,
                    "  {}) {}  {}",
                    position + 1,
                    item.label,
                    item.description
                )?;
            }

            let position = self.ask_index("> ", matches.len())?;
            return Ok(position.map(|position| matches[position]));
        }
    }
}

impl<R: BufRead, W: Write> Notifier for TerminalPrompter<R, W> {
    fn notify(&mut self, message: &str, level: NotifyLevel) {
        let tag = match level {
            NotifyLevel::Info => "info",
            NotifyLevel::Warning => "warning",
            NotifyLevel::Error => "error",
        };
        if let Err(e) = writeln!(self.output, "[{tag}] {message}") {
            log::error!("could not show notification: {e}");
        }
    }
}
