//! Line-oriented editing session.
//!
//! Stands in for a windowed editor: each input line is one user action on the current
//! tab. Modal questions (restore, save/discard/cancel, overwrite, save-as name) are read
//! from the same input stream. End of input abandons the session without any prompt,
//! the way a crash or a killed process would.

use crate::print::{print_message, print_messages, print_snapshots, print_tabs};
use colored::Colorize;
use quicknote::api::{MessageLevel, QuicknoteApi};
use quicknote::commands::close::CloseOutcome;
use quicknote::error::{QuicknoteError, Result};
use quicknote::model::{ContentKind, DocumentId};
use quicknote::scheduler::TickOutcome;
use quicknote::store::StorageBackend;
use quicknote::view::{BufferView, Choice, Prompt, Prompter};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

const HELP: &str = "\
Commands:
  new                  open an untitled tab
  open FILE            open a file in a new tab
  tabs                 list tabs
  show [N]             switch to tab N and print it
  type TEXT            append a line to the current tab
  set TEXT             replace the current tab's content
  rich | plain         switch the current tab's format
  save | saveas        save the current tab
  close [N]            close the current tab (or tab N)
  move N TO            move tab N to position TO
  find TEXT            find TEXT after the cursor, wrapping once
  replace OLD NEW      replace the next OLD after the cursor
  replace -a OLD NEW   replace every OLD
  autosave             write snapshots now
  snapshots            list snapshot files
  quit                 close every tab and exit";

/// Answers prompts from a line-based input stream.
pub struct ConsolePrompter<R: BufRead> {
    input: R,
}

impl<R: BufRead> ConsolePrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Next input line without its terminator; `None` at end of input.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{} ", question.bold());
        let _ = std::io::stdout().flush();
        let answer = self.read_line();
        println!();
        answer
    }
}

impl<R: BufRead> Prompter for ConsolePrompter<R> {
    fn confirm(&mut self, prompt: Prompt<'_>) -> Choice {
        match prompt {
            Prompt::RestoreSnapshots { count } => {
                let question = format!(
                    "Found {} auto-saved file(s) from a previous session. Restore them? [y/N]",
                    count
                );
                yes_no(self.ask(&question))
            }
            Prompt::PurgeSnapshots { count } => {
                let question = format!(
                    "Delete {} snapshot(s)? Unsaved work in them cannot be recovered. [y/N]",
                    count
                );
                yes_no(self.ask(&question))
            }
            Prompt::Overwrite { path } => {
                let question = format!("{} already exists. Overwrite? [y/N]", path.display());
                yes_no(self.ask(&question))
            }
            Prompt::UnsavedChanges { name } => {
                let question = format!(
                    "'{}' has unsaved changes. [s]ave, [d]iscard or [c]ancel?",
                    name
                );
                match self
                    .ask(&question)
                    .map(|a| a.trim().to_lowercase())
                    .as_deref()
                {
                    Some("s") | Some("save") => Choice::Save,
                    Some("d") | Some("discard") => Choice::Discard,
                    _ => Choice::Cancel,
                }
            }
        }
    }

    fn choose_destination(&mut self, suggested_name: &str) -> Option<PathBuf> {
        let question = format!("Save '{}' as (empty to cancel):", suggested_name);
        self.ask(&question)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .map(PathBuf::from)
    }

    fn notify(&mut self, level: MessageLevel, message: &str) {
        print_message(level, message);
    }
}

fn yes_no(answer: Option<String>) -> Choice {
    match answer.map(|a| a.trim().to_lowercase()).as_deref() {
        Some("y") | Some("yes") => Choice::Yes,
        _ => Choice::No,
    }
}

pub struct Session<B: StorageBackend, R: BufRead> {
    api: QuicknoteApi<B>,
    view: BufferView,
    prompter: ConsolePrompter<R>,
    current: Option<DocumentId>,
    cursor: usize,
}

impl<B: StorageBackend, R: BufRead> Session<B, R> {
    pub fn new(api: QuicknoteApi<B>, input: R) -> Self {
        Self {
            api,
            view: BufferView::new(),
            prompter: ConsolePrompter::new(input),
            current: None,
            cursor: 0,
        }
    }

    /// Recover, open `files`, then process commands until `quit` succeeds or input ends.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<()> {
        let report = self.api.recover(&mut self.view, &mut self.prompter)?;
        if !report.declined {
            print_messages(&report.messages);
        }
        self.current = report.restored.last().copied();

        for file in files {
            match self.api.open_document(&mut self.view, file) {
                Ok(id) => self.select(id),
                Err(e) => print_message(
                    MessageLevel::Error,
                    &format!("Could not open '{}': {}", file.display(), e),
                ),
            }
        }
        if self.api.registry().is_empty() {
            let id = self.api.new_document(&mut self.view);
            self.select(id);
        }

        while let Some(line) = self.prompter.read_line() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            if command == "quit" || command == "exit" {
                if self.quit()? {
                    return Ok(());
                }
                continue;
            }
            if let Err(e) = self.dispatch(command, rest) {
                print_message(MessageLevel::Error, &e.to_string());
            }
            self.poll_autosave();
        }

        debug!("input ended, leaving session without closing tabs");
        Ok(())
    }

    fn select(&mut self, id: DocumentId) {
        self.current = Some(id);
        self.cursor = 0;
    }

    fn current(&self) -> Result<DocumentId> {
        self.current
            .ok_or_else(|| QuicknoteError::Api("No tab selected".to_string()))
    }

    fn tab_arg(&self, arg: &str) -> Result<DocumentId> {
        if arg.is_empty() {
            return self.current();
        }
        let number = parse_number(arg)?;
        self.api.tab(number)
    }

    fn poll_autosave(&mut self) {
        if let TickOutcome::Swept(report) = self.api.tick(Instant::now(), &self.view) {
            print_messages(&report.messages);
        }
    }

    fn dispatch(&mut self, command: &str, rest: &str) -> Result<()> {
        match command {
            "help" => println!("{}", HELP),
            "new" => {
                let id = self.api.new_document(&mut self.view);
                self.select(id);
            }
            "open" => {
                let id = self.api.open_document(&mut self.view, Path::new(rest.trim()))?;
                self.select(id);
            }
            "tabs" => print_tabs(self.api.documents(), self.current),
            "show" => {
                let id = self.tab_arg(rest.trim())?;
                if Some(id) != self.current {
                    self.select(id);
                }
                let doc = self.api.document(id)?;
                println!("{}", format!("── {} ──", doc.tab_label()).bold());
                println!("{}", self.view.text(id).unwrap_or_default());
            }
            "type" => {
                let id = self.current()?;
                let mut text = self.view.text(id).unwrap_or_default().to_string();
                text.push_str(rest);
                text.push('\n');
                self.view.set_text(id, &text);
                self.api.content_changed(id)?;
            }
            "set" => {
                let id = self.current()?;
                self.view.set_text(id, rest);
                self.api.content_changed(id)?;
            }
            "rich" | "plain" => {
                let id = self.current()?;
                let kind = if command == "rich" {
                    ContentKind::RichText
                } else {
                    ContentKind::PlainText
                };
                self.api.set_kind(&mut self.view, id, kind)?;
            }
            "save" | "saveas" => {
                let id = self.current()?;
                let report = if command == "save" {
                    self.api.save(&mut self.view, &mut self.prompter, id)?
                } else {
                    self.api.save_as(&mut self.view, &mut self.prompter, id)?
                };
                print_messages(&report.messages);
            }
            "close" => {
                let id = self.tab_arg(rest.trim())?;
                let position = self.api.registry().position(id)?;
                let report = self.api.close_tab(&mut self.view, &mut self.prompter, id)?;
                print_messages(&report.messages);
                if report.outcome == CloseOutcome::Closed && self.current == Some(id) {
                    let next = report.replacement.or_else(|| {
                        let ids = self.api.registry().ids();
                        ids.get(position.min(ids.len().saturating_sub(1))).copied()
                    });
                    self.current = next;
                    self.cursor = 0;
                }
            }
            "move" => {
                let mut parts = rest.split_whitespace();
                let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
                    return Err(QuicknoteError::Api("Usage: move N TO".to_string()));
                };
                let id = self.api.tab(parse_number(from)?)?;
                self.api.move_tab(id, parse_number(to)?)?;
            }
            "find" => {
                let id = self.current()?;
                match self.api.find(&self.view, id, rest, self.cursor)? {
                    Some(range) => {
                        println!("Found at {}", range.start);
                        self.cursor = range.end;
                    }
                    None => println!("Not found: {}", rest),
                }
            }
            "replace" => self.replace(rest)?,
            "autosave" => {
                if let Some(report) = self.api.autosave_now(Instant::now(), &self.view) {
                    print_messages(&report.messages);
                }
            }
            "snapshots" => print_snapshots(&self.api.list_snapshots()?),
            other => {
                return Err(QuicknoteError::Api(format!(
                    "Unknown command: {} (try 'help')",
                    other
                )))
            }
        }
        Ok(())
    }

    fn replace(&mut self, rest: &str) -> Result<()> {
        let id = self.current()?;
        let mut parts: Vec<&str> = rest.split_whitespace().collect();
        let all = parts.first() == Some(&"-a");
        if all {
            parts.remove(0);
        }
        let &[needle, with] = parts.as_slice() else {
            return Err(QuicknoteError::Api(
                "Usage: replace [-a] OLD NEW".to_string(),
            ));
        };

        if all {
            let count = self.api.replace_all(&mut self.view, id, needle, with)?;
            println!("Replaced {} occurrence(s)", count);
        } else {
            match self
                .api
                .replace_next(&mut self.view, id, needle, with, self.cursor)?
            {
                Some(range) => {
                    println!("Replaced at {}", range.start);
                    self.cursor = range.end;
                }
                None => println!("Not found: {}", needle),
            }
        }
        Ok(())
    }

    /// Close everything. False when the user cancelled and the session goes on.
    fn quit(&mut self) -> Result<bool> {
        let report = self.api.close_all(&mut self.view, &mut self.prompter)?;
        print_messages(&report.messages);
        match report.outcome {
            CloseOutcome::Closed => Ok(true),
            CloseOutcome::Cancelled => {
                println!("{}", "Exit cancelled.".dimmed());
                Ok(false)
            }
        }
    }
}

fn parse_number(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| QuicknoteError::Api(format!("Not a tab number: {}", s)))
}
