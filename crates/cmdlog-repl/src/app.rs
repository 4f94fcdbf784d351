//! Interactive loop
//!
//! Lines come from rustyline, each one runs to completion before the next
//! prompt. History is loaded at startup and saved after every line.

use crate::commands::{Outcome, dispatch};
use crate::context::Session;
use cmdlog_client::Transport;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io;
use std::path::PathBuf;

const PROMPT: &str = "> ";

/// REPL over a session
pub struct App<T> {
    session: Session<T>,
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl<T: Transport> App<T> {
    pub fn new(session: Session<T>, history: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        if let Some(path) = &history {
            // A missing history file is normal on first run
            if let Err(e) = editor.load_history(path) {
                tracing::debug!("No history loaded from {}: {}", path.display(), e);
            }
        }

        Ok(Self {
            session,
            editor,
            history,
        })
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Prompt until quit or end of input.
    ///
    /// Reading blocks the current worker thread, so this must run on a
    /// multi-threaded tokio runtime.
    pub async fn run(&mut self) -> Result<()> {
        if let Some(path) = &self.history {
            println!("> history located at {}", path.display());
        }

        loop {
            let line = tokio::task::block_in_place(|| self.editor.readline(PROMPT));

            match line {
                Ok(line) => {
                    if self.run_line(&line).await? == Outcome::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(err).wrap_err("failed to read input");
                }
            }
        }

        tracing::info!("Leaving REPL");
        Ok(())
    }

    /// Record a line in history and run it
    pub async fn run_line(&mut self, line: &str) -> Result<Outcome> {
        if !line.trim().is_empty() {
            if let Err(e) = self.editor.add_history_entry(line) {
                tracing::debug!("Failed to add history entry: {}", e);
            }
            self.save_history();
        }

        let mut out = io::stdout();
        let outcome = dispatch(line, &mut self.session, &mut out)
            .await
            .wrap_err("failed to write output")?;
        Ok(outcome)
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history
            && let Err(e) = self.editor.save_history(path)
        {
            tracing::warn!("Failed to save history to {}: {}", path.display(), e);
        }
    }
}
