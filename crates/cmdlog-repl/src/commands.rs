//! Command dispatch
//!
//! A line is split on whitespace; the first token names the command and
//! the rest are its arguments. Blank lines and `#` comments are ignored.
//!
//! | Command                 | Description                              |
//! |-------------------------|------------------------------------------|
//! | `show`                  | List fields and variables                |
//! | `set <key> <value>`     | Set a session variable                   |
//! | `enable <field>`        | Print a field                            |
//! | `disable <field>`       | Stop printing a field                    |
//! | `test <query>`          | Print the request body, no network call  |
//! | `query <query>`         | Run the search and print the hits        |
//! | `help`                  | Show available commands                  |
//! | `quit` / `exit`         | Leave the REPL                           |
//!
//! Every failure except terminal I/O is reported on the output and the
//! REPL carries on.

use crate::context::Session;
use cmdlog_client::{ClientError, Transport};
use cmdlog_core::{CoreError, Rendered};
use std::io::{self, Write};
use thiserror::Error;

/// Width of the key column in `show`
const SHOW_KEY_WIDTH: usize = 14;

/// What the REPL should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

/// Failures raised by a command
#[derive(Error, Debug)]
pub enum CommandError {
    /// Missing arguments
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing to the terminal failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// REPL commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Set,
    Enable,
    Disable,
    Test,
    Query,
    Help,
    Quit,
}

impl Command {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "show" => Some(Command::Show),
            "set" => Some(Command::Set),
            "enable" => Some(Command::Enable),
            "disable" => Some(Command::Disable),
            "test" => Some(Command::Test),
            "query" => Some(Command::Query),
            "help" => Some(Command::Help),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Command::Show => "show",
            Command::Set => "set <variable> <value>",
            Command::Enable => "enable <field>",
            Command::Disable => "disable <field>",
            Command::Test => "test <query>",
            Command::Query => "query <query>",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    /// Run the command against the session, writing to `out`
    pub async fn execute<T: Transport, W: Write>(
        &self,
        session: &mut Session<T>,
        args: &[&str],
        out: &mut W,
    ) -> Result<Outcome, CommandError> {
        match self {
            Command::Show => show(session, out)?,
            Command::Set => {
                let [key, value, ..] = args else {
                    return Err(CommandError::Usage(self.usage()));
                };
                session.variables.set(*key, *value);
            }
            Command::Enable | Command::Disable => {
                let Some(field) = args.first() else {
                    return Err(CommandError::Usage(self.usage()));
                };
                session
                    .registry
                    .set_enabled(field, *self == Command::Enable)?;
            }
            Command::Test => {
                let text = self.query_text(args)?;
                let request = session.builder().build(&text, &session.variables)?;
                writeln!(out, "{}", request.to_pretty_json()?)?;
            }
            Command::Query => {
                let text = self.query_text(args)?;
                query(session, &text, out).await?;
            }
            Command::Help => writeln!(out, "{}", help_text())?,
            Command::Quit => return Ok(Outcome::Exit),
        }
        Ok(Outcome::Continue)
    }

    /// Arguments joined back into the query text
    fn query_text(&self, args: &[&str]) -> Result<String, CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage(self.usage()));
        }
        Ok(args.join(" "))
    }
}

/// Run one line. Only terminal I/O failures are returned as errors.
pub async fn dispatch<T: Transport, W: Write>(
    line: &str,
    session: &mut Session<T>,
    out: &mut W,
) -> io::Result<Outcome> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Outcome::Continue);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(command) = Command::from_keyword(tokens[0]) else {
        writeln!(out, "command doesn't exist")?;
        return Ok(Outcome::Continue);
    };

    tracing::debug!("Running {:?} with {} argument(s)", command, tokens.len() - 1);

    match command.execute(session, &tokens[1..], out).await {
        Ok(outcome) => Ok(outcome),
        Err(CommandError::Io(e)) => Err(e),
        Err(e) => {
            report(&e, session, out)?;
            Ok(Outcome::Continue)
        }
    }
}

fn report<T: Transport, W: Write>(
    err: &CommandError,
    session: &Session<T>,
    out: &mut W,
) -> io::Result<()> {
    match err {
        CommandError::Usage(_) | CommandError::Core(CoreError::InvalidField(_)) => {
            writeln!(out, "{}", err)
        }
        _ => {
            let palette = session.renderer().palette();
            tracing::warn!("Command failed: {}", err);
            writeln!(out, "{} {}", palette.paint(&palette.red, "error:"), err)
        }
    }
}

fn show<T: Transport, W: Write>(session: &Session<T>, out: &mut W) -> io::Result<()> {
    writeln!(out, "fields")?;
    for field in session.registry.iter() {
        let pad = SHOW_KEY_WIDTH.saturating_sub(field.key.len());
        writeln!(
            out,
            " {}{}: {}",
            field.display_name,
            " ".repeat(pad),
            u8::from(field.enabled)
        )?;
    }

    writeln!(out, "variables")?;
    for (key, value) in session.variables.iter() {
        writeln!(out, " {} = {}", key, value)?;
    }
    Ok(())
}

async fn query<T: Transport, W: Write>(
    session: &Session<T>,
    text: &str,
    out: &mut W,
) -> Result<(), CommandError> {
    let request = session.builder().build(text, &session.variables)?;
    tracing::info!("Searching: {}", text);

    let response = session.transport().search(&request).await?;
    tracing::debug!(
        "Received {} hit(s), total {:?}",
        response.hits().len(),
        response.total_hits()
    );

    match session.renderer().render(&response, &session.registry) {
        Rendered::Errors(lines) => {
            for line in lines {
                writeln!(out, "{}", line)?;
            }
        }
        Rendered::Lines(lines) => {
            for line in lines {
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}

fn help_text() -> String {
    r#"cmdlog commands:

  show                    List fields and session variables
  set <variable> <value>  Set a session variable (from, size, gte, lte, restricted)
  enable <field>          Print a field in query results
  disable <field>         Stop printing a field
  test <query>            Print the search request without sending it
  query <query>           Search and print matching log records
  help                    Show this help message
  quit, exit              Leave cmdlog

Set `restricted` to 1 to limit searches to the gte..lte TimeStamp window.
Lines starting with # are ignored."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdlog_core::{Palette, QueryRequest, QueryResponse};
    use serde_json::{Value, json};
    use std::cell::RefCell;

    /// Transport that records requests and answers with a canned reply
    struct StubTransport {
        requests: RefCell<Vec<QueryRequest>>,
        reply: Result<Value, String>,
    }

    impl StubTransport {
        fn replying(reply: Value) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                reply: Ok(reply),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                reply: Err(message.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Transport for StubTransport {
        async fn search(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
            self.requests.borrow_mut().push(request.clone());
            match &self.reply {
                Ok(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
                Err(message) => Err(ClientError::Connection(message.clone())),
            }
        }
    }

    fn session(transport: StubTransport) -> Session<StubTransport> {
        Session::with_palette(transport, Palette::plain())
    }

    async fn run(line: &str, session: &mut Session<StubTransport>) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = dispatch(line, session, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    fn empty_reply() -> Value {
        json!({ "hits": { "hits": [] } })
    }

    #[tokio::test]
    async fn blank_and_comment_lines_are_ignored() {
        let mut s = session(StubTransport::replying(empty_reply()));
        for line in ["", "   ", "# query host:gas06"] {
            let (outcome, output) = run(line, &mut s).await;
            assert_eq!(outcome, Outcome::Continue);
            assert!(output.is_empty());
        }
        assert_eq!(s.transport().calls(), 0);
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let mut s = session(StubTransport::replying(empty_reply()));
        let (outcome, output) = run("frobnicate now", &mut s).await;
        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(output, "command doesn't exist\n");
    }

    #[tokio::test]
    async fn set_then_query_sends_size() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("set size 10", &mut s).await;
        run("query host:gas06", &mut s).await;

        let requests = s.transport().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].size, "10");
        assert_eq!(requests[0].query_text(), "host:gas06");
    }

    #[tokio::test]
    async fn test_prints_body_without_network_call() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("set size 10", &mut s).await;
        let (_, output) = run("test host:gas06", &mut s).await;

        assert_eq!(s.transport().calls(), 0);
        let body: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(body["size"], json!("10"));
        assert_eq!(body["query"]["query_string"]["query"], json!("host:gas06"));
    }

    #[tokio::test]
    async fn query_text_is_rejoined_with_single_spaces() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("query  Host:gas06   AND text:fullauto", &mut s).await;
        let requests = s.transport().requests.borrow();
        assert_eq!(requests[0].query_text(), "Host:gas06 AND text:fullauto");
    }

    #[tokio::test]
    async fn missing_arguments_print_usage() {
        let mut s = session(StubTransport::replying(empty_reply()));
        let before = s.variables.clone();

        assert_eq!(run("set size", &mut s).await.1, "Usage: set <variable> <value>\n");
        assert_eq!(run("query", &mut s).await.1, "Usage: query <query>\n");
        assert_eq!(run("test", &mut s).await.1, "Usage: test <query>\n");
        assert_eq!(run("enable", &mut s).await.1, "Usage: enable <field>\n");
        assert_eq!(run("disable", &mut s).await.1, "Usage: disable <field>\n");

        assert_eq!(s.variables, before);
        assert_eq!(s.transport().calls(), 0);
    }

    #[tokio::test]
    async fn enable_and_disable_fields() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("enable HOST", &mut s).await;
        run("disable text", &mut s).await;
        assert!(s.registry.get("host").unwrap().enabled);
        assert!(!s.registry.get("text").unwrap().enabled);
    }

    #[tokio::test]
    async fn enable_unknown_field_reports_and_keeps_registry() {
        let mut s = session(StubTransport::replying(empty_reply()));
        let before: Vec<_> = s.registry.iter().cloned().collect();

        let (outcome, output) = run("enable badfield", &mut s).await;
        assert_eq!(outcome, Outcome::Continue);
        assert!(output.contains("badfield"));

        let after: Vec<_> = s.registry.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn disable_unknown_field_reports_and_keeps_registry() {
        let mut s = session(StubTransport::replying(empty_reply()));
        let before: Vec<_> = s.registry.iter().cloned().collect();

        let (outcome, output) = run("disable badfield", &mut s).await;
        assert_eq!(outcome, Outcome::Continue);
        assert!(output.contains("badfield"));

        let after: Vec<_> = s.registry.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(s.transport().calls(), 0);
    }

    #[tokio::test]
    async fn query_renders_hits() {
        let reply = json!({ "hits": { "hits": [
            { "_source": {
                "tags": ["AOS64", "URGENT"],
                "TimeStamp": "2016-09-01T10:00:00.000",
                "LogLevel": "Warning",
                "SourceObject": "CONTROL/DV01",
                "text": "fullauto detected"
            } },
            { "_source": { "tags": ["AOS64"], "text": "second" } }
        ] } });
        let mut s = session(StubTransport::replying(reply));

        let (_, output) = run("query text:fullauto", &mut s).await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "AOS64 2016-09-01T10:00:00.000 Warning   CONTROL/DV01 fullauto detected",
                "AOS64 second",
            ]
        );
    }

    #[tokio::test]
    async fn backend_errors_are_printed() {
        let reply = json!({ "error": { "root_cause": [
            { "type": "query_shard_exception", "reason": "bad" }
        ] } });
        let mut s = session(StubTransport::replying(reply));

        let (outcome, output) = run("query host:(", &mut s).await;
        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(output, "error: query_shard_exception, bad\n");
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_fatal() {
        let mut s = session(StubTransport::failing("connection refused"));
        let (outcome, output) = run("query host:gas06", &mut s).await;
        assert_eq!(outcome, Outcome::Continue);
        assert!(output.starts_with("error: "));
        assert!(output.contains("connection refused"));
    }

    #[tokio::test]
    async fn restricted_query_sends_range() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("set restricted 1", &mut s).await;
        run("set gte 2016-09-01T00:00:00.000", &mut s).await;
        run("set lte 2016-09-01T23:59:59.999", &mut s).await;
        run("query host:gas06", &mut s).await;

        let requests = s.transport().requests.borrow();
        assert_eq!(
            requests[0].shape(),
            cmdlog_core::QueryShape::RangeFiltered {
                gte: "2016-09-01T00:00:00.000".to_string(),
                lte: "2016-09-01T23:59:59.999".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn show_lists_fields_and_variables() {
        let mut s = session(StubTransport::replying(empty_reply()));
        run("set custom value", &mut s).await;
        let (_, output) = run("show", &mut s).await;

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "fields");
        assert_eq!(lines[1], " Data          : 0");
        assert!(lines.contains(&" LogLevel      : 1"));
        assert!(lines.contains(&"variables"));
        assert!(lines.contains(&" custom = value"));
        assert!(lines.contains(&" size = 50"));
    }

    #[tokio::test]
    async fn quit_and_exit_leave() {
        let mut s = session(StubTransport::replying(empty_reply()));
        assert_eq!(run("quit", &mut s).await.0, Outcome::Exit);
        assert_eq!(run("exit", &mut s).await.0, Outcome::Exit);
    }
}
