//! Interactive shell
//!
//! Reads commands from stdin while completions stream in from the
//! orchestrator, so a schema connect can finish while a query is still running.

use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::model::{JobId, DEMO_CONNECTION};
use crate::orchestrator::{Action, Orchestrator, Update};
use crate::ui::{self, print_update, Icons};

pub const HELP: &str = "\
Commands:
  connect <connection string>   discover the schema of a data source
  demo                          connect to the demo database
  upload <path>...              upload documents (quote paths with spaces)
  status                        check the current ingestion job
  query <text>                  run a natural-language query
  query! <text>                 run a query, replacing one still running
  show                          show the current result again
  schema                        show the last schema discovery
  history                       list recent queries
  health                        check the backend
  help                          show this help
  quit                          leave the shell";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Connect(String),
    Demo,
    Upload(Vec<PathBuf>),
    Status,
    Query { text: String, replace: bool },
    Show,
    Schema,
    History,
    Health,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellCommand::Empty);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "connect" => ShellCommand::Connect(rest.to_string()),
            "demo" => ShellCommand::Demo,
            "upload" => ShellCommand::Upload(split_args(rest)?.into_iter().map(PathBuf::from).collect()),
            "status" => ShellCommand::Status,
            "query" | "q" => ShellCommand::Query { text: rest.to_string(), replace: false },
            "query!" | "q!" => ShellCommand::Query { text: rest.to_string(), replace: true },
            "show" => ShellCommand::Show,
            "schema" => ShellCommand::Schema,
            "history" => ShellCommand::History,
            "health" => ShellCommand::Health,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };
        Ok(command)
    }

    /// The orchestrator action behind this command, if it starts one
    pub fn action(&self) -> Option<Action> {
        match self {
            ShellCommand::Connect(conn) => Some(Action::Connect(conn.clone())),
            ShellCommand::Demo => Some(Action::Connect(DEMO_CONNECTION.to_string())),
            ShellCommand::Upload(paths) => Some(Action::Upload(paths.clone())),
            ShellCommand::Status => Some(Action::PollStatus),
            ShellCommand::Query { text, replace } => Some(Action::Query {
                text: text.clone(),
                replace: *replace,
            }),
            ShellCommand::History => Some(Action::History),
            ShellCommand::Health => Some(Action::Health),
            _ => None,
        }
    }
}

/// Split on whitespace, keeping single- or double-quoted runs together
fn split_args(text: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote = None;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unclosed quote".to_string());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

fn current_job(orch: &Orchestrator) -> Option<String> {
    orch.session().job.as_ref().map(JobId::to_string)
}

fn show_prompt(orch: &Orchestrator) {
    print!("{}", ui::prompt(orch.session().result.is_busy()));
    std::io::stdout().flush().ok();
}

fn show_update(orch: &Orchestrator, update: &Update) {
    print_update(update, current_job(orch).as_deref());
}

fn handle(orch: &mut Orchestrator, command: ShellCommand) {
    if let Some(action) = command.action() {
        let update = orch.dispatch(action);
        show_update(orch, &update);
        return;
    }

    match command {
        ShellCommand::Show => match orch.session().render_model() {
            Some(model) => show_update(orch, &Update::Result(model)),
            None => println!("{} No results yet.", Icons::EMPTY),
        },
        ShellCommand::Schema => match orch.session().connection.get() {
            Some(outcome) => show_update(orch, &Update::Schema(outcome.clone())),
            None => println!("{} Not connected yet.", Icons::EMPTY),
        },
        ShellCommand::Help => println!("{}", HELP),
        _ => {}
    }
}

/// Run the shell until `quit` or end of input. Calls still outstanding at end
/// of input are awaited so piped scripts see their results.
pub async fn run_shell(orch: &mut Orchestrator) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    ui::header("NLP Query Engine - type `help` for commands");
    show_prompt(orch);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!();
                    break;
                };
                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Quit) => return Ok(()),
                    Ok(command) => handle(orch, command),
                    Err(message) => {
                        ui::warn(&message);
                        println!("{}", HELP);
                    }
                }
                show_prompt(orch);
            }
            Some(event) = orch.next_event() => {
                let update = orch.apply(event);
                println!();
                show_update(orch, &update);
                show_prompt(orch);
            }
        }
    }

    while orch.outstanding() > 0 {
        let Some(event) = orch.next_event().await else { break };
        let update = orch.apply(event);
        show_update(orch, &update);
    }
    Ok(())
}
