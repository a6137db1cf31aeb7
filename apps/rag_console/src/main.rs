use std::{
    fs,
    io::BufRead,
    path::{Path, PathBuf},
    process::ExitCode,
};

mod app_state;
mod backend_bridge;
mod config;
mod controller;
mod shell;
mod view;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use anyhow::{bail, Context, Result};
use backend_bridge::commands::BackendCommand;
use clap::{Parser, Subcommand};
use controller::{
    dispatch::dispatch_backend_command,
    events::{Outcome, UiEvent},
};
use crossbeam_channel::{bounded, Receiver, Sender};
use shell::ShellCommand;
use tracing_subscriber::EnvFilter;
use view::{page::chat_slot_id, ViewChange};

#[derive(Parser, Debug)]
#[command(name = "rag_console", about = "Console front end for the RAG API")]
struct Cli {
    /// API origin; requests go to `<origin>/api`.
    #[arg(long)]
    origin: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every panel; print the slots or write the page to `--out`.
    Page {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Refresh,
    Upload {
        path: Option<PathBuf>,
    },
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    WorldbankAsk {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    UpdateKnowledge {
        #[arg(long = "country")]
        countries: Vec<String>,
        #[arg(long = "indicator")]
        indicators: Vec<String>,
        #[arg(long)]
        no_topics: bool,
    },
    Shell,
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_change(change: &ViewChange) {
    match change {
        ViewChange::Slot { slot, html } => println!("[{slot}] {html}"),
        ViewChange::ChatAppended { id, at, html } => println!(
            "[{} +{id} {}] {html}",
            chat_slot_id(),
            at.format("%H:%M:%S")
        ),
        ViewChange::ChatRemoved { id } => println!("[{} -{id}]", chat_slot_id()),
        ViewChange::Alert(text) => eprintln!("alert: {text}"),
    }
}

/// Queues one command and prints what it produced until the worker reports
/// it settled. Returns the settled outcome and any assembled page.
fn run_command(
    cmd_tx: &Sender<BackendCommand>,
    ui_rx: &Receiver<UiEvent>,
    cmd: BackendCommand,
) -> Result<(Option<Outcome>, Option<String>)> {
    let mut status = String::new();
    if !dispatch_backend_command(cmd_tx, cmd, &mut status) {
        bail!(status);
    }

    let mut page = None;
    loop {
        let event = ui_rx
            .recv()
            .context("backend worker stopped before finishing the command")?;
        match event {
            UiEvent::View(change) => print_change(&change),
            UiEvent::Page(document) => page = Some(document),
            UiEvent::Info(text) => eprintln!("{text}"),
            UiEvent::Error(text) => eprintln!("error: {text}"),
            UiEvent::Settled { command, outcome } => {
                tracing::debug!(command, ?outcome, "command settled");
                return Ok((outcome, page));
            }
        }
    }
}

fn write_page(
    cmd_tx: &Sender<BackendCommand>,
    ui_rx: &Receiver<UiEvent>,
    out: &Path,
) -> Result<()> {
    let (_, page) = run_command(cmd_tx, ui_rx, BackendCommand::RenderPage)?;
    let page = page.context("backend worker did not return the page")?;
    fs::write(out, page).with_context(|| format!("failed to write '{}'", out.display()))?;
    eprintln!("page written to {}", out.display());
    Ok(())
}

fn run_shell(cmd_tx: &Sender<BackendCommand>, ui_rx: &Receiver<UiEvent>) -> Result<()> {
    eprintln!("{}", shell::HELP);
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        match shell::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Backend(cmd))) => {
                let (outcome, _) = run_command(cmd_tx, ui_rx, cmd)?;
                if let Some(Outcome::Rejected(message)) = outcome {
                    eprintln!("server rejected the request: {message}");
                }
            }
            Ok(Some(ShellCommand::Save(path))) => {
                if let Err(err) = write_page(cmd_tx, ui_rx, &path) {
                    eprintln!("error: {err:#}");
                }
            }
            Ok(Some(ShellCommand::Help)) => eprintln!("{}", shell::HELP),
            Ok(Some(ShellCommand::Quit)) => break,
            Err(message) => eprintln!("{message}"),
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(origin) = cli.origin {
        settings.origin = origin;
    }
    init_tracing(&settings.log_filter);
    let origin = settings.origin_url()?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let worker = backend_bridge::runtime::launch(origin, settings.query_limits(), cmd_rx, ui_tx)?;

    let outcome = match cli.command {
        Command::Shell => {
            run_shell(&cmd_tx, &ui_rx)?;
            None
        }
        Command::Page { out } => {
            let (outcome, _) = run_command(&cmd_tx, &ui_rx, BackendCommand::LoadPage)?;
            if let Some(out) = out {
                write_page(&cmd_tx, &ui_rx, &out)?;
            }
            outcome
        }
        Command::Refresh => run_command(&cmd_tx, &ui_rx, BackendCommand::Refresh)?.0,
        Command::Upload { path } => run_command(&cmd_tx, &ui_rx, BackendCommand::Upload { path })?.0,
        Command::Ask { question } => {
            run_command(
                &cmd_tx,
                &ui_rx,
                BackendCommand::Ask {
                    question: question.join(" "),
                },
            )?
            .0
        }
        Command::WorldbankAsk { question } => {
            run_command(
                &cmd_tx,
                &ui_rx,
                BackendCommand::AskWorldBank {
                    question: question.join(" "),
                },
            )?
            .0
        }
        Command::UpdateKnowledge {
            countries,
            indicators,
            no_topics,
        } => {
            run_command(
                &cmd_tx,
                &ui_rx,
                BackendCommand::UpdateKnowledge {
                    countries,
                    indicators,
                    include_topics: !no_topics,
                },
            )?
            .0
        }
    };

    run_command(&cmd_tx, &ui_rx, BackendCommand::Shutdown)?;
    drop(cmd_tx);
    if worker.join().is_err() {
        bail!("backend worker panicked");
    }

    Ok(match outcome {
        Some(outcome) if !outcome.is_success() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
