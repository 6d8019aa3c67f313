mod agent;
mod app;
mod config;
mod error;
mod guide;
mod logging;
mod types;
mod ui;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use agent::{
    backend::{AnyBackend, FixtureBackend, LlmBackend},
    pipeline::{GuideOutcome, GuidePipeline},
};
use anyhow::Result;
use app::state::{App, Focus};
use clap::Parser;
use config::Config;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use guide::render::GuideView;
use tokio::sync::mpsc;
use types::GuideMode;
use ui::format::{format_errors, format_guide};
use ui::screen::{Screen, strip_ansi};

#[derive(Parser)]
#[command(
    name = "franky",
    version,
    about = "Turn a DevOps task into a checkable step-by-step guide"
)]
struct Cli {
    /// Generate once for REQUEST, print the guide and exit.
    #[arg(short, long, value_name = "REQUEST")]
    print: Option<String>,
    /// With --print: emit the display model as JSON.
    #[arg(long, requires = "print")]
    json: bool,
    /// Generate free text first, then format it as an indented outline.
    #[arg(long)]
    tree: bool,
    /// Serve a fixed guide from a JSON file instead of calling the model.
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,
    /// Config file (defaults to ./franky.toml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

pub(crate) enum WorkerEvent {
    Done(GuideOutcome),
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let cfg = Config::load(cli.config.as_deref())?;
    logging::init(cli.print.is_none(), cfg.log_file.as_deref())?;

    let mode = if cli.tree {
        GuideMode::Tree
    } else {
        cfg.guide_mode()?
    };
    let backend = match &cli.fixture {
        Some(path) => AnyBackend::Fixture(FixtureBackend::from_file(path)?),
        None => AnyBackend::Llm(LlmBackend::from_config(&cfg)?),
    };
    let pipeline = Arc::new(GuidePipeline::new(backend, mode));

    match cli.print {
        Some(request) => print_guide(&pipeline, &request, cli.json).await,
        None => {
            run_interactive(pipeline).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ── Headless ──────────────────────────────────────────────────────────────────

async fn print_guide(
    pipeline: &GuidePipeline<AnyBackend>,
    request: &str,
    json: bool,
) -> Result<ExitCode> {
    let data = match pipeline.submit(request).await {
        GuideOutcome::Ready(data) => data,
        GuideOutcome::Failed(message) => {
            eprintln!("{message}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let model = GuideView::new(data).display();
    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut lines = format_guide(&model, None, true).lines;
    if !model.errors.is_empty() {
        lines.push(String::new());
        lines.extend(format_errors(&model));
    }
    let styled = io::stdout().is_terminal();
    for line in lines {
        if styled {
            println!("{line}");
        } else {
            println!("{}", strip_ansi(&line));
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ── Interactive ───────────────────────────────────────────────────────────────

async fn run_interactive(pipeline: Arc<GuidePipeline<AnyBackend>>) -> Result<()> {
    let mut app = App::new(pipeline.mode());
    let mut screen = Screen::new()?;
    let (tx, mut rx) = mpsc::channel::<WorkerEvent>(4);
    let mut dirty = true;

    loop {
        while let Ok(msg) = rx.try_recv() {
            match msg {
                WorkerEvent::Done(outcome) => {
                    app.finish_submit(outcome);
                    dirty = true;
                }
            }
        }

        if app.generating {
            app.spinner_tick = app.spinner_tick.wrapping_add(1);
            dirty = true;
        }
        if dirty {
            screen.draw(&app)?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(80))? {
            let request = match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    dirty = true;
                    handle_key(&mut app, key.code, key.modifiers)
                }
                CEvent::Paste(text) => {
                    dirty = true;
                    handle_paste(&mut app, &text);
                    None
                }
                CEvent::Resize(..) => {
                    dirty = true;
                    None
                }
                _ => None,
            };

            if let Some(request) = request {
                let pipeline = pipeline.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let outcome = pipeline.submit_detached(request).await;
                    let _ = tx.send(WorkerEvent::Done(outcome)).await;
                });
            }
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}

// ── Key handling ──────────────────────────────────────────────────────────────

/// Apply a key press; returns a request when the user submitted one.
fn handle_key(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> Option<String> {
    if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return None;
    }

    match app.focus {
        Focus::Input => match key {
            KeyCode::Enter => return app.begin_submit(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Tab | KeyCode::Esc => app.cycle_focus(),
            KeyCode::Char(c) if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT => {
                app.push_char(c)
            }
            _ => {}
        },
        Focus::Guide => match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let _ = app.toggle_selected();
            }
            KeyCode::Char('e') => app.toggle_errors(),
            KeyCode::Esc if app.show_errors => app.toggle_errors(),
            KeyCode::Tab | KeyCode::Esc => app.cycle_focus(),
            KeyCode::Char('q') => app.quit = true,
            _ => {}
        },
    }
    None
}

fn handle_paste(app: &mut App, text: &str) {
    if app.focus != Focus::Input {
        return;
    }
    for c in text.chars() {
        app.push_char(if c == '\n' || c == '\r' { ' ' } else { c });
    }
}
