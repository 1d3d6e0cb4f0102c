mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppError, AppEvent, AppModel, DocumentSession, TailBinding};
use crate::cli::{CliInvocation, RunConfig};
use crate::domain::{LogChunk, Mode};
use crate::infra::{ApiClient, LOG_READ_LIMIT};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::mpsc::{Sender, channel};
use std::time::{Duration, Instant};

#[derive(Debug)]
enum TailSignal {
    Fetched {
        generation: u64,
        path: String,
        result: Result<LogChunk, String>,
    },
}

fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    let result = match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Run(config) => run_tui(config),
    };

    if let Err(error) = result {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn print_help() {
    let text = format!(
        "{name}: browse, edit, and tail files on a remote markdown/log server\n\n\
USAGE:\n  {name} [--server URL] [--interval-ms N]\n  {name} --help | --version\n\n\
FLAGS:\n  --server URL, -s URL   Server base URL (default: {server})\n  --interval-ms N        Log tail poll interval in milliseconds (default: {interval}, min: 250)\n\n\
KEYS:\n  Tab switch Markdown/Logs, Up/Down select, Enter open, r reload tree,\n  Ctrl+S save, Esc back to tree, F1 help, q or Ctrl+C quit\n\n\
ENV:\n  BRAMBLE_SERVER         Default server base URL\n",
        name = env!("CARGO_PKG_NAME"),
        server = infra::DEFAULT_SERVER,
        interval = cli::DEFAULT_TAIL_INTERVAL_MS,
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(config: RunConfig) -> Result<(), AppError> {
    let client = ApiClient::new(&config.server);
    let mut model = AppModel::new(client.base_url().to_string());

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    let result = run(&mut terminal, &mut model, &client, config.tail_interval);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableBracketedPaste);
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), DisableBracketedPaste);
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    client: &ApiClient,
    tail_interval: Duration,
) -> Result<(), AppError> {
    let (tail_tx, tail_rx) = channel::<TailSignal>();
    let mut tail: Option<TailBinding> = None;
    let mut tail_in_flight: Option<u64> = None;

    execute_command(model, client, AppCommand::LoadTree);

    loop {
        let mut catch_up = false;
        while let Ok(signal) = tail_rx.try_recv() {
            let TailSignal::Fetched {
                generation,
                path,
                result,
            } = signal;
            if tail_in_flight == Some(generation) {
                tail_in_flight = None;
            }
            if generation == model.generation {
                if let Ok(chunk) = &result {
                    catch_up |= !chunk.eof;
                }
            }
            *model = app::apply_log_chunk(model, generation, &path, result);
        }

        tail = app::reconcile_tail(tail, model, tail_interval, Instant::now());
        if catch_up {
            // More bytes are already waiting on the server. Pull the backlog
            // at full speed instead of one bounded read per interval.
            if let Some(binding) = &mut tail {
                binding.next_due = Instant::now();
            }
        }

        if let Some(binding) = &mut tail {
            let due = Instant::now() >= binding.next_due;
            let already_running = tail_in_flight == Some(binding.generation);
            if due && !already_running {
                let offset = match &model.session {
                    Some(DocumentSession::Log { tail_offset, .. }) => *tail_offset,
                    _ => 0,
                };
                binding.next_due = Instant::now() + tail_interval;
                tail_in_flight = Some(binding.generation);
                spawn_tail_fetch(
                    client.clone(),
                    tail_tx.clone(),
                    binding.generation,
                    binding.path.clone(),
                    offset,
                );
            }
        }

        ui::clamp_scroll_state(model);
        terminal.draw(|frame| ui::render(frame, model))?;

        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    let (next, command) = app::update(model.clone(), AppEvent::Key(key));
                    *model = next;
                    match command {
                        AppCommand::None => {}
                        AppCommand::Quit => return Ok(()),
                        command => execute_command(model, client, command),
                    }
                    // Rebind (or drop) the timer in the same step as the
                    // transition, so a stale timer never outlives its session.
                    tail = app::reconcile_tail(tail, model, tail_interval, Instant::now());
                }
                Event::Paste(text) => {
                    let (next, _command) = app::update(model.clone(), AppEvent::Paste(text));
                    *model = next;
                }
                Event::Resize(width, height) => {
                    let (next, _command) =
                        app::update(model.clone(), AppEvent::Resize(width, height));
                    *model = next;
                }
                _ => {}
            }
        }
    }
}

fn execute_command(model: &mut AppModel, client: &ApiClient, command: AppCommand) {
    match command {
        AppCommand::LoadTree => {
            let result = client
                .fetch_tree(model.mode)
                .map_err(|error| error.to_string());
            *model = app::apply_tree_result(model, result);
        }
        AppCommand::OpenPath { path } => match model.mode {
            Mode::Markdown => {
                let result = client.read_file(&path).map_err(|error| error.to_string());
                *model = app::apply_markdown_open(model, path, result);
            }
            Mode::Log => {
                let result = client
                    .read_log_chunk(&path, 0, LOG_READ_LIMIT)
                    .map_err(|error| error.to_string());
                *model = app::apply_log_open(model, path, result);
            }
        },
        AppCommand::SaveDocument { path, content } => {
            let result = client
                .write_file(&path, &content)
                .map_err(|error| error.to_string());
            *model = app::apply_save_result(model, &path, result);
        }
        AppCommand::None | AppCommand::Quit => {}
    }
}

fn spawn_tail_fetch(
    client: ApiClient,
    tx: Sender<TailSignal>,
    generation: u64,
    path: String,
    offset: u64,
) {
    std::thread::spawn(move || {
        let result = client
            .read_log_chunk(&path, offset, LOG_READ_LIMIT)
            .map_err(|error| error.to_string());
        let _ = tx.send(TailSignal::Fetched {
            generation,
            path,
            result,
        });
    });
}
