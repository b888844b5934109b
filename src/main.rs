mod app;
mod cli;
mod config;
mod input;
mod k8s;
mod model;
mod ui;
mod wrap;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::CliArgs;
use config::DisplayConfig;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use k8s::KubeGateway;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use ui::Target;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;

    let config = DisplayConfig::load()?;
    if let Some(source) = &config.source {
        info!("loaded config from {source}");
    }

    let gateway = KubeGateway::new(args.context.clone(), &config).await?;
    let namespace = args
        .namespace
        .clone()
        .filter(|namespace| !namespace.trim().is_empty())
        .unwrap_or_else(|| gateway.default_namespace().to_string());
    info!(
        "context={} cluster={} namespace={namespace}",
        gateway.context(),
        gateway.cluster()
    );

    let mut app = App::bootstrap(&gateway, namespace, &config).await?;
    run(&mut app, &gateway).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    // The terminal is in raw alternate-screen mode, so nothing may reach stdout.
    let _ = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };

    Ok(())
}

async fn run(app: &mut App, gateway: &KubeGateway) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// One key event is applied (including any fetch it triggers) and drawn before
/// the next one is read.
async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, gateway: &KubeGateway) -> Result<()> {
    let target = Target {
        context: gateway.context(),
        cluster: gateway.cluster(),
    };
    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, app, &target))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        match reader.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if let Some(action) = input::map_key(key) {
                    debug!("key={:?} action={action:?}", key.code);
                    app.apply_action(action, gateway).await?;
                }
            }
            Some(Ok(_)) => {}
            Some(Err(error)) => {
                warn!("terminal event error: {error}");
            }
            None => {
                warn!("terminal event stream closed");
                break;
            }
        }
    }

    Ok(())
}
