use std::{path::Path, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    app::{render::Renderer, Tracker},
    storage::key_value::{JsonFileStore, KeyValueStore},
    utils::clock::DefaultClock,
};

use super::{
    shutdown::detect_shutdown,
    terminal::{TerminalRenderer, View},
};

const TICK_FREQUENCY: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
pub struct TrackCommand {
    #[arg(long, help = "Task being worked on")]
    task: Option<String>,
    #[arg(long, help = "Project label of the session")]
    project: Option<String>,
    #[arg(long, help = "Free form tags, for example \"review,backend\"")]
    tags: Option<String>,
}

/// A line typed by the user while the timer is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackInput {
    Start,
    Stop,
    Reset,
    Task(String),
    Project(String),
    Tags(String),
    Status,
    Quit,
}

impl FromStr for TrackInput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (command, rest) = s
            .split_once(char::is_whitespace)
            .map(|(command, rest)| (command, rest.trim()))
            .unwrap_or((s, ""));
        match command.to_lowercase().as_str() {
            "start" => Ok(TrackInput::Start),
            "stop" => Ok(TrackInput::Stop),
            "reset" => Ok(TrackInput::Reset),
            "task" => Ok(TrackInput::Task(rest.to_string())),
            "project" => Ok(TrackInput::Project(rest.to_string())),
            "tags" => Ok(TrackInput::Tags(rest.to_string())),
            // An empty line simply refreshes the status block.
            "" | "status" => Ok(TrackInput::Status),
            "quit" | "exit" => Ok(TrackInput::Quit),
            other => Err(anyhow!(
                "Unknown command '{other}'. Available: start, stop, reset, task <text>, project <text>, tags <text>, status, quit"
            )),
        }
    }
}

/// Runs the `track` command: the timer starts right away and keeps counting until the user quits,
/// closes the input or interrupts the process. The counted time is saved in every case.
pub async fn process_track_command(
    TrackCommand {
        task,
        project,
        tags,
    }: TrackCommand,
    data_dir: &Path,
) -> Result<()> {
    let store = JsonFileStore::new(data_dir.to_owned())?;
    let renderer = TerminalRenderer::detect_color(std::io::stdout(), View::Silent);
    let mut tracker = Tracker::load(store, renderer, Arc::new(DefaultClock)).await;

    tracker.set_task(task.unwrap_or_default());
    tracker.set_project(project.unwrap_or_default());
    tracker.set_tags(tags.unwrap_or_default());
    tracker.renderer().set_view(View::Live);
    tracker.start();

    let shutdown = CancellationToken::new();
    let signal = tokio::spawn(detect_shutdown(shutdown.clone()));

    let result = run_session(
        &mut tracker,
        BufReader::new(tokio::io::stdin()),
        shutdown,
        TICK_FREQUENCY,
    )
    .await;

    signal.abort();
    result
}

/// Event loop of the timer. Ticks, input lines and shutdown never run concurrently, so the tracker
/// is only ever touched from here.
pub async fn run_session<S: KeyValueStore, R: Renderer>(
    tracker: &mut Tracker<S, R>,
    input: impl AsyncBufRead + Unpin,
    shutdown: CancellationToken,
    tick_frequency: Duration,
) -> Result<()> {
    let clock = tracker.clock();
    let mut lines = input.lines();
    let mut next_tick = clock.instant() + tick_frequency;

    let result = loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested");
                break Ok(());
            }
            _ = clock.sleep_until(next_tick) => {
                next_tick += tick_frequency;
                tracker.tick();
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match line.parse::<TrackInput>() {
                    Ok(TrackInput::Quit) => break Ok(()),
                    Ok(input) => apply_input(tracker, input).await,
                    Err(e) => tracker.renderer().render_notice(&e.to_string()),
                },
                Ok(None) => {
                    debug!("Input closed");
                    break Ok(());
                }
                Err(e) => break Err(e.into()),
            }
        }
    };

    // Whatever was counted is kept even when the loop ended with an error.
    tracker.flush_on_exit().await;
    result
}

async fn apply_input<S: KeyValueStore, R: Renderer>(
    tracker: &mut Tracker<S, R>,
    input: TrackInput,
) {
    debug!("Applying {input:?}");
    match input {
        TrackInput::Start => tracker.start(),
        TrackInput::Stop => tracker.stop(),
        TrackInput::Reset => {
            tracker.reset().await;
        }
        TrackInput::Task(task) => {
            tracker.set_task(task);
            tracker.redraw_status();
        }
        TrackInput::Project(project) => {
            tracker.set_project(project);
            tracker.redraw_status();
        }
        TrackInput::Tags(tags) => {
            tracker.set_tags(tags);
            tracker.redraw_status();
        }
        TrackInput::Status => tracker.redraw_status(),
        TrackInput::Quit => {}
    }
}
