pub mod shutdown;
pub mod terminal;
pub mod track;

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use terminal::{TerminalRenderer, View};
use tracing::debug;
use track::{process_track_command, TrackCommand};

use crate::{
    app::{render::Renderer, Tracker},
    storage::key_value::JsonFileStore,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "timetally", version, long_about = None)]
#[command(about = "Track time spent on tasks, projects and clients", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Start the timer. Type start, stop, reset, task <text>, project <text>, tags <text>, status or quit while it runs"
    )]
    Track {
        #[command(flatten)]
        command: TrackCommand,
    },
    #[command(about = "List recorded sessions, newest first")]
    Sessions {},
    #[command(about = "Show today and week totals, time per project and projects per client")]
    Summary {
        #[arg(long, help = "Print the whole state as JSON")]
        json: bool,
    },
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Manage clients")]
    Client {
        #[command(subcommand)]
        command: ClientCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    #[command(about = "Add a project. Names are unique ignoring case")]
    Add {
        name: String,
        #[arg(long, default_value = "", help = "Client the project belongs to")]
        client: String,
    },
    #[command(about = "Remove projects with exactly this name. Recorded sessions are kept")]
    Remove { name: String },
    #[command(about = "List projects")]
    List {},
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    #[command(about = "Add a client. Names are unique ignoring case")]
    Add { name: String },
    #[command(about = "List clients together with their projects")]
    List {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };

    enable_logging(&app_dir.join("logs"), args.log)?;
    debug!("Using application directory {app_dir:?}");

    let renderer = TerminalRenderer::detect_color(std::io::stdout(), View::Silent);
    run_command(args.commands, &app_dir.join("data"), renderer).await
}

async fn run_command<W: Write>(
    command: Commands,
    data_dir: &Path,
    renderer: TerminalRenderer<W>,
) -> Result<()> {
    let command = match command {
        Commands::Track { command } => return process_track_command(command, data_dir).await,
        other => other,
    };

    let store = JsonFileStore::new(data_dir.to_owned())?;
    let mut tracker = Tracker::load(store, renderer, Arc::new(DefaultClock)).await;

    match command {
        // Handled above, it owns the terminal.
        Commands::Track { .. } => {}
        Commands::Sessions {} => {
            tracker.renderer().set_view(View::Sessions);
            tracker.redraw_status();
        }
        Commands::Summary { json } => {
            let view = if json { View::SummaryJson } else { View::Summary };
            tracker.renderer().set_view(view);
            tracker.redraw_status();
        }
        Commands::Project { command } => match command {
            ProjectCommand::Add { name, client } => {
                tracker.renderer().set_view(View::Projects);
                if let Err(e) = tracker.add_project(&name, &client).await {
                    debug!("Project wasn't added: {e}");
                }
            }
            ProjectCommand::Remove { name } => {
                tracker.renderer().set_view(View::Projects);
                if tracker.remove_project(&name).await == 0 {
                    tracker
                        .renderer()
                        .render_notice(&format!("No project is named exactly '{name}'"));
                }
            }
            ProjectCommand::List {} => {
                tracker.renderer().set_view(View::Projects);
                tracker.redraw_status();
            }
        },
        Commands::Client { command } => match command {
            ClientCommand::Add { name } => {
                tracker.renderer().set_view(View::Clients);
                if let Err(e) = tracker.add_client(&name).await {
                    debug!("Client wasn't added: {e}");
                }
            }
            ClientCommand::List {} => {
                tracker.renderer().set_view(View::Clients);
                tracker.redraw_status();
            }
        },
    }
    Ok(())
}
