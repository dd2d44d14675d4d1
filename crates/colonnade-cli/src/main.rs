mod commands;

use clap::{Parser, Subcommand};
use colonnade_core::Command as EngineCommand;
use colonnade_core::Direction;

#[derive(Parser)]
#[command(
    name = "colonnade",
    version,
    about = "A cross-platform tiling window manager"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the window manager daemon
    Start,
    /// Stop the window manager daemon
    Stop,
    /// Show current status
    Status,
    /// Write default config files to the config directory
    Init,
    /// Send a layout/focus command to the running daemon
    Focus {
        #[command(subcommand)]
        direction: FocusDirectionArg,
    },
    /// Toggle the focused column's tabbed (stacked) display
    ToggleTabbed,
    /// Toggle the focused window's full workspace width
    ToggleFullWidth,
    /// Switch to a named workspace
    Workspace { name: String },
    /// Move the focused window to a named workspace
    MoveToWorkspace { name: String },
    /// Close the focused window
    Close,
    /// Hidden: runs the daemon loop in the foreground. Spawned by `start`.
    #[command(hide = true)]
    Daemon,
    /// Debugging and inspection tools
    Debug {
        #[command(subcommand)]
        command: DebugCommands,
    },
}

#[derive(Subcommand)]
enum FocusDirectionArg {
    Left,
    Right,
    Up,
    Down,
}

impl From<FocusDirectionArg> for Direction {
    fn from(value: FocusDirectionArg) -> Self {
        match value {
            FocusDirectionArg::Left => Direction::Left,
            FocusDirectionArg::Right => Direction::Right,
            FocusDirectionArg::Up => Direction::Up,
            FocusDirectionArg::Down => Direction::Down,
        }
    }
}

#[derive(Subcommand)]
enum DebugCommands {
    /// List all windows the daemon currently knows about
    List,
    /// Watch window events live (press Ctrl+C to stop)
    Events,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => commands::start::execute(),
        Commands::Stop => commands::stop::execute(),
        Commands::Status => commands::status::execute(),
        Commands::Init => commands::init::execute(),
        Commands::Focus { direction } => {
            commands::action::execute(EngineCommand::FocusDirection(direction.into()))
        }
        Commands::ToggleTabbed => commands::action::execute(EngineCommand::ToggleColumnTabbed),
        Commands::ToggleFullWidth => commands::action::execute(EngineCommand::ToggleFullWidth),
        Commands::Workspace { name } => {
            commands::action::execute(EngineCommand::SwitchWorkspace(name))
        }
        Commands::MoveToWorkspace { name } => {
            commands::action::execute(EngineCommand::MoveFocusedWindowToWorkspace(name))
        }
        Commands::Close => commands::action::execute(EngineCommand::CloseFocusedWindow),
        Commands::Daemon => commands::daemon::execute(),
        Commands::Debug { command } => match command {
            DebugCommands::List => commands::debug::list::execute(),
            DebugCommands::Events => commands::debug::events::execute(),
        },
    }
}
