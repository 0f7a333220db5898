//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Live scene synchronization server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: volum.toml)
    #[arg(short = 'C', long, global = true, default_value = "volum.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the scene and push changes to connected viewers
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        scene: SceneArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(long, visible_alias = "interface")]
        host: Option<IpAddr>,

        /// HTTP port for the read endpoint
        #[arg(short, long)]
        port: Option<u16>,

        /// WebSocket port for viewer channels
        #[arg(long)]
        ws_port: Option<u16>,
    },

    /// Build the scene file once and print a summary
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        scene: SceneArgs,
    },

    /// List the built-in plugins and their types
    Plugins,
}

/// Scene source arguments shared by Serve and Check
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SceneArgs {
    /// Scene description file (JSON)
    #[arg(short = 's', long, value_hint = clap::ValueHint::FilePath)]
    pub scene_path: Option<String>,

    /// Script that (re)writes the scene file
    #[arg(short = 'g', long, visible_alias = "python-path", value_hint = clap::ValueHint::FilePath)]
    pub generator: Option<String>,

    /// Interpreter used to run the generator (e.g. "python3")
    #[arg(long)]
    pub interpreter: Option<String>,
}

impl Cli {
    pub fn scene_args(&self) -> Option<&SceneArgs> {
        match &self.command {
            Commands::Serve { scene, .. } | Commands::Check { scene } => Some(scene),
            Commands::Plugins => None,
        }
    }
}
