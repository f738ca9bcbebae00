use clap::Subcommand;
use std::path::PathBuf;

pub mod anim;
pub mod pmo;

#[derive(Subcommand)]
pub enum Commands {
    /// PMO model operations
    Pmo {
        #[command(subcommand)]
        command: PmoCommands,
    },

    /// Sequence animation operations
    Anim {
        #[command(subcommand)]
        command: AnimCommands,
    },
}

#[derive(Subcommand)]
pub enum PmoCommands {
    /// Convert a glTF/GLB file to PMO
    Convert {
        /// Source glTF/GLB file
        #[arg(short, long)]
        source: PathBuf,

        /// Output PMO file
        #[arg(short, long)]
        destination: PathBuf,

        /// Encoder settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use the narrowest precision that fits instead of 32-bit floats
        #[arg(long)]
        adaptive: bool,
    },

    /// Encode a glTF/GLB file and show the resulting header and chunks
    Inspect {
        /// Source glTF/GLB file
        #[arg(short, long)]
        source: PathBuf,

        /// Encoder settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert every glTF/GLB file in a directory
    Batch {
        /// Source directory
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        destination: PathBuf,

        /// Encoder settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AnimCommands {
    /// Evaluate an animation at one frame and print the transform as JSON
    Eval {
        /// Animation list (JSON)
        #[arg(short, long)]
        source: PathBuf,

        /// Animation to evaluate
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Query frame
        #[arg(short, long, allow_negative_numbers = true)]
        frame: f32,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Pmo { command } => command.execute(),
            Commands::Anim { command } => command.execute(),
        }
    }
}

impl PmoCommands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            PmoCommands::Convert {
                source,
                destination,
                config,
                adaptive,
            } => pmo::convert(source, destination, config.as_deref(), *adaptive),
            PmoCommands::Inspect { source, config } => pmo::inspect(source, config.as_deref()),
            PmoCommands::Batch {
                source,
                destination,
                config,
            } => pmo::batch(source, destination, config.as_deref()),
        }
    }
}

impl AnimCommands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            AnimCommands::Eval {
                source,
                index,
                frame,
            } => anim::eval(source, *index, *frame),
        }
    }
}
