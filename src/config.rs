use std::path::{Path, PathBuf};

use clap::Parser;

use crate::looper::{LoopSettings, clamp_bpm};
use crate::packs::PackKind;
use crate::shared::DEFAULT_BPM;

/// A 12-pad loop sequencer for the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "soundgrid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project directory (layers, saved packs and the log live in <dir>/.soundgrid)
    pub project_dir: Option<PathBuf>,

    /// Tempo, clamped to 60-200
    #[arg(long, default_value_t = DEFAULT_BPM)]
    pub bpm: u32,

    /// Pack to start on
    #[arg(long, value_enum, default_value_t = PackKind::DrumMachine)]
    pub pack: PackKind,

    /// Name the custom pack is saved under
    #[arg(long)]
    pub pack_name: Option<String>,

    /// Where the sample pack's WAVs are (default: <project>/samples)
    #[arg(long)]
    pub samples_dir: Option<PathBuf>,

    /// WAVs here are loaded onto the custom pack's pads in order (default: <project>/uploads)
    #[arg(long)]
    pub uploads_dir: Option<PathBuf>,
}

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project_dir: PathBuf,
    pub samples_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub pack: PackKind,
    pub pack_name: Option<String>,
    pub bpm: u32,
}

impl AppConfig {
    pub fn from_cli(cli: Cli, cwd: &Path) -> Self {
        let project_dir = cli.project_dir.unwrap_or_else(|| cwd.to_path_buf());
        Self {
            samples_dir: cli.samples_dir.unwrap_or_else(|| project_dir.join("samples")),
            uploads_dir: cli.uploads_dir.unwrap_or_else(|| project_dir.join("uploads")),
            pack: cli.pack,
            pack_name: cli.pack_name,
            bpm: clamp_bpm(cli.bpm),
            project_dir,
        }
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings::with_bpm(self.bpm)
    }
}
