use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub frame_ms: u64,
    pub tank_width: u32,
    pub tank_height: u32,
    pub enable_color: bool,
    /// 0 picks a seed from the clock at startup.
    pub seed: u64,
    pub last_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_ms: 30,
            tank_width: 1024,
            tank_height: 768,
            enable_color: true,
            seed: 0,
            last_file: None,
        }
    }
}

/// Terminal aquarium: add fish, drag them around, save and load `.aqua` scenes.
#[derive(Parser, Debug, Default)]
#[command(name = "aquaterm", version)]
pub struct Args {
    /// aquarium file to open at startup
    pub file: Option<PathBuf>,

    /// seed for the shared random generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// milliseconds between frames
    #[arg(long)]
    pub frame_ms: Option<u64>,

    /// tank width in pixels (one cell is 8 px wide)
    #[arg(long)]
    pub width: Option<u32>,

    /// tank height in pixels (one cell is 16 px tall)
    #[arg(long)]
    pub height: Option<u32>,

    /// draw without colors
    #[arg(long)]
    pub no_color: bool,

    /// write the log here instead of the data directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Command-line values win over the stored ones.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(ms) = args.frame_ms {
            self.frame_ms = ms;
        }
        if let Some(w) = args.width {
            self.tank_width = w;
        }
        if let Some(h) = args.height {
            self.tank_height = h;
        }
        if args.no_color {
            self.enable_color = false;
        }
        self.frame_ms = self.frame_ms.clamp(5, 1000);
        self.tank_width = self.tank_width.max(64);
        self.tank_height = self.tank_height.max(64);
    }

    /// The file named on the command line, else the scene open at the last
    /// exit if it is still there.
    pub fn startup_file(&self, args: &Args) -> Option<PathBuf> {
        args.file
            .clone()
            .or_else(|| self.last_file.clone().filter(|p| p.is_file()))
    }
}

pub struct Paths {
    pub settings_path: PathBuf,
    pub log_path: PathBuf,
}

pub fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "aquaterm", "Aquaterm")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("aquaterm.log"),
    })
}

pub fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Replaces `to` with `from` on the same filesystem.
pub fn atomic_rename(from: &Path, to: &Path) -> io::Result<()> {
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
}
