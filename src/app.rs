use crate::aquarium::Aquarium;
use crate::config::{load_settings, project_paths, save_settings_atomic, Args, Paths, Settings};
use crate::input::{collect_events, map_event};
use crate::logging;
use crate::render::Terminal;
use crate::view::AquariumView;
use anyhow::Context;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

// Longest step fed to the simulation, e.g. after the process was suspended.
const DT_CLAMP: f64 = 0.25;

struct App {
    /// Settings as stored on disk, without command-line overrides.
    stored: Settings,
    settings: Settings,
    paths: Paths,
    view: AquariumView,
    term: Terminal,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let stored = load_settings(&paths.settings_path);
        let mut settings = stored.clone();
        settings.apply_args(args);

        let log_path = args.log_file.clone().unwrap_or_else(|| paths.log_path.clone());
        logging::init(&log_path)?;

        let seed = if settings.seed == 0 {
            clock_seed()
        } else {
            settings.seed
        };
        info!(
            seed,
            width = settings.tank_width,
            height = settings.tank_height,
            frame_ms = settings.frame_ms,
            "starting aquarium"
        );

        let aquarium = Aquarium::new(
            settings.tank_width as f64,
            settings.tank_height as f64,
            seed,
        );
        let mut view = AquariumView::new(aquarium);
        if let Some(file) = stored.startup_file(args) {
            view.open(&file);
        }

        let term = Terminal::begin(settings.enable_color).context("setting up the terminal")?;

        Ok(Self {
            stored,
            settings,
            paths,
            view,
            term,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame = Duration::from_millis(self.settings.frame_ms);
        let mut last_frame = Instant::now();

        while !self.view.should_quit() {
            self.term.resize_if_needed()?;

            // input until the next frame is due
            let events = collect_events(last_frame + frame)?;
            for ev in events {
                if let Some(action) = map_event(self.view.mode(), &ev) {
                    self.view.apply(action, Instant::now());
                }
                if self.view.should_quit() {
                    break;
                }
            }

            let now = Instant::now();
            let elapsed = now
                .saturating_duration_since(last_frame)
                .as_secs_f64()
                .min(DT_CLAMP);
            last_frame = now;

            self.view.tick(elapsed);
            self.render_frame()?;
        }

        self.term.end()?;

        self.stored.last_file = self.view.current_file().map(|p| p.to_path_buf());
        if let Err(e) = save_settings_atomic(&self.paths.settings_path, &self.stored) {
            warn!(error = %e, "could not save settings");
        }
        info!("bye");
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        self.term.cur.clear(crossterm::style::Color::Black);
        self.view.draw(&mut self.term.cur);
        self.term.present(true)?;
        Ok(())
    }
}

fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ 0xA11CE_u64
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut app = App::init(&args)?;
    app.run()?;
    Ok(())
}
