use crate::about::{gather, About};
use crate::config::{
    init_logging, load_settings, project_paths, save_settings_atomic, Paths, Settings,
};
use crate::engine::{Field, TargetEngine, FRAME_HZ};
use crate::input::{
    collect_input_nonblocking, map_event_to_action, GameAction, Scene, SHAKE_SAMPLE,
};
use crate::render::{draw_center_box, draw_hud, draw_targets, HudState, Surface, Terminal};
use crate::shell::{BombIndicator, GameShell, ShellView, Sound};
use crate::storage::{load_or_init_session, save_atomic};
use clap::Parser;
use crossterm::style::Color;
use std::path::Path;
use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Parser, Debug, Clone)]
#[command(name = "mamo")]
#[command(about = "Tap the targets before they pile up", long_about = None)]
pub struct Args {
    /// Start without HUD or menu
    #[arg(long, default_value_t = false)]
    pub simple: bool,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    pub mono: bool,

    /// RNG seed for target placement
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Indicator state the shell pushes into; the renderer reads it back.
#[derive(Debug)]
pub struct Hud {
    pub score: u64,
    pub bombs: BombIndicator,
    pub sound: bool,
    notice: Option<(String, Instant)>,
    bells: u32,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score: 0,
            bombs: BombIndicator::new(0),
            sound: false,
            notice: None,
            bells: 0,
        }
    }
}

impl Hud {
    pub fn notice(&self, now: Instant) -> Option<&str> {
        match &self.notice {
            Some((msg, until)) if now < *until => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Sounds queued since the last call.
    pub fn take_bells(&mut self) -> u32 {
        std::mem::take(&mut self.bells)
    }
}

impl ShellView for Hud {
    fn show_score(&mut self, score: u64) {
        self.score = score;
    }

    fn show_bombs(&mut self, bombs: u32) {
        self.bombs = BombIndicator::new(bombs);
    }

    fn show_sound(&mut self, on: bool) {
        self.sound = on;
    }

    fn notify(&mut self, msg: &str) {
        self.notice = Some((msg.to_string(), Instant::now() + NOTICE_TTL));
    }

    fn play(&mut self, sound: Sound) {
        log::debug!("play {sound:?}");
        self.bells += 1;
    }
}

pub struct App {
    settings: Settings,
    paths: Paths,
    shell: GameShell<Field>,
    hud: Hud,
    about: About,
    scene: Scene,
    simple: bool,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(args: Args) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_logging(&paths.log_path)?;
        let mut settings = load_settings(&paths.settings_path);
        if args.mono {
            settings.enable_color = false;
        }
        let seed = args.seed.unwrap_or(settings.seed);

        let session = load_or_init_session(&paths.save_path);
        log::info!(
            "launch: score {} bombs {} sound {}",
            session.score,
            session.bombs,
            session.sound
        );
        let mut shell = GameShell::new(session, Field::new(seed), seed.rotate_left(17));
        let mut hud = Hud::default();
        shell.start(chrono::Local::now().naive_local(), &mut hud);

        let about = gather(
            option_env!("CARGO_PKG_VERSION"),
            settings.license_path.as_deref(),
        );

        let term = Terminal::begin()?;
        Ok(Self {
            settings,
            paths,
            shell,
            hud,
            about,
            scene: Scene::Play,
            simple: args.simple,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let result = self.run_loop();
        if let Err(e) = &result {
            log::error!("main loop failed: {e:#}");
        }
        let ended = self.term.end();

        // the session is written whether or not the loop failed
        let saved = suspend_to(&self.paths.save_path, &self.shell)
            .and_then(|()| save_settings_atomic(&self.paths.settings_path, &self.settings));
        result.and(ended).and(saved)
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_secs_f32(1.0 / FRAME_HZ);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(self.scene, self.simple, &ev) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            // targets keep moving behind the About panel
            let now = Instant::now();
            sim_accum = sim_accum.saturating_add(now.saturating_duration_since(last_frame));
            last_frame = now;
            while sim_accum >= sim_step {
                self.shell.engine_mut().step();
                sim_accum = sim_accum.saturating_sub(sim_step);
            }

            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }
        Ok(())
    }

    fn surface(&self) -> Surface {
        Surface::compute(self.term.cols, self.term.rows, self.simple)
    }

    fn apply(&mut self, action: GameAction) {
        match action {
            GameAction::Tap { col, row } => {
                let surface = self.surface();
                tap_cell(&mut self.shell, &surface, col, row, &mut self.hud);
            }
            GameAction::Bomb => {
                let n = self.shell.bomb(&mut self.hud);
                log::debug!("bomb cleared {n}");
            }
            GameAction::ToggleSound => {
                self.shell.toggle_sound(&mut self.hud);
            }
            GameAction::Shake => {
                self.shell.shake(SHAKE_SAMPLE);
            }
            GameAction::About => self.scene = Scene::About,
            GameAction::SimpleMode => {
                log::info!("switching to simple mode");
                self.simple = true;
            }
            GameAction::Back => self.scene = Scene::Play,
            GameAction::Quit => self.should_quit = true,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let color = self.settings.enable_color;
        self.term.cur.clear(Color::Black);

        let surface = self.surface();
        draw_targets(&mut self.term.cur, &surface, self.shell.engine().targets(), color);

        let hud = HudState {
            score: self.hud.score,
            bombs: self.hud.bombs,
            sound: self.hud.sound,
            notice: self.hud.notice(Instant::now()),
            simple: self.simple,
        };
        draw_hud(&mut self.term.cur, &hud, color);

        if self.scene == Scene::About {
            let mut lines = self.about.lines();
            lines.push(String::new());
            lines.push("Press any key".to_string());
            draw_center_box(&mut self.term.cur, "About", &lines);
        }

        for _ in 0..self.hud.take_bells() {
            self.term.bell()?;
        }
        self.term.present()?;
        Ok(())
    }
}

/// Taps the terminal cell `(col, row)`; clicks outside the play surface are
/// ignored.
pub fn tap_cell<E: TargetEngine>(
    shell: &mut GameShell<E>,
    surface: &Surface,
    col: u16,
    row: u16,
    view: &mut dyn ShellView,
) -> u32 {
    let Some((px, py)) = surface.to_pixel(col, row) else {
        return 0;
    };
    let (w, h) = surface.size();
    shell.tap(px, py, w, h, view)
}

/// Persists the session snapshot taken at suspension.
pub fn suspend_to<E: TargetEngine>(path: &Path, shell: &GameShell<E>) -> anyhow::Result<()> {
    let session = shell.suspend();
    save_atomic(path, &session)?;
    log::info!("suspended: score {} bombs {}", session.score, session.bombs);
    Ok(())
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut app = App::init(args)?;
    app.run()
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
