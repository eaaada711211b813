//! Game shell: routes player input to the target engine and keeps the
//! session and its on-screen indicators in step.
//!
//! Every method runs on the UI loop thread and completes before the next
//! input is handled; the view is updated synchronously after each change.

use crate::engine::{DayTuning, TargetEngine};
use crate::session::Session;
use chrono::{Datelike, NaiveDateTime};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Squared acceleration (m/s²)² above which a sample counts as a shake.
pub const SHAKE_THRESHOLD: f32 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sound {
    Bomb,
    Crash { variant: u8, pitch: f32 },
}

/// What the shell needs from its host screen.
pub trait ShellView {
    fn show_score(&mut self, score: u64);
    /// Bomb counter; the host derives button and hint state via [`BombIndicator`].
    fn show_bombs(&mut self, bombs: u32);
    fn show_sound(&mut self, on: bool);
    fn notify(&mut self, msg: &str);
    fn play(&mut self, sound: Sound);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BombIndicator {
    pub count: u32,
    pub button_enabled: bool,
    pub out_of_bombs_hint: bool,
}

impl BombIndicator {
    pub fn new(bombs: u32) -> Self {
        Self {
            count: bombs,
            button_enabled: bombs > 0,
            out_of_bombs_hint: bombs == 0,
        }
    }
}

pub struct GameShell<E> {
    session: Session,
    engine: E,
    rng: SmallRng,
}

impl<E: TargetEngine> GameShell<E> {
    pub fn new(session: Session, engine: E, seed: u64) -> Self {
        Self {
            session,
            engine,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Launch-time bookkeeping: daily bonus, day tuning, initial indicators.
    pub fn start(&mut self, now: NaiveDateTime, view: &mut dyn ShellView) -> DayTuning {
        let bonus = self.session.claim_daily_bonus(now);
        if bonus > 0 {
            log::info!("daily bonus: {bonus} bombs");
            view.notify(&format!("Obtained {bonus} bombs!"));
        }

        let tuning = DayTuning::for_day(now.ordinal());
        tuning.apply(&mut self.engine);
        log::debug!("day {} tuning {tuning:?}", now.ordinal());

        self.refresh(view);
        tuning
    }

    pub fn refresh(&self, view: &mut dyn ShellView) {
        view.show_score(self.session.score);
        view.show_bombs(self.session.bombs);
        view.show_sound(self.session.sound);
    }

    /// A pointer press at pixel `(px, py)` on a `width × height` surface.
    pub fn tap(
        &mut self,
        px: f32,
        py: f32,
        width: f32,
        height: f32,
        view: &mut dyn ShellView,
    ) -> u32 {
        let (x, y) = normalize(px, py, width, height);
        let count = self.engine.judge_target(x, y);
        if count > 0 {
            self.session.award_points(count);
            view.show_score(self.session.score);
            if self.session.sound {
                let variant = self.rng.gen_range(1..=4);
                let pitch = self.rng.gen_range(0.75..1.5);
                view.play(Sound::Crash { variant, pitch });
            }
        }
        count
    }

    /// Throws a bomb if one is left. The bomb is only spent when it scores.
    pub fn bomb(&mut self, view: &mut dyn ShellView) -> u32 {
        if self.session.bombs == 0 {
            return 0;
        }
        let count = self.engine.throw_bomb();
        if count > 0 {
            self.session.award_points(count);
            view.show_score(self.session.score);
            self.session.use_bomb();
            view.show_bombs(self.session.bombs);
            if self.session.sound {
                view.play(Sound::Bomb);
            }
        }
        count
    }

    pub fn toggle_sound(&mut self, view: &mut dyn ShellView) -> bool {
        let on = self.session.toggle_sound();
        view.show_sound(on);
        on
    }

    /// Accelerometer sample; a hard enough shake summons a new target.
    pub fn shake(&mut self, accel: [f32; 3]) -> bool {
        let r: f32 = accel.iter().map(|v| v * v).sum();
        if r > SHAKE_THRESHOLD {
            self.engine.new_target();
            true
        } else {
            false
        }
    }

    /// Snapshot for persistence when the game is suspended.
    pub fn suspend(&self) -> Session {
        self.session.clone()
    }
}

/// Pixel → engine coordinates: centre origin, y up, shorter side = 1.
pub fn normalize(px: f32, py: f32, width: f32, height: f32) -> (f32, f32) {
    let s = width.min(height).max(1.0);
    ((px - width / 2.0) / s, (height / 2.0 - py) / s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_centres_and_flips_y() {
        assert_eq!(normalize(50.0, 25.0, 100.0, 50.0), (0.0, 0.0));
        assert_eq!(normalize(100.0, 0.0, 100.0, 50.0), (1.0, 0.5));
        assert_eq!(normalize(25.0, 50.0, 100.0, 50.0), (-0.5, -0.5));
    }

    #[test]
    fn normalize_tolerates_empty_surface() {
        let (x, y) = normalize(0.0, 0.0, 0.0, 0.0);
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn bomb_indicator_tracks_zero() {
        assert_eq!(
            BombIndicator::new(0),
            BombIndicator {
                count: 0,
                button_enabled: false,
                out_of_bombs_hint: true
            }
        );
        assert!(BombIndicator::new(2).button_enabled);
    }
}
