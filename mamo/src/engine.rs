//! Target management behind the game shell.
//!
//! The shell talks to any [`TargetEngine`]; [`Field`] is the built-in one. All
//! positions are normalised: the origin is the screen centre, y points up and
//! one unit is the shorter screen side.

use rand::{rngs::SmallRng, Rng, SeedableRng};

pub trait TargetEngine {
    /// Destroys whatever sits under `(x, y)` and returns the points earned.
    fn judge_target(&mut self, x: f32, y: f32) -> u32;
    /// Clears the field; returns the points earned.
    fn throw_bomb(&mut self) -> u32;
    fn new_target(&mut self);
    /// Frames between automatic spawns.
    fn set_interval(&mut self, frames: u32);
    fn set_tricks(&mut self, fast: bool, tiny: bool, swarm: bool);
}

/// Per-day engine tuning, derived from the local day of the year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayTuning {
    pub interval: u32,
    pub fast: bool,
    pub tiny: bool,
    pub swarm: bool,
}

impl DayTuning {
    pub fn for_day(day_of_year: u32) -> Self {
        let interval = if day_of_year == 16 {
            8
        } else {
            (i64::from(day_of_year % 21) - 10).unsigned_abs() as u32 + 50
        };
        Self {
            interval,
            fast: day_of_year % 67 == 33,
            tiny: day_of_year % 31 == 11,
            swarm: day_of_year % 37 == 22,
        }
    }

    pub fn apply(&self, engine: &mut dyn TargetEngine) {
        engine.set_interval(self.interval);
        engine.set_tricks(self.fast, self.tiny, self.swarm);
    }
}

pub const FRAME_HZ: f32 = 60.0;
const MAX_TARGETS: usize = 24;
const BASE_RADIUS: f32 = 0.06;
const BASE_SPEED: f32 = 0.12; // units per second
const SPAWN_EXTENT: f32 = 0.42;
const FIELD_EDGE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub age: u32,
}

impl Target {
    pub fn covers(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

pub struct Field {
    targets: Vec<Target>,
    rng: SmallRng,
    interval: u32,
    frame: u32,
    fast: bool,
    tiny: bool,
    swarm: bool,
}

impl Field {
    pub fn new(seed: u64) -> Self {
        Self {
            targets: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            interval: 60,
            frame: 0,
            fast: false,
            tiny: false,
            swarm: false,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Places a target at a fixed spot; mostly for scripted setups.
    pub fn place(&mut self, x: f32, y: f32) {
        if self.targets.len() < MAX_TARGETS {
            let radius = self.radius();
            self.targets.push(Target {
                x,
                y,
                vx: 0.0,
                vy: 0.0,
                radius,
                age: 0,
            });
        }
    }

    /// One fixed 1/60 s frame: spawn on schedule, then drift and bounce.
    pub fn step(&mut self) {
        self.frame += 1;
        if self.frame >= self.interval {
            self.frame = 0;
            self.spawn();
            if self.swarm {
                self.spawn();
            }
        }

        for t in &mut self.targets {
            t.age = t.age.saturating_add(1);
            t.x += t.vx / FRAME_HZ;
            t.y += t.vy / FRAME_HZ;
            let lim = FIELD_EDGE - t.radius;
            if t.x.abs() > lim {
                t.x = t.x.clamp(-lim, lim);
                t.vx = -t.vx;
            }
            if t.y.abs() > lim {
                t.y = t.y.clamp(-lim, lim);
                t.vy = -t.vy;
            }
        }
    }

    fn radius(&self) -> f32 {
        if self.tiny {
            BASE_RADIUS * 0.5
        } else {
            BASE_RADIUS
        }
    }

    fn spawn(&mut self) {
        if self.targets.len() >= MAX_TARGETS {
            return;
        }
        let speed = if self.fast { BASE_SPEED * 2.5 } else { BASE_SPEED };
        let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let x = self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT);
        let y = self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT);
        let radius = self.radius();
        self.targets.push(Target {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            radius,
            age: 0,
        });
    }
}

impl TargetEngine for Field {
    fn judge_target(&mut self, x: f32, y: f32) -> u32 {
        let before = self.targets.len();
        self.targets.retain(|t| !t.covers(x, y));
        u32::try_from(before - self.targets.len()).unwrap_or(u32::MAX)
    }

    fn throw_bomb(&mut self) -> u32 {
        let n = self.targets.len();
        self.targets.clear();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    fn new_target(&mut self) {
        self.spawn();
    }

    fn set_interval(&mut self, frames: u32) {
        self.interval = frames.max(1);
    }

    fn set_tricks(&mut self, fast: bool, tiny: bool, swarm: bool) {
        self.fast = fast;
        self.tiny = tiny;
        self.swarm = swarm;
    }
}
