//! Persistent player bookkeeping: score, bombs, sound flag and launch time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOMBS: u32 = 10;
pub const DAILY_BONUS: u32 = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    pub bombs: u32,
    pub sound: bool,
    /// Local wall-clock time of the last launch; `None` before the first one.
    #[serde(default)]
    pub last_launch: Option<NaiveDateTime>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            score: 0,
            bombs: DEFAULT_BOMBS,
            sound: false,
            last_launch: None,
        }
    }
}

impl Session {
    pub fn award_points(&mut self, n: u32) {
        self.score = self.score.saturating_add(u64::from(n));
    }

    /// Spends one bomb. With none left this is a no-op returning `false`.
    pub fn use_bomb(&mut self) -> bool {
        if self.bombs == 0 {
            return false;
        }
        self.bombs -= 1;
        true
    }

    pub fn obtain_bombs(&mut self, n: u32) {
        self.bombs = self.bombs.saturating_add(n);
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound = !self.sound;
        self.sound
    }

    /// Grants the daily bonus if the previous launch happened before today's
    /// midnight, then records `now` as the latest launch. Returns the bombs added.
    pub fn claim_daily_bonus(&mut self, now: NaiveDateTime) -> u32 {
        let bonus = grant_daily_bonus(now, self.last_launch);
        self.obtain_bombs(bonus);
        self.last_launch = Some(now);
        bonus
    }
}

/// [`DAILY_BONUS`] when `last_launch` lies strictly before the midnight that
/// starts `today`'s calendar day, otherwise 0. A first launch earns nothing.
pub fn grant_daily_bonus(today: NaiveDateTime, last_launch: Option<NaiveDateTime>) -> u32 {
    let Some(midnight) = today.date().and_hms_opt(0, 0, 0) else {
        return 0;
    };
    match last_launch {
        Some(last) if last < midnight => DAILY_BONUS,
        _ => 0,
    }
}
