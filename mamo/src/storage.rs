use crate::config::atomic_rename;
use crate::session::Session;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub(crate) const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub session: Session,
}

/// Session as last written at suspension; a fresh one if nothing usable is on disk.
pub fn load_or_init_session(path: &Path) -> Session {
    let Ok(s) = fs::read_to_string(path) else {
        return Session::default();
    };
    match serde_json::from_str::<SaveFile>(&s) {
        Ok(save) => save.session,
        Err(e) => {
            log::warn!("discarding unreadable save {}: {e}", path.display());
            Session::default()
        }
    }
}

pub fn save_atomic(path: &Path, session: &Session) -> Result<()> {
    let save = SaveFile {
        version: SAVE_VERSION,
        session: session.clone(),
    };
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(&save)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn session_round_trips_and_garbage_resets() {
        let dir = std::env::temp_dir().join(format!("mamo-save-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");

        assert_eq!(load_or_init_session(&path), Session::default());

        let s = Session {
            score: 1234,
            bombs: 2,
            sound: true,
            last_launch: NaiveDate::from_ymd_opt(2024, 5, 6)
                .and_then(|d| d.and_hms_opt(7, 8, 9)),
        };
        save_atomic(&path, &s).unwrap();
        assert_eq!(load_or_init_session(&path), s);

        fs::write(&path, "{\"version\": 1}").unwrap();
        assert_eq!(load_or_init_session(&path), Session::default());
        fs::remove_dir_all(&dir).ok();
    }
}
