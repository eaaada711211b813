//! Contents of the About panel.

use crate::error::AboutError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// License text shipped inside the binary.
pub const BUILTIN_LICENSE: &str = include_str!("../LICENSE");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct About {
    pub version: Option<String>,
    pub license: String,
}

impl About {
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        match &self.version {
            Some(v) => out.push(format!("Mamo version {v}")),
            None => out.push("Mamo".to_string()),
        }
        out.push(String::new());
        out.extend(self.license.lines().map(str::to_string));
        out
    }
}

/// Collects what it can. A missing version is logged and left out; an
/// unreadable license override is logged and the built-in text shown instead.
pub fn gather(version: Option<&str>, license_override: Option<&Path>) -> About {
    let version = match version.filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            log::warn!("about: {}", AboutError::MissingVersion);
            None
        }
    };
    let license = match license_override.map(read_license) {
        None => BUILTIN_LICENSE.to_string(),
        Some(Ok(text)) => text,
        Some(Err(e)) => {
            log::warn!("about: {e}; showing the built-in license");
            BUILTIN_LICENSE.to_string()
        }
    };
    About { version, license }
}

fn read_license(path: &Path) -> Result<String, AboutError> {
    let wrap = |source| AboutError::License {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(wrap)?);
    let mut buf = String::new();
    for line in reader.lines() {
        buf.push_str(&line.map_err(wrap)?);
        buf.push('\n');
    }
    Ok(buf)
}
