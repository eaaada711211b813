use crate::config::atomic_rename;
use crate::error::{Result, SheetError};
use crate::model::SheetData;
use std::{fs, io, path::Path};

/// Reads a sheet from disk. A missing file is `Ok(None)`; a file that exists
/// but does not parse or validate is an error, so it never gets overwritten.
pub fn load_sheet(path: &Path) -> Result<Option<SheetData>> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let sheet: SheetData = serde_json::from_str(&s).map_err(|source| SheetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    sheet.validate()?;
    Ok(Some(sheet))
}

pub fn save_atomic(path: &Path, sheet: &SheetData) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(sheet)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}
