use std::path::PathBuf;

/// Failures while gathering the About panel. None of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum AboutError {
    #[error("package version is not available")]
    MissingVersion,

    #[error("reading license {path}: {source}")]
    License {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
