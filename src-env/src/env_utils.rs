//! Where generation logs are written, and whether runs are timed.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{METRIC_EVOLVE_DIR, METRIC_EVOLVE_TIMING, RECORDS_SUBDIR};

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("METRIC_EVOLVE_DIR is not set; set it or pass an explicit directory for generation logs")]
    ProjectDirNotSet,

    #[error("METRIC_EVOLVE_DIR is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot create records directory {path}: {source}")]
    RecordsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<root>/data_generated/records`, created on demand
pub fn records_dir_under(root: &Path) -> Result<PathBuf, EnvError> {
    if !root.is_dir() {
        return Err(EnvError::NotADirectory(root.to_path_buf()));
    }
    let dir = RECORDS_SUBDIR.iter().fold(root.to_path_buf(), |p, part| p.join(part));
    std::fs::create_dir_all(&dir).map_err(|source| EnvError::RecordsDir { path: dir.clone(), source })?;
    Ok(dir)
}

/// Records directory under `METRIC_EVOLVE_DIR`
///
/// ```no_run
/// let dir = metric_evolve_env::records_dir()?;
/// println!("generation logs go to {}", dir.display());
/// # Ok::<(), metric_evolve_env::EnvError>(())
/// ```
pub fn records_dir() -> Result<PathBuf, EnvError> {
    let root = env::var_os(METRIC_EVOLVE_DIR).ok_or(EnvError::ProjectDirNotSet)?;
    records_dir_under(Path::new(&root))
}

pub fn timing_enabled() -> bool {
    env::var(METRIC_EVOLVE_TIMING).map(|v| v != "0").unwrap_or(false)
}
