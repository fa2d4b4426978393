use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use harvester_core::{render_discoveries, DiscoveryBook};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {dir:?} is unusable: {reason}")]
    OutputDir { dir: PathBuf, reason: String },
    #[error("output path {0:?} does not name a file")]
    InvalidPath(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes harvested entries to a single text file, replacing earlier output.
///
/// The whole file is rendered up front and moved into place with one rename, so a
/// failed save leaves any previous output untouched.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, discoveries: &DiscoveryBook) -> Result<PathBuf, PersistError> {
        if self.path.file_name().is_none() {
            return Err(PersistError::InvalidPath(self.path.clone()));
        }
        let dir = self.output_dir();
        prepare_dir(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(render_discoveries(discoveries).as_bytes())?;
        staged.flush()?;
        staged.as_file_mut().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(self.path.clone())
    }

    fn output_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::OutputDir {
        dir: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable("not a directory".into())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))
        }
        Err(err) => Err(unusable(err.to_string())),
    }
}
