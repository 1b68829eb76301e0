//! # Pose persistence
//!
//! Stores the robot pose between runs so that a later program can carry on from where the last
//! one finished.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use log::debug;
use thiserror::Error;

// Internal
use crate::pose::Pose2D;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A keyed store of poses.
pub trait PoseStore {
    fn save(&mut self, key: &str, pose: Pose2D) -> Result<(), PersistError>;

    /// The pose saved under `key`, if there is one.
    fn load(&self, key: &str) -> Option<Pose2D>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// In memory store, lost when the program exits.
#[derive(Debug, Default, Clone)]
pub struct MemPoseStore {
    poses: HashMap<String, Pose2D>,
}

/// Store backed by a JSON file mapping keys to poses.
#[derive(Debug, Clone)]
pub struct JsonPoseStore {
    path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Could not access the pose file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialise the poses: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseStore for MemPoseStore {
    fn save(&mut self, key: &str, pose: Pose2D) -> Result<(), PersistError> {
        self.poses.insert(key.to_string(), pose);
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Pose2D> {
        self.poses.get(key).copied()
    }
}

impl JsonPoseStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, Pose2D>, PersistError> {
        let s = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&s)?)
    }
}

impl PoseStore for JsonPoseStore {
    fn save(&mut self, key: &str, pose: Pose2D) -> Result<(), PersistError> {
        // A missing or corrupt file is replaced
        let mut poses = self.read_all().unwrap_or_default();
        poses.insert(key.to_string(), pose);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&poses)?)?;

        debug!("Wrote {} pose(s) to {:?}", poses.len(), self.path);

        Ok(())
    }

    fn load(&self, key: &str) -> Option<Pose2D> {
        match self.read_all() {
            Ok(mut poses) => poses.remove(key),
            Err(e) => {
                debug!("No poses loaded from {:?}: {}", self.path, e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
