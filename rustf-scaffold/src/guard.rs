//! Overwrite protection for generated artifacts

use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct ArtifactGuard;

impl ArtifactGuard {
    /// Writing is allowed when overriding, or when neither artifact exists yet
    pub fn may_write(view_exists: bool, controller_exists: bool, allow_overwrite: bool) -> bool {
        allow_overwrite || !(view_exists || controller_exists)
    }
}

/// Per-path async locks serializing Produce requests with overlapping targets.
///
/// The existence check and the writes must happen while the returned guards
/// are held.
#[derive(Default, Clone)]
pub struct TargetLocks {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

/// Guards for every locked target, released on drop.
///
/// Map entries nobody else holds or waits on are removed on release.
pub struct TargetGuard {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
    held: Vec<(PathBuf, OwnedMutexGuard<()>)>,
}

impl TargetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock all `paths`, in sorted order so overlapping requests cannot deadlock
    pub async fn acquire(&self, paths: &[&Path]) -> TargetGuard {
        let mut keys: Vec<PathBuf> = paths.iter().map(|p| normalize(p)).collect();
        keys.sort();
        keys.dedup();

        let mut guard = TargetGuard {
            locks: self.locks.clone(),
            held: Vec::with_capacity(keys.len()),
        };
        for key in keys {
            let lock = self
                .locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            guard.held.push((key, lock.lock_owned().await));
        }

        guard
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        for (key, held) in self.held.drain(..) {
            drop(held);
            // The map holds the only reference once no request holds or awaits it
            self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

/// Lexical normalization: absolute, `.` dropped, `..` folded
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
