//! Per-note mutual exclusion.
//!
//! Creating, appending to and deleting a note are each a read-decide-write
//! sequence. [`NoteLocks`] hands out one mutex per note path so that two such
//! sequences on the same note never interleave, while different notes proceed
//! independently.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use daynote_journal::locks::NoteLocks;
//!
//! let locks = NoteLocks::new();
//! let len = locks.with_note(Path::new("/ll/2024/01/2024-01-02.md"), || 42);
//! assert_eq!(len, 42);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

/// Registry of per-path locks.
///
/// Cloning is cheap and clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct NoteLocks {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl NoteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `path`.
    ///
    /// A lock poisoned by a panicking holder is recovered; the file system,
    /// not the mutex, holds the state it protects.
    pub fn with_note<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        trace!(path = %path.display(), "Acquired note lock");
        f()
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut registry = self.registry();
        // Entries only referenced by the registry have no holder or waiter.
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(registry.entry(path.to_path_buf()).or_default())
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_path_is_serialized() {
        let locks = NoteLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));
        let path = PathBuf::from("/ll/2024/01/2024-01-02.md");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                let path = path.clone();
                thread::spawn(move || {
                    locks.with_note(&path, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_paths_do_not_block_each_other() {
        let locks = NoteLocks::new();
        let a = PathBuf::from("/ll/a.md");
        let b = PathBuf::from("/ll/b.md");

        let value = locks.with_note(&a, || locks.with_note(&b, || 7));
        assert_eq!(value, 7);
    }

    #[test]
    fn idle_entries_are_pruned() {
        let locks = NoteLocks::new();
        locks.with_note(Path::new("/ll/a.md"), || ());
        locks.with_note(Path::new("/ll/b.md"), || ());
        assert_eq!(locks.registry().len(), 1);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let locks = NoteLocks::new();
        let path = PathBuf::from("/ll/a.md");

        let cloned = locks.clone();
        let p = path.clone();
        let _ = thread::spawn(move || cloned.with_note(&p, || panic!("holder panicked"))).join();

        assert_eq!(locks.with_note(&path, || 1), 1);
    }
}
