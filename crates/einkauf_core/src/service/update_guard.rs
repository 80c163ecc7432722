//! Optional per-item single-writer discipline for read-modify-write updates.
//!
//! # Invariants
//! - When enabled, at most one guarded write (update or delete) per `ItemId`
//!   runs at a time.
//! - An id's entry exists only while a guarded write holds or waits on it.
//! - When disabled, `run` calls straight through.

use crate::model::item::ItemId;
use crate::repo::item_dao::{RepoError, RepoResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct UpdateGuard {
    enabled: bool,
    locks: Mutex<HashMap<ItemId, Arc<Mutex<()>>>>,
}

impl UpdateGuard {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Runs `op` while holding the lock for `id`.
    ///
    /// The id's entry is released once no other caller holds or waits on it.
    pub fn run<T>(&self, id: ItemId, op: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
        if !self.enabled {
            return op();
        }

        let lock = self.lock_for(id)?;
        let result = match lock.lock() {
            Ok(_held) => op(),
            Err(_) => Err(RepoError::LockPoisoned),
        };
        self.release(id, &lock);
        result
    }

    /// Number of ids that currently own a lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().map_or(0, |locks| locks.len())
    }

    fn lock_for(&self, id: ItemId) -> RepoResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| RepoError::LockPoisoned)?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    // Clones only happen under the map lock, so a count of two (map + caller)
    // means nobody else is queued on this id.
    fn release(&self, id: ItemId, lock: &Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        let idle = locks
            .get(&id)
            .is_some_and(|entry| Arc::ptr_eq(entry, lock) && Arc::strong_count(lock) == 2);
        if idle {
            locks.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateGuard;
    use crate::repo::item_dao::RepoError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn disabled_guard_tracks_nothing() {
        let guard = UpdateGuard::disabled();
        let value = guard.run(7, || Ok(42)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn entries_are_released_after_each_run() {
        let guard = UpdateGuard::new(true);
        guard.run(1, || Ok(())).unwrap();
        guard.run(2, || Ok(())).unwrap();
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn failed_runs_on_missing_ids_leave_no_entries() {
        let guard = UpdateGuard::new(true);
        for id in 0..1_000 {
            let err = guard
                .run(id, || Err::<(), _>(RepoError::NotFound(id)))
                .unwrap_err();
            assert!(matches!(err, RepoError::NotFound(found) if found == id));
        }
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn entry_is_kept_while_held_inside_run() {
        let guard = UpdateGuard::new(true);
        guard
            .run(4, || {
                assert_eq!(guard.tracked(), 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn enabled_guard_serializes_same_id() {
        let guard = Arc::new(UpdateGuard::new(true));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    guard
                        .run(5, || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_inside.fetch_max(now, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(5));
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(guard.tracked(), 0);
    }

    #[test]
    fn errors_from_guarded_op_propagate() {
        let guard = UpdateGuard::new(true);
        let err = guard
            .run(3, || Err::<(), _>(RepoError::NotFound(3)))
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(3)));
    }
}
