//! In-memory registry of connected clients.
//!
//! Lock order, strictly increasing on every code path:
//! 1. [`LiveGroup`] membership lock
//! 2. [`SessionRegistry`] map lock
//! 3. [`GroupRegistry`] map lock
//! 4. [`Session`] field mutex
//!
//! A path may take a later lock while holding an earlier one, never the reverse.

use log::warn;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod aggregator;
pub mod live_group;
pub mod raid_tracker;
pub mod session;
pub mod sweeper;

pub use live_group::{GroupRegistry, LiveGroup};
pub use raid_tracker::{RaidTracker, TokenSource};
pub use session::{Session, SessionRegistry};
pub use sweeper::{SweepReport, Sweeper};

// Guarded data is plain values that stay consistent if a holder panicked,
// so poisoned locks are recovered instead of propagated.

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned registry lock");
        poisoned.into_inner()
    })
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned registry lock");
        poisoned.into_inner()
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned session lock");
        poisoned.into_inner()
    })
}
