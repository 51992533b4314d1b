use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the guard if a panicking callback poisoned it.
///
/// Stage state is only mutated between lock sections, so a poisoned lock still
/// holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Takes the value out of a once-only slot.
pub(crate) fn take_once<T>(slot: &Mutex<Option<T>>) -> Option<T> { lock(slot).take() }
