//! # Latest Value Cell
//!
//! A shared slot holding the most recent value received by a background listener. Readers take
//! a snapshot of the value and work on their own copy outside the lock.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Last-value cell shared between a listener thread and its reader.
///
/// Cloning the cell gives another handle onto the same slot.
#[derive(Debug)]
pub struct LatestValue<T> {
    inner: Arc<Mutex<Option<T>>>
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> LatestValue<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None))
        }
    }

    /// Replace the value in the cell.
    pub fn set(&self, value: T) {
        *self.lock() = Some(value);
    }

    /// A writer panicking half way through a set leaves a valid `Option` behind, so poisoning is
    /// ignored.
    fn lock(&self) -> MutexGuard<Option<T>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner()
        }
    }
}

impl<T: Clone> LatestValue<T> {
    /// Get a copy of the most recent value, if any has been received.
    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }
}

impl<T> Clone for LatestValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone()
        }
    }
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_latest_value() {
        let cell = LatestValue::<i32>::new();
        assert_eq!(cell.get(), None);

        let writer = cell.clone();
        thread::spawn(move || {
            for i in 0..10 {
                writer.set(i);
            }
        }).join().unwrap();

        // Reading does not consume the value
        assert_eq!(cell.get(), Some(9));
        assert_eq!(cell.get(), Some(9));
    }
}
