//! Bulkhead: a cap on concurrently in-flight calls.
//!
//! # Responsibilities
//! - Track in-flight calls for one circuit
//! - Refuse admission once `capacity` calls are running
//! - Release the slot when the permit is dropped, however the call ends

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct Bulkhead {
    capacity: usize,
    in_flight: AtomicUsize,
}

impl Bulkhead {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Calls currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim a slot, or `None` if the bulkhead is full.
    pub fn try_acquire(self: &Arc<Self>) -> Option<BulkheadPermit> {
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        Some(BulkheadPermit {
            bulkhead: self.clone(),
        })
    }
}

/// A RAII guard holding one bulkhead slot.
#[derive(Debug)]
pub struct BulkheadPermit {
    bulkhead: Arc<Bulkhead>,
}

impl Drop for BulkheadPermit {
    fn drop(&mut self) {
        self.bulkhead.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_enforced() {
        let bulkhead = Arc::new(Bulkhead::new(2));
        let first = bulkhead.try_acquire().expect("first slot");
        let _second = bulkhead.try_acquire().expect("second slot");
        assert!(bulkhead.try_acquire().is_none());
        assert_eq!(bulkhead.in_flight(), 2);

        drop(first);
        assert_eq!(bulkhead.in_flight(), 1);
        assert!(bulkhead.try_acquire().is_some());
    }

    #[test]
    fn test_concurrent_acquire_never_oversubscribes() {
        let bulkhead = Arc::new(Bulkhead::new(8));
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let bulkhead = bulkhead.clone();
                std::thread::spawn(move || bulkhead.try_acquire())
            })
            .collect();

        let permits: Vec<_> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(permits.len(), 8);
        assert_eq!(bulkhead.in_flight(), 8);
        drop(permits);
        assert_eq!(bulkhead.in_flight(), 0);
    }
}
