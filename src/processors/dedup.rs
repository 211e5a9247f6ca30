use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Run-scoped set of station ids already selected for persistence.
///
/// Owned by the orchestrator instance and shared by reference with its
/// batch workers; never persisted across runs. A poisoned lock is recovered
/// by taking the inner set: a panic in another worker cannot corrupt a
/// `HashSet` of owned strings.
pub struct StationDeduplicator {
    seen: Mutex<HashSet<String>>,
}

impl StationDeduplicator {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Atomic check-and-mark: returns true if the id was newly marked,
    /// false if it had already been seen.
    pub fn mark_seen(&self, id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StationDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_mark_seen_is_check_and_mark() {
        let dedup = StationDeduplicator::new();

        assert!(!dedup.is_seen("03772099999"));
        assert!(dedup.mark_seen("03772099999"));
        assert!(dedup.is_seen("03772099999"));
        assert!(!dedup.mark_seen("03772099999"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_concurrent_marking_yields_one_winner_per_id() {
        let dedup = Arc::new(StationDeduplicator::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let dedup = Arc::clone(&dedup);
            handles.push(thread::spawn(move || {
                let mut wins = 0usize;
                for id in 0..100 {
                    if dedup.mark_seen(&format!("station-{id}")) {
                        wins += 1;
                    }
                }
                wins
            }));
        }

        let total_wins: usize = handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .sum();

        assert_eq!(total_wins, 100);
        assert_eq!(dedup.len(), 100);
    }
}
