//! Per-kind identifier allocation
//!
//! Counters start at 1 and only move forward. Deleting a record never
//! frees its identifier.

use super::models::{EntityKind, RecordId};

#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_member: RecordId,
    next_song: RecordId,
    next_scale: RecordId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_member: 1,
            next_song: 1,
            next_scale: 1,
        }
    }

    /// Hand out the next identifier for `kind`
    pub fn next(&mut self, kind: EntityKind) -> RecordId {
        let counter = match kind {
            EntityKind::Member => &mut self.next_member,
            EntityKind::Song => &mut self.next_song,
            EntityKind::Scale => &mut self.next_scale,
        };
        let id = *counter;
        *counter += 1;
        id
    }

    /// Identifier the next call to [`IdAllocator::next`] would return
    pub fn peek(&self, kind: EntityKind) -> RecordId {
        match kind {
            EntityKind::Member => self.next_member,
            EntityKind::Song => self.next_song,
            EntityKind::Scale => self.next_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(EntityKind::Member), 1);
        assert_eq!(ids.next(EntityKind::Song), 1);
        assert_eq!(ids.next(EntityKind::Scale), 1);
    }

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdAllocator::new();
        for _ in 0..3 {
            ids.next(EntityKind::Member);
        }

        assert_eq!(ids.next(EntityKind::Song), 1);
        assert_eq!(ids.next(EntityKind::Member), 4);
    }

    #[test]
    fn test_strictly_increasing() {
        let mut ids = IdAllocator::new();
        let mut last = 0;
        for _ in 0..100 {
            let id = ids.next(EntityKind::Scale);
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.peek(EntityKind::Song), 1);
        assert_eq!(ids.peek(EntityKind::Song), 1);
        assert_eq!(ids.next(EntityKind::Song), 1);
        assert_eq!(ids.peek(EntityKind::Song), 2);
    }
}
