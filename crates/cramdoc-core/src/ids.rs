// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block identifier sources
//!
//! Every conversion stage that creates a node needing an id takes an
//! [`IdGenerator`], so tests and storage can pick deterministic ids while the
//! editor uses random ones.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh block identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random ids of the form `block-<uuid>`
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        format!("block-{}", Uuid::new_v4().simple())
    }
}

/// Deterministic ids `block-1`, `block-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("block-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "block-1");
        assert_eq!(ids.next_id(), "block-2");
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let a = UuidIds.next_id();
        let b = UuidIds.next_id();
        assert!(a.starts_with("block-"));
        assert_ne!(a, b);
    }
}
