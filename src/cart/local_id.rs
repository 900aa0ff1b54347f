//! Local cart item ids

use std::sync::atomic::{AtomicI64, Ordering};

use jiff::Timestamp;

use crate::cart::CartItemId;

/// Issues ids for cart items created while the session is anonymous.
///
/// Ids are the current time in milliseconds, bumped past the last issued id
/// whenever the clock has not moved on, so they never repeat in one process.
#[derive(Debug, Default)]
pub struct LocalIdGenerator {
    last: AtomicI64,
}

impl LocalIdGenerator {
    /// Create a generator that has issued nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that will only issue ids above `floor`.
    ///
    /// Used when resuming from a stored cart so that new ids cannot collide
    /// with ones persisted by an earlier session on a skewed clock.
    pub fn starting_after(floor: CartItemId) -> Self {
        Self {
            last: AtomicI64::new(floor.get()),
        }
    }

    /// Issue the next id.
    pub fn next_id(&self) -> CartItemId {
        let now = Timestamp::now().as_millisecond();

        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);

        CartItemId::new(now.max(previous.saturating_add(1)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique_in_a_tight_loop() {
        let generator = LocalIdGenerator::new();

        let ids: HashSet<_> = (0..1_000).map(|_| generator.next_id()).collect();

        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let generator = LocalIdGenerator::new();

        let first = generator.next_id();
        let second = generator.next_id();

        assert!(second > first, "{second} should be greater than {first}");
    }

    #[test]
    fn resumed_generator_skips_past_floor() {
        let floor = CartItemId::new(i64::MAX / 2);
        let generator = LocalIdGenerator::starting_after(floor);

        assert_eq!(generator.next_id(), CartItemId::new(i64::MAX / 2 + 1));
    }
}
