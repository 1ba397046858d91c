//! Inventory ledger tests
//!
//! Exercises a pure model of the ledger with the same semantics as the SQL:
//! entries upsert-add, exits deduct only when sufficient stock is on hand,
//! deletes reverse the original delta. The invariant under test is
//! quantity == sum(entries) - sum(exits) for every applied movement.

use std::collections::HashMap;

use proptest::prelude::*;

use shared::models::MovementType;

/// In-memory ledger mirroring the inventory table semantics
#[derive(Debug, Default)]
struct Ledger {
    levels: HashMap<u32, i32>,
    applied: Vec<(u32, MovementType, i32)>,
}

impl Ledger {
    /// Apply a movement; exits are rejected without changing state when
    /// stock is insufficient
    fn apply(&mut self, product: u32, movement_type: MovementType, quantity: i32) -> bool {
        assert!(quantity > 0);
        match movement_type {
            MovementType::Entry => {
                *self.levels.entry(product).or_insert(0) += quantity;
            }
            MovementType::Exit => {
                let level = self.levels.entry(product).or_insert(0);
                if *level < quantity {
                    return false;
                }
                *level -= quantity;
            }
        }
        self.applied.push((product, movement_type, quantity));
        true
    }

    /// Reverse a previously applied movement, as deleting it would
    fn reverse(&mut self, index: usize) {
        let (product, movement_type, quantity) = self.applied.remove(index);
        let delta = match movement_type {
            MovementType::Entry => -quantity,
            MovementType::Exit => quantity,
        };
        *self.levels.entry(product).or_insert(0) += delta;
    }

    fn quantity(&self, product: u32) -> i32 {
        self.levels.get(&product).copied().unwrap_or(0)
    }

    /// Recompute the level for a product from the applied movement log
    fn replayed_quantity(&self, product: u32) -> i32 {
        self.applied
            .iter()
            .filter(|(p, _, _)| *p == product)
            .map(|(_, t, q)| match t {
                MovementType::Entry => *q,
                MovementType::Exit => -*q,
            })
            .sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_entries_accumulate() {
        let mut ledger = Ledger::default();
        assert!(ledger.apply(1, MovementType::Entry, 50));
        assert!(ledger.apply(1, MovementType::Entry, 30));
        assert_eq!(ledger.quantity(1), 80);
    }

    #[test]
    fn test_exit_deducts() {
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 100);
        assert!(ledger.apply(1, MovementType::Exit, 40));
        assert_eq!(ledger.quantity(1), 60);
    }

    #[test]
    fn test_exit_rejected_when_insufficient() {
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 10);
        assert!(!ledger.apply(1, MovementType::Exit, 11));
        // A rejected exit leaves the level untouched
        assert_eq!(ledger.quantity(1), 10);
        assert_eq!(ledger.replayed_quantity(1), 10);
    }

    #[test]
    fn test_exit_of_exact_balance_allowed() {
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 25);
        assert!(ledger.apply(1, MovementType::Exit, 25));
        assert_eq!(ledger.quantity(1), 0);
    }

    #[test]
    fn test_exit_from_unknown_product_rejected() {
        let mut ledger = Ledger::default();
        assert!(!ledger.apply(7, MovementType::Exit, 1));
        assert_eq!(ledger.quantity(7), 0);
    }

    #[test]
    fn test_delete_entry_reverses_addition() {
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 50);
        ledger.apply(1, MovementType::Exit, 20);
        ledger.reverse(1); // remove the exit
        assert_eq!(ledger.quantity(1), 50);
        ledger.reverse(0); // remove the entry
        assert_eq!(ledger.quantity(1), 0);
    }

    #[test]
    fn test_deleting_entry_after_exit_can_go_negative() {
        // Stock came in, went out, then the entry record is corrected away.
        // The ledger reads -20 rather than refusing the correction.
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 30);
        ledger.apply(1, MovementType::Exit, 20);
        ledger.reverse(0);
        assert_eq!(ledger.quantity(1), -20);
        assert_eq!(ledger.replayed_quantity(1), -20);
    }

    #[test]
    fn test_products_are_independent() {
        let mut ledger = Ledger::default();
        ledger.apply(1, MovementType::Entry, 10);
        ledger.apply(2, MovementType::Entry, 99);
        assert!(ledger.apply(2, MovementType::Exit, 50));
        assert_eq!(ledger.quantity(1), 10);
        assert_eq!(ledger.quantity(2), 49);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn movement_strategy() -> impl Strategy<Value = (u32, MovementType, i32)> {
        (
            0u32..4,
            prop_oneof![Just(MovementType::Entry), Just(MovementType::Exit)],
            1i32..500,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The stored level always equals the replayed sum of applied
        /// movements
        #[test]
        fn prop_level_equals_replayed_log(
            movements in prop::collection::vec(movement_strategy(), 0..60)
        ) {
            let mut ledger = Ledger::default();
            for (product, movement_type, quantity) in movements {
                ledger.apply(product, movement_type, quantity);
            }
            for product in 0..4 {
                prop_assert_eq!(ledger.quantity(product), ledger.replayed_quantity(product));
            }
        }

        /// Applied movements alone can never drive a level negative
        #[test]
        fn prop_no_overdraw(
            movements in prop::collection::vec(movement_strategy(), 0..60)
        ) {
            let mut ledger = Ledger::default();
            for (product, movement_type, quantity) in movements {
                ledger.apply(product, movement_type, quantity);
                for p in 0..4 {
                    prop_assert!(ledger.quantity(p) >= 0);
                }
            }
        }

        /// Deleting every movement in any order returns all levels to zero
        #[test]
        fn prop_full_reversal_restores_zero(
            movements in prop::collection::vec(movement_strategy(), 1..30),
            seed in 0u64..u64::MAX
        ) {
            let mut ledger = Ledger::default();
            for (product, movement_type, quantity) in movements {
                ledger.apply(product, movement_type, quantity);
            }

            // Deterministic pseudo-random deletion order
            let mut state = seed;
            while !ledger.applied.is_empty() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let index = (state % ledger.applied.len() as u64) as usize;
                ledger.reverse(index);
            }

            for product in 0..4 {
                prop_assert_eq!(ledger.quantity(product), 0);
            }
        }

        /// A rejected exit is a no-op: applying it never changes any level
        #[test]
        fn prop_rejected_exit_is_noop(
            entries in prop::collection::vec(1i32..100, 0..5),
            exit_quantity in 1i32..1000
        ) {
            let mut ledger = Ledger::default();
            for quantity in &entries {
                ledger.apply(0, MovementType::Entry, *quantity);
            }
            let before = ledger.quantity(0);
            let accepted = ledger.apply(0, MovementType::Exit, exit_quantity);
            if accepted {
                prop_assert_eq!(ledger.quantity(0), before - exit_quantity);
            } else {
                prop_assert_eq!(ledger.quantity(0), before);
                prop_assert!(before < exit_quantity);
            }
        }
    }
}
