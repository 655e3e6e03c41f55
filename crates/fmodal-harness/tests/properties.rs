#![forbid(unsafe_code)]

//! Property-based invariant tests for the modal lifecycle.
//!
//! 1. Random operation sequences never break a lifecycle invariant
//!    (see `fmodal_harness::scenario`).
//! 2. Without animation every toggle lands on the final state immediately.
//! 3. With animation a transition stays intermediate for `D - 1` ms and
//!    settles at exactly `D`.
//! 4. The ever-opened flag is monotone.
//! 5. Same operations yield the same state history.

use fmodal::{ModalConfig, ModalState};
use fmodal_harness::ModalHarness;
use fmodal_harness::scenario::{ModalOp, Scenario};
use fmodal_harness::strategy::{duration_strategy, ops_strategy};
use proptest::prelude::*;

fn run(animated: bool, duration_ms: u16, ops: &[ModalOp]) -> Scenario {
    let mut scenario = Scenario::new(animated, duration_ms);
    for op in ops {
        scenario.apply(*op);
    }
    scenario
}

proptest! {
    #[test]
    fn random_sequences_hold_invariants(
        animated in any::<bool>(),
        duration in duration_strategy(),
        ops in ops_strategy(60),
    ) {
        let scenario = run(animated, duration, &ops);
        prop_assert!(
            scenario.violations().is_empty(),
            "violations: {:?}",
            scenario.violations()
        );
        let leftovers = scenario.finish();
        prop_assert!(leftovers.is_empty(), "after unmount: {:?}", leftovers);
    }

    #[test]
    fn non_animated_toggles_are_immediate(toggles in prop::collection::vec(any::<bool>(), 1..30)) {
        let mut h: ModalHarness = ModalHarness::mount(ModalConfig::new());
        for open in toggles {
            h.update(|c| c.open(open));
            let expected = if open { ModalState::Opened } else { ModalState::Closed };
            prop_assert_eq!(h.state(), expected);
        }
        prop_assert!(!h.history().iter().any(|s| s.is_animating()));
    }

    #[test]
    fn animated_transition_settles_at_duration(duration in 1u64..2_000, closing in any::<bool>()) {
        let mut h: ModalHarness = ModalHarness::mount(
            ModalConfig::new().animated(true).animation_duration_ms(duration),
        );
        if closing {
            h.update(|c| c.open(true));
            h.advance(duration);
            prop_assert_eq!(h.state(), ModalState::Opened);
        }

        let (intermediate, settled) = if closing {
            (ModalState::Closing, ModalState::Closed)
        } else {
            (ModalState::Opening, ModalState::Opened)
        };
        h.update(|c| c.open(!closing));
        prop_assert_eq!(h.state(), intermediate);
        h.advance(duration - 1);
        prop_assert_eq!(h.state(), intermediate);
        h.advance(1);
        prop_assert_eq!(h.state(), settled);
    }

    #[test]
    fn ever_opened_is_monotone(
        animated in any::<bool>(),
        steps in prop::collection::vec((any::<bool>(), 0u64..200), 1..30),
    ) {
        let mut h: ModalHarness = ModalHarness::mount(
            ModalConfig::new().animated(animated).animation_duration_ms(100),
        );
        let mut was_opened = h.result().has_already_been_opened;
        for (open, wait) in steps {
            h.update(|c| c.open(open));
            h.advance(wait);
            let now = h.result().has_already_been_opened;
            prop_assert!(now || !was_opened);
            if h.state().is_presenting() {
                prop_assert!(now);
            }
            was_opened = now;
        }
    }

    #[test]
    fn same_operations_same_history(
        animated in any::<bool>(),
        duration in duration_strategy(),
        ops in ops_strategy(40),
    ) {
        let a = run(animated, duration, &ops);
        let b = run(animated, duration, &ops);
        prop_assert_eq!(a.harness().history(), b.harness().history());
        prop_assert_eq!(a.closes(), b.closes());
    }
}
