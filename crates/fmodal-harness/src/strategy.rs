#![forbid(unsafe_code)]

//! `proptest` strategies for scripted modal scenarios.

use proptest::prelude::*;

use crate::scenario::ModalOp;

/// Durations short enough that advances regularly cross them, plus zero.
pub fn duration_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![Just(0u16), 1u16..50, 50u16..400]
}

/// A single operation, weighted towards toggling and time.
pub fn op_strategy() -> impl Strategy<Value = ModalOp> {
    prop_oneof![
        4 => any::<bool>().prop_map(ModalOp::SetOpen),
        1 => any::<bool>().prop_map(ModalOp::SetAnimated),
        1 => any::<bool>().prop_map(ModalOp::SetPersistent),
        1 => duration_strategy().prop_map(ModalOp::SetDurationMs),
        4 => (0u16..500).prop_map(ModalOp::AdvanceMs),
        2 => Just(ModalOp::Escape),
        2 => Just(ModalOp::ClickOutside),
        1 => Just(ModalOp::ClickInside),
        1 => Just(ModalOp::Rerender),
    ]
}

/// Operation sequences of up to `max_len` steps.
pub fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<ModalOp>> {
    prop::collection::vec(op_strategy(), 0..max_len)
}
