#![no_main]

use arbitrary::Arbitrary;
use fmodal_harness::scenario::{ModalOp, Scenario};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Open(bool),
    Animated(bool),
    Persistent(bool),
    Duration(u16),
    Advance(u16),
    Escape,
    ClickOutside,
    ClickInside,
    Rerender,
}

impl From<FuzzOp> for ModalOp {
    fn from(op: FuzzOp) -> Self {
        match op {
            FuzzOp::Open(open) => Self::SetOpen(open),
            FuzzOp::Animated(animated) => Self::SetAnimated(animated),
            FuzzOp::Persistent(persistent) => Self::SetPersistent(persistent),
            // Keep durations near the advance range so transitions complete.
            FuzzOp::Duration(ms) => Self::SetDurationMs(ms % 2_000),
            FuzzOp::Advance(ms) => Self::AdvanceMs(ms % 2_500),
            FuzzOp::Escape => Self::Escape,
            FuzzOp::ClickOutside => Self::ClickOutside,
            FuzzOp::ClickInside => Self::ClickInside,
            FuzzOp::Rerender => Self::Rerender,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    animated: bool,
    duration_ms: u16,
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: Input| {
    // Bound sequence length so each run stays fast.
    if input.ops.len() > 512 {
        return;
    }

    let mut scenario = Scenario::new(input.animated, input.duration_ms % 2_000);
    for op in input.ops {
        scenario.apply(op.into());
    }

    // Post-conditions that must always hold:
    assert!(
        scenario.violations().is_empty(),
        "lifecycle invariant broken: {:?}",
        scenario.violations()
    );
    let leftovers = scenario.finish();
    assert!(leftovers.is_empty(), "teardown incomplete: {leftovers:?}");
});
