#![forbid(unsafe_code)]

//! Scripted operation sequences with invariant checking.
//!
//! A [`Scenario`] owns a [`ModalHarness`] mounted with a real container node,
//! applies [`ModalOp`]s to it, and records every broken lifecycle invariant.
//! Property tests and the fuzz target generate the operations.
//!
//! # Checked invariants
//!
//! 1. Without animation the state is `Opened` or `Closed`, matching `open`.
//! 2. At most one timer is pending; none without animation.
//! 3. `Opening`/`Closing` only with animation and a pending timer.
//! 4. Once time has advanced past an animated transition's duration, the
//!    state matches `open` again.
//! 5. `has_already_been_opened` is set exactly when an `Opening` or `Opened`
//!    state has been observed, and never reset.
//! 6. Escape closes once iff not persistent and `open`; an outside click
//!    closes once iff not persistent and `Opened`; inside clicks never close.
//! 7. After unmount no listener or timer remains.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use fmodal::{ModalConfig, ModalState, NodeRef};
use fmodal_core::event::KeyCode;
use fmodal_core::node::{NodeId, NodeTree};
use fmodal_runtime::ListenerKind;

use crate::ModalHarness;

/// One scripted step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOp {
    SetOpen(bool),
    SetAnimated(bool),
    SetPersistent(bool),
    SetDurationMs(u16),
    AdvanceMs(u16),
    Escape,
    ClickOutside,
    ClickInside,
    /// Re-evaluate with an unchanged configuration.
    Rerender,
}

/// Harness plus bookkeeping for invariant checks.
pub struct Scenario {
    harness: ModalHarness,
    closes: Rc<Cell<u32>>,
    inside: NodeId,
    outside: NodeId,
    /// Virtual time by which the current animated transition must settle.
    settle_by: Option<Duration>,
    /// Set once time has been advanced past `settle_by`.
    must_be_settled: bool,
    seen_presenting: bool,
    violations: Vec<String>,
}

impl Scenario {
    /// Mount a closed modal with the given animation settings.
    pub fn new(animated: bool, duration_ms: u16) -> Self {
        let tree = NodeTree::new();
        let page = tree.create_root();
        let surface = tree.append_child(page);
        let inside = tree.append_child(surface);
        let container = NodeRef::with_node(tree.node(surface));

        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let config = ModalConfig::new()
            .animated(animated)
            .animation_duration_ms(u64::from(duration_ms))
            .container(container)
            .on_close(move |_| counter.set(counter.get() + 1));

        let mut scenario = Self {
            harness: ModalHarness::mount(config),
            closes,
            inside,
            outside: page,
            settle_by: None,
            must_be_settled: false,
            seen_presenting: false,
            violations: Vec::new(),
        };
        scenario.observe();
        scenario.check();
        scenario
    }

    #[must_use]
    pub fn harness(&self) -> &ModalHarness {
        &self.harness
    }

    /// Close notifications so far.
    #[must_use]
    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    /// Every invariant violation recorded so far.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Apply `op`, then check invariants.
    pub fn apply(&mut self, op: ModalOp) {
        match op {
            ModalOp::SetOpen(open) => {
                let changed = self.harness.config().open != open;
                let config = self.harness.config();
                if changed && config.animated {
                    self.settle_by = Some(self.now() + config.animation_duration);
                    self.must_be_settled = false;
                }
                self.harness.update(|c| c.open(open));
            }
            ModalOp::SetAnimated(animated) => {
                if self.harness.config().animated != animated {
                    self.settle_by = None;
                    self.must_be_settled = false;
                }
                self.harness.update(|c| c.animated(animated));
            }
            ModalOp::SetPersistent(persistent) => {
                self.harness.update(|c| c.persistent(persistent));
            }
            ModalOp::SetDurationMs(ms) => {
                self.harness
                    .update(|c| c.animation_duration_ms(u64::from(ms)));
            }
            ModalOp::AdvanceMs(ms) => {
                self.harness.advance(u64::from(ms));
                if self.settle_by.is_some_and(|deadline| self.now() >= deadline) {
                    self.must_be_settled = true;
                }
            }
            ModalOp::Escape => {
                let config = self.harness.config();
                let expected = u32::from(!config.persistent && config.open);
                self.expect_closes(expected, "escape", |h| {
                    h.key_down(KeyCode::Escape);
                });
            }
            ModalOp::ClickOutside => {
                let expected = u32::from(
                    !self.harness.config().persistent && self.harness.state() == ModalState::Opened,
                );
                let target = self.outside;
                self.expect_closes(expected, "outside click", |h| {
                    h.click(Some(target));
                });
            }
            ModalOp::ClickInside => {
                let target = self.inside;
                self.expect_closes(0, "inside click", |h| {
                    h.click(Some(target));
                });
            }
            ModalOp::Rerender => {
                self.harness.update(|c| c);
            }
        }
        self.observe();
        self.check();
    }

    /// Unmount and check that nothing is left behind.
    pub fn finish(mut self) -> Vec<String> {
        self.harness.unmount();
        let host = self.harness.host();
        for kind in [ListenerKind::KeyDown, ListenerKind::Click] {
            let left = host.events().listener_count(kind);
            if left != 0 {
                self.violations
                    .push(format!("{left} {kind:?} listener(s) left after unmount"));
            }
        }
        let pending = host.timers().pending_count();
        if pending != 0 {
            self.violations
                .push(format!("{pending} timer(s) pending after unmount"));
        }
        let before = self.closes();
        self.harness.result().close.call(None);
        if self.closes() != before {
            self.violations.push("close handle fired after unmount".into());
        }
        self.violations
    }

    fn now(&self) -> Duration {
        self.harness.host().timers().now()
    }

    fn expect_closes(&mut self, expected: u32, what: &str, act: impl FnOnce(&mut ModalHarness)) {
        let before = self.closes();
        act(&mut self.harness);
        let got = self.closes() - before;
        if got != expected {
            self.violations
                .push(format!("{what}: expected {expected} close(s), got {got}"));
        }
    }

    fn observe(&mut self) {
        if self
            .harness
            .history()
            .iter()
            .any(|state| state.is_presenting())
        {
            self.seen_presenting = true;
        }
    }

    fn check(&mut self) {
        let snapshot = self.harness.result();
        let config = self.harness.config();
        let state = snapshot.state;
        let pending = self.harness.host().timers().pending_count();
        let settled = if config.open {
            ModalState::Opened
        } else {
            ModalState::Closed
        };
        let mut found = Vec::new();

        if !config.animated && state != settled {
            found.push(format!("not animated but state is {state}, open={}", config.open));
        }
        if pending > 1 {
            found.push(format!("{pending} timers pending"));
        }
        if !config.animated && pending != 0 {
            found.push("timer pending without animation".to_string());
        }
        if state.is_animating() && (!config.animated || pending != 1) {
            found.push(format!(
                "{state} with animated={} and {pending} pending timer(s)",
                config.animated
            ));
        }
        if self.must_be_settled && config.animated && state != settled {
            found.push(format!(
                "transition past its deadline {:?} still {state}",
                self.settle_by
            ));
        }
        if snapshot.has_already_been_opened != self.seen_presenting {
            found.push(format!(
                "has_already_been_opened={} but presenting observed={}",
                snapshot.has_already_been_opened, self.seen_presenting
            ));
        }

        self.violations.extend(found);
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("state", &self.harness.state())
            .field("closes", &self.closes())
            .field("violations", &self.violations.len())
            .finish()
    }
}
