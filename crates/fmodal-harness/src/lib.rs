#![forbid(unsafe_code)]

//! Deterministic test host for the modal lifecycle controller.
//!
//! [`ModalHarness`] plays the part of a rendering framework driving one
//! modal: it mounts the controller on a manual-clock [`Host`], re-evaluates
//! whenever the controller requests it, and exposes the latest snapshot as
//! [`ModalHarness::result`]. Every action (advancing time, dispatching input,
//! calling a handle) is followed by a flush of pending render requests, so
//! assertions always see settled output.
//!
//! [`scenario`] builds on it with a scripted operation vocabulary and an
//! invariant checker used by property tests and the fuzz target.
//!
//! # Example
//!
//! ```ignore
//! let mut h = ModalHarness::mount(ModalConfig::new().animated(true).animation_duration_ms(1000));
//! h.update(|c| c.open(true));
//! assert_eq!(h.state(), ModalState::Opening);
//! h.advance(1000);
//! assert_eq!(h.state(), ModalState::Opened);
//! ```

pub mod scenario;
pub mod strategy;

use std::time::Duration;

use fmodal::{ModalConfig, ModalController, ModalSnapshot, ModalState};
use fmodal_core::event::{Event, KeyCode};
use fmodal_core::node::NodeId;
use fmodal_runtime::Host;
use tracing::{debug, warn};

/// Upper bound on re-evaluations per flush.
pub const MAX_FLUSH_PASSES: usize = 64;

/// Test host for one modal.
pub struct ModalHarness<V: Clone + 'static = ()> {
    host: Host,
    controller: Option<ModalController<V>>,
    config: ModalConfig<V>,
    result: ModalSnapshot<V>,
    history: Vec<ModalState>,
}

impl<V: Clone + 'static> ModalHarness<V> {
    /// Mount on a fresh manual-clock host.
    pub fn mount(config: ModalConfig<V>) -> Self {
        Self::mount_on(&Host::manual(), config)
    }

    /// Mount on an existing host (e.g., to share it between modals).
    pub fn mount_on(host: &Host, config: ModalConfig<V>) -> Self {
        let controller = ModalController::new(host);
        let result = controller.evaluate(config.clone());
        debug!(state = result.state.as_str(), "harness mounted");
        let mut harness = Self {
            host: host.clone(),
            controller: Some(controller),
            config,
            history: vec![result.state],
            result,
        };
        harness.flush();
        harness
    }

    /// Latest snapshot.
    #[must_use]
    pub fn result(&self) -> &ModalSnapshot<V> {
        &self.result
    }

    /// Latest state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.result.state
    }

    /// Every state returned by an evaluation, in order.
    #[must_use]
    pub fn history(&self) -> &[ModalState] {
        &self.history
    }

    /// The configuration last supplied by the caller.
    #[must_use]
    pub fn config(&self) -> &ModalConfig<V> {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.controller.is_some()
    }

    /// Re-evaluate with a new configuration.
    pub fn rerender(&mut self, config: ModalConfig<V>) {
        self.config = config;
        let Some(controller) = self.controller.as_ref() else {
            warn!("rerender after unmount ignored");
            return;
        };
        let snapshot = controller.evaluate(self.config.clone());
        self.record(snapshot);
        self.flush();
    }

    /// Re-evaluate with the last configuration transformed by `f`.
    pub fn update(&mut self, f: impl FnOnce(ModalConfig<V>) -> ModalConfig<V>) {
        let next = f(self.config.clone());
        self.rerender(next);
    }

    /// Advance virtual time by `ms` milliseconds. Returns the timers fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        let fired = self.host.advance(Duration::from_millis(ms));
        self.flush();
        fired
    }

    /// Deliver `event` to the host's global listeners.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let delivered = self.host.dispatch(event);
        self.flush();
        delivered
    }

    /// Press a key.
    pub fn key_down(&mut self, code: KeyCode) -> usize {
        self.dispatch(&Event::key(code))
    }

    /// Left-click a node.
    pub fn click(&mut self, target: Option<NodeId>) -> usize {
        self.dispatch(&Event::click(target))
    }

    /// Route a click through the snapshot's overlay handler. Returns `false`
    /// when the snapshot has none.
    pub fn overlay_click(&mut self, target: Option<NodeId>) -> bool {
        let Some(handler) = self.result.overlay_click.clone() else {
            return false;
        };
        handler.call(&Event::click(target));
        self.flush();
        true
    }

    /// Run `f` against the latest snapshot, then flush.
    pub fn act(&mut self, f: impl FnOnce(&ModalSnapshot<V>)) {
        let snapshot = self.result.clone();
        f(&snapshot);
        self.flush();
    }

    /// Drop the controller. The last snapshot stays readable.
    pub fn unmount(&mut self) {
        if self.controller.take().is_some() {
            debug!("harness unmounted");
        }
    }

    fn record(&mut self, snapshot: ModalSnapshot<V>) {
        self.history.push(snapshot.state);
        self.result = snapshot;
    }

    fn flush(&mut self) {
        for _ in 0..MAX_FLUSH_PASSES {
            let Some(controller) = self.controller.as_ref() else {
                return;
            };
            if !controller.take_render_request() {
                return;
            }
            let snapshot = controller.refresh();
            self.record(snapshot);
        }
        warn!(passes = MAX_FLUSH_PASSES, "render flush did not settle");
    }
}

impl<V: Clone + std::fmt::Debug + 'static> std::fmt::Debug for ModalHarness<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalHarness")
            .field("mounted", &self.is_mounted())
            .field("result", &self.result)
            .field("renders", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmodal_runtime::ListenerKind;

    #[test]
    fn flush_settles_mount_delay() {
        let h: ModalHarness = ModalHarness::mount(
            ModalConfig::new()
                .open(true)
                .animated(true)
                .animation_duration_ms(10),
        );
        assert_eq!(h.history(), &[ModalState::Closed, ModalState::Opening]);
        assert_eq!(h.state(), ModalState::Opening);
    }

    #[test]
    fn unmount_detaches_and_keeps_last_result() {
        let mut h: ModalHarness = ModalHarness::mount(ModalConfig::new().open(true));
        assert!(h.is_mounted());
        h.unmount();
        assert!(!h.is_mounted());
        assert_eq!(h.state(), ModalState::Opened);
        assert_eq!(h.host().events().listener_count(ListenerKind::KeyDown), 0);

        h.rerender(ModalConfig::new());
        assert_eq!(h.state(), ModalState::Opened);
    }

    #[test]
    fn overlay_click_requires_overlay_mode() {
        let mut h: ModalHarness = ModalHarness::mount(ModalConfig::new().open(true));
        assert!(!h.overlay_click(None));
    }
}
