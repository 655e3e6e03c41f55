#![forbid(unsafe_code)]

//! The modal lifecycle controller.
//!
//! One [`ModalController`] owns the visibility state machine of one modal:
//! the delayed "effective open" flag, the locally rendered flag, the single
//! animation timer, the ever-opened marker, and the two dismissal listeners.
//!
//! # Evaluation
//!
//! [`ModalController::evaluate`] runs three phases in order:
//!
//! 1. **Render**: store the configuration, derive effective open, the
//!    ever-opened marker, the discrete state and the latched value.
//! 2. **Layout**: without animation, copy effective open into the rendered
//!    flag and derive again, so no intermediate state is ever returned.
//! 3. **Passive**: release the one-shot entry delay, reschedule the animation
//!    timer when the effective target changed, attach listeners on first use.
//!
//! Changes made outside `evaluate` (timer expiry, releasing the entry delay)
//! raise a render request. The host answers it by evaluating again, either by
//! polling [`ModalController::take_render_request`] or from a
//! [`ModalController::subscribe_render`] callback.
//!
//! # Invariants
//!
//! 1. At most one animation timer is pending.
//! 2. Listeners are attached once, on the first evaluation, and removed once,
//!    on teardown.
//! 3. Listeners and handles read the configuration stored by the most recent
//!    evaluation, never the one current when they were created.
//! 4. `has_already_been_opened` never goes back to `false`.
//!
//! # Failure Modes
//!
//! - Calling a [`CloseHandle`] or [`OverlayClick`] after the controller is
//!   dropped does nothing.
//! - A close callback may drop the controller re-entrantly; teardown runs
//!   once and the remainder of the dispatch sees detached listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fmodal_core::event::{Event, KeyCode};
use fmodal_core::node::NodeRef;
use fmodal_core::{debug, trace};
use fmodal_runtime::{
    Binding, CleanupScope, Host, LatestRef, ListenerKind, Observable, Subscription, TimerSlot,
    bind_mapped2,
};

use super::config::{ModalConfig, OutsideClickGate, OutsideClickMode};
use super::snapshot::{CloseHandle, Dismiss, ModalSnapshot, OverlayClick};
use super::state::ModalState;

/// How a click reached the outside-click check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickRoute {
    Global,
    Overlay,
}

struct ModalCore<V> {
    host: Host,
    config: LatestRef<ModalConfig<V>>,
    /// Cleared on the first evaluation when an animated modal mounts open.
    can_be_opened: Cell<bool>,
    has_rendered: Cell<bool>,
    effective_open: Observable<bool>,
    locally_rendered: Observable<bool>,
    state: Binding<ModalState>,
    last_state: Cell<ModalState>,
    ever_opened: Cell<bool>,
    latched: RefCell<Option<V>>,
    /// Effective target the animation timer was last scheduled against.
    timer_target: Cell<Option<bool>>,
    timer: TimerSlot,
    listeners: RefCell<CleanupScope>,
    internal_container: NodeRef,
    render_requests: Observable<u64>,
    render_pending: Cell<bool>,
    mounted: Cell<bool>,
}

impl<V: Clone + 'static> ModalCore<V> {
    fn new(host: &Host) -> Self {
        let effective_open = Observable::new(false);
        let locally_rendered = Observable::new(false);
        let state = bind_mapped2(&effective_open, &locally_rendered, |open, rendered| {
            ModalState::from_flags(*open, *rendered)
        });
        Self {
            host: host.clone(),
            config: LatestRef::new(ModalConfig::default()),
            can_be_opened: Cell::new(true),
            has_rendered: Cell::new(false),
            effective_open,
            locally_rendered,
            state,
            last_state: Cell::new(ModalState::Closed),
            ever_opened: Cell::new(false),
            latched: RefCell::new(None),
            timer_target: Cell::new(None),
            timer: TimerSlot::new(host.timers()),
            listeners: RefCell::new(CleanupScope::new()),
            internal_container: NodeRef::new(),
            render_requests: Observable::new(0),
            render_pending: Cell::new(false),
            mounted: Cell::new(true),
        }
    }

    /// Render phase.
    fn derive(&self) {
        let (open, animated) = self.config.with(|c| (c.open, c.animated));
        if !self.has_rendered.get() && animated && open {
            self.can_be_opened.set(false);
        }

        let effective = self.can_be_opened.get() && open;
        self.effective_open.set(effective);
        if effective && !self.ever_opened.replace(true) {
            debug!("modal effectively opened for the first time");
        }

        let state = self.state.get();
        let previous = self.last_state.replace(state);
        if previous != state {
            debug!(from = previous.as_str(), to = state.as_str(), "modal state changed");
        }

        if state.is_presenting() || !self.has_rendered.get() {
            let value = self.config.with(|c| c.value.clone());
            *self.latched.borrow_mut() = value;
        }
    }

    /// Layout phase. Returns whether anything changed.
    fn sync_without_animation(&self) -> bool {
        let animated = self.config.with(|c| c.animated);
        let effective = self.effective_open.get();
        if animated || effective == self.locally_rendered.get() {
            return false;
        }
        self.timer.cancel();
        self.locally_rendered.set(effective);
        trace!(rendered = effective, "rendered flag synced before paint");
        true
    }

    /// Passive phase.
    fn run_effects(self: &Rc<Self>) {
        let first = !self.has_rendered.replace(true);
        let mut needs_render = false;

        if !self.can_be_opened.get() {
            self.can_be_opened.set(true);
            needs_render = true;
        }

        let target = self.effective_open.get();
        if self.timer_target.replace(Some(target)) != Some(target) {
            self.reschedule(target);
        }

        if first {
            self.attach_listeners();
        }

        if needs_render {
            self.request_render("entry delay released");
        }
    }

    fn reschedule(self: &Rc<Self>, target: bool) {
        self.timer.cancel();
        let (animated, duration) = self.config.with(|c| (c.animated, c.animation_duration));
        if !animated || self.locally_rendered.get() == target {
            return;
        }
        let weak = Rc::downgrade(self);
        self.timer.schedule(duration, move || {
            if let Some(core) = weak.upgrade() {
                core.settle(target);
            }
        });
        debug!(
            target,
            duration_ms = duration.as_millis() as u64,
            "animation timer scheduled"
        );
    }

    /// Timer expiry: the rendered flag catches up with the target.
    fn settle(&self, target: bool) {
        if !self.mounted.get() {
            return;
        }
        if self.locally_rendered.set(target) {
            self.request_render("animation finished");
        }
    }

    fn attach_listeners(self: &Rc<Self>) {
        let events = self.host.events();
        let mut scope = self.listeners.borrow_mut();

        let weak = Rc::downgrade(self);
        scope.hold(events.add_listener(ListenerKind::KeyDown, move |event| {
            if let Some(core) = weak.upgrade() {
                core.escape_key_check(event);
            }
        }));

        let weak = Rc::downgrade(self);
        scope.hold(events.add_listener(ListenerKind::Click, move |event| {
            if let Some(core) = weak.upgrade() {
                core.outside_interaction_check(event, ClickRoute::Global);
            }
        }));
        debug!(listeners = scope.len(), "dismissal listeners attached");
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn request_render(&self, reason: &'static str) {
        self.render_pending.set(true);
        self.render_requests.update(|revision| *revision += 1);
        trace!(reason, "render requested");
    }

    fn escape_key_check(&self, event: &Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.code != KeyCode::Escape {
            return;
        }
        let (persistent, open) = self.config.with(|c| (c.persistent, c.open));
        if persistent || !open {
            trace!(persistent, open, "escape ignored");
            return;
        }
        debug!("escape dismissal");
        self.fire_close(Some(event));
    }

    fn outside_interaction_check(&self, event: &Event, route: ClickRoute) {
        let (mode, persistent, open, gate, container) = self.config.with(|c| {
            (
                c.outside_click,
                c.persistent,
                c.open,
                c.outside_click_gate,
                c.container.clone(),
            )
        });
        let routed = match route {
            ClickRoute::Global => OutsideClickMode::Global,
            ClickRoute::Overlay => OutsideClickMode::Overlay,
        };
        if mode != routed {
            trace!(?route, ?mode, "click from inactive route ignored");
            return;
        }
        if persistent {
            return;
        }
        let gate_open = match gate {
            OutsideClickGate::Opened => self.state.get() == ModalState::Opened,
            OutsideClickGate::ConfigOpen => open,
        };
        if !gate_open {
            trace!(?gate, "outside click ignored while not open");
            return;
        }
        let container = container.unwrap_or_else(|| self.internal_container.clone());
        if !container.is_set() || container.contains(event.target()) {
            return;
        }
        debug!(?route, "outside click dismissal");
        self.fire_close(Some(event));
    }

    fn fire_close(&self, event: Option<&Event>) {
        if !self.mounted.get() {
            return;
        }
        // Clone the callback out so it may re-evaluate or drop the controller.
        let on_close = self.config.with(|c| c.on_close.clone());
        if let Some(on_close) = on_close {
            on_close(event);
        }
    }

    fn snapshot(self: &Rc<Self>) -> ModalSnapshot<V> {
        let dismiss: Rc<dyn Dismiss> = self.clone();
        let target = Rc::downgrade(&dismiss);
        let (mode, container, animated, animation_duration, persistent) = self.config.with(|c| {
            (
                c.outside_click,
                c.container.clone(),
                c.animated,
                c.animation_duration,
                c.persistent,
            )
        });
        ModalSnapshot {
            state: self.state.get(),
            close: CloseHandle::new(target.clone()),
            overlay_click: (mode == OutsideClickMode::Overlay).then(|| OverlayClick::new(target)),
            container: container.unwrap_or_else(|| self.internal_container.clone()),
            has_already_been_opened: self.ever_opened.get(),
            value: self.latched.borrow().clone(),
            animated,
            animation_duration,
            persistent,
        }
    }

    fn teardown(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        self.timer.cancel();
        let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        listeners.clear();
        debug!("modal torn down");
    }
}

impl<V: Clone + 'static> Dismiss for ModalCore<V> {
    fn close(&self, event: Option<&Event>) {
        self.fire_close(event);
    }

    fn overlay_click(&self, event: &Event) {
        self.outside_interaction_check(event, ClickRoute::Overlay);
    }
}

/// Modal lifecycle controller bound to one host.
///
/// Dropping the controller cancels the pending animation timer and removes
/// both dismissal listeners.
pub struct ModalController<V: Clone + 'static = ()> {
    core: Rc<ModalCore<V>>,
}

impl<V: Clone + 'static> ModalController<V> {
    /// Create a controller. Nothing is scheduled or attached until the first
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn new(host: &Host) -> Self {
        Self {
            core: Rc::new(ModalCore::new(host)),
        }
    }

    /// Evaluate against a fresh configuration and return the snapshot to
    /// render from.
    pub fn evaluate(&self, config: ModalConfig<V>) -> ModalSnapshot<V> {
        let core = &self.core;
        core.config.replace(config);
        core.render_pending.set(false);

        core.derive();
        if core.sync_without_animation() {
            core.derive();
        }
        let snapshot = core.snapshot();
        core.run_effects();
        snapshot
    }

    /// Evaluate again with the configuration stored by the last evaluation.
    pub fn refresh(&self) -> ModalSnapshot<V> {
        let config = self.core.config.get();
        self.evaluate(config)
    }

    /// Snapshot of the current state without running any phase.
    #[must_use]
    pub fn snapshot(&self) -> ModalSnapshot<V> {
        self.core.snapshot()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.core.state.get()
    }

    /// Whether a re-evaluation was requested since the last evaluation.
    /// Clears the request.
    pub fn take_render_request(&self) -> bool {
        self.core.render_pending.replace(false)
    }

    /// Call `callback` with a request counter each time a re-evaluation is
    /// requested. Dropping the subscription stops notifications.
    pub fn subscribe_render(&self, callback: impl Fn(u64) + 'static) -> Subscription {
        self.core
            .render_requests
            .subscribe(move |revision| callback(*revision))
    }

    /// Whether an animation timer is pending.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.core.timer.is_pending()
    }

    /// Tear down explicitly. Equivalent to dropping the controller.
    pub fn unmount(self) {}
}

impl<V: Clone + 'static> Drop for ModalController<V> {
    fn drop(&mut self) {
        self.core.teardown();
    }
}

impl<V: Clone + 'static> std::fmt::Debug for ModalController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalController")
            .field("state", &self.core.state.get())
            .field("has_already_been_opened", &self.core.ever_opened.get())
            .field("timer_pending", &self.core.timer.is_pending())
            .finish_non_exhaustive()
    }
}
