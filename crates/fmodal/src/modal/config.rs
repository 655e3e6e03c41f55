#![forbid(unsafe_code)]

//! Caller-supplied modal configuration.
//!
//! A [`ModalConfig`] is rebuilt by the caller for every evaluation and carries
//! no identity between evaluations. Every field has a default, so
//! `ModalConfig::default()` is a closed, non-persistent, non-animated modal
//! with a 300ms animation duration and no close callback.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use fmodal_core::event::Event;
use fmodal_core::node::NodeRef;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use super::policy::ModalPolicy;

/// Animation duration used when the caller does not supply one.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);

/// Close notification. Receives the triggering event when there is one.
pub type OnClose = Rc<dyn Fn(Option<&Event>)>;

/// Where outside clicks are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "snake_case"))]
pub enum OutsideClickMode {
    /// The controller listens for clicks on the top-level event target.
    #[default]
    Global,
    /// The caller routes clicks on its own overlay element through
    /// [`OverlayClick`](super::OverlayClick); global clicks are ignored.
    Overlay,
}

/// Which notion of "open" an outside click must observe to close the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "snake_case"))]
pub enum OutsideClickGate {
    /// The discrete state must be [`ModalState::Opened`](super::ModalState::Opened).
    /// Clicks during an opening or closing animation are ignored.
    #[default]
    Opened,
    /// The latest configuration's `open` flag must be set.
    ConfigOpen,
}

/// Modal configuration.
///
/// `V` is an arbitrary payload the snapshot latches while the modal is
/// opening or opened (for example the record a dialog is editing), so content
/// does not change under a closing animation.
pub struct ModalConfig<V = ()> {
    /// Desired visibility.
    pub open: bool,
    /// Suppress both dismissal gestures.
    pub persistent: bool,
    /// Pass through `Opening`/`Closing` for `animation_duration`.
    pub animated: bool,
    /// Length of the intermediate phase in both directions.
    pub animation_duration: Duration,
    /// Invoked when a dismissal gesture fires.
    pub on_close: Option<OnClose>,
    /// Caller-owned container handle. An internal empty handle is used when
    /// absent.
    pub container: Option<NodeRef>,
    /// Payload latched by the snapshot.
    pub value: Option<V>,
    /// Outside-click wiring.
    pub outside_click: OutsideClickMode,
    /// Outside-click gating.
    pub outside_click_gate: OutsideClickGate,
}

impl<V> Default for ModalConfig<V> {
    fn default() -> Self {
        Self {
            open: false,
            persistent: false,
            animated: false,
            animation_duration: DEFAULT_ANIMATION_DURATION,
            on_close: None,
            container: None,
            value: None,
            outside_click: OutsideClickMode::Global,
            outside_click_gate: OutsideClickGate::Opened,
        }
    }
}

impl<V: Clone> Clone for ModalConfig<V> {
    fn clone(&self) -> Self {
        Self {
            open: self.open,
            persistent: self.persistent,
            animated: self.animated,
            animation_duration: self.animation_duration,
            on_close: self.on_close.clone(),
            container: self.container.clone(),
            value: self.value.clone(),
            outside_click: self.outside_click,
            outside_click_gate: self.outside_click_gate,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ModalConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalConfig")
            .field("open", &self.open)
            .field("persistent", &self.persistent)
            .field("animated", &self.animated)
            .field("animation_duration", &self.animation_duration)
            .field("on_close", &self.on_close.is_some())
            .field("container", &self.container)
            .field("value", &self.value)
            .field("outside_click", &self.outside_click)
            .field("outside_click_gate", &self.outside_click_gate)
            .finish()
    }
}

impl<V> ModalConfig<V> {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Set the animation duration in milliseconds.
    pub fn animation_duration_ms(self, ms: u64) -> Self {
        self.animation_duration(Duration::from_millis(ms))
    }

    /// Set the close callback.
    pub fn on_close(mut self, on_close: impl Fn(Option<&Event>) + 'static) -> Self {
        self.on_close = Some(Rc::new(on_close));
        self
    }

    /// Set an already shared close callback.
    pub fn on_close_rc(mut self, on_close: OnClose) -> Self {
        self.on_close = Some(on_close);
        self
    }

    pub fn container(mut self, container: NodeRef) -> Self {
        self.container = Some(container);
        self
    }

    pub fn value(mut self, value: V) -> Self {
        self.value = Some(value);
        self
    }

    pub fn outside_click(mut self, mode: OutsideClickMode) -> Self {
        self.outside_click = mode;
        self
    }

    pub fn outside_click_gate(mut self, gate: OutsideClickGate) -> Self {
        self.outside_click_gate = gate;
        self
    }

    /// Apply every setting a [`ModalPolicy`] carries. `open`, the callback,
    /// the container and the value are left untouched.
    pub fn with_policy(mut self, policy: &ModalPolicy) -> Self {
        self.persistent = policy.persistent;
        self.animated = policy.animated;
        self.animation_duration = policy.animation_duration();
        self.outside_click = policy.outside_click;
        self.outside_click_gate = policy.outside_click_gate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn defaults() {
        let config: ModalConfig = ModalConfig::default();
        assert!(!config.open);
        assert!(!config.persistent);
        assert!(!config.animated);
        assert_eq!(config.animation_duration, Duration::from_millis(300));
        assert!(config.on_close.is_none());
        assert!(config.container.is_none());
        assert_eq!(config.outside_click, OutsideClickMode::Global);
        assert_eq!(config.outside_click_gate, OutsideClickGate::Opened);
    }

    #[test]
    fn builder_sets_fields() {
        let config = ModalConfig::new()
            .open(true)
            .persistent(true)
            .animated(true)
            .animation_duration_ms(1000)
            .value("draft")
            .outside_click(OutsideClickMode::Overlay)
            .outside_click_gate(OutsideClickGate::ConfigOpen);

        assert!(config.open && config.persistent && config.animated);
        assert_eq!(config.animation_duration, Duration::from_secs(1));
        assert_eq!(config.value, Some("draft"));
        assert_eq!(config.outside_click, OutsideClickMode::Overlay);
        assert_eq!(config.outside_click_gate, OutsideClickGate::ConfigOpen);
    }

    #[test]
    fn clone_shares_callback() {
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let config: ModalConfig = ModalConfig::new().on_close(move |_| c.set(c.get() + 1));
        let copy = config.clone();

        if let Some(on_close) = copy.on_close.as_ref() {
            on_close(None);
        }
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(
            config.on_close.as_ref().unwrap(),
            copy.on_close.as_ref().unwrap()
        ));
    }

    #[test]
    fn policy_overrides_behavior_only() {
        let policy = ModalPolicy {
            persistent: true,
            animated: true,
            animation_duration_ms: 150,
            outside_click: OutsideClickMode::Overlay,
            outside_click_gate: OutsideClickGate::ConfigOpen,
        };
        let config = ModalConfig::new().open(true).value(7).with_policy(&policy);

        assert!(config.open);
        assert_eq!(config.value, Some(7));
        assert!(config.persistent && config.animated);
        assert_eq!(config.animation_duration, Duration::from_millis(150));
        assert_eq!(config.outside_click, OutsideClickMode::Overlay);
    }

    #[test]
    fn debug_hides_callback_body() {
        let config: ModalConfig = ModalConfig::new().on_close(|_| {});
        let text = format!("{config:?}");
        assert!(text.contains("on_close: true"));
    }
}
