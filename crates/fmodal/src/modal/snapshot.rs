#![forbid(unsafe_code)]

//! Read-only result of one evaluation, and the callable handles it carries.

use std::fmt;
use std::rc::Weak;
use std::time::Duration;

use fmodal_core::event::Event;
use fmodal_core::node::NodeRef;

use super::state::ModalState;

/// What the handles in a snapshot call back into.
pub(crate) trait Dismiss {
    /// Invoke the latest close callback.
    fn close(&self, event: Option<&Event>);
    /// Run the outside-click check for a click the caller routed itself.
    fn overlay_click(&self, event: &Event);
}

/// Everything a renderer needs from one evaluation.
#[derive(Clone, Debug)]
pub struct ModalSnapshot<V = ()> {
    /// Current lifecycle state.
    pub state: ModalState,
    /// Close trigger. Stable for the controller's lifetime.
    pub close: CloseHandle,
    /// Outside-click trigger for the caller's overlay element. Present only
    /// in [`OutsideClickMode::Overlay`](super::OutsideClickMode::Overlay).
    pub overlay_click: Option<OverlayClick>,
    /// Container handle: the caller's, or an internal empty one.
    pub container: NodeRef,
    /// Whether the surface has ever been effectively open.
    pub has_already_been_opened: bool,
    /// Payload latched while opening or opened.
    pub value: Option<V>,
    pub animated: bool,
    pub animation_duration: Duration,
    pub persistent: bool,
}

impl<V> ModalSnapshot<V> {
    /// Shorthand for `self.state.is_visible()`.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }
}

/// Callable close trigger.
///
/// Calling it after the controller is gone does nothing.
#[derive(Clone)]
pub struct CloseHandle {
    target: Weak<dyn Dismiss>,
}

impl CloseHandle {
    pub(crate) fn new(target: Weak<dyn Dismiss>) -> Self {
        Self { target }
    }

    /// Notify the close callback, passing `event` through.
    pub fn call(&self, event: Option<&Event>) {
        if let Some(target) = self.target.upgrade() {
            target.close(event);
        }
    }

    /// Whether the owning controller is still alive.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Whether both handles belong to the same controller.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.target, &other.target)
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Callable outside-click check for an overlay element.
#[derive(Clone)]
pub struct OverlayClick {
    target: Weak<dyn Dismiss>,
}

impl OverlayClick {
    pub(crate) fn new(target: Weak<dyn Dismiss>) -> Self {
        Self { target }
    }

    /// Close if `event` targets something outside the container.
    pub fn call(&self, event: &Event) {
        if let Some(target) = self.target.upgrade() {
            target.overlay_click(event);
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl fmt::Debug for OverlayClick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayClick")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<&'static str>>,
    }

    impl Dismiss for Recorder {
        fn close(&self, event: Option<&Event>) {
            self.calls
                .borrow_mut()
                .push(if event.is_some() { "close(event)" } else { "close" });
        }

        fn overlay_click(&self, _event: &Event) {
            self.calls.borrow_mut().push("overlay");
        }
    }

    #[test]
    fn handles_forward_while_target_lives() {
        let recorder = Rc::new(Recorder::default());
        let dyn_target: Rc<dyn Dismiss> = recorder.clone();
        let close = CloseHandle::new(Rc::downgrade(&dyn_target));
        let overlay = OverlayClick::new(Rc::downgrade(&dyn_target));

        close.call(None);
        close.call(Some(&Event::click(None)));
        overlay.call(&Event::click(None));

        assert_eq!(
            *recorder.calls.borrow(),
            vec!["close", "close(event)", "overlay"]
        );
        assert!(close.ptr_eq(&close.clone()));
    }

    #[test]
    fn handles_are_inert_after_target_drops() {
        let dyn_target: Rc<dyn Dismiss> = Rc::new(Recorder::default());
        let close = CloseHandle::new(Rc::downgrade(&dyn_target));
        let overlay = OverlayClick::new(Rc::downgrade(&dyn_target));
        drop(dyn_target);

        assert!(!close.is_live());
        assert!(!overlay.is_live());
        close.call(None);
        overlay.call(&Event::click(None));
        assert_eq!(format!("{close:?}"), "CloseHandle { live: false }");
    }
}
