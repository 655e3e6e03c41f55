#![forbid(unsafe_code)]

//! Runtime services for fmodal: timers, the top-level event target, and
//! reactive primitives.
//!
//! Everything here is single-threaded and cooperative. Work happens only when
//! the host delivers an event, fires due timers, or re-evaluates a component;
//! nothing blocks and nothing needs a lock.

pub mod event_target;
pub mod host;
pub mod reactive;
pub mod timer;

pub use event_target::{EventTarget, ListenerGuard, ListenerKind};
pub use host::Host;
pub use reactive::{Binding, CleanupScope, LatestRef, Observable, Subscription, bind_mapped2};
pub use timer::{MAX_FIRES_PER_RUN, TimerId, TimerQueue, TimerSlot};
