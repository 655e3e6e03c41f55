#![forbid(unsafe_code)]

//! Core: input events, node handles, and the logging facade.
//!
//! # Role in fmodal
//! `fmodal-core` is the vocabulary layer. It defines the canonical events the
//! host delivers to the top-level event target, the node handles a modal uses
//! to tell "inside" from "outside", and a logging facade that compiles to
//! nothing when the `tracing` feature is off.
//!
//! # How it fits in the system
//! `fmodal-runtime` dispatches [`event::Event`] values to listeners and owns
//! timers. `fmodal` builds the lifecycle controller on top of both.

pub mod event;
pub mod logging;
pub mod node;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use node::{Containment, NodeId, NodeRef, NodeTree, TreeNode};
