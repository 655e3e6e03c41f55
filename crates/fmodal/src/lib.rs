#![forbid(unsafe_code)]

//! Modal lifecycle controller.
//!
//! `fmodal` decides when an overlay surface is present, runs the optional
//! entry and exit animation window, remembers whether the surface was ever
//! shown, and turns outside clicks and the Escape key into a single close
//! notification.
//!
//! The controller is headless. A renderer evaluates it with a
//! [`ModalConfig`] on every relevant change and draws from the returned
//! [`ModalSnapshot`]. Timers and global listeners come from a
//! [`Host`](fmodal_runtime::Host).
//!
//! # Feature Flags
//!
//! - `tracing`: structured logs of state changes, timer scheduling and
//!   dismissal decisions.
//! - `policy-config`: load a [`ModalPolicy`] from TOML or JSON.

pub mod modal;

pub use modal::{
    CloseHandle, DEFAULT_ANIMATION_DURATION, MAX_ANIMATION_DURATION_MS, ModalConfig,
    ModalController, ModalPolicy, ModalPolicyError, ModalSnapshot, ModalState, OnClose,
    OutsideClickGate, OutsideClickMode, OverlayClick,
};

pub use fmodal_core::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent};
pub use fmodal_core::node::{Containment, NodeId, NodeRef, NodeTree, TreeNode};
pub use fmodal_runtime::{Host, Subscription};
