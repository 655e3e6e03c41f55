#![forbid(unsafe_code)]

//! Modal lifecycle: configuration, discrete state, controller, and snapshot.
//!
//! # Lifecycle
//!
//! A modal's visibility lags the caller's `open` flag by the animation
//! duration on entry and exit. The [`ModalController`] tracks that lag with a
//! single timer and reports it as a [`ModalState`]:
//!
//! ```text
//! open=true            +D                  open=false           +D
//! Closed ──────▶ Opening ──────▶ Opened ──────▶ Closing ──────▶ Closed
//! ```
//!
//! Without animation the intermediate states are skipped.
//!
//! # Example
//!
//! ```ignore
//! use fmodal::{Host, ModalConfig, ModalController};
//!
//! let host = Host::system();
//! let modal = ModalController::new(&host);
//!
//! let snapshot = modal.evaluate(
//!     ModalConfig::new()
//!         .open(true)
//!         .animated(true)
//!         .on_close(|_| println!("dismissed")),
//! );
//! if snapshot.is_visible() {
//!     // render, attaching snapshot.container to the surface
//! }
//! ```

mod config;
mod controller;
mod policy;
mod snapshot;
mod state;

pub use config::{
    DEFAULT_ANIMATION_DURATION, ModalConfig, OnClose, OutsideClickGate, OutsideClickMode,
};
pub use controller::ModalController;
pub use policy::{MAX_ANIMATION_DURATION_MS, ModalPolicy, ModalPolicyError};
pub use snapshot::{CloseHandle, ModalSnapshot, OverlayClick};
pub use state::ModalState;
