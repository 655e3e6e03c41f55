#![forbid(unsafe_code)]

//! Reactive primitives for single-threaded UI state.
//!
//! - [`Observable`]: shared, version-tracked value with change notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Binding`]: lazily evaluated value derived from observables.
//! - [`LatestRef`]: slot holding the most recently supplied value, for
//!   callbacks that outlive the data they read.
//! - [`CleanupScope`]: owner of RAII guards released together.
//!
//! # Architecture
//!
//! Everything uses `Rc<RefCell<..>>` shared ownership and never holds a
//! borrow while running foreign callbacks, so callbacks may freely read the
//! primitives they were notified by.

pub mod binding;
pub mod latest;
pub mod observable;
pub mod scope;

pub use binding::{Binding, bind_mapped2};
pub use latest::LatestRef;
pub use observable::{Observable, Subscription};
pub use scope::CleanupScope;
