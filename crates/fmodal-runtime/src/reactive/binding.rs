#![forbid(unsafe_code)]

//! Read-only bindings that derive a value from [`Observable`]s.
//!
//! A [`Binding<T>`] evaluates its transform on every `get()`, so it can never
//! be stale. That is the property a derived lifecycle value needs: the modal
//! state is a pure function of two flags and must be readable from timer
//! callbacks and event listeners without anyone "refreshing" it first.
//!
//! ```ignore
//! let open = Observable::new(true);
//! let rendered = Observable::new(false);
//! let label = bind_mapped2(&open, &rendered, |o, r| format!("{o}/{r}"));
//! assert_eq!(label.get(), "true/false");
//! ```
//!
//! # Invariants
//!
//! 1. `Binding::get()` always returns the current value.
//! 2. The transform runs on every `get()` (no caching).
//! 3. Clones share the same sources.

use std::rc::Rc;

use super::observable::Observable;

/// A read-only binding with a transform evaluated on each `get()`.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Create a binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Get the current bound value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }
}

/// Create a binding from two observables combined by `map`.
pub fn bind_mapped2<
    S1: Clone + PartialEq + 'static,
    S2: Clone + PartialEq + 'static,
    T: 'static,
>(
    s1: &Observable<S1>,
    s2: &Observable<S2>,
    map: impl Fn(&S1, &S2) -> T + 'static,
) -> Binding<T> {
    let src1 = s1.clone();
    let src2 = s2.clone();
    Binding {
        eval: Rc::new(move || src1.with(|v1| src2.with(|v2| map(v1, v2)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_map2_formats_current_values() {
        let open = Observable::new(true);
        let rendered = Observable::new(false);
        let label = bind_mapped2(&open, &rendered, |o, r| format!("{o}/{r}"));
        assert_eq!(label.get(), "true/false");

        rendered.set(true);
        assert_eq!(label.get(), "true/true");
    }

    #[test]
    fn binding_map2_tracks_both_sources() {
        let target = Observable::new(false);
        let rendered = Observable::new(false);
        let both = bind_mapped2(&target, &rendered, |t, r| (*t, *r));
        assert_eq!(both.get(), (false, false));

        target.set(true);
        assert_eq!(both.get(), (true, false));
        rendered.set(true);
        assert_eq!(both.get(), (true, true));
    }

    #[test]
    fn binding_clone_shares_source() {
        let x = Observable::new(1);
        let y = Observable::new(2);
        let a = bind_mapped2(&x, &y, |x, y| x + y);
        let b = a.clone();
        x.set(9);
        assert_eq!(a.get(), 11);
        assert_eq!(b.get(), 11);
    }

    #[test]
    fn binding_new_custom() {
        let b = Binding::new(|| "fixed");
        assert_eq!(b.get(), "fixed");
        assert_eq!(format!("{b:?}"), "Binding { value: \"fixed\" }");
    }
}
