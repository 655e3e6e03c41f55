#![forbid(unsafe_code)]

//! Discrete lifecycle state.
//!
//! State machine: Closed → Opening → Opened → Closing → Closed
//!
//! The state is never stored. It is derived from two flags on every read:
//!
//! | effective open | locally rendered | state     |
//! |----------------|------------------|-----------|
//! | false          | false            | `Closed`  |
//! | false          | true             | `Closing` |
//! | true           | false            | `Opening` |
//! | true           | true             | `Opened`  |
//!
//! Rapid toggling can skip phases (e.g., Opening → Closed directly when the
//! target flips back before the entry timer fires).

/// Current phase of the modal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalState {
    /// Not present.
    #[default]
    Closed,
    /// Entry animation in flight.
    Opening,
    /// Fully present.
    Opened,
    /// Exit animation in flight.
    Closing,
}

impl ModalState {
    /// Derive the state from the effective target and the rendered flag.
    #[inline]
    #[must_use]
    pub const fn from_flags(effective_open: bool, locally_rendered: bool) -> Self {
        match (effective_open, locally_rendered) {
            (false, false) => Self::Closed,
            (false, true) => Self::Closing,
            (true, false) => Self::Opening,
            (true, true) => Self::Opened,
        }
    }

    /// Lowercase name, as used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Opened => "opened",
            Self::Closing => "closing",
        }
    }

    /// Check if the surface should be rendered.
    #[inline]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Check if an animation is in progress.
    #[inline]
    #[must_use]
    pub const fn is_animating(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// Whether the surface is heading towards (or at) full presence.
    ///
    /// The latched value follows the configuration only in these states.
    #[inline]
    #[must_use]
    pub const fn is_presenting(self) -> bool {
        matches!(self, Self::Opening | Self::Opened)
    }
}

impl std::fmt::Display for ModalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
