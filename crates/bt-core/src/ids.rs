//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering matters: the scheduler
//! visits agents of one priority bucket in ascending `AgentId` order, and the
//! workspace ticks contexts in ascending `ContextId` order.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// `true` unless this is the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so unassigned IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Context-local agent identifier, handed out by `AllocAgentId`.
    ///
    /// Ids start at 1 and are never reused within one context's lifetime;
    /// `INVALID` marks an agent that is not registered anywhere.
    pub struct AgentId(u32);
}

typed_id! {
    /// Identifier of a context inside a workspace directory.
    ///
    /// Valid context ids are non-negative.  [`ContextId::ALL`] is the
    /// "every context" sentinel accepted by tick, log and cleanup entry points.
    pub struct ContextId(i64);
}

impl ContextId {
    /// Sentinel selecting every context of a workspace.
    pub const ALL: ContextId = ContextId(-1);

    /// `true` for the [`ALL`](Self::ALL) sentinel.
    #[inline]
    pub fn is_all(self) -> bool {
        self == Self::ALL
    }

    /// `true` if this id may name a concrete context.
    #[inline]
    pub fn is_concrete(self) -> bool {
        self.0 >= 0 && self.is_valid()
    }
}
