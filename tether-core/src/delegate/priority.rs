//! Priority partitions and return-value policies.

use serde::{Deserialize, Serialize};

/// The fixed listener partitions of a [`Delegate`](super::Delegate).
///
/// Partitions run in declaration order, most privileged first. The order is
/// part of the contract: attaching to [`Priority::User`] before attaching to
/// [`Priority::ArgumentGuard`] still runs the guard first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Validates or filters arguments before anything else runs.
    ArgumentGuard,
    /// Reserved for binder listeners feeding a binding executor.
    Binder,
    /// Library bookkeeping that must precede user code.
    PreUtility,
    /// Listeners attached by library consumers.
    User,
    /// Library bookkeeping that must follow user code.
    PostUtility,
    /// Lowest priority catch-all, e.g. recursion breakers.
    Tail,
}

impl Priority {
    /// Number of partitions.
    pub const COUNT: usize = 6;

    /// Every partition in dispatch order.
    pub const ALL: [Priority; Self::COUNT] = [
        Priority::ArgumentGuard,
        Priority::Binder,
        Priority::PreUtility,
        Priority::User,
        Priority::PostUtility,
        Priority::Tail,
    ];

    /// Position of this partition in dispatch order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::User
    }
}

/// Maps the raw dispatch outcome to the delegate's own return value.
///
/// The raw outcome is `true` when every listener ran to completion and
/// `false` when one of them stopped the dispatch early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnPolicy {
    /// Always report `true`.
    AlwaysTrue,
    /// Always report `false`.
    AlwaysFalse,
    /// Report the raw outcome.
    #[default]
    UseChild,
    /// Report the negated raw outcome.
    InverseChild,
}

impl ReturnPolicy {
    /// Convert a raw dispatch outcome.
    pub fn convert(self, completed: bool) -> bool {
        match self {
            ReturnPolicy::AlwaysTrue => true,
            ReturnPolicy::AlwaysFalse => false,
            ReturnPolicy::UseChild => completed,
            ReturnPolicy::InverseChild => !completed,
        }
    }
}
