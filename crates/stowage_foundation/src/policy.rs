//! Per-call storage policies.
//!
//! Policies are chosen per operation rather than stored as global state.

/// Whether an operation validates its preconditions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Safety {
    /// Validate preconditions and report violations as errors.
    #[default]
    Checked,
    /// Skip validation and trust the caller.
    ///
    /// Preconditions are only asserted in debug builds. Violating them in a
    /// release build leaves the result unspecified (a panic or a wrong
    /// component), but never memory unsafety.
    Unchecked,
}

impl Safety {
    /// Returns true for [`Safety::Checked`].
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }
}

/// How bulk component removal treats absent components.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RemovePolicy {
    /// Every requested component type must be present; the first absent one
    /// fails the operation.
    Strict,
    /// Absent component types are skipped.
    #[default]
    Lax,
}
