//! Boundary behavior of the indexed world.

/// How the grid treats the faces of its world bounds.
///
/// # Examples
///
/// ```
/// use vivarium_space::EdgeBehavior;
///
/// assert!(EdgeBehavior::Wrap.is_periodic());
/// assert!(!EdgeBehavior::Bounded.is_periodic());
/// assert_eq!(EdgeBehavior::from_code(EdgeBehavior::Wrap.code()), Some(EdgeBehavior::Wrap));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Opposite faces are adjacent (torus topology). Positions outside the
    /// bounds wrap back in; distances are measured the short way round.
    #[default]
    Wrap,
    /// Positions must lie inside the bounds (max face inclusive) and
    /// distances are plain Euclidean.
    Bounded,
}

impl EdgeBehavior {
    /// Whether the world wraps around.
    #[inline]
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Wrap)
    }

    /// Stable numeric code used in persisted grid frames.
    pub fn code(self) -> u32 {
        match self {
            Self::Wrap => 1,
            Self::Bounded => 2,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Wrap),
            2 => Some(Self::Bounded),
            _ => None,
        }
    }
}
