//! List index forms and their resolution into positions

use crate::tree::node::NodeId;

/// Selects members of a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListIndex {
    /// Every current member.
    All,
    /// One position; negative values count from the end.
    Single(isize),
    /// A contiguous range resolved with slice semantics against the current length.
    Range {
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    },
    /// The position of a member node.
    ByIdentity(NodeId),
}

impl ListIndex {
    /// `start..stop` with unit step.
    pub fn range(start: isize, stop: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// `[:]`
    pub fn full_range() -> Self {
        Self::Range {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// True for forms that may select more than one member.
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::All | Self::Range { .. })
    }
}

impl From<usize> for ListIndex {
    fn from(i: usize) -> Self {
        // past the end either way; must not wrap into a count from the end
        Self::Single(isize::try_from(i).unwrap_or(isize::MAX))
    }
}

impl From<isize> for ListIndex {
    fn from(i: isize) -> Self {
        Self::Single(i)
    }
}

impl From<i32> for ListIndex {
    fn from(i: i32) -> Self {
        Self::Single(i as isize)
    }
}

impl From<NodeId> for ListIndex {
    fn from(node: NodeId) -> Self {
        Self::ByIdentity(node)
    }
}

/// Positions selected by a slice over a sequence of length `len`.
///
/// Start and stop are clamped to the sequence the way an ordinary slice is;
/// a negative step walks backwards. Returns `None` for a zero step.
pub fn slice_positions(
    len: usize,
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
) -> Option<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return None;
    }

    let len = len as isize;
    let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

    let clamp = |bound: Option<isize>, default: isize| match bound {
        None => default,
        Some(b) if b < 0 => (b + len).max(lower),
        Some(b) => b.min(upper),
    };

    let start = clamp(start, if step < 0 { upper } else { lower });
    let stop = clamp(stop, if step < 0 { lower } else { upper });

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        positions.push(i as usize);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Some(positions)
}
