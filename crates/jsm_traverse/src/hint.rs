/// How much of a traversal is known before it is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeHint {
    /// Exactly this many items remain.
    Exact(usize),
    /// Roughly this many items remain; lookups may drop some.
    Estimated(usize),
    Unknown,
}

impl SizeHint {
    pub fn exact(&self) -> Option<usize> {
        match self {
            SizeHint::Exact(count) => Some(*count),
            _ => None,
        }
    }

    /// Bounds in the shape of [`Iterator::size_hint`].
    pub fn bounds(&self) -> (usize, Option<usize>) {
        match self {
            SizeHint::Exact(count) => (*count, Some(*count)),
            SizeHint::Estimated(_) | SizeHint::Unknown => (0, None),
        }
    }
}

pub trait Traversal: Iterator {
    fn size(&self) -> SizeHint;
}
