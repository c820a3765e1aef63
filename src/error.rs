use std::{error, fmt};

/// LlrbError enumerates over all possible errors that this package
/// shall return. Insertion and lookup never fail, only a structural
/// check via [`Llrb::validate`] can report one of these.
///
/// [`Llrb::validate`]: crate::Llrb::validate
#[derive(Debug, PartialEq)]
pub enum LlrbError<K>
where
    K: Clone + Ord,
{
    /// Fatal case, breaking one of the two LLRB rules.
    ConsecutiveReds,
    /// Fatal case, a red link is leaning to the right.
    RightLeaningRed,
    /// Fatal case, breaking one of the two LLRB rules. The String
    /// component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, keys are not in sort-order, (child, parent).
    SortError(K, K),
    /// Fatal case, cached sub-tree size does not add up.
    CountMismatch { expected: usize, found: usize },
    /// Fatal case, root link is left red after a mutation.
    RedRoot,
}

impl<K> fmt::Display for LlrbError<K>
where
    K: Clone + Ord + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LlrbError::ConsecutiveReds => write!(f, "consecutive red links"),
            LlrbError::RightLeaningRed => write!(f, "red link leaning right"),
            LlrbError::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            LlrbError::SortError(child, parent) => {
                write!(f, "sort error, child {:?} parent {:?}", child, parent)
            }
            LlrbError::CountMismatch { expected, found } => {
                write!(f, "count mismatch, expected {} found {}", expected, found)
            }
            LlrbError::RedRoot => write!(f, "root is red"),
        }
    }
}

impl<K> error::Error for LlrbError<K> where K: Clone + Ord + fmt::Debug {}
