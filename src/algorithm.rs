//! Sequence comparisons over cursor ranges.

use std::cmp::Ordering;

use crate::cursor::RandomCursor;

/// Whether `[first1, last1)` matches the same number of elements starting at `first2`.
///
/// The second range must hold at least as many elements as the first; a second cursor
/// that runs off its storage makes the ranges unequal.
pub fn equal<A, B>(mut first1: A, last1: A, mut first2: B) -> bool
where
    A: RandomCursor,
    B: RandomCursor,
    A::Item: PartialEq<B::Item>,
{
    while first1.position() != last1.position() {
        match (first1.get(), first2.get()) {
            (Some(a), Some(b)) if a == b => {}
            _ => return false,
        }
        first1.inc();
        first2.inc();
    }
    true
}

/// Whether `[first1, last1)` orders strictly before `[first2, last2)`.
///
/// The first mismatching pair decides; a strict prefix orders first. Incomparable
/// pairs (`partial_cmp` returning `None`) are skipped like equal ones.
pub fn lexicographical_compare<A, B>(mut first1: A, last1: A, mut first2: B, last2: B) -> bool
where
    A: RandomCursor,
    B: RandomCursor,
    A::Item: PartialOrd<B::Item>,
{
    while first1.position() != last1.position() {
        if first2.position() == last2.position() {
            return false;
        }
        let (Some(a), Some(b)) = (first1.get(), first2.get()) else {
            return false;
        };
        match a.partial_cmp(b) {
            Some(Ordering::Less) => return true,
            Some(Ordering::Greater) => return false,
            _ => {}
        }
        first1.inc();
        first2.inc();
    }
    first2.position() != last2.position()
}
