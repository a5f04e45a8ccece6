use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Index, Sub, SubAssign};

use crate::cursor::{CursorMut, RandomCursor};

/// Walks the storage of a base cursor back to front.
///
/// Logical position `i` refers to physical position `i - 1` of the wrapped cursor,
/// so `ReverseCursor::new(end)` yields the last element and
/// `ReverseCursor::new(begin)` is one past the first.
#[derive(Debug, Clone, Copy)]
pub struct ReverseCursor<C> {
    base: C,
}

impl<C: RandomCursor> ReverseCursor<C> {
    pub fn new(base: C) -> Self {
        Self { base }
    }

    /// Copy of the wrapped forward cursor.
    pub fn base(&self) -> C
    where
        C: Clone,
    {
        self.base.clone()
    }

    pub fn into_base(self) -> C {
        self.base
    }
}

impl<'a, T> ReverseCursor<CursorMut<'a, T>> {
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.base.peek_mut(-1)
    }
}

impl<C> From<C> for ReverseCursor<C> {
    fn from(base: C) -> Self {
        Self { base }
    }
}

impl<C: RandomCursor> RandomCursor for ReverseCursor<C> {
    type Item = C::Item;

    fn position(&self) -> isize {
        self.base.position().wrapping_neg()
    }

    fn step(&mut self, n: isize) {
        self.base.step(n.wrapping_neg());
    }

    fn peek(&self, n: isize) -> Option<&C::Item> {
        self.base.peek((-1isize).wrapping_sub(n))
    }
}

impl<C: RandomCursor> Add<isize> for ReverseCursor<C> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self.step(n);
        self
    }
}

impl<C: RandomCursor> Sub<isize> for ReverseCursor<C> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self.step(n.wrapping_neg());
        self
    }
}

impl<C: RandomCursor> AddAssign<isize> for ReverseCursor<C> {
    fn add_assign(&mut self, n: isize) {
        self.step(n);
    }
}

impl<C: RandomCursor> SubAssign<isize> for ReverseCursor<C> {
    fn sub_assign(&mut self, n: isize) {
        self.step(n.wrapping_neg());
    }
}

impl<C: RandomCursor> Sub for ReverseCursor<C> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        self.position() - other.position()
    }
}

impl<C: RandomCursor> Index<isize> for ReverseCursor<C> {
    type Output = C::Item;

    fn index(&self, n: isize) -> &C::Item {
        match self.peek(n) {
            Some(value) => value,
            None => panic!("reverse cursor offset {n} out of range"),
        }
    }
}

impl<C: RandomCursor> PartialEq for ReverseCursor<C> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<C: RandomCursor> Eq for ReverseCursor<C> {}

impl<C: RandomCursor> PartialOrd for ReverseCursor<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: RandomCursor> Ord for ReverseCursor<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position().cmp(&other.position())
    }
}
