use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::GrowableArray;
use crate::algorithm::{equal, lexicographical_compare};
use crate::alloc::AllocStrategy;

impl<T, U, A, B> PartialEq<GrowableArray<U, B>> for GrowableArray<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy,
    B: AllocStrategy,
{
    fn eq(&self, other: &GrowableArray<U, B>) -> bool {
        self.len() == other.len() && equal(self.begin(), self.end(), other.begin())
    }
}

impl<T: Eq, A: AllocStrategy> Eq for GrowableArray<T, A> {}

impl<T, U, A: AllocStrategy> PartialEq<[U]> for GrowableArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: AllocStrategy> PartialEq<&[U]> for GrowableArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A: AllocStrategy, const N: usize> PartialEq<[U; N]> for GrowableArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: AllocStrategy> PartialEq<Vec<U>> for GrowableArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

/// 字典序。`<` 是基本操作，`<=`、`>`、`>=` 分别由 `!(b < a)`、`b < a`、`!(a < b)` 推出
impl<T, A, B> PartialOrd<GrowableArray<T, B>> for GrowableArray<T, A>
where
    T: PartialOrd,
    A: AllocStrategy,
    B: AllocStrategy,
{
    fn partial_cmp(&self, other: &GrowableArray<T, B>) -> Option<Ordering> {
        if self.lt(other) {
            Some(Ordering::Less)
        } else if self.gt(other) {
            Some(Ordering::Greater)
        } else if self == other {
            Some(Ordering::Equal)
        } else {
            None
        }
    }

    fn lt(&self, other: &GrowableArray<T, B>) -> bool {
        lexicographical_compare(self.begin(), self.end(), other.begin(), other.end())
    }

    fn le(&self, other: &GrowableArray<T, B>) -> bool {
        !lexicographical_compare(other.begin(), other.end(), self.begin(), self.end())
    }

    fn gt(&self, other: &GrowableArray<T, B>) -> bool {
        lexicographical_compare(other.begin(), other.end(), self.begin(), self.end())
    }

    fn ge(&self, other: &GrowableArray<T, B>) -> bool {
        !self.lt(other)
    }
}

impl<T: Ord, A: AllocStrategy> Ord for GrowableArray<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.lt(other) {
            Ordering::Less
        } else if self.gt(other) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<T: Hash, A: AllocStrategy> Hash for GrowableArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug, A: AllocStrategy> fmt::Debug for GrowableArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
