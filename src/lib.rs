//! A contiguous growable array generic over its allocation strategy, with
//! pointer-like random-access cursors.
//!
//! ```
//! use growable_array::{growable, GrowableArray};
//!
//! let mut arr: GrowableArray<i32> = growable![10, 20, 30];
//! let at = arr.erase(1);
//! assert_eq!(arr[at], 30);
//! arr.insert(0, 5).unwrap();
//! assert_eq!(arr, [5, 10, 30]);
//! ```

pub mod algorithm;
pub mod alloc;
pub mod array;
pub mod cursor;
pub mod error;
pub mod reverse;

pub use crate::alloc::{AllocStats, AllocStrategy, Counting, Heap};
pub use crate::array::{swap, GrowableArray, IntoIter};
pub use crate::cursor::{Cursor, CursorMut, RandomCursor};
pub use crate::error::{ArrayError, Result};
pub use crate::reverse::ReverseCursor;

/// Build a [`GrowableArray`] on the global heap.
///
/// `growable![]` is empty, `growable![x; n]` holds `n` clones of `x`, and
/// `growable![a, b, c]` holds the listed values. Panics if the storage cannot be
/// allocated.
#[macro_export]
macro_rules! growable {
    () => {
        $crate::GrowableArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::GrowableArray::from_elem($n, $elem).unwrap_or_else(|err| panic!("{err}"))
    };
    ($($x:expr),+ $(,)?) => {
        <$crate::GrowableArray<_> as ::core::iter::FromIterator<_>>::from_iter([$($x),+])
    };
}

#[cfg(test)]
mod tests;
