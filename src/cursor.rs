//! 连续存储上的随机访问游标
//!
//! 游标是借用的一段元素中的一个位置，用法类似指针：可以按任意有符号偏移移动，
//! 可以与另一个游标相减，也可以比较大小。与指针不同，越过两端移动是无害的，
//! 只有解引用时才检查位置，返回 `None`（使用 `[]` 时 panic）。
//!
//! 游标借用其来源数组，数组被修改之后借用检查器会拒绝继续使用游标。
//! 因此数组的修改操作接收并返回 `usize` 位置，参见 [`Cursor::as_index`]。

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};
use std::ptr;

/// 所有游标类型共享的类指针导航
pub trait RandomCursor {
    type Item;

    /// 有符号位置，同一存储上的游标按它排序
    fn position(&self) -> isize;

    /// 移动 `n` 格，负数表示向后
    fn step(&mut self, n: isize);

    /// 距当前位置 `n` 格的元素
    fn peek(&self, n: isize) -> Option<&Self::Item>;

    fn get(&self) -> Option<&Self::Item> {
        self.peek(0)
    }

    fn inc(&mut self) {
        self.step(1);
    }

    fn dec(&mut self) {
        self.step(-1);
    }

    /// 从 `self` 到 `other` 的有符号步数
    fn distance(&self, other: &Self) -> isize
    where
        Self: Sized,
    {
        other.position() - self.position()
    }
}

fn slot(pos: isize, n: isize, len: usize) -> Option<usize> {
    pos.checked_add(n)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < len)
}

/// 只读游标
pub struct Cursor<'a, T> {
    slice: &'a [T],
    pos: isize,
}

impl<'a, T> Cursor<'a, T> {
    pub fn new(slice: &'a [T], pos: usize) -> Self {
        Self {
            slice,
            pos: pos as isize,
        }
    }

    /// 游标处的元素，借用期与整个存储相同
    pub fn current(&self) -> Option<&'a T> {
        self.at(0)
    }

    pub fn at(&self, n: isize) -> Option<&'a T> {
        let slice = self.slice;
        slot(self.pos, n, slice.len()).map(|i| &slice[i])
    }

    /// 把位置转换为可用于数组修改方法的下标
    ///
    /// 游标位于存储起点之前时 panic。
    pub fn as_index(&self) -> usize {
        usize::try_from(self.pos).unwrap_or_else(|_| {
            panic!("cursor position {} is before the start", self.pos)
        })
    }

    fn same_storage(&self, other: &Self) -> bool {
        ptr::eq(self.slice.as_ptr(), other.slice.as_ptr())
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<T> RandomCursor for Cursor<'_, T> {
    type Item = T;

    fn position(&self) -> isize {
        self.pos
    }

    fn step(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add(n);
    }

    fn peek(&self, n: isize) -> Option<&T> {
        self.at(n)
    }
}

impl<T> Add<isize> for Cursor<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self.step(n);
        self
    }
}

impl<T> Sub<isize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self.step(n.wrapping_neg());
        self
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.step(n);
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.step(n.wrapping_neg());
    }
}

impl<T> Sub for Cursor<'_, T> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        debug_assert!(self.same_storage(&other), "cursors over different storage");
        self.pos - other.pos
    }
}

impl<T> Index<isize> for Cursor<'_, T> {
    type Output = T;

    fn index(&self, n: isize) -> &T {
        match self.at(n) {
            Some(value) => value,
            None => panic!("cursor offset {n} out of range"),
        }
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(self.same_storage(other), "cursors over different storage");
        self.pos == other.pos
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Cursor<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert!(self.same_storage(other), "cursors over different storage");
        self.pos.cmp(&other.pos)
    }
}

/// 可以写入所访问元素的游标
///
/// 它持有存储的唯一借用，因此不是 `Copy`；需要只读游标的地方可以通过 `From`
/// 转换为 [`Cursor`]。
pub struct CursorMut<'a, T> {
    slice: &'a mut [T],
    pos: isize,
}

impl<'a, T> CursorMut<'a, T> {
    pub fn new(slice: &'a mut [T], pos: usize) -> Self {
        Self {
            slice,
            pos: pos as isize,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.peek_mut(0)
    }

    pub fn peek_mut(&mut self, n: isize) -> Option<&mut T> {
        let i = slot(self.pos, n, self.slice.len())?;
        Some(&mut self.slice[i])
    }

    /// 同一位置上的只读视图，对存储重新借用
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            slice: &*self.slice,
            pos: self.pos,
        }
    }

    pub fn as_index(&self) -> usize {
        self.as_cursor().as_index()
    }
}

impl<T> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("pos", &self.pos)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<'a, T> From<CursorMut<'a, T>> for Cursor<'a, T> {
    fn from(cursor: CursorMut<'a, T>) -> Self {
        Cursor {
            slice: cursor.slice,
            pos: cursor.pos,
        }
    }
}

impl<T> RandomCursor for CursorMut<'_, T> {
    type Item = T;

    fn position(&self) -> isize {
        self.pos
    }

    fn step(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add(n);
    }

    fn peek(&self, n: isize) -> Option<&T> {
        slot(self.pos, n, self.slice.len()).map(|i| &self.slice[i])
    }
}

impl<T> Add<isize> for CursorMut<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self.step(n);
        self
    }
}

impl<T> Sub<isize> for CursorMut<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self.step(n.wrapping_neg());
        self
    }
}

impl<T> AddAssign<isize> for CursorMut<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.step(n);
    }
}

impl<T> SubAssign<isize> for CursorMut<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.step(n.wrapping_neg());
    }
}

impl<T> Index<isize> for CursorMut<'_, T> {
    type Output = T;

    fn index(&self, n: isize) -> &T {
        match self.peek(n) {
            Some(value) => value,
            None => panic!("cursor offset {n} out of range"),
        }
    }
}

impl<T> IndexMut<isize> for CursorMut<'_, T> {
    fn index_mut(&mut self, n: isize) -> &mut T {
        match self.peek_mut(n) {
            Some(value) => value,
            None => panic!("cursor offset {n} out of range"),
        }
    }
}

impl<T> PartialEq for CursorMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl<T> PartialOrd for CursorMut<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.pos.cmp(&other.pos))
    }
}
