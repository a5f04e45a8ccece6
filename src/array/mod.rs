//! 可增长数组本体
//!
//! 存储布局与失效规则:
//!
//! * 槽位 `[0, len)` 存放存活的值，`[len, cap)` 已分配但未初始化；
//! * 第一次增长之前不分配内存；迁移到新内存块时按顺序搬移全部元素，之后才释放旧块；
//! * 游标借用数组，任何修改操作都会结束所有未归还的游标；
//! * `usize` 位置在修改之后是否仍然有效，以各方法的说明为准。

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

use tracing::{debug, trace};

use crate::alloc::{AllocStrategy, Heap};
use crate::cursor::{Cursor, CursorMut, RandomCursor};
use crate::error::{ArrayError, Result};
use crate::reverse::ReverseCursor;

mod cmp;
mod into_iter;
mod mutate;
#[cfg(feature = "serde")]
mod serde_impl;

pub use into_iter::IntoIter;
pub use mutate::swap;

/// 连续存储的可增长数组，内存通过 [`AllocStrategy`] 管理
pub struct GrowableArray<T, A: AllocStrategy = Heap> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: 数组独占其存储；只要 T 和分配策略可以跨线程转移，整个数组就可以
unsafe impl<T: Send, A: AllocStrategy + Send> Send for GrowableArray<T, A> {}
// SAFETY: 共享引用只暴露 &[T] 与 &A
unsafe impl<T: Sync, A: AllocStrategy + Sync> Sync for GrowableArray<T, A> {}

impl<T> GrowableArray<T> {
    /// 在全局堆上创建空数组，不分配内存
    pub fn new() -> Self {
        Self::new_in(Heap)
    }

    /// 创建恰好具有 `capacity` 个槽位的空数组
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Heap)
    }

    /// 由 `n` 个 `value` 的克隆组成，恰好占用 `n` 个槽位
    pub fn from_elem(n: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, Heap)
    }

    /// 克隆 `[first, last)` 中的元素，容量恰好等于元素个数
    pub fn from_range<C>(first: C, last: C) -> Result<Self>
    where
        C: RandomCursor<Item = T>,
        T: Clone,
    {
        Self::from_range_in(first, last, Heap)
    }
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: AllocStrategy> GrowableArray<T, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut array = Self::new_in(alloc);
        array.reserve(capacity)?;
        Ok(array)
    }

    pub fn from_elem_in(n: usize, value: T, alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let mut array = Self::with_capacity_in(n, alloc)?;
        for _ in 0..n {
            // SAFETY: 容量恰好为 n
            unsafe { array.write_next(value.clone()) };
        }
        Ok(array)
    }

    pub fn from_range_in<C>(first: C, last: C, alloc: A) -> Result<Self>
    where
        C: RandomCursor<Item = T>,
        T: Clone,
    {
        let n = range_len(&first, &last);
        let mut array = Self::with_capacity_in(n, alloc)?;
        for i in 0..n {
            // SAFETY: 容量恰好为 n
            unsafe { array.write_next(read_range(&first, i).clone()) };
        }
        Ok(array)
    }

    /// 深拷贝，容量与 `self` 相同
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::with_capacity_in(self.cap, self.alloc.clone())?;
        for value in self.iter() {
            // SAFETY: copy.cap == self.cap >= self.len
            unsafe { copy.write_next(value.clone()) };
        }
        Ok(copy)
    }

    /// 存活元素个数
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 已分配的槽位数
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// 分配策略给出的元素个数上限
    pub fn max_size(&self) -> usize {
        self.alloc.max_size::<T>()
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// 保证总容量至少为 `n`，从不缩容
    ///
    /// 需要重新分配时恰好分配 `n` 个槽位。`n > max_size()` 时在调用分配器之前返回
    /// [`ArrayError::Length`]；遇到 [`ArrayError::AllocationFailure`] 时数组保持不变。
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        self.check_length(n)?;
        if n > self.cap {
            self.reallocate(n)?;
        }
        Ok(())
    }

    /// 重新分配为恰好 `len` 个槽位，数组为空时直接释放存储
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.len == self.cap {
            return Ok(());
        }
        if self.len == 0 {
            self.release_storage();
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// 缩短时从尾部析构到 `n` 个元素，增长时在末尾构造 `value` 的克隆
    pub fn resize(&mut self, n: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.resize_with(n, || value.clone())
    }

    pub fn resize_with(&mut self, n: usize, mut f: impl FnMut() -> T) -> Result<()> {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        self.grow_for(n)?;
        while self.len < n {
            // SAFETY: grow_for 保证 cap >= n
            unsafe { self.write_next(f()) };
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) 均已初始化；空数组时指针悬垂但对齐
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: 同上，且 &mut self 保证独占
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// 带边界检查的访问
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::OutOfRange { index, len })
    }

    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), 0)
    }

    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.len)
    }

    /// 位于 `index` 的游标，`index` 可以等于 `len()`
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), index)
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self.as_mut_slice(), 0)
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let len = self.len;
        CursorMut::new(self.as_mut_slice(), len)
    }

    pub fn rbegin(&self) -> ReverseCursor<Cursor<'_, T>> {
        ReverseCursor::new(self.end())
    }

    pub fn rend(&self) -> ReverseCursor<Cursor<'_, T>> {
        ReverseCursor::new(self.begin())
    }

    pub fn rbegin_mut(&mut self) -> ReverseCursor<CursorMut<'_, T>> {
        ReverseCursor::new(self.end_mut())
    }

    pub fn rend_mut(&mut self) -> ReverseCursor<CursorMut<'_, T>> {
        ReverseCursor::new(self.begin_mut())
    }

    fn check_length(&self, requested: usize) -> Result<()> {
        let max = self.max_size();
        if requested > max {
            debug!(requested, max, "length check rejected request");
            return Err(ArrayError::Length { requested, max });
        }
        Ok(())
    }

    /// 按翻倍策略为 `required` 个元素预留空间
    fn grow_for(&mut self, required: usize) -> Result<()> {
        if required <= self.cap {
            return Ok(());
        }
        self.check_length(required)?;
        let new_cap = self.cap.saturating_mul(2).max(required).min(self.max_size());
        self.reallocate(new_cap)
    }

    /// 把所有存活元素搬到一块新的 `new_cap` 槽位内存中
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        let new_ptr = self.allocate(new_cap)?;
        // SAFETY: 两块内存互不重叠，新区域至少容纳 len 个元素；
        // 旧区域中的值被逻辑上移走，只释放内存不析构
        unsafe {
            self.alloc
                .relocate(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
        }
        let old_cap = self.cap;
        self.free_region();
        self.ptr = new_ptr;
        self.cap = new_cap;
        trace!(old_cap, new_cap, len = self.len, "reallocated storage");
        Ok(())
    }

    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        self.alloc.allocate::<T>(slots).inspect_err(|err| {
            debug!(slots, error = %err, "allocation failed");
        })
    }

    /// 把内存块交还给分配策略，不触碰其中的内容
    fn free_region(&mut self) {
        if self.cap != 0 {
            // SAFETY: ptr/cap 来自同一次 allocate
            unsafe { self.alloc.deallocate(self.ptr, self.cap) };
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// 析构所有元素并释放内存块
    fn release_storage(&mut self) {
        self.clear();
        if self.cap != 0 {
            trace!(cap = self.cap, "released storage");
        }
        self.free_region();
    }

    /// 释放当前内存块，换上一块新分配的空内存
    fn replace_storage(&mut self, ptr: NonNull<T>, cap: usize) {
        self.release_storage();
        self.ptr = ptr;
        self.cap = cap;
    }

    /// 在第一个空闲槽位上构造 `value`
    ///
    /// # Safety
    ///
    /// 调用方须保证 `len < cap`
    unsafe fn write_next(&mut self, value: T) {
        debug_assert!(self.len < self.cap);
        // SAFETY: 调用方保证有足够的容量
        unsafe { self.alloc.construct(self.ptr.as_ptr().add(self.len), value) };
        // 只有在写入成功后才增加 len
        self.len += 1;
    }
}

impl<T, A: AllocStrategy> Drop for GrowableArray<T, A> {
    fn drop(&mut self) {
        self.release_storage();
    }
}

impl<T, A: AllocStrategy> Deref for GrowableArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: AllocStrategy> DerefMut for GrowableArray<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: AllocStrategy> AsRef<[T]> for GrowableArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: AllocStrategy> AsMut<[T]> for GrowableArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, A: AllocStrategy + Clone> Clone for GrowableArray<T, A> {
    /// 分配策略无法提供存储时 panic；需要处理该情况请使用 [`GrowableArray::try_clone`]
    fn clone(&self) -> Self {
        expect_alloc(self.try_clone())
    }

    fn clone_from(&mut self, source: &Self) {
        expect_alloc(self.assign_from(source));
    }
}

impl<'a, T, A: AllocStrategy> IntoIterator for &'a GrowableArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: AllocStrategy> IntoIterator for &'a mut GrowableArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, A: AllocStrategy> Extend<T> for GrowableArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        expect_alloc(self.grow_for(self.len.saturating_add(lower)));
        for value in iter {
            expect_alloc(self.push_back(value));
        }
    }
}

impl<'a, T: Copy + 'a, A: AllocStrategy> Extend<&'a T> for GrowableArray<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> From<Vec<T>> for GrowableArray<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> From<&[T]> for GrowableArray<T> {
    fn from(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for GrowableArray<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

/// 供没有错误通道的 trait 实现使用：分配失败时与 `Vec` 一样中止操作
fn expect_alloc<R>(result: Result<R>) -> R {
    result.unwrap_or_else(|err| panic!("{err}"))
}

fn range_len<C: RandomCursor>(first: &C, last: &C) -> usize {
    usize::try_from(last.position() - first.position()).unwrap_or(0)
}

fn read_range<C: RandomCursor>(first: &C, i: usize) -> &C::Item {
    match first.peek(i as isize) {
        Some(value) => value,
        None => panic!("cursor range runs past its storage at offset {i}"),
    }
}
