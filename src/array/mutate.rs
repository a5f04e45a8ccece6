use std::mem;
use std::ptr;

use super::{read_range, range_len, GrowableArray};
use crate::alloc::AllocStrategy;
use crate::cursor::RandomCursor;
use crate::error::{ArrayError, Result};

/// `[start, start + width)` 是一段未初始化的空洞，其后跟着 `tail` 个存活元素。
/// 守卫析构时把尾部左移填平空洞并修正 `len`，即使填充或清空过程中发生 panic，
/// 数组也会回到一致状态。
struct Hole<'a, T, A: AllocStrategy> {
    array: &'a mut GrowableArray<T, A>,
    start: usize,
    width: usize,
    tail: usize,
}

impl<T, A: AllocStrategy> Hole<'_, T, A> {
    /// 在空洞最前面构造 `value`，空洞缩小一格
    fn fill(&mut self, value: T) {
        debug_assert!(self.width > 0);
        // SAFETY: start 处于空洞内，尚未初始化
        unsafe {
            let slot = self.array.ptr.as_ptr().add(self.start);
            self.array.alloc.construct(slot, value);
        }
        self.start += 1;
        self.width -= 1;
    }
}

impl<T, A: AllocStrategy> Drop for Hole<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: 尾部元素整体左移，ptr::copy 允许重叠
        unsafe {
            let base = self.array.ptr.as_ptr();
            ptr::copy(
                base.add(self.start + self.width),
                base.add(self.start),
                self.tail,
            );
        }
        self.array.len = self.start + self.tail;
    }
}

impl<T, A: AllocStrategy> GrowableArray<T, A> {
    /// 在末尾追加 `value`，容量用尽时先翻倍
    ///
    /// 已有位置保持有效；重新分配只会结束未归还的游标。
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.len == self.cap {
            let required = self.len.checked_add(1).ok_or_else(|| self.overflow())?;
            self.grow_for(required)?;
        }
        // SAFETY: 上面已确保 len < cap
        unsafe { self.write_next(value) };
        Ok(())
    }

    /// 移除并返回最后一个元素，数组为空时返回 `None`
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: len 已减 1，该位置是有效的已初始化元素
            Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
        }
    }

    /// 在 `index` 之前插入 `value`，返回 `index`
    ///
    /// `index > len()` 时 panic。`index` 之前的位置仍指向原来的元素，之后的位置后移一格。
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize> {
        let mut value = Some(value);
        self.insert_with(index, 1, |_| {
            value.take().unwrap_or_else(|| unreachable!("single insert filled twice"))
        })
    }

    /// 在 `index` 之前插入 `n` 个 `value` 的克隆
    pub fn insert_n(&mut self, index: usize, n: usize, value: &T) -> Result<usize>
    where
        T: Clone,
    {
        self.insert_with(index, n, |_| value.clone())
    }

    /// 在 `index` 之前插入 `[first, last)` 的克隆
    pub fn insert_range<C>(&mut self, index: usize, first: C, last: C) -> Result<usize>
    where
        C: RandomCursor<Item = T>,
        T: Clone,
    {
        let n = range_len(&first, &last);
        self.insert_with(index, n, |i| read_range(&first, i).clone())
    }

    pub fn insert_slice(&mut self, index: usize, values: &[T]) -> Result<usize>
    where
        T: Clone,
    {
        self.insert_with(index, values.len(), |i| values[i].clone())
    }

    /// 在 `index` 处腾出 `n` 个槽位，依次填入 `f(0), f(1), ...`
    ///
    /// `f` panic 时已经生成的值保留在原处，尾部被移回紧贴它们。
    fn insert_with(&mut self, index: usize, n: usize, mut f: impl FnMut(usize) -> T) -> Result<usize> {
        assert!(index <= self.len, "Index out of bounds");
        if n == 0 {
            return Ok(index);
        }
        let required = self.len.checked_add(n).ok_or_else(|| self.overflow())?;
        self.grow_for(required)?;

        let tail = self.len - index;
        // SAFETY: 容量足够容纳 len + n；将 index 之后的元素向后移动 n 位
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            ptr::copy(p, p.add(n), tail);
        }
        self.len = index;
        let mut hole = Hole {
            array: self,
            start: index,
            width: n,
            tail,
        };
        for i in 0..n {
            hole.fill(f(i));
        }
        Ok(index)
    }

    /// 用 `n` 个 `value` 的克隆替换全部内容
    pub fn assign_n(&mut self, n: usize, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.assign_with(n, |_| value.clone())
    }

    /// 用 `[first, last)` 的克隆替换全部内容
    pub fn assign_range<C>(&mut self, first: C, last: C) -> Result<()>
    where
        C: RandomCursor<Item = T>,
        T: Clone,
    {
        let n = range_len(&first, &last);
        self.assign_with(n, |i| read_range(&first, i).clone())
    }

    pub fn assign_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.assign_with(values.len(), |i| values[i].clone())
    }

    /// 拷贝赋值：逐元素克隆 `source`
    ///
    /// 现有容量放得下 `source.len()` 时复用存储；否则先从 `source` 分配策略的克隆中
    /// 取得恰好 `source.len()` 个槽位，再释放旧存储。
    pub fn assign_from(&mut self, source: &Self) -> Result<()>
    where
        T: Clone,
        A: Clone,
    {
        let n = source.len;
        if n <= self.cap {
            return self.assign_with(n, |i| source[i].clone());
        }
        let alloc = source.alloc.clone();
        let ptr = alloc.allocate::<T>(n)?;
        self.release_storage();
        // 旧存储已用旧策略释放，之后的内存都归新策略管理
        self.alloc = alloc;
        self.ptr = ptr;
        self.cap = n;
        for value in source.iter() {
            // SAFETY: cap == n
            unsafe { self.write_next(value.clone()) };
        }
        Ok(())
    }

    /// 析构当前内容，并在原处构造 `f(0)..f(n)`
    ///
    /// 需要更大的内存块时先分配再动旧内容，分配失败时数组保持不变。
    fn assign_with(&mut self, n: usize, mut f: impl FnMut(usize) -> T) -> Result<()> {
        if n > self.cap {
            self.check_length(n)?;
            let ptr = self.allocate(n)?;
            self.replace_storage(ptr, n);
        } else {
            self.clear();
        }
        for i in 0..n {
            // SAFETY: cap >= n
            unsafe { self.write_next(f(i)) };
        }
        Ok(())
    }

    /// 析构 `index` 处的元素并合拢空隙，返回 `index`，此时它指向原来的后继元素
    ///
    /// `index == len()` 时什么也不做；`index > len()` 时 panic。
    pub fn erase(&mut self, index: usize) -> usize {
        self.erase_range(index, index.saturating_add(1).min(self.len))
    }

    /// 析构 `[first, last)` 并合拢空隙，返回 `first`
    ///
    /// `first == len()` 或 `first == last` 时什么也不做；不满足
    /// `first <= last <= len()` 时 panic。
    pub fn erase_range(&mut self, first: usize, last: usize) -> usize {
        if first == self.len || first == last {
            return first;
        }
        assert!(first <= last && last <= self.len, "Index out of bounds");

        let tail = self.len - last;
        self.len = first;
        let hole = Hole {
            array: self,
            start: first,
            width: last - first,
            tail,
        };
        for i in first..last {
            // SAFETY: [first, last) 仍是已初始化元素，且已移出 len 的管理范围
            unsafe {
                let slot = hole.array.ptr.as_ptr().add(i);
                hole.array.alloc.destroy(slot);
            }
        }
        drop(hole);
        first
    }

    /// 移除并返回 `index` 处的元素，之后的元素左移
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "Index out of bounds");
        let tail = self.len - index - 1;
        // SAFETY: index < len
        let value = unsafe { ptr::read(self.ptr.as_ptr().add(index)) };
        self.len = index;
        drop(Hole {
            array: self,
            start: index,
            width: 1,
            tail,
        });
        value
    }

    /// 从尾部析构元素直到 `len() == n`，容量不变
    pub fn truncate(&mut self, n: usize) {
        while self.len > n {
            self.len -= 1;
            // SAFETY: 先缩短 len，析构函数 panic 时该元素不会被二次析构
            unsafe {
                let slot = self.ptr.as_ptr().add(self.len);
                self.alloc.destroy(slot);
            }
        }
    }

    /// 从后往前析构所有元素，容量不变
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// 与 `other` 交换存储、长度、容量和分配策略
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn overflow(&self) -> ArrayError {
        ArrayError::Length {
            requested: usize::MAX,
            max: self.max_size(),
        }
    }
}

/// [`GrowableArray::swap`] 的自由函数形式
pub fn swap<T, A: AllocStrategy>(a: &mut GrowableArray<T, A>, b: &mut GrowableArray<T, A>) {
    a.swap(b);
}
