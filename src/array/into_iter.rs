use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

use super::GrowableArray;
use crate::alloc::AllocStrategy;

/// 按值消费 [`GrowableArray`] 的迭代器，逐个移出元素
pub struct IntoIter<T, A: AllocStrategy> {
    ptr: NonNull<T>,
    cap: usize,
    start: usize,
    end: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: 与 GrowableArray 相同，迭代器独占剩余元素和存储
unsafe impl<T: Send, A: AllocStrategy + Send> Send for IntoIter<T, A> {}
// SAFETY: 共享引用只暴露 &[T]
unsafe impl<T: Sync, A: AllocStrategy + Sync> Sync for IntoIter<T, A> {}

impl<T, A: AllocStrategy> IntoIterator for GrowableArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        // 关键：避免 GrowableArray 的 Drop 被调用
        let array = ManuallyDrop::new(self);
        IntoIter {
            ptr: array.ptr,
            cap: array.cap,
            start: 0,
            end: array.len,
            // SAFETY: array 不会再被析构，分配策略只被读出一次
            alloc: unsafe { ptr::read(&array.alloc) },
            _marker: PhantomData,
        }
    }
}

impl<T, A: AllocStrategy> IntoIter<T, A> {
    /// 尚未被取出的元素
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [start, end) 仍是已初始化元素
        unsafe {
            std::slice::from_raw_parts(self.ptr.as_ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T, A: AllocStrategy> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            // SAFETY: start < end，该位置的值被移出后不再访问
            let value = unsafe { ptr::read(self.ptr.as_ptr().add(self.start)) };
            self.start += 1;
            Some(value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T, A: AllocStrategy> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            self.end -= 1;
            // SAFETY: end 已减 1，指向尚未移出的元素
            Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.end)) })
        }
    }
}

impl<T, A: AllocStrategy> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: AllocStrategy> FusedIterator for IntoIter<T, A> {}

impl<T, A: AllocStrategy> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // 某个元素的析构函数 panic 时，守卫继续析构其余元素并释放内存块
        struct DropGuard<'a, T, A: AllocStrategy>(&'a mut IntoIter<T, A>);

        impl<T, A: AllocStrategy> DropGuard<'_, T, A> {
            fn destroy_rest(&mut self) {
                let it = &mut *self.0;
                while it.start < it.end {
                    it.end -= 1;
                    // SAFETY: [start, end) 中的元素仍然存活，先缩短 end 避免二次析构
                    unsafe { it.alloc.destroy(it.ptr.as_ptr().add(it.end)) };
                }
            }
        }

        impl<T, A: AllocStrategy> Drop for DropGuard<'_, T, A> {
            fn drop(&mut self) {
                self.destroy_rest();
                let it = &mut *self.0;
                if it.cap != 0 {
                    // SAFETY: ptr/cap 来自原数组的同一次 allocate
                    unsafe { it.alloc.deallocate(it.ptr, it.cap) };
                    it.cap = 0;
                }
            }
        }

        // 析构剩余未消费的元素，内存块随守卫一起释放
        DropGuard(self).destroy_rest();
    }
}
