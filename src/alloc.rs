//! Allocation strategies.
//!
//! A [`GrowableArray`](crate::GrowableArray) never touches `std::alloc` itself. Every
//! slot it owns is obtained, initialized, torn down and released through an
//! [`AllocStrategy`], which makes the array generic over allocation policy.

use std::alloc::{alloc, dealloc, Layout};
use std::cell::Cell;
use std::mem;
use std::ptr::{self, NonNull};
use std::rc::Rc;

use crate::error::{ArrayError, Result};

/// Capability to allocate, release, construct and destroy raw slots of `T`.
///
/// # Safety
///
/// `allocate::<T>(n)` must return a region valid for reads and writes of `n`
/// contiguous, properly aligned `T`s (a dangling aligned pointer is fine when the
/// region is zero bytes), and that region must stay valid until it is handed back to
/// `deallocate` with the same `n` on this strategy or a clone of it. The array relies
/// on this for every unsafe access it makes.
pub unsafe trait AllocStrategy {
    /// Obtain uninitialized storage for `n` elements.
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>>;

    /// Release storage previously returned by `allocate::<T>(n)`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate::<T>(n)` on this strategy (or a clone) and must
    /// not have been released already. All slots must be uninitialized or already
    /// destroyed.
    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize);

    /// Move `value` into an uninitialized slot.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        unsafe { ptr::write(slot, value) }
    }

    /// Run the destructor of the value in `slot`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used again.
    unsafe fn destroy<T>(&self, slot: *mut T) {
        unsafe { ptr::drop_in_place(slot) }
    }

    /// Move `n` live values from `src` into uninitialized slots at `dst`.
    ///
    /// # Safety
    ///
    /// The two ranges must not overlap. Afterwards `src` is logically uninitialized.
    unsafe fn relocate<T>(&self, src: *const T, dst: *mut T, n: usize) {
        unsafe { ptr::copy_nonoverlapping(src, dst, n) }
    }

    /// Largest element count this strategy could ever describe for `T`.
    fn max_size<T>(&self) -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }
}

pub(crate) fn array_layout<T>(n: usize) -> Result<Layout> {
    Layout::array::<T>(n).map_err(|_| ArrayError::AllocationFailure {
        slots: n,
        bytes: n.saturating_mul(mem::size_of::<T>()),
    })
}

/// Default strategy backed by the global allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heap;

// SAFETY: regions come straight from the global allocator with `Layout::array::<T>(n)`
// and are released with the same layout; zero-byte regions are never allocated.
unsafe impl AllocStrategy for Heap {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>> {
        let layout = array_layout::<T>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: layout 的大小非零
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(ArrayError::AllocationFailure {
            slots: n,
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        let Ok(layout) = Layout::array::<T>(n) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: caller guarantees ptr came from `allocate::<T>(n)`
            unsafe { dealloc(ptr.as_ptr().cast::<u8>(), layout) }
        }
    }
}

/// Snapshot of the bookkeeping kept by [`Counting`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Successful `allocate` calls
    pub allocations: usize,
    /// `deallocate` calls
    pub deallocations: usize,
    /// Slots currently allocated and not yet released, saturating at `usize::MAX`
    pub live_slots: usize,
    /// Values moved into slots through `construct`
    pub constructs: usize,
    /// Values torn down through `destroy`
    pub destroys: usize,
}

/// Wraps another strategy and records every request made through it.
///
/// Clones share one set of counters, so an array and its copies report into the same
/// [`AllocStats`]. An optional slot limit turns requests that would exceed it into
/// [`ArrayError::AllocationFailure`], which is how allocation failure is exercised
/// without exhausting real memory.
#[derive(Debug, Clone, Default)]
pub struct Counting<A = Heap> {
    inner: A,
    stats: Rc<Cell<AllocStats>>,
    slot_limit: Option<usize>,
}

impl Counting<Heap> {
    pub fn new() -> Self {
        Self::wrap(Heap)
    }

    /// Counting heap strategy that refuses to hold more than `limit` live slots.
    pub fn with_slot_limit(limit: usize) -> Self {
        Self {
            slot_limit: Some(limit),
            ..Self::new()
        }
    }
}

impl<A> Counting<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            stats: Rc::default(),
            slot_limit: None,
        }
    }

    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn update(&self, f: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

// SAFETY: every request is forwarded unchanged to `inner`, which upholds the contract.
unsafe impl<A: AllocStrategy> AllocStrategy for Counting<A> {
    fn allocate<T>(&self, n: usize) -> Result<NonNull<T>> {
        if let Some(limit) = self.slot_limit {
            if self.stats().live_slots.saturating_add(n) > limit {
                return Err(ArrayError::AllocationFailure {
                    slots: n,
                    bytes: n.saturating_mul(mem::size_of::<T>()),
                });
            }
        }
        let ptr = self.inner.allocate::<T>(n)?;
        self.update(|s| {
            s.allocations += 1;
            s.live_slots = s.live_slots.saturating_add(n);
        });
        Ok(ptr)
    }

    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize) {
        unsafe { self.inner.deallocate(ptr, n) };
        self.update(|s| {
            s.deallocations += 1;
            s.live_slots = s.live_slots.saturating_sub(n);
        });
    }

    unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        unsafe { self.inner.construct(slot, value) };
        self.update(|s| s.constructs += 1);
    }

    unsafe fn destroy<T>(&self, slot: *mut T) {
        // count first: a panicking destructor still consumed the slot
        self.update(|s| s.destroys += 1);
        unsafe { self.inner.destroy(slot) };
    }

    unsafe fn relocate<T>(&self, src: *const T, dst: *mut T, n: usize) {
        unsafe { self.inner.relocate(src, dst, n) }
    }

    fn max_size<T>(&self) -> usize {
        self.inner.max_size::<T>()
    }
}
