use super::*;
use crossbeam::scope;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Droppable(Arc<AtomicUsize>);

impl Drop for Droppable {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clones successfully until its shared fuse runs out, then panics.
#[derive(Debug)]
struct Fused {
    id: u32,
    fuse: Rc<Cell<usize>>,
}

impl Clone for Fused {
    fn clone(&self) -> Self {
        let left = self.fuse.get();
        if left == 0 {
            panic!("fuse blown");
        }
        self.fuse.set(left - 1);
        Fused {
            id: self.id,
            fuse: self.fuse.clone(),
        }
    }
}

fn ids(arr: &GrowableArray<Fused>) -> Vec<u32> {
    arr.iter().map(|f| f.id).collect()
}

#[test]
fn test_basic_push_pop() {
    let mut v = GrowableArray::new();
    v.push_back(1).unwrap();
    v.push_back(2).unwrap();
    v.push_back(3).unwrap();
    assert_eq!(v.len(), 3);
    assert_eq!(v[0], 1);
    assert_eq!(v[1], 2);
    assert_eq!(v[2], 3);
    assert_eq!(v.pop_back(), Some(3));
    assert_eq!(v.pop_back(), Some(2));
    assert_eq!(v.pop_back(), Some(1));
    assert_eq!(v.pop_back(), None);
}

#[test]
fn test_insert_remove() {
    let mut v = GrowableArray::new();
    v.push_back(1).unwrap();
    v.push_back(3).unwrap();
    v.insert(1, 2).unwrap();
    assert_eq!(v.as_ref(), &[1, 2, 3]);
    assert_eq!(v.remove(1), 2);
    assert_eq!(v.as_ref(), &[1, 3]);
}

#[test]
fn test_doubling_growth_policy() {
    let mut v = GrowableArray::new();
    assert_eq!(v.capacity(), 0);
    let mut caps = Vec::new();
    for i in 0..5 {
        v.push_back(i).unwrap();
        caps.push(v.capacity());
    }
    assert_eq!(caps, vec![1, 2, 4, 4, 8]);

    // 需要 15 个槽位，翻倍得到 16
    v.insert_n(0, 10, &7).unwrap();
    assert_eq!(v.capacity(), 16);

    // 需要的数量超过翻倍结果时取需要的数量
    let mut w: GrowableArray<i32> = GrowableArray::new();
    w.insert_n(0, 5, &1).unwrap();
    assert_eq!(w.capacity(), 5);
}

#[test]
fn test_grow_and_shrink() {
    let mut v = GrowableArray::with_capacity(2).unwrap();
    assert_eq!(v.capacity(), 2);
    v.push_back(1).unwrap();
    v.push_back(2).unwrap();
    v.push_back(3).unwrap();
    assert!(v.capacity() >= 3);
    v.shrink_to_fit().unwrap();
    assert_eq!(v.capacity(), 3);
    v.pop_back();
    v.pop_back();
    v.pop_back();
    v.shrink_to_fit().unwrap();
    assert_eq!(v.capacity(), 0);
}

#[test]
fn test_raii_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let mut v = GrowableArray::new();
        for _ in 0..10 {
            v.push_back(Droppable(counter.clone())).unwrap();
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_erase_destroys_each_element_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = GrowableArray::new();
    for _ in 0..6 {
        v.push_back(Droppable(counter.clone())).unwrap();
    }
    v.erase_range(1, 4);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert_eq!(v.len(), 3);
    v.erase(0);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    v.clear();
    assert_eq!(counter.load(Ordering::SeqCst), 6);
    assert!(v.capacity() >= 6);
    drop(v);
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}

#[test]
fn test_panicking_clone_during_insert_keeps_array_valid() {
    let fuse = Rc::new(Cell::new(usize::MAX));
    let mut v = GrowableArray::new();
    for id in 0..3 {
        v.push_back(Fused { id, fuse: fuse.clone() }).unwrap();
    }
    let template = Fused { id: 9, fuse: fuse.clone() };

    fuse.set(2);
    let result = catch_unwind(AssertUnwindSafe(|| {
        v.insert_n(1, 3, &template).unwrap();
    }));
    assert!(result.is_err());
    // 已经插入的两个副本保留，尾部被移回
    assert_eq!(ids(&v), vec![0, 9, 9, 1, 2]);
}

#[test]
fn test_panicking_clone_during_assign_keeps_prefix() {
    let fuse = Rc::new(Cell::new(usize::MAX));
    let mut v = GrowableArray::new();
    for id in 0..4 {
        v.push_back(Fused { id, fuse: fuse.clone() }).unwrap();
    }
    let template = Fused { id: 5, fuse: fuse.clone() };

    fuse.set(1);
    let result = catch_unwind(AssertUnwindSafe(|| {
        v.assign_n(3, &template).unwrap();
    }));
    assert!(result.is_err());
    assert_eq!(ids(&v), vec![5]);
}

#[test]
fn test_allocation_failure_leaves_array_unchanged() {
    // 扩容时新旧两块内存同时存在：2 + 4 > 4
    let mut v = GrowableArray::new_in(Counting::with_slot_limit(4));
    v.push_back(1).unwrap();
    v.push_back(2).unwrap();
    let err = v.push_back(3).unwrap_err();
    assert!(matches!(err, ArrayError::AllocationFailure { slots: 4, .. }));
    assert_eq!(v, [1, 2]);
    assert_eq!(v.capacity(), 2);

    let err = v.assign_n(5, &0).unwrap_err();
    assert!(matches!(err, ArrayError::AllocationFailure { .. }));
    assert_eq!(v, [1, 2]);
}

#[test]
fn test_allocation_failure_during_insert_leaves_array_unchanged() {
    let mut v = GrowableArray::new_in(Counting::with_slot_limit(4));
    v.push_back(1).unwrap();
    v.push_back(2).unwrap();
    let ptr = v.as_ptr();

    // 需要 4 个槽位，新旧两块内存同时存在：2 + 4 > 4
    let err = v.insert_n(1, 2, &9).unwrap_err();
    assert!(matches!(err, ArrayError::AllocationFailure { slots: 4, .. }));
    assert_eq!(v, [1, 2]);
    assert_eq!(v.capacity(), 2);
    assert_eq!(v.as_ptr(), ptr);

    let extra = growable![7, 8, 9];
    let err = v.insert_range(0, extra.begin(), extra.end()).unwrap_err();
    assert!(matches!(err, ArrayError::AllocationFailure { slots: 5, .. }));
    assert_eq!(v, [1, 2]);

    let err = v.insert_n(0, usize::MAX, &0).unwrap_err();
    assert!(matches!(err, ArrayError::Length { .. }));
    assert_eq!(v, [1, 2]);
    assert_eq!(v.allocator().stats().live_slots, 2);
}

#[test]
fn test_length_error_is_checked_before_allocating() {
    let strategy = Counting::new();
    let mut v: GrowableArray<u64, _> = GrowableArray::new_in(strategy.clone());
    v.push_back(1).unwrap();
    let before = strategy.stats();

    let max = v.max_size();
    assert_eq!(
        v.reserve(max + 1),
        Err(ArrayError::Length { requested: max + 1, max })
    );
    assert_eq!(strategy.stats(), before);
    assert_eq!(v, [1]);
    assert_eq!(v.capacity(), 1);
}

#[test]
fn test_counting_strategy_sees_every_request() {
    let strategy = Counting::new();
    {
        let mut v = GrowableArray::new_in(strategy.clone());
        for i in 0..3 {
            v.push_back(i).unwrap();
        }
        let stats = strategy.stats();
        assert_eq!(stats.allocations, 3);
        assert_eq!(stats.deallocations, 2);
        assert_eq!(stats.live_slots, 4);
        assert_eq!(stats.constructs, 3);
        assert_eq!(stats.destroys, 0);
    }
    let stats = strategy.stats();
    assert_eq!(stats.deallocations, 3);
    assert_eq!(stats.live_slots, 0);
    assert_eq!(stats.destroys, 3);
}

#[test]
fn test_counting_zero_sized_reserve_to_max() {
    let strategy = Counting::new();
    {
        let mut v: GrowableArray<(), _> = GrowableArray::new_in(strategy.clone());
        v.push_back(()).unwrap();
        let max = v.max_size();
        v.reserve(max).unwrap();
        assert_eq!(v.capacity(), max);
        assert_eq!(v.len(), 1);
    }
    let stats = strategy.stats();
    assert_eq!(stats.allocations, 2);
    assert_eq!(stats.deallocations, 2);
    assert_eq!(stats.live_slots, 0);
}

#[test]
fn test_empty_array_never_allocates() {
    let strategy = Counting::new();
    {
        let mut v: GrowableArray<String, _> = GrowableArray::new_in(strategy.clone());
        v.clear();
        assert_eq!(v.pop_back(), None);
        v.erase_range(0, 0);
    }
    assert_eq!(strategy.stats(), AllocStats::default());
}

#[test]
fn test_clone_keeps_capacity_and_clone_from_reuses_storage() {
    let mut src: GrowableArray<i32> = GrowableArray::with_capacity(10).unwrap();
    src.extend([1, 2, 3]);
    let copy = src.clone();
    assert_eq!(copy, src);
    assert_eq!(copy.capacity(), 10);
    assert_ne!(copy.as_ptr(), src.as_ptr());

    let mut dst: GrowableArray<i32> = GrowableArray::with_capacity(8).unwrap();
    dst.extend([9, 9, 9, 9, 9]);
    let before = dst.as_ptr();
    dst.clone_from(&src);
    assert_eq!(dst, [1, 2, 3]);
    assert_eq!(dst.capacity(), 8);
    assert_eq!(dst.as_ptr(), before);

    let mut small = GrowableArray::with_capacity(1).unwrap();
    small.push_back(0).unwrap();
    small.clone_from(&src);
    assert_eq!(small, [1, 2, 3]);
    assert_eq!(small.capacity(), 3);
}

#[test]
fn test_into_iter_drops_unconsumed_elements() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = GrowableArray::new();
    for _ in 0..5 {
        v.push_back(Droppable(counter.clone())).unwrap();
    }
    let mut it = v.into_iter();
    drop(it.next());
    drop(it.next_back());
    assert_eq!(it.len(), 3);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    drop(it);
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_into_iter_moves_to_another_thread() {
    fn assert_send_sync<S: Send + Sync>() {}
    assert_send_sync::<IntoIter<i32, Heap>>();

    let v: GrowableArray<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let mut it = v.into_iter();
    assert_eq!(it.next().as_deref(), Some("a"));

    let rest = std::thread::spawn(move || it.collect::<Vec<_>>())
        .join()
        .unwrap();
    assert_eq!(rest, vec!["b", "c"]);
}

#[test]
fn test_into_iter_frees_storage_when_a_destructor_panics() {
    struct Bomb {
        armed: bool,
        dropped: Arc<AtomicUsize>,
    }

    impl Drop for Bomb {
        fn drop(&mut self) {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            if self.armed {
                panic!("bomb dropped");
            }
        }
    }

    let strategy = Counting::new();
    let dropped = Arc::new(AtomicUsize::new(0));
    let mut v = GrowableArray::new_in(strategy.clone());
    for i in 0..4 {
        v.push_back(Bomb {
            armed: i == 1,
            dropped: dropped.clone(),
        })
        .unwrap();
    }

    let it = v.into_iter();
    let result = catch_unwind(AssertUnwindSafe(move || drop(it)));
    assert!(result.is_err());
    // 其余元素仍被析构，内存块被释放
    assert_eq!(dropped.load(Ordering::SeqCst), 4);
    let stats = strategy.stats();
    assert_eq!(stats.destroys, 4);
    assert_eq!(stats.live_slots, 0);
    assert_eq!(stats.allocations, stats.deallocations);
}

#[test]
fn test_iterators() {
    let mut v = GrowableArray::new();
    v.push_back(10).unwrap();
    v.push_back(20).unwrap();
    v.push_back(30).unwrap();

    let mut sum = 0;
    for &x in &v {
        sum += x;
    }
    assert_eq!(sum, 60);

    for x in &mut v {
        *x += 1;
    }
    assert_eq!(v[0], 11);

    let collected: Vec<i32> = v.into_iter().collect();
    assert_eq!(collected, vec![11, 21, 31]);
}

#[test]
fn test_zero_sized_elements() {
    let mut v = GrowableArray::new();
    for _ in 0..100 {
        v.push_back(()).unwrap();
    }
    assert_eq!(v.len(), 100);
    assert_eq!(v.max_size(), usize::MAX);
    v.erase_range(10, 20);
    assert_eq!(v.len(), 90);
    assert_eq!(v.into_iter().count(), 90);
}

#[test]
fn test_concurrency() {
    let mut v = GrowableArray::new();
    for i in 0..100 {
        v.push_back(i).unwrap();
    }

    scope(|s| {
        s.spawn(|_| {
            for x in &v {
                let _ = *x;
            }
        });
        s.spawn(|_| {
            for x in &v {
                let _ = *x;
            }
        });
    })
    .unwrap();
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_remove() {
    let mut v: GrowableArray<i32> = GrowableArray::new();
    v.remove(0);
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_insert() {
    let mut v: GrowableArray<i32> = GrowableArray::new();
    let _ = v.insert(1, 10);
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_erase_range() {
    let mut v: GrowableArray<i32> = growable![1, 2, 3];
    v.erase_range(1, 5);
}
