use anyhow::Result;
use growable_array::{Counting, GrowableArray};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

struct Tracked(usize, Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        println!("Dropping element {}", self.0);
        self.1.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- Exception Safety & RAII Example ---");
    let drop_count = Arc::new(AtomicUsize::new(0));

    {
        let mut arr = GrowableArray::new();
        for i in 0..3 {
            arr.push_back(Tracked(i, drop_count.clone()))?;
        }
        println!("Array created with 3 elements.");
    }

    println!("Total elements dropped: {}", drop_count.load(Ordering::SeqCst));
    assert_eq!(drop_count.load(Ordering::SeqCst), 3);

    println!("--- Allocation Failure Example ---");
    let strategy = Counting::with_slot_limit(4);
    let mut arr = GrowableArray::new_in(strategy.clone());
    for i in 0..3 {
        arr.push_back(i)?;
    }
    match arr.assign_n(8, &7) {
        Ok(()) => println!("Unexpectedly assigned 8 elements"),
        Err(err) => println!("Assignment failed: {err}"),
    }
    println!("Array left untouched: {arr:?}, stats: {:?}", strategy.stats());
    Ok(())
}
