use anyhow::Result;
use growable_array::{GrowableArray, RandomCursor};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- Basic Usage Example ---");
    let mut arr = GrowableArray::new();

    for i in 1..=5 {
        arr.push_back(i * 10)?;
        println!("Pushed: {}, len: {}, cap: {}", i * 10, arr.len(), arr.capacity());
    }

    println!("Elements: {:?}", &arr[..]);

    let mut r = arr.rbegin();
    let mut reversed = Vec::new();
    while r != arr.rend() {
        reversed.extend(r.get().copied());
        r.inc();
    }
    println!("Reversed through cursors: {reversed:?}");

    let at = arr.erase(1);
    println!("Erased index 1, next element: {:?}", arr.at(at)?);
    arr.insert(0, 5)?;
    println!("After insert at front: {arr:?}");

    while let Some(val) = arr.pop_back() {
        println!("Popped: {}, len: {}", val, arr.len());
    }
    Ok(())
}
