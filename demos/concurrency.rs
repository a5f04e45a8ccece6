use anyhow::{Result, anyhow};
use growable_array::GrowableArray;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- Cross-thread Ownership Transfer Example ---");
    let arr: GrowableArray<i32> = (0..10).collect();

    println!("Original array (thread main): {:?}", &arr[..]);

    let handle = thread::spawn(move || -> Result<GrowableArray<i32>> {
        let mut arr = arr;
        println!("Array in new thread: {:?}", &arr[..]);
        arr.push_back(100)?;
        Ok(arr)
    });

    let arr = handle
        .join()
        .map_err(|_| anyhow!("worker thread panicked"))??;
    println!("Array back in main thread: {:?}", &arr[..]);
    Ok(())
}
