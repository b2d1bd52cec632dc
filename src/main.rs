use intrapool::{Config, ThreadPool};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;


fn main() {
    let pool = ThreadPool::with_config(Config::cpu_bound()).unwrap();
    let counter = Arc::new(AtomicU64::new(0));

    let now = Instant::now();
    let mut handles = Vec::with_capacity(1_000_000);
    for i in 0..1_000_000u64 {
        let counter = counter.clone();
        handles.push(pool.submit(move || {
            counter.fetch_add(i, Ordering::Relaxed);
        }));
    }
    for handle in handles {
        let _ = handle.unwrap().join();
    }
    pool.shutdown();

    println!("elapsed: {:?}", now.elapsed());
    println!("sum: {}", counter.load(Ordering::Relaxed));
}
