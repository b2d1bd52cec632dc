#[cfg(test)]
mod tests {
    use intrapool::{
        errors::PoolError,
        handle::join_handles,
        pool::{
            Config,
            ThreadPool,
        },
    };
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    };

    fn measure<F, T>(name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        println!("✓ {}: {:?}", name, elapsed);
        result
    }

    #[test]
    fn load_test_1_small_fast_tasks() {
        println!("\n=== LOAD TEST 1: 10k быстрых задач ===");
        let pool = ThreadPool::with_config(Config::cpu_bound()).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        measure("10k tasks", || {
            let handles: Vec<_> = (0..10_000)
                .map(|_| {
                    let c = counter.clone();
                    pool.submit(move || {
                        c.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap()
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
        });

        assert_eq!(counter.load(Ordering::Relaxed), 10_000);
        pool.shutdown();

        let metrics = pool.metrics();
        println!("  Успешно: {}/10000", metrics.completed_tasks);
        assert_eq!(metrics.completed_tasks, 10_000);
        assert_eq!(metrics.failed_tasks, 0);
    }

    #[test]
    fn load_test_2_par_map() {
        println!("\n=== LOAD TEST 2: par_map на 20k элементов ===");
        let pool = ThreadPool::with_config(Config::cpu_bound()).unwrap();

        let items: Vec<u64> = (0..20_000).collect();
        let results = measure("20k par_map", || {
            pool.par_map(items, |x| x * 2).unwrap()
        });

        assert_eq!(results.len(), 20_000);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(*r, Ok(i as u64 * 2), "Результаты в порядке входных элементов");
        }

        let metrics = pool.metrics();
        println!("  Утилизация на момент снятия: {:.1}%", metrics.utilization() * 100.0);
        println!("  Success rate: {:.1}%", metrics.success_rate() * 100.0);
        pool.shutdown();
    }

    #[test]
    fn load_test_3_slow_tasks_drained_on_shutdown() {
        println!("\n=== LOAD TEST 3: 200 медленных задач + shutdown ===");
        let pool = ThreadPool::new(8).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..200 {
            let c = counter.clone();
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(2));
                c.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }

        measure("shutdown с выработкой очереди", || pool.shutdown());

        assert_eq!(counter.load(Ordering::Relaxed), 200, "Shutdown обязан выработать всю очередь");
        assert_eq!(pool.pending_count(), 0);
        assert_eq!(pool.active_workers(), 0);
    }

    #[test]
    fn load_test_4_stress_with_panics() {
        println!("\n=== LOAD TEST 4: Стресс-тест с паниками ===");

        // Подавляем вывод паник в тесте
        std::panic::set_hook(Box::new(|_| {}));

        let pool = ThreadPool::new(8).unwrap();

        let handles: Vec<_> = (0..1_000)
            .map(|x: usize| {
                pool.submit(move || {
                    if x % 10 == 0 {
                        panic!("Intentional panic at {}", x);
                    }
                    x
                })
                .unwrap()
            })
            .collect();

        let results = measure("1k tasks (10% panic)", || join_handles(handles));

        let successful = results.iter().filter(|r| r.is_ok()).count();
        let panicked = results
            .iter()
            .filter(|r| matches!(r, Err(PoolError::Panic(_))))
            .count();

        println!("  Успешно: {}", successful);
        println!("  Паник перехвачено: {}", panicked);
        assert_eq!(successful, 900);
        assert_eq!(panicked, 100);

        pool.shutdown();
        let metrics = pool.metrics();
        println!("  Pool success rate: {:.1}%", metrics.success_rate() * 100.0);
        assert_eq!(metrics.completed_tasks, 900);
        assert_eq!(metrics.failed_tasks, 100);
        assert_eq!(pool.active_workers(), 0, "Паники не убивают воркеров");

        let _ = std::panic::take_hook();
    }

    #[test]
    fn load_test_5_stop_under_load() {
        println!("\n=== LOAD TEST 5: Stop под нагрузкой ===");
        let pool = ThreadPool::new(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..1_000 {
            let c = counter.clone();
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(1));
                c.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        }

        measure("stop", || pool.stop());

        let executed = counter.load(Ordering::Relaxed);
        let abandoned = pool.pending_count();
        println!("  Выполнено: {}, брошено в очереди: {}", executed, abandoned);

        assert_eq!(pool.active_workers(), 0);
        assert!(executed < 1_000, "Stop не должен дожидаться всей очереди");
        assert_eq!(pool.submit(|| ()).err(), Some(PoolError::PoolClosed));

        // Брошенные задачи так и не выполняются
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(counter.load(Ordering::Relaxed), executed);
        assert_eq!(pool.pending_count(), abandoned);
    }

    #[test]
    fn load_test_6_many_pools_sequential() {
        println!("\n=== LOAD TEST 6: Серия короткоживущих пулов ===");
        let total = Arc::new(AtomicUsize::new(0));

        measure("50 пулов по 100 задач", || {
            for _ in 0..50 {
                let pool = ThreadPool::new(4).unwrap();
                for _ in 0..100 {
                    let t = total.clone();
                    pool.submit(move || {
                        t.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap();
                }
                // дроп пула = graceful shutdown
            }
        });

        assert_eq!(total.load(Ordering::Relaxed), 5_000);
    }
}
