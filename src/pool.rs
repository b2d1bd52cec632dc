use super::{
    errors::PoolError,
    result::PoolResult,
    handle::{
        join_handles,
        JoinHandle,
        Task,
    },
    model::PoolMetrics,
};
use std::{
    any::Any,
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use crossbeam::channel::bounded;
use parking_lot::{Condvar, Mutex};


/// Конфигурация пула потоков
#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: usize,
    pub thread_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            thread_name_prefix: "intrapool-worker".to_string(),
        }
    }
}

impl Config {
    pub fn cpu_bound() -> Self {
        Self {
            num_threads: num_cpus::get(),
            ..Default::default()
        }
    }

    pub fn io_bound() -> Self {
        Self {
            num_threads: num_cpus::get() * 2, // Для I/O-bound задач
            ..Default::default()
        }
    }
}


/// Общее состояние под единственным мьютексом пула.
///
/// Инвариант: `accepting_work` и `force_stop` меняются ровно один раз,
/// монотонно, и никогда не сбрасываются обратно.
struct PoolState {
    queue: VecDeque<Task>,
    accepting_work: bool,
    force_stop: bool,
    active_workers: usize,
}

struct PoolShared {
    state: Mutex<PoolState>,
    /// Будит воркера при новой задаче и всех воркеров при shutdown/stop.
    work_available: Condvar,
    /// Сигналит изменение active_workers (вход/выход воркера).
    lifecycle: Condvar,
    busy_workers: AtomicUsize,
    total_spawned: AtomicUsize,
    completed_tasks: Arc<AtomicUsize>,
    failed_tasks: Arc<AtomicUsize>,
}

impl PoolShared {
    /// Цикл воркера: WAITING -> DISPATCHING/DRAINING -> EXITING.
    fn worker_loop(&self) {
        {
            let mut state = self.state.lock();
            state.active_workers += 1;
            self.lifecycle.notify_all();
        }

        while let Some(task) = self.next_task() {
            // Задача выполняется без какого-либо lock пула; обертка из
            // submit() перехватывает панику, поэтому task() не анвиндит.
            self.busy_workers.fetch_add(1, Ordering::Relaxed);
            task();
            self.busy_workers.fetch_sub(1, Ordering::Relaxed);
        }

        let mut state = self.state.lock();
        state.active_workers -= 1;
        self.lifecycle.notify_all();
    }

    /// Берет ровно одну задачу из очереди или `None`, когда воркеру пора
    /// выйти: немедленно при `force_stop`, либо после выработки очереди
    /// при опущенном `accepting_work`.
    fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if state.force_stop {
                return None;
            }
            if let Some(task) = state.queue.pop_front() {
                return Some(task);
            }
            if !state.accepting_work {
                return None;
            }
            // Предикат перепроверяется после каждого пробуждения,
            // spurious wakeup здесь безопасен.
            self.work_available.wait(&mut state);
        }
    }
}


/// Пул персистентных OS-потоков с общей FIFO-очередью задач.
///
/// Конструктор возвращается только когда все воркеры зарегистрировались и
/// готовы принимать работу, поэтому submit сразу после создания не может
/// "промахнуться" мимо спящих воркеров.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> PoolResult<ThreadPool> {
        Self::with_config(Config {
            num_threads,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> PoolResult<ThreadPool> {
        if config.num_threads == 0 {
            return Err(PoolError::InvalidConfiguration);
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                accepting_work: true,
                force_stop: false,
                active_workers: 0,
            }),
            work_available: Condvar::new(),
            lifecycle: Condvar::new(),
            busy_workers: AtomicUsize::new(0),
            total_spawned: AtomicUsize::new(0),
            completed_tasks: Arc::new(AtomicUsize::new(0)),
            failed_tasks: Arc::new(AtomicUsize::new(0)),
        });

        let mut workers = Vec::with_capacity(config.num_threads);
        for i in 0..config.num_threads {
            let worker_shared = shared.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, i))
                .spawn(move || worker_shared.worker_loop());

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Частично построенный пул не отдаем наружу: гасим уже
                    // запущенные воркеры и возвращаем ошибку.
                    {
                        let mut state = shared.state.lock();
                        state.accepting_work = false;
                        state.force_stop = true;
                    }
                    shared.work_available.notify_all();
                    for handle in workers.drain(..) {
                        let _ = handle.join();
                    }
                    return Err(PoolError::ThreadSpawnFailed(e.to_string()));
                }
            }
        }

        // Блокируемся, пока каждый воркер не отметился живым. Условная
        // переменная вместо busy-wait, наблюдаемый контракт тот же:
        // после возврата active_workers() == num_threads.
        {
            let mut state = shared.state.lock();
            while state.active_workers < config.num_threads {
                shared.lifecycle.wait(&mut state);
            }
        }

        Ok(ThreadPool {
            shared,
            workers: Mutex::new(workers),
            num_threads: config.num_threads,
        })
    }

    /// Ставит задачу в хвост очереди и будит ровно одного воркера.
    ///
    /// Не блокирует вызывающего дольше захвата lock. После shutdown()/stop()
    /// возвращает `PoolClosed`, и задача не попадает в очередь.
    pub fn submit<F, T>(&self, f: F) -> PoolResult<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let completed = self.shared.completed_tasks.clone();
        let failed = self.shared.failed_tasks.clone();

        let task: Task = Box::new(move || {
            // Паника задачи уходит в handle отправителя, воркер не падает.
            let result = panic::catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| PoolError::Panic(panic_message(payload)));
            if result.is_ok() {
                completed.fetch_add(1, Ordering::Relaxed);
            } else {
                failed.fetch_add(1, Ordering::Relaxed);
            }
            let _ = tx.send(result);
        });

        {
            let mut state = self.shared.state.lock();
            if !state.accepting_work || state.force_stop {
                return Err(PoolError::PoolClosed);
            }
            state.queue.push_back(task);
            self.shared.total_spawned.fetch_add(1, Ordering::Relaxed);
        }
        self.shared.work_available.notify_one();

        Ok(JoinHandle::new(rx))
    }

    /// Submit + join по коллекции, результаты в порядке входных элементов.
    pub fn par_map<I, T, R, F>(&self, items: I, f: F) -> PoolResult<Vec<PoolResult<R>>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let handles = items
            .into_iter()
            .map(|item| {
                let f = Arc::clone(&f);
                self.submit(move || f(item))
            })
            .collect::<PoolResult<Vec<_>>>()?;
        Ok(join_handles(handles))
    }

    /// Длина очереди на момент вызова. Только для наблюдения: значение
    /// может устареть сразу после возврата.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Число живых воркеров. Только для наблюдения и тестов, не примитив
    /// синхронизации.
    #[inline]
    pub fn active_workers(&self) -> usize {
        self.shared.state.lock().active_workers
    }

    /// Сконфигурированный размер пула.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.num_threads
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        let (active_workers, queued_tasks) = {
            let state = self.shared.state.lock();
            (state.active_workers, state.queue.len())
        };
        PoolMetrics {
            active_workers,
            busy_workers: self.shared.busy_workers.load(Ordering::Relaxed),
            queued_tasks,
            total_spawned: self.shared.total_spawned.load(Ordering::Relaxed),
            completed_tasks: self.shared.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.shared.failed_tasks.load(Ordering::Relaxed),
        }
    }

    /// Graceful shutdown: перестает принимать задачи, дожидается выработки
    /// очереди и выхода всех воркеров. Идемпотентен; после возврата
    /// `active_workers() == 0` и `pending_count() == 0`. Пул повторно не
    /// используется — для новой работы создается новый пул.
    ///
    /// НЕЛЬЗЯ вызывать из тела задачи этого же пула — deadlock.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.accepting_work = false;
        }
        self.shared.work_available.notify_all();
        self.join_workers();
    }

    /// Немедленная остановка: воркеры выходят, как только заметят флаг,
    /// не трогая оставшиеся в очереди задачи. Уже взятая воркером задача
    /// доводится до конца. После возврата `active_workers() == 0`, а
    /// `pending_count()` может быть ненулевым — брошенные задачи остаются
    /// в очереди как наблюдаемый признак нечистой остановки. Идемпотентна.
    ///
    /// НЕЛЬЗЯ вызывать из тела задачи этого же пула — deadlock.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            state.accepting_work = false;
            state.force_stop = true;
        }
        self.shared.work_available.notify_all();
        self.join_workers();
    }

    fn join_workers(&self) {
        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.join();
        }
        // Конкурентный shutdown мог забрать handles первым: блокируемся,
        // пока последний воркер не отметит выход.
        let mut state = self.shared.state.lock();
        while state.active_workers > 0 {
            self.shared.lifecycle.wait(&mut state);
        }
    }
}

impl Drop for ThreadPool {
    /// Дроп без явного shutdown()/stop() выполняет graceful shutdown:
    /// ни один воркер не переживает значение пула.
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in submitted task".to_string()
    }
}
