//! Синхронный пул воркер-потоков с общей FIFO-очередью задач
//!
//! # Features
//! - Фиксированное число персистентных OS-потоков
//! - Детерминированный старт: конструктор ждет регистрации всех воркеров
//! - Graceful shutdown с выработкой очереди и немедленный stop
//! - Перехват паник в handle задачи, пул не падает
//! - Метрики пула и блокирующий JoinHandle с timeout
//! - Конфигурация для CPU-bound и I/O-bound workloads

pub mod errors;
pub mod handle;
pub mod model;
pub mod pool;
pub mod result;

pub use errors::PoolError;
pub use handle::{join_handles, JoinHandle};
pub use model::PoolMetrics;
pub use pool::{Config, ThreadPool};
pub use result::PoolResult;
