use super::{
    errors::PoolError,
    result::PoolResult,
};
use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Стёртая задача, которую хранит очередь пула: все аргументы уже захвачены
/// замыканием, результат уходит через канал внутри самого замыкания.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle на задачу с блокирующим ожиданием результата и timeout.
///
/// ВАЖНО: задача, оставшаяся в очереди после `stop()`, никогда не выполнится.
/// `join()` на таком handle блокируется, пока пул жив, и возвращает
/// `ChannelClosed` только после дропа пула. После `stop()` опрашивайте
/// `pending_count()`/`active_workers()` вместо блокирующего `join()`.
pub struct JoinHandle<T> {
    receiver: Receiver<PoolResult<T>>,
}

impl<T> JoinHandle<T> {
    pub fn new(receiver: Receiver<PoolResult<T>>) -> Self {
        Self { receiver }
    }

    /// Блокирует вызывающий поток до завершения задачи.
    #[inline]
    pub fn join(self) -> PoolResult<T> {
        self.receiver.recv().unwrap_or(Err(PoolError::ChannelClosed))
    }

    /// Неблокирующая проверка: `None`, если задача ещё не завершилась.
    ///
    /// Забирает результат из канала, повторный вызов после успешного
    /// получения вернет `ChannelClosed`.
    #[inline]
    pub fn try_join(&self) -> Option<PoolResult<T>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PoolError::ChannelClosed)),
        }
    }

    /// Ожидание результата не дольше `timeout`.
    ///
    /// Timeout ограничивает ожидание вызывающего, а не выполнение задачи:
    /// воркер доведет уже взятую задачу до конца в любом случае.
    pub fn join_timeout(self, timeout: Duration) -> PoolResult<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(PoolError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(PoolError::ChannelClosed),
        }
    }
}

/// Последовательно дожидается все handles, результаты в порядке подачи.
pub fn join_handles<T>(handles: Vec<JoinHandle<T>>) -> Vec<PoolResult<T>> {
    handles.into_iter().map(JoinHandle::join).collect()
}
