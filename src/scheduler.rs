//! Executors the timed sources run on.
//!
//! A scheduler only has to spawn a `()` future. [`LocalScheduler`] futures stay
//! on the thread that drives the executor, [`SharedScheduler`] futures may
//! move between threads.
use crate::error::SchedulerError;
use std::future::Future;

pub trait LocalScheduler {
  fn spawn<Fut>(&self, future: Fut) -> Result<(), SchedulerError>
  where
    Fut: Future<Output = ()> + 'static;
}

pub trait SharedScheduler {
  fn spawn<Fut>(&self, future: Fut) -> Result<(), SchedulerError>
  where
    Fut: Future<Output = ()> + Send + 'static;
}

#[cfg(feature = "futures-scheduler")]
mod futures_scheduler {
  use super::*;
  use futures::{
    executor::{LocalSpawner, ThreadPool},
    task::LocalSpawnExt,
  };
  use once_cell::sync::OnceCell;

  static DEFAULT_POOL: OnceCell<ThreadPool> = OnceCell::new();

  /// The process wide thread pool, built on first use.
  pub fn default_pool() -> Result<ThreadPool, SchedulerError> {
    Ok(DEFAULT_POOL.get_or_try_init(ThreadPool::new)?.clone())
  }

  impl LocalScheduler for LocalSpawner {
    fn spawn<Fut>(&self, future: Fut) -> Result<(), SchedulerError>
    where
      Fut: Future<Output = ()> + 'static,
    {
      self.spawn_local(future)?;
      Ok(())
    }
  }

  impl SharedScheduler for ThreadPool {
    fn spawn<Fut>(&self, future: Fut) -> Result<(), SchedulerError>
    where
      Fut: Future<Output = ()> + Send + 'static,
    {
      self.spawn_ok(future);
      Ok(())
    }
  }
}

#[cfg(feature = "futures-scheduler")]
pub use futures_scheduler::default_pool;

#[cfg(feature = "tokio-scheduler")]
impl SharedScheduler for tokio::runtime::Handle {
  fn spawn<Fut>(&self, future: Fut) -> Result<(), SchedulerError>
  where
    Fut: Future<Output = ()> + Send + 'static,
  {
    // Detached: the returned subscription aborts the task, not the handle.
    drop(tokio::runtime::Handle::spawn(self, future));
    Ok(())
  }
}

#[cfg(all(test, feature = "futures-scheduler"))]
mod test {
  use super::*;
  use futures::{channel::oneshot, executor::LocalPool};

  #[test]
  fn local_spawner_runs_task() {
    let mut pool = LocalPool::new();
    let (tx, rx) = oneshot::channel();
    LocalScheduler::spawn(&pool.spawner(), async move {
      let _ = tx.send(7);
    })
    .unwrap();
    assert_eq!(pool.run_until(rx), Ok(7));
  }

  #[test]
  fn default_pool_is_reused() {
    let a = default_pool().unwrap();
    let (tx, rx) = oneshot::channel();
    SharedScheduler::spawn(&a, async move {
      let _ = tx.send("done");
    })
    .unwrap();
    assert_eq!(futures::executor::block_on(rx), Ok("done"));
    assert!(default_pool().is_ok());
  }
}
