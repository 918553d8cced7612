//! Errors raised by the crate itself.
//!
//! Failures travelling through a sequence use the sequence's own `Err` type;
//! this module only covers the plumbing around it.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
  #[error("failed to spawn a task: {0}")]
  Spawn(#[from] futures::task::SpawnError),
  #[error("failed to build the default thread pool: {0}")]
  ThreadPool(#[from] std::io::Error),
}
