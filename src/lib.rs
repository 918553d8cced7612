//! # rxbind: concurrent bind for push-based sequences
//!
//! `rxbind` implements the merge engine behind `flat_map` (bind,
//! `SelectMany`): every value of a source observable is projected into a
//! child observable, all children are subscribed at once and their values are
//! merged into one sequence as they arrive.
//!
//! ```rust
//! use rxbind::prelude::*;
//! use std::convert::Infallible;
//!
//! observable::from_iter::<_, Infallible>(1..=3usize)
//!   .flat_map(|v| observable::from_iter(vec![v; v]))
//!   .filter(|v| v % 2 == 1)
//!   .subscribe(|v| println!("{v}"));
//! ```
//!
//! Every operator works in two contexts. [`LocalObservable`] keeps its state
//! in `Rc<RefCell<_>>` and accepts observers borrowing from the stack, while
//! [`SharedObservable`] keeps it behind a `Mutex` so children may emit from
//! any thread. Call [`Observable::into_shared`] to subscribe in the shared
//! context.
//!
//! ## Features
//!
//! | Feature | Default | |
//! |---|---|---|
//! | `futures-scheduler` | yes | schedulers on `futures` executors |
//! | `timer` | yes | `timer` and `interval` sources |
//! | `tokio-scheduler` | no | scheduler on a tokio runtime handle |
//!
//! [`LocalObservable`]: prelude::LocalObservable
//! [`SharedObservable`]: prelude::SharedObservable
//! [`Observable::into_shared`]: prelude::Observable::into_shared

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscription;
mod type_hint;

pub use prelude::*;
