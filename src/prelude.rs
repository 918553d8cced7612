pub use crate::error::SchedulerError;
pub use crate::notification::Notification;
pub use crate::observable;
pub use crate::observable::{LocalObservable, Observable, Shared, SharedObservable};
pub use crate::observer::{Observer, ObserverAll, ObserverN, Subscriber};
pub use crate::ops::{
  filter::FilterOp,
  flat_map::{FlatMapOp, Identity, Project, Projection, TryProject},
  map::MapOp,
  take::TakeOp,
};
pub use crate::scheduler::{LocalScheduler, SharedScheduler};
pub use crate::subject::{LocalSubject, SharedSubject};
pub use crate::subscription::*;
