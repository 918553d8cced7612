use crate::{prelude::*, type_hint::TypeHint};
use futures::{
  future::{abortable, AbortHandle},
  FutureExt,
};
use futures_time::task::sleep;
use std::{future::Future, time::Duration};

/// Creates an observable that emits `value` once `delay` has elapsed on the
/// given scheduler, then completes.
pub fn timer<Item, Err, S>(value: Item, delay: Duration, scheduler: S) -> TimerObservable<Item, Err, S> {
  TimerObservable { value, delay, scheduler, _hint: TypeHint::new() }
}

/// Creates an observable that emits `0, 1, 2, ...`, one value every `period`.
/// It never completes on its own.
pub fn interval<Err, S>(period: Duration, scheduler: S) -> IntervalObservable<Err, S> {
  IntervalObservable { period, scheduler, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct TimerObservable<Item, Err, S> {
  value: Item,
  delay: Duration,
  scheduler: S,
  _hint: TypeHint<Err>,
}

#[derive(Clone)]
pub struct IntervalObservable<Err, S> {
  period: Duration,
  scheduler: S,
  _hint: TypeHint<Err>,
}

impl<Item, Err, S> Observable for TimerObservable<Item, Err, S> {
  type Item = Item;
  type Err = Err;
}

impl<Err, S> Observable for IntervalObservable<Err, S> {
  type Item = usize;
  type Err = Err;
}

/// Handle of a spawned timed task. Unsubscribing aborts the task.
#[derive(Clone)]
pub struct TaskHandle {
  abort: AbortHandle,
  closed: SingleSubscription,
}

impl SubscriptionLike for TaskHandle {
  fn unsubscribe(&mut self) {
    self.abort.abort();
    self.closed.unsubscribe();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.is_closed() }
}

fn task<Fut>(future: Fut) -> (impl Future<Output = ()>, TaskHandle)
where
  Fut: Future<Output = ()>,
{
  let (future, abort) = abortable(future);
  let closed = SingleSubscription::default();
  let mut c_closed = closed.clone();
  let future = future.map(move |_| c_closed.unsubscribe());
  (future, TaskHandle { abort, closed })
}

fn spawned(result: Result<(), SchedulerError>, mut handle: TaskHandle) -> TaskHandle {
  if let Err(err) = result {
    tracing::error!(%err, "timed source could not be scheduled");
    handle.unsubscribe();
  }
  handle
}

async fn emit_after<O>(value: O::Item, delay: Duration, mut observer: O)
where
  O: Observer,
{
  sleep(delay.into()).await;
  observer.next(value);
  observer.complete();
}

async fn emit_every<O>(period: Duration, mut observer: O)
where
  O: Observer<Item = usize>,
{
  let mut seq = 0;
  while !observer.is_closed() {
    sleep(period.into()).await;
    observer.next(seq);
    seq += 1;
  }
}

impl<Item, Err, S> LocalObservable<'static> for TimerObservable<Item, Err, S>
where
  Item: 'static,
  S: LocalScheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'static,
  {
    let (future, handle) = task(emit_after(self.value, self.delay, observer));
    spawned(self.scheduler.spawn(future), handle)
  }
}

impl<Item, Err, S> SharedObservable for TimerObservable<Item, Err, S>
where
  Item: Send + 'static,
  S: SharedScheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    let (future, handle) = task(emit_after(self.value, self.delay, observer));
    spawned(self.scheduler.spawn(future), handle)
  }
}

impl<Err, S> LocalObservable<'static> for IntervalObservable<Err, S>
where
  S: LocalScheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'static,
  {
    let (future, handle) = task(emit_every(self.period, observer));
    spawned(self.scheduler.spawn(future), handle)
  }
}

impl<Err, S> SharedObservable for IntervalObservable<Err, S>
where
  S: SharedScheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    let (future, handle) = task(emit_every(self.period, observer));
    spawned(self.scheduler.spawn(future), handle)
  }
}
