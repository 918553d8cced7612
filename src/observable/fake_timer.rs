//! Virtual time for deterministic tests.
//!
//! A [`FakeClock`] only moves when told to. Work scheduled on it runs in
//! due-time order, ties broken by scheduling order, inside
//! [`FakeClock::advance`] or [`FakeClock::flush`].
//!
//! ```
//! use rxbind::prelude::*;
//! use rxbind::observable::fake_timer::FakeClock;
//! use std::time::Duration;
//!
//! let clock = FakeClock::default();
//! let child = clock.cold(vec![
//!   (Duration::from_millis(10), Notification::Next(1)),
//!   (Duration::from_millis(20), Notification::<_, ()>::Completed),
//! ]);
//! let recorder = clock.recorder();
//! LocalObservable::actual_subscribe(child, recorder.clone());
//!
//! clock.advance(Duration::from_millis(15));
//! assert_eq!(recorder.values(), vec![1]);
//! clock.flush();
//! assert!(recorder.is_completed());
//! ```
use crate::{
  prelude::*,
  rc::{MutRc, RcDeref, RcDerefMut},
  type_hint::TypeHint,
};
use std::{collections::VecDeque, time::Duration};

#[derive(Clone, Default)]
pub struct FakeClock(MutRc<ClockState>);

#[derive(Default)]
struct ClockState {
  now: Duration,
  tasks: VecDeque<ScheduledTask>,
}

struct ScheduledTask {
  at: Duration,
  task: Box<dyn FnOnce()>,
}

impl FakeClock {
  /// Virtual time elapsed since the clock was created.
  pub fn now(&self) -> Duration { self.0.rc_deref().now }

  /// Number of tasks waiting to run.
  pub fn pending(&self) -> usize { self.0.rc_deref().tasks.len() }

  /// Runs `task` once the clock reaches `now() + delay`.
  pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) {
    let mut state = self.0.rc_deref_mut();
    let at = state.now + delay;
    // Tasks are kept sorted by due time; equal times keep scheduling order.
    let position = state.tasks.partition_point(|t| t.at <= at);
    state.tasks.insert(position, ScheduledTask { at, task: Box::new(task) });
  }

  /// Moves the clock forward by `by`, running every task that falls due.
  pub fn advance(&self, by: Duration) { self.advance_to(self.now() + by) }

  /// Moves the clock forward to `to`, running every task due at or before it.
  pub fn advance_to(&self, to: Duration) {
    while let Some(task) = self.pop_due(to) {
      (task.task)();
    }
    let mut state = self.0.rc_deref_mut();
    if state.now < to {
      state.now = to;
    }
  }

  /// Runs tasks until none are left. Never returns while an uncancelled
  /// interval is pending.
  pub fn flush(&self) {
    while let Some(task) = self.pop_due(Duration::MAX) {
      (task.task)();
    }
  }

  fn pop_due(&self, to: Duration) -> Option<ScheduledTask> {
    let mut state = self.0.rc_deref_mut();
    if state.tasks.front().is_some_and(|t| t.at <= to) {
      let task = state.tasks.pop_front()?;
      state.now = task.at;
      Some(task)
    } else {
      None
    }
  }

  /// An observable emitting `0, 1, 2, ...` every `period` of virtual time.
  pub fn interval<Err>(&self, period: Duration) -> ClockInterval<Err> {
    ClockInterval { period, clock: self.clone(), _hint: TypeHint::new() }
  }

  /// A cold observable replaying `timeline` for every subscriber, each entry
  /// delayed relative to the moment of subscription.
  pub fn cold<Item, Err>(
    &self,
    timeline: impl IntoIterator<Item = (Duration, Notification<Item, Err>)>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable { clock: self.clone(), timeline: timeline.into_iter().collect() }
  }

  /// An observer that records every notification with the virtual time it
  /// arrived at.
  pub fn recorder<Item, Err>(&self) -> Recorder<Item, Err> {
    Recorder { clock: self.clone(), records: MutRc::own(vec![]) }
  }
}

pub struct ClockInterval<Err> {
  period: Duration,
  clock: FakeClock,
  _hint: TypeHint<Err>,
}

impl<Err> Clone for ClockInterval<Err> {
  fn clone(&self) -> Self {
    ClockInterval { period: self.period, clock: self.clock.clone(), _hint: TypeHint::new() }
  }
}

impl<Err> Observable for ClockInterval<Err> {
  type Item = usize;
  type Err = Err;
}

impl<Err> LocalObservable<'static> for ClockInterval<Err> {
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'static,
  {
    let subscription = SingleSubscription::default();
    tick(self.clock, self.period, 0, observer, subscription.clone());
    subscription
  }
}

fn tick<O>(clock: FakeClock, period: Duration, seq: usize, mut observer: O, closed: SingleSubscription)
where
  O: Observer<Item = usize> + 'static,
{
  let c_clock = clock.clone();
  clock.schedule(period, move || {
    if !closed.is_closed() {
      observer.next(seq);
      tick(c_clock, period, seq + 1, observer, closed);
    }
  });
}

#[derive(Clone)]
pub struct ColdObservable<Item, Err> {
  clock: FakeClock,
  timeline: Vec<(Duration, Notification<Item, Err>)>,
}

impl<Item, Err> Observable for ColdObservable<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item: 'static, Err: 'static> LocalObservable<'static> for ColdObservable<Item, Err> {
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'static,
  {
    let subscription = SingleSubscription::default();
    let observer = MutRc::own(observer);
    for (delay, notification) in self.timeline {
      let mut observer = observer.clone();
      let mut subscription = subscription.clone();
      self.clock.schedule(delay, move || {
        if subscription.is_closed() {
          return;
        }
        let terminal = notification.is_terminal();
        notification.accept(&mut observer);
        if terminal {
          subscription.unsubscribe();
        }
      });
    }
    subscription
  }
}

pub type Recorded<Item, Err> = (Duration, Notification<Item, Err>);

/// Observer that keeps every notification it receives, stamped with the
/// clock's virtual time.
pub struct Recorder<Item, Err> {
  clock: FakeClock,
  records: MutRc<Vec<Recorded<Item, Err>>>,
}

impl<Item, Err> Clone for Recorder<Item, Err> {
  fn clone(&self) -> Self { Recorder { clock: self.clock.clone(), records: self.records.clone() } }
}

impl<Item, Err> Recorder<Item, Err> {
  fn push(&self, notification: Notification<Item, Err>) {
    let now = self.clock.now();
    self.records.rc_deref_mut().push((now, notification));
  }

  pub fn records(&self) -> Vec<Recorded<Item, Err>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.records.rc_deref().clone()
  }

  pub fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self
      .records
      .rc_deref()
      .iter()
      .filter_map(|(_, n)| match n {
        Notification::Next(v) => Some(v.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn is_completed(&self) -> bool {
    self.records.rc_deref().iter().any(|(_, n)| matches!(n, Notification::Completed))
  }

  pub fn err(&self) -> Option<Err>
  where
    Err: Clone,
  {
    self.records.rc_deref().iter().find_map(|(_, n)| match n {
      Notification::Error(e) => Some(e.clone()),
      _ => None,
    })
  }

  /// Virtual time of the terminal notification, if any arrived.
  pub fn terminated_at(&self) -> Option<Duration> {
    self.records.rc_deref().iter().find(|(_, n)| n.is_terminal()).map(|(at, _)| *at)
  }
}

impl<Item, Err> Observer for Recorder<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) { self.push(Notification::Next(value)); }

  fn error(&mut self, err: Err) { self.push(Notification::Error(err)); }

  fn complete(&mut self) { self.push(Notification::Completed); }

  fn is_closed(&self) -> bool { false }
}
