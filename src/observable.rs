//! The observable traits and the source factories.
//!
//! Every observable carries its `Item` and `Err` types. How it is subscribed
//! depends on the context: [`LocalObservable`] accepts any observer living
//! for `'a` on the current thread, [`SharedObservable`] accepts observers
//! that may be driven from any thread.
use crate::prelude::*;
use std::convert::Infallible;

/// Implements both `LocalObservable` and `SharedObservable` for a source whose
/// subscribe logic does not depend on the context.
macro_rules! impl_local_shared_both {
  (
    impl<$($g:ident),*> $ty:ty;
    type Unsub = $unsub:ty;
    fn actual_subscribe($this:ident, $observer:ident) $body:block
    $(where $($w:tt)*)?
  ) => {
    impl<'a, $($g),*> $crate::observable::LocalObservable<'a> for $ty
    $(where $($w)*)?
    {
      type Unsub = $unsub;

      fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
      where
        O: $crate::observer::Observer<Item = Self::Item, Err = Self::Err> + 'a,
      {
        let $this = self;
        #[allow(unused_mut)]
        let mut $observer = observer;
        $body
      }
    }

    impl<$($g),*> $crate::observable::SharedObservable for $ty
    $(where $($w)*)?
    {
      type Unsub = $unsub;

      fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
      where
        O: $crate::observer::Observer<Item = Self::Item, Err = Self::Err>
          + Send
          + Sync
          + 'static,
      {
        let $this = self;
        #[allow(unused_mut)]
        let mut $observer = observer;
        $body
      }
    }
  };
}

mod create;
pub mod fake_timer;
mod from_iter;
mod of;
#[cfg(feature = "timer")]
mod timer;

pub use create::*;
pub use from_iter::*;
pub use of::*;
#[cfg(feature = "timer")]
pub use timer::*;

/// A representation of any set of values over any amount of time. This is the
/// most basic building block of rxbind.
pub trait Observable: Sized {
  type Item;
  type Err;

  /// Applies `f` to every value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Emits only the values that pass `filter`.
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp::new(self, filter)
  }

  /// Emits the first `count` values, then completes and releases the source.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Projects every value into a child observable and merges all children
  /// into one sequence (bind, `SelectMany`).
  ///
  /// Children are subscribed as soon as their value arrives and run
  /// concurrently; values are forwarded the moment a child emits them. The
  /// result completes once the source and every child have completed, and
  /// fails with the first error raised by the source or any child, releasing
  /// everything still running.
  ///
  /// ```
  /// use rxbind::prelude::*;
  /// use std::convert::Infallible;
  ///
  /// let mut values = vec![];
  /// observable::from_iter::<_, Infallible>(vec![1, 2])
  ///   .flat_map(|x| observable::from_iter(vec![x * 10, x * 10 + 1]))
  ///   .subscribe(|v| values.push(v));
  ///
  /// assert_eq!(values, vec![10, 11, 20, 21]);
  /// ```
  fn flat_map<Child, F>(self, f: F) -> FlatMapOp<Self, Project<F>>
  where
    F: FnMut(Self::Item) -> Child,
    Child: Observable<Err = Self::Err>,
  {
    FlatMapOp::new(self, Project(f))
  }

  /// Like [`Observable::flat_map`], but the projection itself may fail. A
  /// projection error terminates the result exactly like a child error.
  fn try_flat_map<Child, F>(self, f: F) -> FlatMapOp<Self, TryProject<F>>
  where
    F: FnMut(Self::Item) -> Result<Child, Self::Err>,
    Child: Observable<Err = Self::Err>,
  {
    FlatMapOp::new(self, TryProject(f))
  }

  /// Merges an observable of observables.
  fn merge_all(self) -> FlatMapOp<Self, Identity>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    FlatMapOp::new(self, Identity)
  }

  /// Switches to the thread safe subscribe API.
  fn into_shared(self) -> Shared<Self> { Shared(self) }
}

/// An observable that can be subscribed on the current thread by an observer
/// that lives for `'a`.
pub trait LocalObservable<'a>: Observable {
  type Unsub: SubscriptionLike + 'static;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'a;

  /// Subscribes with a `next` handler. Only sequences that cannot fail can be
  /// subscribed this way, use [`LocalObservable::subscribe_all`] otherwise.
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<Self::Unsub>
  where
    Self: Observable<Err = Infallible>,
    Self::Item: 'a,
    N: FnMut(Self::Item) + 'a,
  {
    SubscriptionWrapper(self.actual_subscribe(ObserverN::new(next)))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SubscriptionWrapper<Self::Unsub>
  where
    Self::Item: 'a,
    Self::Err: 'a,
    N: FnMut(Self::Item) + 'a,
    E: FnMut(Self::Err) + 'a,
    C: FnMut() + 'a,
  {
    SubscriptionWrapper(self.actual_subscribe(ObserverAll::new(next, error, complete)))
  }
}

/// An observable whose observers may be called from any thread.
pub trait SharedObservable: Observable {
  type Unsub: SubscriptionLike + Send + Sync + 'static;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static;
}

/// Marks an observable to be subscribed through [`SharedObservable`].
#[derive(Clone)]
pub struct Shared<S>(pub(crate) S);

impl<S: Observable> Observable for Shared<S> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S: SharedObservable> SharedObservable for Shared<S> {
  type Unsub = S::Unsub;

  #[inline]
  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    self.0.actual_subscribe(observer)
  }
}

impl<S: SharedObservable> Shared<S> {
  pub fn subscribe<N>(self, next: N) -> SubscriptionWrapper<S::Unsub>
  where
    S: Observable<Err = Infallible>,
    S::Item: 'static,
    N: FnMut(S::Item) + Send + Sync + 'static,
  {
    SubscriptionWrapper(self.0.actual_subscribe(ObserverN::new(next)))
  }

  pub fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SubscriptionWrapper<S::Unsub>
  where
    S::Item: 'static,
    S::Err: 'static,
    N: FnMut(S::Item) + Send + Sync + 'static,
    E: FnMut(S::Err) + Send + Sync + 'static,
    C: FnMut() + Send + Sync + 'static,
  {
    SubscriptionWrapper(self.0.actual_subscribe(ObserverAll::new(next, error, complete)))
  }
}
