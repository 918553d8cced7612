//! The merge engine behind `flat_map`, `try_flat_map` and `merge_all`.
//!
//! Every source value is projected into a child observable that is subscribed
//! right away. All children run side by side and whatever they emit is
//! forwarded at once, so values of different children interleave freely
//! while each child keeps its own order.
//!
//! One gate per subscription serializes everything that reaches the
//! downstream observer. It holds the observer itself, the number of children
//! still running and whether the source has completed. Taking the observer
//! out of the gate is how the first terminal notification wins.
use crate::{
  prelude::*,
  rc::{MutArc, MutRc, RcDeref, RcDerefMut},
  type_hint::TypeHint,
};
use tracing::{debug, trace};

/// Turns a source value into the child observable to merge.
pub trait Projection<Item, Err> {
  type Child: Observable<Err = Err>;

  fn project(&mut self, value: Item) -> Result<Self::Child, Err>;
}

/// Projection by an infallible closure.
#[derive(Clone)]
pub struct Project<F>(pub F);

/// Projection by a closure that may fail.
#[derive(Clone)]
pub struct TryProject<F>(pub F);

/// The source values are observables already.
#[derive(Clone, Copy, Default)]
pub struct Identity;

impl<Item, Err, F, Child> Projection<Item, Err> for Project<F>
where
  F: FnMut(Item) -> Child,
  Child: Observable<Err = Err>,
{
  type Child = Child;

  #[inline]
  fn project(&mut self, value: Item) -> Result<Child, Err> { Ok((self.0)(value)) }
}

impl<Item, Err, F, Child> Projection<Item, Err> for TryProject<F>
where
  F: FnMut(Item) -> Result<Child, Err>,
  Child: Observable<Err = Err>,
{
  type Child = Child;

  #[inline]
  fn project(&mut self, value: Item) -> Result<Child, Err> { (self.0)(value) }
}

impl<Item, Err> Projection<Item, Err> for Identity
where
  Item: Observable<Err = Err>,
{
  type Child = Item;

  #[inline]
  fn project(&mut self, value: Item) -> Result<Item, Err> { Ok(value) }
}

#[derive(Clone)]
pub struct FlatMapOp<S, P> {
  source: S,
  projection: P,
}

impl<S, P> FlatMapOp<S, P> {
  #[inline]
  pub(crate) fn new(source: S, projection: P) -> Self { FlatMapOp { source, projection } }
}

impl<S, P> Observable for FlatMapOp<S, P>
where
  S: Observable,
  P: Projection<S::Item, S::Err>,
{
  type Item = <P::Child as Observable>::Item;
  type Err = S::Err;
}

impl<'a, S, P> LocalObservable<'a> for FlatMapOp<S, P>
where
  S: LocalObservable<'a>,
  S::Item: 'a,
  P: Projection<S::Item, S::Err> + 'a,
  P::Child: LocalObservable<'a>,
{
  type Unsub = LocalSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'a,
  {
    let subscription = LocalSubscription::default();
    let outer = LocalOuterObserver {
      gate: MutRc::own(MergeGate::new(observer)),
      projection: self.projection,
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    };
    subscription.add(self.source.actual_subscribe(outer));
    subscription
  }
}

impl<S, P> SharedObservable for FlatMapOp<S, P>
where
  S: SharedObservable,
  S::Item: 'static,
  P: Projection<S::Item, S::Err> + Send + Sync + 'static,
  P::Child: SharedObservable,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    let subscription = SharedSubscription::default();
    let outer = SharedOuterObserver {
      gate: MutArc::own(MergeGate::new(observer)),
      projection: self.projection,
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    };
    subscription.add(self.source.actual_subscribe(outer));
    subscription
  }
}

/// The serialization point of one merged subscription. `observer` becomes
/// `None` once a terminal notification has been sent downstream.
struct MergeGate<O> {
  observer: Option<O>,
  active: usize,
  source_completed: bool,
}

impl<O> MergeGate<O> {
  fn new(observer: O) -> Self { MergeGate { observer: Some(observer), active: 0, source_completed: false } }

  /// Counts a child before it is subscribed, so a child that completes
  /// synchronously cannot complete the result early. Returns false once the
  /// result has terminated.
  fn register_child(&mut self) -> bool {
    if self.observer.is_some() {
      self.active += 1;
      true
    } else {
      false
    }
  }

  fn child_completed(&mut self) -> Option<O> {
    self.active -= 1;
    self.finish_if_done()
  }

  fn source_completed(&mut self) -> Option<O> {
    self.source_completed = true;
    self.finish_if_done()
  }

  fn finish_if_done(&mut self) -> Option<O> {
    if self.source_completed && self.active == 0 {
      self.observer.take()
    } else {
      None
    }
  }

  fn fail(&mut self) -> Option<O> { self.observer.take() }
}

impl<O: Observer> MergeGate<O> {
  fn is_closed(&self) -> bool { self.observer.as_ref().map_or(true, O::is_closed) }
}

/// Terminal notifications are sent once the observer has left the gate and
/// the gate is released. Nothing reaches an unsubscribed result.
fn deliver_error<O, U>(observer: Option<O>, subscription: &mut U, err: O::Err)
where
  O: Observer,
  U: SubscriptionLike,
{
  if let Some(mut observer) = observer {
    debug!("flat_map failed, releasing the source and every child");
    if !subscription.is_closed() {
      observer.error(err);
    }
    subscription.unsubscribe();
  }
}

fn deliver_complete<O, U>(observer: Option<O>, subscription: &mut U)
where
  O: Observer,
  U: SubscriptionLike,
{
  if let Some(mut observer) = observer {
    debug!("flat_map completed");
    if !subscription.is_closed() {
      observer.complete();
    }
    subscription.unsubscribe();
  }
}

/// Observes the source of a local merge.
pub struct LocalOuterObserver<'a, O, P, Item> {
  gate: MutRc<MergeGate<O>>,
  projection: P,
  subscription: LocalSubscription,
  _hint: TypeHint<&'a Item>,
}

/// Observes the source of a thread safe merge.
pub struct SharedOuterObserver<O, P, Item> {
  gate: MutArc<MergeGate<O>>,
  projection: P,
  subscription: SharedSubscription,
  _hint: TypeHint<Item>,
}

/// Observes one child of a local merge.
pub struct LocalInnerObserver<O> {
  gate: MutRc<MergeGate<O>>,
  child: LocalSubscription,
  subscription: LocalSubscription,
  done: bool,
}

/// Observes one child of a thread safe merge.
pub struct SharedInnerObserver<O> {
  gate: MutArc<MergeGate<O>>,
  child: SharedSubscription,
  subscription: SharedSubscription,
  done: bool,
}

macro_rules! impl_outer_observer {
  (
    impl<$($lf:lifetime,)? O, P, Item> $ty:ty;
    inner = $inner:ident, subscription = $subscription:ty;
    where $($bounds:tt)*
  ) => {
    impl<$($lf,)? O, P, Item> Observer for $ty
    where
      O: Observer,
      P: Projection<Item, O::Err>,
      $($bounds)*
    {
      type Item = Item;
      type Err = O::Err;

      fn next(&mut self, value: Item) {
        if self.subscription.is_closed() || !self.gate.rc_deref_mut().register_child() {
          return;
        }
        match self.projection.project(value) {
          Ok(child) => {
            let child_subscription = <$subscription>::default();
            self.subscription.add(child_subscription.clone());
            trace!("flat_map subscribes a child");
            let inner = $inner {
              gate: self.gate.clone(),
              child: child_subscription.clone(),
              subscription: self.subscription.clone(),
              done: false,
            };
            child_subscription.add(child.actual_subscribe(inner));
          }
          Err(err) => {
            let observer = self.gate.rc_deref_mut().fail();
            deliver_error(observer, &mut self.subscription, err);
          }
        }
      }

      fn error(&mut self, err: O::Err) {
        let observer = self.gate.rc_deref_mut().fail();
        deliver_error(observer, &mut self.subscription, err);
      }

      fn complete(&mut self) {
        let observer = self.gate.rc_deref_mut().source_completed();
        deliver_complete(observer, &mut self.subscription);
      }

      fn is_closed(&self) -> bool {
        self.subscription.is_closed() || self.gate.rc_deref().is_closed()
      }
    }
  };
}

impl_outer_observer! {
  impl<'a, O, P, Item> LocalOuterObserver<'a, O, P, Item>;
  inner = LocalInnerObserver, subscription = LocalSubscription;
  where
    O: 'a,
    P::Child: LocalObservable<'a, Item = O::Item>,
}

impl_outer_observer! {
  impl<O, P, Item> SharedOuterObserver<O, P, Item>;
  inner = SharedInnerObserver, subscription = SharedSubscription;
  where
    O: Send + 'static,
    P::Child: SharedObservable<Item = O::Item>,
}

macro_rules! impl_inner_observer {
  ($ty:ty) => {
    impl<O: Observer> Observer for $ty {
      type Item = O::Item;
      type Err = O::Err;

      fn next(&mut self, value: O::Item) {
        let mut gate = self.gate.rc_deref_mut();
        if self.done || self.subscription.is_closed() {
          return;
        }
        if let Some(observer) = gate.observer.as_mut() {
          observer.next(value);
        }
      }

      fn error(&mut self, err: O::Err) {
        if self.done {
          return;
        }
        self.done = true;
        let observer = self.gate.rc_deref_mut().fail();
        deliver_error(observer, &mut self.subscription, err);
      }

      /// Each child is counted down exactly once, however often it completes.
      fn complete(&mut self) {
        if self.done {
          return;
        }
        self.done = true;
        trace!("flat_map child completed");
        let observer = self.gate.rc_deref_mut().child_completed();
        self.child.unsubscribe();
        deliver_complete(observer, &mut self.subscription);
      }

      fn is_closed(&self) -> bool {
        self.done
          || self.child.is_closed()
          || self.subscription.is_closed()
          || self.gate.rc_deref().is_closed()
      }
    }
  };
}

impl_inner_observer!(LocalInnerObserver<O>);
impl_inner_observer!(SharedInnerObserver<O>);
