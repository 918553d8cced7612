//! Observer trait and the closure based observers used by `subscribe`.
//!
//! An observer receives zero or more `next` calls followed by at most one
//! terminal call, either `error` or `complete`.
use crate::type_hint::TypeHint;
use std::convert::Infallible;

/// The consumer side of a reactive sequence.
pub trait Observer {
  type Item;
  type Err;

  fn next(&mut self, value: Self::Item);

  fn error(&mut self, err: Self::Err);

  fn complete(&mut self);

  /// Whether the observer accepts no more values. Synchronous sources such
  /// as `from_iter` check it to stop producing early.
  fn is_closed(&self) -> bool;
}

/// `None` swallows every notification.
impl<O: Observer> Observer for Option<O> {
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, O::is_closed) }
}

impl<'a, Item, Err> Observer for Box<dyn Observer<Item = Item, Err = Err> + 'a> {
  type Item = Item;
  type Err = Err;
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<Item, Err> Observer for Box<dyn Observer<Item = Item, Err = Err> + Send> {
  type Item = Item;
  type Err = Err;
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }
  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }
  #[inline]
  fn complete(&mut self) { (**self).complete() }
  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Observer built from a single `next` closure. Only sequences that cannot
/// fail may be observed this way.
#[derive(Clone)]
pub struct ObserverN<N, Item> {
  next: N,
  _hint: TypeHint<Item>,
}

impl<N, Item> ObserverN<N, Item> {
  pub fn new(next: N) -> Self { ObserverN { next, _hint: TypeHint::new() } }
}

impl<N, Item> Observer for ObserverN<N, Item>
where
  N: FnMut(Item),
{
  type Item = Item;
  type Err = Infallible;

  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Infallible) { match err {} }

  #[inline]
  fn complete(&mut self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from `next`, `error` and `complete` closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C, Item, Err> {
  next: N,
  error: E,
  complete: C,
  _hint: TypeHint<(Item, Err)>,
}

impl<N, E, C, Item, Err> ObserverAll<N, E, C, Item, Err> {
  pub fn new(next: N, error: E, complete: C) -> Self {
    ObserverAll { next, error, complete, _hint: TypeHint::new() }
  }
}

impl<N, E, C, Item, Err> Observer for ObserverAll<N, E, C, Item, Err>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Wraps an observer so nothing reaches it after a terminal notification.
pub struct Subscriber<O> {
  observer: O,
  stopped: bool,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self { Subscriber { observer, stopped: false } }

  #[inline]
  pub fn is_stopped(&self) -> bool { self.stopped }
}

impl<O: Observer> Observer for Subscriber<O> {
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if !self.stopped {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    if !self.stopped {
      self.stopped = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.stopped {
      self.stopped = true;
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.stopped || self.observer.is_closed() }
}
