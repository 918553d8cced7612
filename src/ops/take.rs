use crate::prelude::*;

/// Emits only the first `count` values emitted by the source, then completes
/// and unsubscribes from the source.
///
/// If the source emits fewer than `count` values, all of them are emitted and
/// the source's own terminal notification is forwarded.
///
/// ```
/// use rxbind::prelude::*;
/// use std::convert::Infallible;
///
/// let mut values = vec![];
/// observable::from_iter::<_, Infallible>(0..10)
///   .take(5)
///   .subscribe(|v| values.push(v));
/// assert_eq!(values, vec![0, 1, 2, 3, 4]);
/// ```
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  #[inline]
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Err = S::Err;
}

macro_rules! take_subscribe {
  ($this:ident, $observer:ident, $subscription:ty) => {{
    let mut subscription = <$subscription>::default();
    if $this.count == 0 {
      let mut observer = $observer;
      observer.complete();
      subscription.unsubscribe();
    } else {
      let take = TakeObserver {
        observer: $observer,
        subscription: subscription.clone(),
        remaining: $this.count,
      };
      subscription.add($this.source.actual_subscribe(take));
    }
    subscription
  }};
}

impl<'a, S> LocalObservable<'a> for TakeOp<S>
where
  S: LocalObservable<'a>,
{
  type Unsub = LocalSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'a,
  {
    take_subscribe!(self, observer, LocalSubscription)
  }
}

impl<S> SharedObservable for TakeOp<S>
where
  S: SharedObservable,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    take_subscribe!(self, observer, SharedSubscription)
  }
}

pub struct TakeObserver<O, U> {
  observer: O,
  subscription: U,
  remaining: usize,
}

impl<O, U> Observer for TakeObserver<O, U>
where
  O: Observer,
  U: SubscriptionLike,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
      self.observer.next(value);
      if self.remaining == 0 {
        self.observer.complete();
        self.subscription.unsubscribe();
      }
    }
  }

  fn error(&mut self, err: Self::Err) {
    if self.remaining > 0 {
      self.remaining = 0;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if self.remaining > 0 {
      self.remaining = 0;
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.remaining == 0 || self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
  };

  #[test]
  fn base_function() {
    let completed = Cell::new(0);
    let mut next_count = 0;

    observable::from_iter::<_, ()>(0..100)
      .take(5)
      .subscribe_all(|_| next_count += 1, |_| {}, || completed.set(completed.get() + 1));

    assert_eq!(completed.get(), 1);
    assert_eq!(next_count, 5);
  }

  #[test]
  fn take_zero_completes_without_subscribing() {
    let completed = Cell::new(false);
    let mut subject = LocalSubject::<i32, ()>::new();
    let subscription = subject
      .clone()
      .take(0)
      .subscribe_all(|_| {}, |_| {}, || completed.set(true));

    assert!(subscription.is_closed());
    assert_eq!(subject.subscribed_size(), 0);
    subject.next(1);
    assert!(completed.get());
  }

  #[test]
  fn releases_the_source() {
    let values = RefCell::new(vec![]);
    let mut subject = LocalSubject::<i32, Infallible>::new();
    subject.clone().take(2).subscribe(|v| values.borrow_mut().push(v));
    assert_eq!(subject.subscribed_size(), 1);

    (0..5).for_each(|v| subject.next(v));
    assert_eq!(subject.subscribed_size(), 0);
    assert_eq!(*values.borrow(), vec![0, 1]);
  }

  #[test]
  fn shorter_source_completes_normally() {
    let mut values = vec![];
    let mut completed = false;
    observable::from_iter::<_, ()>(0..3)
      .take(10)
      .subscribe_all(|v| values.push(v), |_| {}, || completed = true);
    assert_eq!(values, vec![0, 1, 2]);
    assert!(completed);
  }
}
