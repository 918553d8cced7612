use crate::{prelude::*, type_hint::TypeHint};

#[derive(Clone)]
pub struct MapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> MapOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func } }
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<'a, S, F, B> LocalObservable<'a> for MapOp<S, F>
where
  S: LocalObservable<'a>,
  S::Item: 'a,
  F: FnMut(S::Item) -> B + 'a,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'a,
  {
    let map = MapObserver { observer, map: self.func, _hint: TypeHint::new() };
    self.source.actual_subscribe(map)
  }
}

impl<S, F, B> SharedObservable for MapOp<S, F>
where
  S: SharedObservable,
  S::Item: 'static,
  F: FnMut(S::Item) -> B + Send + Sync + 'static,
{
  type Unsub = S::Unsub;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    let map = MapObserver { observer, map: self.func, _hint: TypeHint::new() };
    self.source.actual_subscribe(map)
  }
}

pub struct MapObserver<O, F, A> {
  observer: O,
  map: F,
  _hint: TypeHint<A>,
}

impl<O, F, A> Observer for MapObserver<O, F, A>
where
  O: Observer,
  F: FnMut(A) -> O::Item,
{
  type Item = A;
  type Err = O::Err;

  #[inline]
  fn next(&mut self, value: A) { self.observer.next((self.map)(value)) }

  #[inline]
  fn error(&mut self, err: Self::Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::convert::Infallible;

  #[test]
  fn primitive_type() {
    let mut i = 0;
    observable::from_iter::<_, Infallible>(100..101)
      .map(|v| v * 2)
      .subscribe(|v| i += v);
    assert_eq!(i, 200);
  }

  #[test]
  fn map_types_mixed() {
    let mut i = 0;
    observable::from_iter::<_, Infallible>(vec!['a', 'b', 'c'])
      .map(|_| 1)
      .subscribe(|v| i += v);
    assert_eq!(i, 3);
  }

  #[test]
  fn error_passes_through() {
    let mut err = None;
    observable::throw_err::<i32, _>("bad")
      .map(|v| v + 1)
      .subscribe_all(|_| {}, |e| err = Some(e), || {});
    assert_eq!(err, Some("bad"));
  }
}
