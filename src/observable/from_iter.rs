use crate::prelude::*;
use crate::type_hint::TypeHint;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. Stops
/// pulling from the iterator as soon as the observer is closed, so infinite
/// iterators are fine behind an operator like `take`.
///
/// ```
/// use rxbind::prelude::*;
/// use std::convert::Infallible;
///
/// observable::from_iter::<_, Infallible>(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, TypeHint::new())
}

#[derive(Clone)]
pub struct ObservableIter<Iter, Err>(Iter, TypeHint<Err>);

impl<Iter: IntoIterator, Err> Observable for ObservableIter<Iter, Err> {
  type Item = Iter::Item;
  type Err = Err;
}

impl_local_shared_both! {
  impl<Iter, Err> ObservableIter<Iter, Err>;
  type Unsub = ();
  fn actual_subscribe(this, observer) {
    let mut iter = this.0.into_iter();
    while !observer.is_closed() {
      match iter.next() {
        Some(v) => observer.next(v),
        None => {
          observer.complete();
          break;
        }
      }
    }
  }
  where Iter: IntoIterator
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::convert::Infallible;

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    observable::from_iter::<_, Infallible>(0..100).subscribe_all(
      |_| hit_count += 1,
      |_| {},
      || completed = true,
    );

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn stops_pulling_once_closed() {
    let mut pulled = 0;
    let mut values = vec![];
    observable::from_iter::<_, Infallible>((0..).inspect(|_| pulled += 1))
      .take(3)
      .subscribe(|v| values.push(v));

    assert_eq!(values, vec![0, 1, 2]);
    assert_eq!(pulled, 3);
  }

  #[test]
  fn from_vec() {
    let mut values = vec![];
    observable::from_iter(vec![3, 1, 2]).subscribe(|v| values.push(v));
    assert_eq!(values, vec![3, 1, 2]);
  }
}
