use crate::type_hint::TypeHint;
use crate::prelude::*;

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. The error type is
/// free, so the result can be used as a child of any source.
///
/// ```
/// use rxbind::prelude::*;
/// use std::convert::Infallible;
///
/// observable::of::<_, Infallible>(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item, Err>(v: Item) -> ObservableOf<Item, Err> { ObservableOf(v, TypeHint::new()) }

#[derive(Clone)]
pub struct ObservableOf<Item, Err>(Item, TypeHint<Err>);

impl<Item, Err> Observable for ObservableOf<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl_local_shared_both! {
  impl<Item, Err> ObservableOf<Item, Err>;
  type Unsub = ();
  fn actual_subscribe(this, observer) {
    observer.next(this.0);
    observer.complete();
  }
}

/// Creates an observable that completes without emitting anything.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(TypeHint::new()) }

#[derive(Clone)]
pub struct Empty<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Observable for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl_local_shared_both! {
  impl<Item, Err> Empty<Item, Err>;
  type Unsub = ();
  fn actual_subscribe(_this, observer) {
    observer.complete();
  }
}

/// Creates an observable that fails with `err` right away.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, TypeHint::new()) }

#[derive(Clone)]
pub struct ThrowErr<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err> Observable for ThrowErr<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl_local_shared_both! {
  impl<Item, Err> ThrowErr<Item, Err>;
  type Unsub = ();
  fn actual_subscribe(this, observer) {
    observer.error(this.0);
  }
}
