use crate::prelude::*;
use crate::type_hint::TypeHint;

/// Creates an observable from a function that drives the observer by hand.
///
/// Anything pushed after the first `error` or `complete` is dropped.
///
/// ```
/// use rxbind::prelude::*;
///
/// observable::create(|s| {
///   s.next(1);
///   s.next(2);
///   s.error("odd");
///   s.next(3);
/// })
/// .subscribe_all(|v: i32| println!("{v}"), |e: &str| println!("{e}"), || {});
/// ```
pub fn create<F, Item, Err>(subscribe: F) -> ObservableFn<F, Item, Err>
where
  F: FnOnce(&mut dyn Observer<Item = Item, Err = Err>),
{
  ObservableFn(subscribe, TypeHint::new())
}

#[derive(Clone)]
pub struct ObservableFn<F, Item, Err>(F, TypeHint<(Item, Err)>);

impl<F, Item, Err> Observable for ObservableFn<F, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl_local_shared_both! {
  impl<F, Item, Err> ObservableFn<F, Item, Err>;
  type Unsub = ();
  fn actual_subscribe(this, observer) {
    let mut subscriber = Subscriber::new(observer);
    let subscriber: &mut dyn Observer<Item = Item, Err = Err> = &mut subscriber;
    (this.0)(subscriber);
  }
  where F: FnOnce(&mut dyn Observer<Item = Item, Err = Err>)
}
