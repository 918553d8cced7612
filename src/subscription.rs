use smallvec::SmallVec;
use std::{
  any::Any,
  cell::RefCell,
  fmt::{Debug, Formatter},
  mem,
  rc::Rc,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
  },
};

/// Subscription returns from `Observable.subscribe(Subscriber)` to allow
///  unsubscribing.
pub trait SubscriptionLike {
  /// This allows deregistering an stream before it has finished receiving all
  /// events (i.e. before onCompleted is called).
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

impl Debug for Box<dyn SubscriptionLike> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Box<dyn SubscriptionLike>")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

/// Synchronous sources have nothing left to tear down once `actual_subscribe`
/// returns.
impl SubscriptionLike for () {
  #[inline]
  fn unsubscribe(&mut self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

/// A composite subscription for the local context. Everything added is torn
/// down together; adding to a closed subscription tears the addition down
/// immediately.
#[derive(Clone, Debug, Default)]
pub struct LocalSubscription(Rc<RefCell<Inner<Box<dyn SubscriptionLike>>>>);

impl LocalSubscription {
  pub fn add<S: SubscriptionLike + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) {
      return;
    }
    let rejected = self.0.borrow_mut().add(Box::new(subscription));
    if let Some(mut rejected) = rejected {
      rejected.unsubscribe();
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Rc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl TearDownSize for LocalSubscription {
  fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }
}

pub trait TearDownSize: SubscriptionLike {
  fn teardown_size(&self) -> usize;
}

impl SubscriptionLike for LocalSubscription {
  fn unsubscribe(&mut self) {
    let teardown = self.0.borrow_mut().close();
    teardown.into_iter().for_each(|mut v| v.unsubscribe());
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().closed }
}

/// The thread safe counterpart of [`LocalSubscription`].
#[derive(Clone, Debug, Default)]
pub struct SharedSubscription(Arc<Mutex<Inner<Box<dyn SubscriptionLike + Send + Sync>>>>);

impl SharedSubscription {
  pub fn add<S: SubscriptionLike + Send + Sync + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) {
      return;
    }
    let rejected = self.lock().add(Box::new(subscription));
    if let Some(mut rejected) = rejected {
      rejected.unsubscribe();
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }

  fn lock(&self) -> MutexGuard<'_, Inner<Box<dyn SubscriptionLike + Send + Sync>>> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl TearDownSize for SharedSubscription {
  fn teardown_size(&self) -> usize { self.lock().teardown.len() }
}

impl SubscriptionLike for SharedSubscription {
  fn unsubscribe(&mut self) {
    let teardown = self.lock().close();
    teardown.into_iter().for_each(|mut v| v.unsubscribe());
  }

  #[inline]
  fn is_closed(&self) -> bool { self.lock().closed }
}

struct Inner<T> {
  closed: bool,
  teardown: SmallVec<[T; 1]>,
}

impl<T> Debug for Inner<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Inner")
      .field("closed", &self.closed)
      .field("teardown_count", &self.teardown.len())
      .finish()
  }
}

impl<T: SubscriptionLike> Inner<T> {
  /// Returns the subscription back when it arrives after closing; the caller
  /// must tear it down outside of the lock.
  fn add(&mut self, v: T) -> Option<T> {
    if self.closed {
      Some(v)
    } else if v.is_closed() {
      None
    } else {
      self.teardown.retain(|v| !v.is_closed());
      self.teardown.push(v);
      None
    }
  }

  /// Marks the subscription closed and hands out everything that still needs
  /// to be torn down, so no lock is held while the children unsubscribe.
  fn close(&mut self) -> SmallVec<[T; 1]> {
    if self.closed {
      SmallVec::new()
    } else {
      self.closed = true;
      mem::take(&mut self.teardown)
    }
  }
}

impl<T> Default for Inner<T> {
  fn default() -> Self { Inner { closed: false, teardown: SmallVec::new() } }
}

/// A flag only subscription, shared by every clone.
#[derive(Clone, Debug, Default)]
pub struct SingleSubscription(Arc<AtomicBool>);

impl SubscriptionLike for SingleSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0.store(true, Ordering::Release); }

  #[inline]
  fn is_closed(&self) -> bool { self.0.load(Ordering::Acquire) }
}

impl<T: ?Sized> SubscriptionLike for Box<T>
where
  T: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) {
    let s = &mut **self;
    s.unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    let s = &**self;
    s.is_closed()
  }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(self.0) }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn add_remove_for_local() {
    let local = LocalSubscription::default();
    let l1 = LocalSubscription::default();
    let l2 = LocalSubscription::default();
    let l3 = LocalSubscription::default();
    local.add(l1);
    assert_eq!(local.teardown_size(), 1);
    local.add(l2);
    assert_eq!(local.teardown_size(), 2);
    local.add(l3);
    assert_eq!(local.teardown_size(), 3);
  }

  #[test]
  fn add_remove_for_shared() {
    let shared = SharedSubscription::default();
    let s1 = SharedSubscription::default();
    let s2 = SharedSubscription::default();
    shared.add(s1);
    assert_eq!(shared.teardown_size(), 1);
    shared.add(s2);
    assert_eq!(shared.teardown_size(), 2);
  }

  #[test]
  fn closed_entries_are_pruned_on_add() {
    let local = LocalSubscription::default();
    let mut done = LocalSubscription::default();
    local.add(done.clone());
    done.unsubscribe();
    local.add(LocalSubscription::default());
    assert_eq!(local.teardown_size(), 1);
  }

  #[test]
  fn adding_to_itself_is_ignored() {
    let local = LocalSubscription::default();
    local.add(local.clone());
    assert_eq!(local.teardown_size(), 0);
  }

  #[test]
  fn add_after_close_unsubscribes() {
    let mut local = LocalSubscription::default();
    local.unsubscribe();
    let flag = SingleSubscription::default();
    local.add(flag.clone());
    assert!(flag.is_closed());
    assert_eq!(local.teardown_size(), 0);
  }

  #[test]
  fn unsubscribe_cascades() {
    let mut root = SharedSubscription::default();
    let child = SharedSubscription::default();
    let flag = SingleSubscription::default();
    child.add(flag.clone());
    root.add(child.clone());

    root.unsubscribe();
    assert!(root.is_closed());
    assert!(child.is_closed());
    assert!(flag.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let flag = SingleSubscription::default();
    {
      let _guard = SubscriptionWrapper(flag.clone()).unsubscribe_when_dropped();
      assert!(!flag.is_closed());
    }
    assert!(flag.is_closed());
  }

  #[test]
  fn guard_wraps_existing_subscription() {
    let flag = SingleSubscription::default();
    drop(SubscriptionGuard::new(flag.clone()));
    assert!(flag.is_closed());
  }

  #[test]
  fn wrapper_hands_back_subscription() {
    let flag = SingleSubscription::default();
    let mut inner = SubscriptionWrapper(flag.clone()).into_inner();
    assert!(!inner.is_closed());
    inner.unsubscribe();
    assert!(flag.is_closed());
  }
}
