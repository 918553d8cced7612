//! Hot sources that multicast everything they observe.
//!
//! A subject is both an [`Observer`] and an observable: values pushed into it
//! are forwarded to every observer subscribed at that moment. Once it has
//! completed or failed, later subscribers receive that terminal notification
//! straight away.
use crate::{
  prelude::*,
  rc::{MutArc, MutRc, RcDeref, RcDerefMut},
};
use smallvec::SmallVec;

type LocalHandle<'a, Item, Err> = MutRc<Box<dyn Observer<Item = Item, Err = Err> + 'a>>;
type SharedHandle<Item, Err> = MutArc<Box<dyn Observer<Item = Item, Err = Err> + Send>>;

pub struct LocalSubject<'a, Item, Err> {
  core: MutRc<SubjectCore<LocalHandle<'a, Item, Err>, Err>>,
}

/// The thread safe counterpart of [`LocalSubject`].
pub struct SharedSubject<Item, Err> {
  core: MutArc<SubjectCore<SharedHandle<Item, Err>, Err>>,
}

struct SubjectCore<Ob, Err> {
  observers: Vec<Entry<Ob>>,
  stopped: Option<Stopped<Err>>,
}

#[derive(Clone)]
struct Entry<Ob> {
  observer: Ob,
  closed: SingleSubscription,
}

#[derive(Clone)]
enum Stopped<Err> {
  Completed,
  Error(Err),
}

impl<Err> Stopped<Err> {
  fn replay<O: Observer<Err = Err>>(self, observer: &mut O) {
    match self {
      Stopped::Completed => observer.complete(),
      Stopped::Error(err) => observer.error(err),
    }
  }
}

impl<Ob, Err> Default for SubjectCore<Ob, Err> {
  fn default() -> Self { SubjectCore { observers: vec![], stopped: None } }
}

impl<Ob, Err> SubjectCore<Ob, Err> {
  fn subscribed_size(&self) -> usize {
    self.observers.iter().filter(|e| !e.closed.is_closed()).count()
  }
}

impl<Ob: Clone, Err: Clone> SubjectCore<Ob, Err> {
  /// Registers `observer`, or hands it back with the terminal it missed.
  fn add(&mut self, observer: Ob) -> Result<SingleSubscription, (Ob, Stopped<Err>)> {
    match &self.stopped {
      Some(stopped) => Err((observer, stopped.clone())),
      None => {
        self.observers.retain(|e| !e.closed.is_closed());
        let closed = SingleSubscription::default();
        self.observers.push(Entry { observer, closed: closed.clone() });
        Ok(closed)
      }
    }
  }

  /// Snapshot of the observers still subscribed. Emitting happens on the
  /// snapshot so observers may unsubscribe while being notified.
  fn live(&mut self) -> SmallVec<[Entry<Ob>; 2]> {
    self.observers.retain(|e| !e.closed.is_closed());
    self.observers.iter().cloned().collect()
  }

  fn stop(&mut self, stopped: Stopped<Err>) -> Vec<Entry<Ob>> {
    if self.stopped.is_some() {
      return vec![];
    }
    self.stopped = Some(stopped);
    std::mem::take(&mut self.observers)
  }
}

macro_rules! impl_subject {
  (impl<$($lt:lifetime,)? Item, Err> $ty:ty) => {
    impl<$($lt,)? Item, Err> $ty {
      pub fn new() -> Self { Self::default() }

      /// Number of observers currently subscribed.
      pub fn subscribed_size(&self) -> usize { self.core.rc_deref().subscribed_size() }

      /// Whether the subject has already completed or failed.
      pub fn is_stopped(&self) -> bool { self.core.rc_deref().stopped.is_some() }
    }

    impl<$($lt,)? Item, Err> Default for $ty {
      fn default() -> Self { Self { core: <_>::default() } }
    }

    impl<$($lt,)? Item, Err> Clone for $ty {
      fn clone(&self) -> Self { Self { core: self.core.clone() } }
    }

    impl<$($lt,)? Item, Err> Observable for $ty {
      type Item = Item;
      type Err = Err;
    }

    impl<$($lt,)? Item: Clone, Err: Clone> Observer for $ty {
      type Item = Item;
      type Err = Err;

      fn next(&mut self, value: Item) {
        let live = self.core.rc_deref_mut().live();
        let mut iter = live.into_iter().peekable();
        while let Some(mut entry) = iter.next() {
          if entry.closed.is_closed() {
            continue;
          }
          if iter.peek().is_some() {
            entry.observer.next(value.clone());
          } else {
            entry.observer.next(value);
            break;
          }
        }
      }

      fn error(&mut self, err: Err) {
        let observers = self.core.rc_deref_mut().stop(Stopped::Error(err.clone()));
        for mut entry in observers {
          if !entry.closed.is_closed() {
            entry.observer.error(err.clone());
            entry.closed.unsubscribe();
          }
        }
      }

      fn complete(&mut self) {
        let observers = self.core.rc_deref_mut().stop(Stopped::Completed);
        for mut entry in observers {
          if !entry.closed.is_closed() {
            entry.observer.complete();
            entry.closed.unsubscribe();
          }
        }
      }

      fn is_closed(&self) -> bool { self.is_stopped() }
    }
  };
}

impl_subject!(impl<'a, Item, Err> LocalSubject<'a, Item, Err>);
impl_subject!(impl<Item, Err> SharedSubject<Item, Err>);

impl<'a, Item: 'a, Err: Clone + 'a> LocalObservable<'a> for LocalSubject<'a, Item, Err> {
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + 'a,
  {
    let observer: Box<dyn Observer<Item = Item, Err = Err> + 'a> = Box::new(observer);
    let added = self.core.rc_deref_mut().add(MutRc::own(observer));
    match added {
      Ok(subscription) => subscription,
      Err((mut observer, stopped)) => {
        stopped.replay(&mut observer);
        let mut subscription = SingleSubscription::default();
        subscription.unsubscribe();
        subscription
      }
    }
  }
}

impl<Item: Send + 'static, Err: Clone + Send + 'static> SharedObservable
  for SharedSubject<Item, Err>
{
  type Unsub = SingleSubscription;

  fn actual_subscribe<O>(self, observer: O) -> Self::Unsub
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + Sync + 'static,
  {
    let observer: Box<dyn Observer<Item = Item, Err = Err> + Send> = Box::new(observer);
    let added = self.core.rc_deref_mut().add(MutArc::own(observer));
    match added {
      Ok(subscription) => subscription,
      Err((mut observer, stopped)) => {
        stopped.replay(&mut observer);
        let mut subscription = SingleSubscription::default();
        subscription.unsubscribe();
        subscription
      }
    }
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    cell::RefCell,
    convert::Infallible,
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
    thread,
  };

  #[test]
  fn multicast() {
    let first = RefCell::new(vec![]);
    let second = RefCell::new(vec![]);
    {
      let mut subject = LocalSubject::<_, Infallible>::new();
      subject.clone().subscribe(|v| first.borrow_mut().push(v));
      subject.next(1);
      subject.clone().subscribe(|v| second.borrow_mut().push(v));
      subject.next(2);
      assert_eq!(subject.subscribed_size(), 2);
    }
    assert_eq!(first.into_inner(), vec![1, 2]);
    assert_eq!(second.into_inner(), vec![2]);
  }

  #[test]
  fn unsubscribe_removes_observer() {
    let mut subject = LocalSubject::<i32, Infallible>::new();
    let mut subscription = subject.clone().subscribe(|_| {});
    assert_eq!(subject.subscribed_size(), 1);

    subscription.unsubscribe();
    assert_eq!(subject.subscribed_size(), 0);
    subject.next(1);
  }

  #[test]
  fn late_subscriber_gets_terminal() {
    let err = RefCell::new(None);
    let mut subject = LocalSubject::<i32, &str>::new();
    subject.error("boom");
    assert!(subject.is_stopped());

    let subscription = subject.clone().subscribe_all(|_| {}, |e| *err.borrow_mut() = Some(e), || {});
    assert!(subscription.is_closed());
    assert_eq!(subject.subscribed_size(), 0);
    assert_eq!(*err.borrow(), Some("boom"));
  }

  #[test]
  fn complete_once() {
    let completed = RefCell::new(0);
    let mut subject = LocalSubject::<i32, ()>::new();
    subject.clone().subscribe_all(|_| {}, |_| {}, || *completed.borrow_mut() += 1);
    subject.complete();
    subject.complete();
    subject.error(());
    assert_eq!(*completed.borrow(), 1);
  }

  #[test]
  fn shared_across_threads() {
    let sum = Arc::new(AtomicUsize::new(0));
    let subject = SharedSubject::<usize, Infallible>::new();
    let c_sum = sum.clone();
    subject.clone().into_shared().subscribe(move |v| {
      c_sum.fetch_add(v, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..4)
      .map(|_| {
        let mut subject = subject.clone();
        thread::spawn(move || (1..=100).for_each(|v| subject.next(v)))
      })
      .collect();
    handles.into_iter().for_each(|h| h.join().unwrap());

    assert_eq!(sum.load(Ordering::SeqCst), 4 * 5050);
  }
}
