//! Integration tests for the merge engine.
//!
//! Covers the bind laws over several source shapes, and the thread safe
//! context with children emitting from many threads at once.

use std::{
  cell::RefCell,
  convert::Infallible,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
};

use rxbind::prelude::*;

fn collect<S>(source: S) -> Vec<S::Item>
where
  S: for<'a> LocalObservable<'a, Err = Infallible>,
{
  let values = RefCell::new(vec![]);
  source.subscribe(|v| values.borrow_mut().push(v));
  values.into_inner()
}

#[test]
fn flatten_law_over_uneven_children() {
  let shapes: Vec<Vec<Vec<u32>>> = vec![
    vec![],
    vec![vec![]],
    vec![vec![1], vec![], vec![2, 3]],
    (0..10).map(|i| (0..i).collect()).collect(),
  ];
  for rows in shapes {
    let flattened = collect(observable::from_iter(rows.clone()).flat_map(observable::from_iter));
    assert_eq!(flattened, rows.concat());
  }
}

#[test]
fn bind_laws_against_map_and_filter() {
  for len in [0, 1, 7, 64] {
    let mapped = collect(observable::from_iter(0..len).map(|v| v * v));
    let bound = collect(observable::from_iter(0..len).flat_map(|v| observable::of(v * v)));
    assert_eq!(mapped, bound);

    let filtered = collect(observable::from_iter(0..len).filter(|v| v % 4 == 1));
    let bound = collect(
      observable::from_iter(0..len).flat_map(|v| observable::from_iter((v % 4 == 1).then_some(v))),
    );
    assert_eq!(filtered, bound);
  }
}

#[test]
fn chained_operators() {
  let values = collect(
    observable::from_iter(1..=10)
      .filter(|v| v % 2 == 0)
      .flat_map(|v| observable::from_iter(vec![v, -v]))
      .map(|v| v * 10)
      .take(5),
  );
  assert_eq!(values, vec![20, -20, 40, -40, 60]);
}

#[test]
fn concurrent_children_deliver_every_value_once() {
  const CHILDREN: usize = 8;
  const PER_CHILD: usize = 1_000;

  let children: Vec<_> = (0..CHILDREN).map(|_| SharedSubject::<usize, Infallible>::new()).collect();
  let mut source = SharedSubject::<usize, Infallible>::new();
  let count = Arc::new(AtomicUsize::new(0));
  let sum = Arc::new(AtomicUsize::new(0));
  let completed = Arc::new(AtomicUsize::new(0));

  let c_children = children.clone();
  let (c_count, c_sum, c_completed) = (count.clone(), sum.clone(), completed.clone());
  source
    .clone()
    .flat_map(move |i| c_children[i].clone())
    .into_shared()
    .subscribe_all(
      move |v| {
        c_count.fetch_add(1, Ordering::SeqCst);
        c_sum.fetch_add(v, Ordering::SeqCst);
      },
      |_| {},
      move || {
        c_completed.fetch_add(1, Ordering::SeqCst);
      },
    );
  (0..CHILDREN).for_each(|i| source.next(i));
  source.complete();

  let handles: Vec<_> = children
    .into_iter()
    .map(|mut child| {
      thread::spawn(move || {
        (0..PER_CHILD).for_each(|v| child.next(v));
        child.complete();
      })
    })
    .collect();
  handles.into_iter().for_each(|h| h.join().unwrap());

  assert_eq!(count.load(Ordering::SeqCst), CHILDREN * PER_CHILD);
  assert_eq!(sum.load(Ordering::SeqCst), CHILDREN * (PER_CHILD * (PER_CHILD - 1) / 2));
  assert_eq!(completed.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_failure_is_delivered_once() {
  let children: Vec<_> = (0..4).map(|_| SharedSubject::<usize, usize>::new()).collect();
  let mut source = SharedSubject::<usize, usize>::new();
  let errors = Arc::new(Mutex::new(vec![]));

  let c_children = children.clone();
  let c_errors = errors.clone();
  source
    .clone()
    .flat_map(move |i| c_children[i].clone())
    .into_shared()
    .subscribe_all(|_| {}, move |e| c_errors.lock().unwrap().push(e), || {});
  (0..4).for_each(|i| source.next(i));

  let handles: Vec<_> = children
    .into_iter()
    .enumerate()
    .map(|(i, mut child)| {
      thread::spawn(move || {
        (0..100).for_each(|v| child.next(v));
        child.error(i);
      })
    })
    .collect();
  handles.into_iter().for_each(|h| h.join().unwrap());

  assert_eq!(errors.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribe_from_another_thread() {
  let child = SharedSubject::<usize, Infallible>::new();
  let mut source = SharedSubject::<usize, Infallible>::new();
  let received = Arc::new(AtomicUsize::new(0));

  let c_child = child.clone();
  let c_received = received.clone();
  let subscription = source
    .clone()
    .flat_map(move |_| c_child.clone())
    .into_shared()
    .subscribe(move |_| {
      c_received.fetch_add(1, Ordering::SeqCst);
    });
  source.next(0);
  assert_eq!(child.subscribed_size(), 1);

  thread::spawn(move || {
    let mut subscription = subscription;
    subscription.unsubscribe();
  })
  .join()
  .unwrap();

  let mut c_child = child.clone();
  c_child.next(1);
  assert_eq!(child.subscribed_size(), 0);
  assert_eq!(source.subscribed_size(), 0);
  assert_eq!(received.load(Ordering::SeqCst), 0);
}

#[cfg(all(feature = "futures-scheduler", feature = "timer"))]
#[test]
fn timed_children_run_concurrently_on_a_thread_pool() {
  use futures::{channel::oneshot, executor::block_on, executor::ThreadPool};
  use std::time::Duration;

  let pool = ThreadPool::new().unwrap();
  let (tx, rx) = oneshot::channel();
  let tx = Mutex::new(Some(tx));
  let values = Arc::new(Mutex::new(vec![]));

  let c_values = values.clone();
  observable::from_iter::<_, Infallible>(1..=3u64)
    .flat_map(move |v| observable::timer(v, Duration::from_millis((4 - v) * 50), pool.clone()))
    .into_shared()
    .subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || {
        if let Some(tx) = tx.lock().unwrap().take() {
          let _ = tx.send(());
        }
      },
    );

  block_on(rx).unwrap();
  assert_eq!(*values.lock().unwrap(), vec![3, 2, 1]);
}

#[cfg(all(feature = "tokio-scheduler", feature = "timer"))]
#[tokio::test(flavor = "multi_thread")]
async fn timed_children_on_tokio() {
  use futures::channel::oneshot;
  use std::time::Duration;

  let handle = tokio::runtime::Handle::current();
  let (tx, rx) = oneshot::channel();
  let tx = Mutex::new(Some(tx));
  let values = Arc::new(Mutex::new(vec![]));

  let c_values = values.clone();
  observable::from_iter::<_, Infallible>(0..4usize)
    .flat_map(move |v| observable::interval(Duration::from_millis(5), handle.clone()).take(v))
    .into_shared()
    .subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || {
        if let Some(tx) = tx.lock().unwrap().take() {
          let _ = tx.send(());
        }
      },
    );

  rx.await.unwrap();
  let mut values = values.lock().unwrap().clone();
  values.sort_unstable();
  assert_eq!(values, vec![0, 0, 0, 1, 1, 2]);
}
