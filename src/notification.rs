use crate::observer::Observer;

/// One observable event as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  /// Replays this notification into `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item = Item, Err = Err> + ?Sized,
  {
    match self {
      Notification::Next(value) => observer.next(value),
      Notification::Error(err) => observer.error(err),
      Notification::Completed => observer.complete(),
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  pub fn into_value(self) -> Option<Item> {
    match self {
      Notification::Next(value) => Some(value),
      _ => None,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::observer::ObserverAll;
  use std::cell::RefCell;

  #[test]
  fn accept_dispatches_by_kind() {
    let log = RefCell::new(vec![]);
    let mut observer = ObserverAll::new(
      |v: i32| log.borrow_mut().push(Notification::Next(v)),
      |e: &'static str| log.borrow_mut().push(Notification::Error(e)),
      || log.borrow_mut().push(Notification::Completed),
    );
    Notification::Next(1).accept(&mut observer);
    Notification::Error("e").accept(&mut observer);
    Notification::Completed.accept(&mut observer);

    assert_eq!(
      *log.borrow(),
      vec![Notification::Next(1), Notification::Error("e"), Notification::Completed]
    );
  }

  #[test]
  fn terminal_kinds() {
    assert!(!Notification::<_, ()>::Next(1).is_terminal());
    assert!(Notification::<i32, _>::Error(()).is_terminal());
    assert!(Notification::<i32, ()>::Completed.is_terminal());
  }

  #[test]
  fn value_only_for_next() {
    assert_eq!(Notification::<_, ()>::Next(3).into_value(), Some(3));
    assert_eq!(Notification::<i32, _>::Error(()).into_value(), None);
    assert_eq!(Notification::<i32, ()>::Completed.into_value(), None);
  }
}
