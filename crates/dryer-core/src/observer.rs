//! A fixed-capacity, array-backed subscriber registry.
//!
//! Per the design notes in `spec.md` §9, subscriber counts for any one event
//! are known and small, so a heap-backed growable list is unwarranted: a
//! registration beyond capacity is a programming error, not a runtime
//! condition callers need to handle.

/// The maximum number of subscribers any single notification point accepts.
pub const MAX_SUBSCRIBERS: usize = 4;

/// A small callback registry holding up to [`MAX_SUBSCRIBERS`] handlers,
/// dispatched in registration order. Handlers observe the event by
/// reference; per `spec.md` §5 cross-component observation carries values by
/// copy, so event types are themselves small `Copy` structs even though
/// dispatch passes `&E` (this also lets `E` hold a borrowed field, as
/// [`crate::safety::Emergency`]'s reason string needs to).
pub struct Subscribers<E> {
    slots: [Option<Box<dyn FnMut(&E)>>; MAX_SUBSCRIBERS],
    len: usize,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self { slots: [None, None, None, None], len: 0 }
    }

    /// Registers a handler. Panics in debug builds if the registry is
    /// already full; silently drops the registration in release builds.
    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) {
        debug_assert!(
            self.len < MAX_SUBSCRIBERS,
            "subscriber registry exceeded its fixed capacity of {MAX_SUBSCRIBERS}"
        );
        if self.len < MAX_SUBSCRIBERS {
            self.slots[self.len] = Some(Box::new(handler));
            self.len += 1;
        }
    }

    /// Calls every registered handler, in registration order. No subscriber
    /// can prevent another from running.
    pub fn dispatch(&mut self, event: &E) {
        for slot in self.slots[..self.len].iter_mut().flatten() {
            slot(event);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn dispatches_to_all_subscribers_in_registration_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut subs = Subscribers::<i32>::new();

        let o1 = order.clone();
        subs.subscribe(move |v| o1.borrow_mut().push(("a", *v)));
        let o2 = order.clone();
        subs.subscribe(move |v| o2.borrow_mut().push(("b", *v)));

        subs.dispatch(&7);
        assert_eq!(*order.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn registrations_up_to_capacity_all_take_effect() {
        let count = Rc::new(Cell::new(0));
        let mut subs = Subscribers::<()>::new();
        for _ in 0..MAX_SUBSCRIBERS {
            let c = count.clone();
            subs.subscribe(move |_| c.set(c.get() + 1));
        }
        assert_eq!(subs.len(), MAX_SUBSCRIBERS);
        subs.dispatch(&());
        assert_eq!(count.get(), MAX_SUBSCRIBERS);
    }
}
