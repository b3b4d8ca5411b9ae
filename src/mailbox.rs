//! Single-slot mailbox between the worker bridge and the presenter.
//!
//! The base design has no frame queue: a newer frame supersedes an older one
//! that was never displayed. This slot makes that rule an explicit contract
//! instead of a side effect of event-loop timing. Frames are never reordered
//! or duplicated; dropping the superseded value is the only permitted loss.

use std::cell::RefCell;
use std::rc::Rc;

pub struct Mailbox<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Stores `value`, returning the superseded value if one was pending.
    pub fn put(&self, value: T) -> Option<T> {
        self.slot.borrow_mut().replace(value)
    }

    /// Removes and returns the pending value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_empties_the_slot() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.put(1), None);
        assert_eq!(mailbox.take(), Some(1));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn newer_value_supersedes_older() {
        let mailbox = Mailbox::new();
        mailbox.put("frame 1");
        assert_eq!(mailbox.put("frame 2"), Some("frame 1"));
        assert_eq!(mailbox.take(), Some("frame 2"));
    }

    #[test]
    fn handles_are_views_of_the_same_slot() {
        let producer = Mailbox::new();
        let consumer = producer.clone();
        producer.put(7);
        assert_eq!(consumer.take(), Some(7));
    }
}
