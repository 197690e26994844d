use std::cell::RefCell;
use std::rc::Rc;

use crate::process::Process;
use crate::slot::{Phase, PhaseSealed, SimTimeSlot, SlotItem};

struct Inner {
    waiters: Vec<Box<dyn Process>>,
}

/// A named rendezvous object (`spec.md` §4.4).
///
/// Cloning an `Event` clones the handle, not the waiter list — all clones
/// refer to the same rendezvous, the way the source's single `Event`
/// object is imported and awaited from many different agents. There is no
/// cross-thread sharing (the scheduler is single-threaded by contract,
/// `spec.md` §5), so a bare `Rc<RefCell<_>>` is the right tool, not
/// `Arc<Mutex<_>>`.
#[derive(Clone)]
pub struct Event(Rc<RefCell<Inner>>);

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    pub fn new() -> Self {
        Event(Rc::new(RefCell::new(Inner {
            waiters: Vec::new(),
        })))
    }

    /// Register `process` as a waiter. Called by the runner when a process
    /// yields `Trigger::Wait(event)`; never called directly by user code.
    pub(crate) fn add_waiter(&self, process: Box<dyn Process>) {
        self.0.borrow_mut().waiters.push(process);
    }

    /// Move all waiters into `phase` of `slot`, in arrival order, and empty
    /// the waiter list. A fire with no waiters is a no-op. An event may be
    /// fired and re-awaited across any number of later instants.
    pub fn fire<B>(&self, slot: &mut SimTimeSlot<B>, phase: Phase) -> Result<(), PhaseSealed> {
        let waiters = std::mem::take(&mut self.0.borrow_mut().waiters);
        for waiter in waiters {
            slot.enqueue(phase, SlotItem::Process(waiter))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("waiters", &self.0.borrow().waiters.len())
            .finish()
    }
}
