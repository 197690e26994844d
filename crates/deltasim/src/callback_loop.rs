use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{ReadableSignal, SignalValue};
use crate::process::{Process, ProcessStep};
use crate::trigger::SimTime;

/// Which clock-signal transition re-arms a [`CallbackLoop`] (`spec.md`
/// §4.7). Named after `hwtSimApi.process_utils`'s
/// `OnRisingCallbackLoop`/`OnFallingCallbackLoop` pair, generalized with a
/// third `AnyChange` case for agents (e.g. a 2-phase handshake) that care
/// about either edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Rising,
    Falling,
    AnyChange,
}

impl EdgeKind {
    fn fires(self, last: Option<SignalValue>, current: SignalValue) -> bool {
        let last_bit = last.and_then(SignalValue::as_u64).map(|v| v != 0);
        let current_bit = current.as_u64().map(|v| v != 0);
        match (self, last_bit, current_bit) {
            (EdgeKind::Rising, Some(false), Some(true)) => true,
            (EdgeKind::Falling, Some(true), Some(false)) => true,
            (EdgeKind::AnyChange, Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

struct Inner {
    signal: Box<dyn ReadableSignal>,
    kind: EdgeKind,
    make_child: Box<dyn FnMut() -> Box<dyn Process>>,
    enabled: Box<dyn FnMut() -> bool>,
    last: Option<SignalValue>,
    live: bool,
}

/// An agent's re-arming shell (`spec.md` §4.7): on every edge of a watched
/// signal matching `kind`, if `enabled()` says so and no previous child
/// instance is still running, spawns a fresh child process via
/// `make_child`.
///
/// The direct analogue of `hwtSimApi.agents.clk.ClockAgent`'s
/// `CallbackLoop(sim, self.hwIO, self.monitor, self.getEnable)` wiring: a
/// signal, a child-process factory, and an enable predicate. Per `spec.md`
/// §4.7, edges are "detected via RTL pending-event callback in phase
/// `comb_stable`" — so a `CallbackLoop` is not itself a self-re-arming
/// `Process` (re-yielding the same phase forever would re-enter the same
/// drain pass and never advance, since `comb_stable` is drained exactly
/// once per instant). Instead it is cheap, shareable state: [`poll`] hands
/// out a fresh one-shot [`Process`] each time the back-end wants an edge
/// check performed, and the back-end (here, `tests/support`'s
/// `RecordingBackend`) is responsible for handing one back via
/// `take_pending_callbacks()` every instant it is watching — exactly the
/// way a real RTL back-end's persistent sensitivity list keeps re-invoking
/// a registered callback on every relevant edge.
#[derive(Clone)]
pub struct CallbackLoop(Rc<RefCell<Inner>>);

impl CallbackLoop {
    pub fn new(
        signal: impl ReadableSignal + 'static,
        kind: EdgeKind,
        make_child: impl FnMut() -> Box<dyn Process> + 'static,
        enabled: impl FnMut() -> bool + 'static,
    ) -> Self {
        CallbackLoop(Rc::new(RefCell::new(Inner {
            signal: Box::new(signal),
            kind,
            make_child: Box::new(make_child),
            enabled: Box::new(enabled),
            last: None,
            live: false,
        })))
    }

    pub fn on_rising(
        signal: impl ReadableSignal + 'static,
        make_child: impl FnMut() -> Box<dyn Process> + 'static,
        enabled: impl FnMut() -> bool + 'static,
    ) -> Self {
        Self::new(signal, EdgeKind::Rising, make_child, enabled)
    }

    pub fn on_falling(
        signal: impl ReadableSignal + 'static,
        make_child: impl FnMut() -> Box<dyn Process> + 'static,
        enabled: impl FnMut() -> bool + 'static,
    ) -> Self {
        Self::new(signal, EdgeKind::Falling, make_child, enabled)
    }

    pub fn on_any_change(
        signal: impl ReadableSignal + 'static,
        make_child: impl FnMut() -> Box<dyn Process> + 'static,
        enabled: impl FnMut() -> bool + 'static,
    ) -> Self {
        Self::new(signal, EdgeKind::AnyChange, make_child, enabled)
    }

    /// Produce a one-shot callback: checks the watched signal against the
    /// value seen on the *previous* `poll()`, and spawns a fresh child if
    /// an edge of the requested kind fired, nothing is already running,
    /// and `enabled()` allows it.
    pub fn poll(&self) -> Box<dyn Process> {
        Box::new(Poll(Rc::clone(&self.0)))
    }
}

struct Poll(Rc<RefCell<Inner>>);

impl Process for Poll {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        let mut inner = self.0.borrow_mut();
        let current = inner.signal.read();
        let fired = inner.kind.fires(inner.last, current);
        inner.last = Some(current);

        if fired && !inner.live && (inner.enabled)() {
            inner.live = true;
            let child = (inner.make_child)();
            drop(inner);
            return ProcessStep::Spawn(Box::new(GuardedChild {
                inner: child,
                owner: Rc::clone(&self.0),
            }));
        }
        ProcessStep::Finished
    }
}

/// Wraps the spawned child so its `Finished` result flips the wrapper's
/// `live` flag back off, enforcing "at most one live instance of the child
/// process at a time per wrapper" (`spec.md` §4.7 invariant (i)).
struct GuardedChild {
    inner: Box<dyn Process>,
    owner: Rc<RefCell<Inner>>,
}

impl Process for GuardedChild {
    fn step(&mut self, now: SimTime) -> ProcessStep {
        match self.inner.step(now) {
            ProcessStep::Finished => {
                self.owner.borrow_mut().live = false;
                ProcessStep::Finished
            }
            other => other,
        }
    }
}
