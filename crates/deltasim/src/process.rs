use crate::event::Event;
use crate::trigger::{SimTime, Trigger};

/// A cooperative, possibly-infinite sequence of [`Trigger`]s.
///
/// `spec.md` §9 describes the source's processes as lazy generator
/// sequences and notes three portable realizations: a stackful fiber, a
/// stackless state machine, or a hand-written struct. We take the third:
/// a process is any type that can produce its next step given the current
/// simulated time, with move-ownership semantics on suspension (the runner
/// holds the `Box<dyn Process>` until it yields or finishes, then files it
/// away wherever the yielded trigger says to).
pub trait Process {
    /// Advance the process by one step.
    ///
    /// `now` is the simulated time of the instant currently being
    /// processed; it is the only simulator state a process is handed
    /// directly (`spec.md` §6: "`sim.now`: current instant (read-only to
    /// users)"). Everything else a process needs — signal handles, shared
    /// state with its sibling driver/monitor, RTL back-end access — is
    /// captured by the process itself at construction time.
    fn step(&mut self, now: SimTime) -> ProcessStep;
}

/// The result of advancing a [`Process`] by one step.
pub enum ProcessStep {
    /// The process yielded a trigger and must be filed away accordingly.
    Yield(Trigger),
    /// The process spawned a child process without suspending itself.
    ///
    /// The child is enqueued into the current active phase-queue; the
    /// parent is immediately stepped again in the same drain pass
    /// (`spec.md` §4.5: "cooperative spawn").
    Spawn(Box<dyn Process>),
    /// The process fired a named event without suspending itself.
    ///
    /// Moves the event's waiters into the current active phase-queue (in
    /// arrival order) and keeps the firing process running, the same way
    /// `Spawn` does (`spec.md` §4.4/§3: an event-firing is a third kind of
    /// phase-queue item alongside processes and one-shot actions).
    FireEvent(Event),
    /// The process has nothing left to do.
    Finished,
}

/// Adapts a plain `FnMut(SimTime) -> ProcessStep` closure into a
/// [`Process`], for the common case of a one-off or tiny fixture that
/// doesn't need a hand-rolled state machine.
pub struct FnProcess<F>(pub F)
where
    F: FnMut(SimTime) -> ProcessStep;

impl<F> Process for FnProcess<F>
where
    F: FnMut(SimTime) -> ProcessStep,
{
    fn step(&mut self, now: SimTime) -> ProcessStep {
        (self.0)(now)
    }
}

/// A process that, on its first (and only) step, raises
/// [`Trigger::StopSimulation`]. Used to plant the end-of-run guard slot
/// (`spec.md` §4.6: "push an end-guard slot at now+until with a
/// StopSimulation raiser").
pub struct StopRaiser;

impl Process for StopRaiser {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        ProcessStep::Yield(Trigger::StopSimulation)
    }
}
