use std::collections::VecDeque;

use crate::event::Event;
use crate::process::Process;

/// One of the six ordered sub-stages of a simulated instant (`spec.md` §3).
///
/// The declaration order of the variants **is** the phase order; code that
/// needs "the next phase" indexes into [`Phase::ALL`] rather than
/// hand-rolling a second ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    TimeslotBegin,
    WriteOnly,
    CombRead,
    CombStable,
    MemStable,
    TimeslotEnd,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::TimeslotBegin,
        Phase::WriteOnly,
        Phase::CombRead,
        Phase::CombStable,
        Phase::MemStable,
        Phase::TimeslotEnd,
    ];

    fn index(self) -> usize {
        Phase::ALL.iter().position(|p| *p == self).unwrap()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::TimeslotBegin => "timeslot_begin",
            Phase::WriteOnly => "write_only",
            Phase::CombRead => "comb_read",
            Phase::CombStable => "comb_stable",
            Phase::MemStable => "mem_stable",
            Phase::TimeslotEnd => "timeslot_end",
        };
        f.write_str(name)
    }
}

/// An item held by a phase-queue: a process, a deferred event-firing, or a
/// one-shot action (`spec.md` §3).
pub enum SlotItem<B> {
    Process(Box<dyn Process>),
    EventFire(Event),
    Action(Box<dyn FnOnce(&mut B)>),
}

impl<B> SlotItem<B> {
    pub fn process(p: impl Process + 'static) -> Self {
        SlotItem::Process(Box::new(p))
    }
}

/// Appending into an already-sealed phase (`spec.md` §3: "attempted
/// enqueues must fail with PhaseClosedError"). Carries only the phase —
/// the caller (the runner, which knows `now`) is responsible for turning
/// this into a fully contextual [`crate::error::CoreError`].
#[derive(Debug, Clone, Copy)]
pub struct PhaseSealed {
    pub phase: Phase,
}

/// A single phase-queue: either still accepting appends (`Open`) or sealed
/// (`Done`), the latter being a distinct sentinel so that appends after
/// sealing can be rejected rather than silently dropped (`spec.md` §3).
enum PhaseQueue<B> {
    Open(VecDeque<SlotItem<B>>),
    Done,
}

impl<B> Default for PhaseQueue<B> {
    fn default() -> Self {
        PhaseQueue::Open(VecDeque::new())
    }
}

/// One instant's worth of work: the six ordered phase-queues described in
/// `spec.md` §3. Passive record — all interesting behavior lives in the
/// process runner (`crate::simulator`) that drains it.
pub struct SimTimeSlot<B> {
    queues: [PhaseQueue<B>; 6],
}

impl<B> Default for SimTimeSlot<B> {
    fn default() -> Self {
        SimTimeSlot {
            queues: [
                PhaseQueue::default(),
                PhaseQueue::default(),
                PhaseQueue::default(),
                PhaseQueue::default(),
                PhaseQueue::default(),
                PhaseQueue::default(),
            ],
        }
    }
}

impl<B> SimTimeSlot<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to `phase`. Fails if `phase` has already been sealed.
    pub fn enqueue(&mut self, phase: Phase, item: SlotItem<B>) -> Result<(), PhaseSealed> {
        match &mut self.queues[phase.index()] {
            PhaseQueue::Open(q) => {
                q.push_back(item);
                Ok(())
            }
            PhaseQueue::Done => Err(PhaseSealed { phase }),
        }
    }

    /// Pop the next item off `phase`'s queue, if any and if still open.
    pub fn pop_front(&mut self, phase: Phase) -> Option<SlotItem<B>> {
        match &mut self.queues[phase.index()] {
            PhaseQueue::Open(q) => q.pop_front(),
            PhaseQueue::Done => None,
        }
    }

    /// True if `phase` currently has no queued items (sealed phases count
    /// as empty).
    pub fn is_empty(&self, phase: Phase) -> bool {
        match &self.queues[phase.index()] {
            PhaseQueue::Open(q) => q.is_empty(),
            PhaseQueue::Done => true,
        }
    }

    pub fn is_sealed(&self, phase: Phase) -> bool {
        matches!(&self.queues[phase.index()], PhaseQueue::Done)
    }

    /// Seal `phase`: no further appends are accepted. Idempotent.
    pub fn seal(&mut self, phase: Phase) {
        self.queues[phase.index()] = PhaseQueue::Done;
    }
}
