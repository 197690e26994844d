use crate::backend::{EvalStatus, RtlBackend};
use crate::calendar::SimCalendar;
use crate::error::CoreError;
use crate::process::{Process, ProcessStep, StopRaiser};
use crate::slot::{Phase, SimTimeSlot, SlotItem};
use crate::trigger::{SimTime, Trigger};

mod builder;

pub use builder::{HdlSimulatorBuilder, HdlSimulatorOptions};

/// The result of driving one [`Process`] forward: either it suspended (and
/// has been filed away by the runner) or the whole run must stop.
enum Flow {
    Suspended,
    Stop,
}

/// Drives the calendar: for each instant, cycles through the six phases of
/// `spec.md` §3, re-invoking the RTL back-end on writes, draining
/// RTL-originated callbacks, and advancing time until a bound is reached or
/// `StopSimulation` fires (`spec.md` §4.6).
///
/// Grounded in `celox::simulator::Simulator` / `celox::simulation::Simulation`:
/// a facade struct owning the engine it drives (there, a `JitBackend`; here,
/// any `B: RtlBackend`) plus the bookkeeping the engine itself doesn't carry.
/// The teacher's `Simulation::step`/`run_until` pair is the template for
/// `HdlSimulator::run`, generalized from its fixed clock-event heap to the
/// phase-sealing calendar `spec.md` §9 asks for.
pub struct HdlSimulator<B> {
    backend: B,
    calendar: SimCalendar<B>,
    now: SimTime,
    options: HdlSimulatorOptions,
}

impl<B> std::fmt::Debug for HdlSimulator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdlSimulator").field("now", &self.now).finish()
    }
}

impl<B: RtlBackend> HdlSimulator<B> {
    /// Start building a simulator around `backend`, matching
    /// `Simulator::builder()` / `SimulatorBuilder::build()`.
    pub fn builder(backend: B) -> HdlSimulatorBuilder<B> {
        HdlSimulatorBuilder::new(backend)
    }

    pub(crate) fn new(backend: B, options: HdlSimulatorOptions) -> Self {
        HdlSimulator {
            backend,
            calendar: SimCalendar::new(),
            now: 0,
            options,
        }
    }

    /// The current simulated instant (`spec.md` §6: "read-only to users").
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Schedule `item` into `phase` of the slot at `time`, creating that
    /// slot if it does not yet exist. The agent-facing immediate/future
    /// scheduling primitive of `spec.md` §6.
    pub fn schedule(&mut self, time: SimTime, phase: Phase, item: SlotItem<B>) -> Result<(), CoreError<B::Error>> {
        let slot = self.calendar.peek_or_create(time);
        slot.enqueue(phase, item)
            .map_err(|sealed| CoreError::from_phase_sealed(time, sealed))
    }

    /// Schedule a bare process into `write_only` at `time` — the common
    /// case for `Timer(d)` continuations and callback-loop re-arms.
    pub fn schedule_proc(&mut self, time: SimTime, proc: Box<dyn Process>) -> Result<(), CoreError<B::Error>> {
        self.schedule(time, Phase::WriteOnly, SlotItem::Process(proc))
    }

    /// Schedule a bare process into the current instant's `write_only`
    /// phase, i.e. `schedule_proc(self.now(), proc)`.
    pub fn schedule_proc_now(&mut self, proc: Box<dyn Process>) -> Result<(), CoreError<B::Error>> {
        let now = self.now;
        self.schedule_proc(now, proc)
    }

    /// Entry point (`spec.md` §6): run for `until` ticks past `now`,
    /// draining `extra_processes` alongside whatever is already on the
    /// calendar. `until` is a duration, not an absolute time.
    pub fn run(&mut self, until: SimTime, extra_processes: Vec<Box<dyn Process>>) -> Result<(), CoreError<B::Error>> {
        let start = self.now;
        {
            let boot = self.calendar.peek_or_create(start);
            for proc in extra_processes {
                boot.enqueue(Phase::WriteOnly, SlotItem::Process(proc))
                    .map_err(|sealed| CoreError::from_phase_sealed(start, sealed))?;
            }
        }
        {
            let end_guard = self.calendar.peek_or_create(start + until);
            end_guard
                .enqueue(Phase::WriteOnly, SlotItem::process(StopRaiser))
                .map_err(|sealed| CoreError::from_phase_sealed(start + until, sealed))?;
        }

        let result = self.drive();

        self.backend.finalize();
        result
    }

    fn drive(&mut self) -> Result<(), CoreError<B::Error>> {
        loop {
            let Some((now, mut slot)) = self.calendar.pop() else {
                return Ok(());
            };
            self.now = now;
            self.backend.set_time(now);

            match self.drain_phase(&mut slot, Phase::TimeslotBegin)? {
                Flow::Stop => return self.stop(),
                Flow::Suspended => {}
            }
            slot.seal(Phase::TimeslotBegin);

            match self.settle_write_comb(&mut slot)? {
                Flow::Stop => return self.stop(),
                Flow::Suspended => {}
            }

            // Second convergence pass: re-evaluate until an eval() call
            // produces no further RTL-originated callbacks (`spec.md`
            // §4.6's "repeat RTL eval() until ... read_only_not_write_only",
            // realized against the two-valued `EvalStatus` as "stop once a
            // pass is quiet" — see DESIGN.md). Unlike the write_only/comb_read
            // loop, nothing here reopens `write_only`: `comb_stable` is a
            // read-only observation phase, and unlike that loop the
            // back-end's status is not asserted here — a back-end with
            // nothing left to resolve is free to report `EndOfStep` early.
            loop {
                let _status = self.backend.eval().map_err(CoreError::Backend)?;
                let (callback_count, stop) = self.drain_callbacks_into(&mut slot, Phase::CombStable)?;
                if stop {
                    return self.stop();
                }
                if callback_count == 0 {
                    break;
                }
            }
            match self.drain_phase(&mut slot, Phase::CombStable)? {
                Flow::Stop => return self.stop(),
                Flow::Suspended => {}
            }
            slot.seal(Phase::CombStable);

            loop {
                let status = self.backend.eval().map_err(CoreError::Backend)?;
                let (_, stop) = self.drain_callbacks_into(&mut slot, Phase::MemStable)?;
                if stop {
                    return self.stop();
                }
                if status == EvalStatus::EndOfStep {
                    break;
                }
            }
            match self.drain_phase(&mut slot, Phase::MemStable)? {
                Flow::Stop => return self.stop(),
                Flow::Suspended => {}
            }
            slot.seal(Phase::MemStable);

            match self.drain_phase(&mut slot, Phase::TimeslotEnd)? {
                Flow::Stop => return self.stop(),
                Flow::Suspended => {}
            }
            slot.seal(Phase::TimeslotEnd);

            self.backend.set_write_only();
        }
    }

    /// The `write_only` / `comb_read` settle loop of `spec.md` §4.3/§4.6:
    /// drain writes, `eval()`, drain `comb_read`, and reopen `write_only`
    /// if callbacks produced fresh writes, until a pass leaves it empty.
    fn settle_write_comb(&mut self, slot: &mut SimTimeSlot<B>) -> Result<Flow, CoreError<B::Error>> {
        loop {
            match self.drain_phase(slot, Phase::WriteOnly)? {
                Flow::Stop => return Ok(Flow::Stop),
                Flow::Suspended => {}
            }

            let status = self.backend.eval().map_err(CoreError::Backend)?;
            if status != EvalStatus::CombUpdateDone {
                return Err(CoreError::BackendStatus { now: self.now, status });
            }

            let (_, stop) = self.drain_callbacks_into(slot, Phase::CombRead)?;
            if stop {
                return Ok(Flow::Stop);
            }

            match self.drain_phase(slot, Phase::CombRead)? {
                Flow::Stop => return Ok(Flow::Stop),
                Flow::Suspended => {}
            }

            if slot.is_empty(Phase::WriteOnly) {
                slot.seal(Phase::WriteOnly);
                slot.seal(Phase::CombRead);
                return Ok(Flow::Suspended);
            }

            self.backend.reset_eval();
        }
    }

    /// Pop and run every process currently queued in `phase`, running each
    /// to its next suspension point (or to `StopSimulation`/completion). A
    /// process scheduling a child or re-enqueuing into the same phase from
    /// inside this drain is picked up within the same pass (`spec.md` §5:
    /// "Re-entrant enqueues from inside a draining phase land at the tail
    /// of that same phase's queue and are visited in the same drain
    /// pass").
    fn drain_phase(&mut self, slot: &mut SimTimeSlot<B>, phase: Phase) -> Result<Flow, CoreError<B::Error>> {
        while let Some(item) = slot.pop_front(phase) {
            match item {
                SlotItem::Process(proc) => match self.run_process(slot, phase, proc)? {
                    Flow::Stop => return Ok(Flow::Stop),
                    Flow::Suspended => {}
                },
                SlotItem::EventFire(event) => {
                    event
                        .fire(slot, phase)
                        .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                }
                SlotItem::Action(action) => action(&mut self.backend),
            }
        }
        Ok(Flow::Suspended)
    }

    /// Ask the back-end for its pending-callback list and file each one
    /// into `phase` of `slot`, running it immediately if it terminates or
    /// re-suspends without ever being queued (mirrors `drain_phase`'s
    /// per-item handling so a callback's own `StopSimulation` or spawn is
    /// honored the same way a scheduled process's would be).
    ///
    /// Returns the number of callbacks the back-end had pending (so the
    /// caller can tell "the network is still settling" from "this pass was
    /// quiet") and whether one of them raised `StopSimulation`.
    fn drain_callbacks_into(&mut self, slot: &mut SimTimeSlot<B>, phase: Phase) -> Result<(usize, bool), CoreError<B::Error>> {
        let callbacks = self.backend.take_pending_callbacks();
        let count = callbacks.len();
        for proc in callbacks {
            match self.run_process(slot, phase, proc)? {
                Flow::Stop => return Ok((count, true)),
                Flow::Suspended => {}
            }
        }
        Ok((count, false))
    }

    /// Advance `proc` until it yields a suspending trigger, spawns a child
    /// (in which case the parent keeps running in the same call), or
    /// finishes (`spec.md` §4.5).
    fn run_process(
        &mut self,
        slot: &mut SimTimeSlot<B>,
        phase: Phase,
        mut proc: Box<dyn Process>,
    ) -> Result<Flow, CoreError<B::Error>> {
        loop {
            match proc.step(self.now) {
                ProcessStep::Finished => return Ok(Flow::Suspended),
                ProcessStep::Spawn(child) => {
                    slot.enqueue(phase, SlotItem::Process(child))
                        .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                    continue;
                }
                ProcessStep::FireEvent(event) => {
                    event
                        .fire(slot, phase)
                        .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                    continue;
                }
                ProcessStep::Yield(trigger) => match trigger {
                    Trigger::StopSimulation => return Ok(Flow::Stop),
                    Trigger::Timer(0) => {
                        return Err(CoreError::InvalidTrigger {
                            now: self.now,
                            detail: "Timer(0) is not a valid delay; yield WaitWriteOnly to resume within the same instant".into(),
                        });
                    }
                    Trigger::Timer(d) => {
                        let target = self.now + d;
                        self.schedule_proc(target, proc)?;
                        return Ok(Flow::Suspended);
                    }
                    Trigger::WaitWriteOnly => {
                        slot.enqueue(Phase::WriteOnly, SlotItem::Process(proc))
                            .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                        return Ok(Flow::Suspended);
                    }
                    Trigger::WaitCombRead => {
                        slot.enqueue(Phase::CombRead, SlotItem::Process(proc))
                            .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                        return Ok(Flow::Suspended);
                    }
                    Trigger::WaitCombStable => {
                        slot.enqueue(Phase::CombStable, SlotItem::Process(proc))
                            .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                        return Ok(Flow::Suspended);
                    }
                    Trigger::WaitTimeslotEnd => {
                        slot.enqueue(Phase::TimeslotEnd, SlotItem::Process(proc))
                            .map_err(|sealed| CoreError::from_phase_sealed(self.now, sealed))?;
                        return Ok(Flow::Suspended);
                    }
                    Trigger::Wait(event) => {
                        event.add_waiter(proc);
                        return Ok(Flow::Suspended);
                    }
                },
            }
        }
    }

    /// Clean termination (`spec.md` §4.8): put the back-end into read-only
    /// mode so post-mortem inspection remains legal, then return normally.
    /// `finalize()` is invoked by the caller of `drive` (`run`), on every
    /// exit path.
    fn stop(&mut self) -> Result<(), CoreError<B::Error>> {
        self.backend.set_read_only(true);
        Ok(())
    }
}
