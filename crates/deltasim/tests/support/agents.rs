//! Driver/monitor pairs translated from `hwtSimApi.agents.{clk,rst,rdVldSync}`
//! into the hand-written `Process` state-machine idiom.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use deltasim::{Process, ProcessStep, SignalValue, SimTime, Trigger};

use super::Signal;

/// Oscillates `sig` forever: low at boot, then alternating every
/// `period / 2` ticks after `init_wait` elapses, matching
/// `hwtSimApi.agents.clk.ClockAgent`'s driver generator.
pub struct ClockDriver {
    sig: Signal,
    period: SimTime,
    init_wait: SimTime,
    state: ClockDriverState,
}

enum ClockDriverState {
    Boot,
    PostInitWait,
    Oscillating { next_high: bool },
}

impl ClockDriver {
    pub fn new(sig: Signal, period: SimTime, init_wait: SimTime) -> Self {
        ClockDriver {
            sig,
            period,
            init_wait,
            state: ClockDriverState::Boot,
        }
    }
}

impl Process for ClockDriver {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        let half = self.period / 2;
        match self.state {
            ClockDriverState::Boot => {
                self.sig.write(SignalValue::Bit(Some(false)));
                if self.init_wait > 0 {
                    self.state = ClockDriverState::PostInitWait;
                    ProcessStep::Yield(Trigger::Timer(self.init_wait))
                } else {
                    self.state = ClockDriverState::Oscillating { next_high: true };
                    ProcessStep::Yield(Trigger::Timer(half))
                }
            }
            ClockDriverState::PostInitWait => {
                self.state = ClockDriverState::Oscillating { next_high: true };
                ProcessStep::Yield(Trigger::Timer(half))
            }
            ClockDriverState::Oscillating { next_high } => {
                self.sig.write(SignalValue::Bit(Some(next_high)));
                self.state = ClockDriverState::Oscillating { next_high: !next_high };
                ProcessStep::Yield(Trigger::Timer(half))
            }
        }
    }
}

/// Samples `sig` once every tick (`Timer(1)`-granularity) right after
/// `comb_read` settles, and appends `(now, value)` to `log` whenever the
/// value differs from the last recorded one. Grounded in `ClockAgent`'s
/// monitor, which records every transition of the clock signal it observes.
pub struct ClockMonitor {
    sig: Signal,
    log: Rc<RefCell<Vec<(SimTime, Option<bool>)>>>,
    last: Option<Option<bool>>,
    in_write_only: bool,
}

impl ClockMonitor {
    pub fn new(sig: Signal, log: Rc<RefCell<Vec<(SimTime, Option<bool>)>>>) -> Self {
        ClockMonitor {
            sig,
            log,
            last: None,
            in_write_only: true,
        }
    }
}

impl Process for ClockMonitor {
    fn step(&mut self, now: SimTime) -> ProcessStep {
        if self.in_write_only {
            self.in_write_only = false;
            return ProcessStep::Yield(Trigger::WaitCombRead);
        }

        let value = self.sig.read().as_u64().map(|v| v != 0);
        if self.last != Some(value) {
            self.log.borrow_mut().push((now, value));
            self.last = Some(value);
        }
        self.in_write_only = true;
        ProcessStep::Yield(Trigger::Timer(1))
    }
}

/// Deasserts `sig` at boot, asserts it after `delay` ticks, then finishes.
/// Grounded in `hwtSimApi.agents.rst.PullUpAgent`.
pub struct PullUpAgent {
    sig: Signal,
    delay: SimTime,
    armed: bool,
}

impl PullUpAgent {
    pub fn new(sig: Signal, delay: SimTime) -> Self {
        PullUpAgent {
            sig,
            delay,
            armed: false,
        }
    }
}

impl Process for PullUpAgent {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        if !self.armed {
            self.sig.write(SignalValue::Bit(Some(false)));
            self.armed = true;
            ProcessStep::Yield(Trigger::Timer(self.delay))
        } else {
            self.sig.write(SignalValue::Bit(Some(true)));
            ProcessStep::Finished
        }
    }
}

/// Asserts `sig` at boot, deasserts it after `delay` ticks, then finishes.
/// Grounded in `hwtSimApi.agents.rst.PullDownAgent`.
pub struct PullDownAgent {
    sig: Signal,
    delay: SimTime,
    armed: bool,
}

impl PullDownAgent {
    pub fn new(sig: Signal, delay: SimTime) -> Self {
        PullDownAgent {
            sig,
            delay,
            armed: false,
        }
    }
}

impl Process for PullDownAgent {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        if !self.armed {
            self.sig.write(SignalValue::Bit(Some(true)));
            self.armed = true;
            ProcessStep::Yield(Trigger::Timer(self.delay))
        } else {
            self.sig.write(SignalValue::Bit(Some(false)));
            ProcessStep::Finished
        }
    }
}

/// A 2-phase ready/valid driver: on every clock edge (synced to
/// `clk_period`, assuming the paired clock starts low with no init wait),
/// pops the next item from `queue` and presents it, or deasserts `valid`
/// for a `None` (bubble). Grounded in `hwtSimApi.agents.rdVldSync`'s
/// driver half, simplified to a fixed, pre-recorded send queue rather than
/// a live data-source callback.
pub struct ReadyValidDriver {
    data: Signal,
    valid: Signal,
    queue: VecDeque<Option<u64>>,
    clk_period: SimTime,
    started: bool,
}

impl ReadyValidDriver {
    pub fn new(data: Signal, valid: Signal, clk_period: SimTime, queue: impl IntoIterator<Item = Option<u64>>) -> Self {
        ReadyValidDriver {
            data,
            valid,
            queue: queue.into_iter().collect(),
            clk_period,
            started: false,
        }
    }
}

impl Process for ReadyValidDriver {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        if !self.started {
            self.started = true;
            return ProcessStep::Yield(Trigger::Timer(self.clk_period / 2));
        }
        match self.queue.pop_front() {
            Some(Some(word)) => {
                self.data.write(SignalValue::Word(Some(word)));
                self.valid.write(SignalValue::Bit(Some(true)));
            }
            _ => {
                self.valid.write(SignalValue::Bit(Some(false)));
            }
        }
        ProcessStep::Yield(Trigger::Timer(self.clk_period))
    }
}

/// The paired monitor: asserts `ready` unconditionally (an "always ready"
/// receiver) and, on every clock edge, appends `data` to `received` if
/// `valid` was asserted that cycle. Grounded in `rdVldSync`'s monitor half.
pub struct ReadyValidMonitor {
    data: Signal,
    valid: Signal,
    ready: Signal,
    clk_period: SimTime,
    received: Rc<RefCell<Vec<u64>>>,
    in_write_only: bool,
    next_delay: SimTime,
}

impl ReadyValidMonitor {
    pub fn new(data: Signal, valid: Signal, ready: Signal, clk_period: SimTime, received: Rc<RefCell<Vec<u64>>>) -> Self {
        ReadyValidMonitor {
            data,
            valid,
            ready,
            clk_period,
            received,
            in_write_only: true,
            next_delay: clk_period / 2,
        }
    }
}

impl Process for ReadyValidMonitor {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        if self.in_write_only {
            self.ready.write(SignalValue::Bit(Some(true)));
            self.in_write_only = false;
            return ProcessStep::Yield(Trigger::WaitCombRead);
        }

        if self.valid.read().as_u64() == Some(1) {
            if let Some(word) = self.data.read().as_u64() {
                self.received.borrow_mut().push(word);
            }
        }

        self.in_write_only = true;
        let delay = self.next_delay;
        self.next_delay = self.clk_period;
        ProcessStep::Yield(Trigger::Timer(delay))
    }
}

/// Pins a quirk carried over verbatim from
/// `hwtSimApi.agents.rdVldSync.DataRdVldAgent.monitor`'s reset path: on
/// reset the agent's "last value consumed" bookkeeping flag is set to
/// `true` *before* the write-path deasserts `rd`, rather than after. A
/// faithful reimplementation keeps this ordering rather than silently
/// "fixing" it — see DESIGN.md.
pub struct RdVldResetQuirk {
    rd: Signal,
    ready_consumed: bool,
    done: bool,
}

impl RdVldResetQuirk {
    pub fn new(rd: Signal) -> Self {
        RdVldResetQuirk {
            rd,
            ready_consumed: false,
            done: false,
        }
    }

    pub fn ready_consumed(&self) -> bool {
        self.ready_consumed
    }
}

impl Process for RdVldResetQuirk {
    fn step(&mut self, _now: SimTime) -> ProcessStep {
        if self.done {
            return ProcessStep::Finished;
        }
        self.ready_consumed = true;
        self.rd.write(SignalValue::Bit(Some(false)));
        self.done = true;
        ProcessStep::Finished
    }
}
