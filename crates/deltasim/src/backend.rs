use crate::process::Process;
use crate::trigger::SimTime;

/// The status an RTL back-end's `eval()` reports after one micro-step of
/// circuit evaluation (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalStatus {
    /// The combinational network has been (re-)resolved.
    CombUpdateDone,
    /// Sequential/memory elements have been updated; the instant's
    /// evaluation is complete.
    EndOfStep,
}

/// The contract an external RTL simulator must satisfy to be driven by
/// [`crate::simulator::HdlSimulator`] (`spec.md` §6). The core never reads
/// or writes a signal itself — it only calls these six operations at the
/// phase boundaries the main loop defines.
///
/// This is the seam where `spec.md` §1 draws the "out of scope" line: a
/// concrete implementation (JIT-compiled, interpreted, or — as in
/// `tests/support` — a trivial in-memory stand-in) plugs in here instead
/// of being part of this crate.
pub trait RtlBackend {
    type Error: std::error::Error;

    /// Advance the circuit one micro-step.
    fn eval(&mut self) -> Result<EvalStatus, Self::Error>;

    /// Invalidate any cached combinational result so the next `eval()`
    /// re-resolves from scratch. Called when `write_only` is reopened.
    fn reset_eval(&mut self);

    /// Put the back-end into write-accept mode for the next instant.
    fn set_write_only(&mut self);

    /// Irrevocably end the simulation and release back-end resources.
    fn finalize(&mut self);

    /// Drain the back-end's pending-callback queue. Each returned process
    /// is scheduled into the phase the caller is currently populating
    /// (`comb_read`, `comb_stable`, or `mem_stable` depending on when this
    /// is called — `spec.md` §3).
    fn take_pending_callbacks(&mut self) -> Vec<Box<dyn Process>>;

    /// Flip the back-end's read-only/write-only mode flag. Set `true`
    /// after `StopSimulation` so post-mortem inspection remains legal.
    fn set_read_only(&mut self, read_only: bool);

    /// Mirror the scheduler's `now` into the back-end before evaluating
    /// the new instant.
    fn set_time(&mut self, time: SimTime);
}

/// A signal value that may be undefined ("x" in RTL parlance). Agents must
/// tolerate this rather than assume every read yields a definite bit
/// (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalValue {
    Bit(Option<bool>),
    Word(Option<u64>),
}

impl SignalValue {
    /// Convert to a definite `u64`, or `None` if undefined.
    pub fn as_u64(self) -> Option<u64> {
        match self {
            SignalValue::Bit(b) => b.map(|b| b as u64),
            SignalValue::Word(w) => w,
        }
    }
}

/// The read half of the signal surface used by agents (`spec.md` §6). The
/// scheduler itself never calls this — only fixture/agent code does.
pub trait ReadableSignal {
    fn read(&self) -> SignalValue;
}

/// The write half of the signal surface used by agents (`spec.md` §6).
pub trait WritableSignal {
    fn write(&mut self, value: SignalValue);
}
