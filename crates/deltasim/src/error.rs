use thiserror::Error;

use crate::backend::EvalStatus;
use crate::slot::Phase;
use crate::trigger::SimTime;

/// Errors raised by the scheduler itself (`spec.md` §7).
///
/// Grounded in `celox::simulator::error::SimulatorError`: a flat
/// `thiserror` enum that wraps the caller's own back-end error type
/// through a single `#[from]`-style variant rather than re-deriving a
/// parallel error hierarchy. All fatal variants carry `now` because
/// `spec.md` §7's propagation policy requires "contextual fields (`now`,
/// phase, item)" on every fatal error.
#[derive(Debug, Error)]
pub enum CoreError<E: std::error::Error = std::convert::Infallible> {
    /// An item tried to enqueue into a phase that was already sealed for
    /// this instant.
    #[error("phase '{phase}' is already sealed (now={now})")]
    PhaseClosed { now: SimTime, phase: Phase },

    /// A process yielded a trigger that violates one of its own
    /// preconditions (currently: `Timer(0)` — a delay of zero is not a
    /// valid request to "resume later").
    #[error("invalid trigger at now={now}: {detail}")]
    InvalidTrigger { now: SimTime, detail: String },

    /// The RTL back-end's `eval()` reported a status the scheduler did not
    /// expect at this point in the phase cycle.
    #[error("unexpected back-end eval() status {status:?} at now={now}")]
    BackendStatus { now: SimTime, status: EvalStatus },

    /// The RTL back-end itself reported a fatal error.
    #[error(transparent)]
    Backend(E),
}

impl<E: std::error::Error> CoreError<E> {
    pub(crate) fn from_phase_sealed(now: SimTime, sealed: crate::slot::PhaseSealed) -> Self {
        CoreError::PhaseClosed {
            now,
            phase: sealed.phase,
        }
    }
}
