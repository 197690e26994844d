use crate::event::Event;

/// Simulated time: a monotonic tick count. Unit is left to the embedding
/// RTL back-end (typically femto- or picoseconds).
pub type SimTime = u64;

/// The closed set of values a [`Process`](crate::process::Process) may
/// yield to request scheduling action.
///
/// Unlike the dynamically-typed original this taxonomy is a plain Rust
/// enum, so "unknown yielded value" (`spec.md` §4.8) can't occur at the
/// type level; the one remaining runtime-checkable misuse is `Timer(0)`,
/// which is rejected the same way a negative/zero delay was rejected in
/// the source.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Resume at `now + d`. `d` must be greater than zero.
    Timer(SimTime),
    /// Resume in the `write_only` phase of the current instant.
    WaitWriteOnly,
    /// Resume in the `comb_read` phase (after writes have settled once).
    WaitCombRead,
    /// Resume in the `comb_stable` phase (after combinational fixpoint).
    WaitCombStable,
    /// Resume in the `timeslot_end` phase (last phase of the instant).
    WaitTimeslotEnd,
    /// Resume when the named event next fires.
    Wait(Event),
    /// Cleanly terminate the simulation.
    StopSimulation,
}
