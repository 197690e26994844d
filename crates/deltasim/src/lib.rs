//! Discrete-event scheduler core for HDL/RTL co-simulation.
//!
//! Orchestrates the interleaving of an external RTL back-end (accessed
//! only through the [`RtlBackend`] trait) with cooperative Rust processes,
//! guaranteeing the ordering of writes, combinational settles, memory
//! updates, and clock-edge callbacks that `spec.md` §1 describes. The
//! crate is single-threaded and cooperative by contract (`spec.md` §5):
//! nothing here spawns an OS thread or requires `Send`/`Sync`.

mod backend;
mod calendar;
mod callback_loop;
mod error;
mod event;
mod process;
mod simulator;
mod slot;
mod trigger;

pub use backend::{EvalStatus, ReadableSignal, RtlBackend, SignalValue, WritableSignal};
pub use callback_loop::{CallbackLoop, EdgeKind};
pub use error::CoreError;
pub use event::Event;
pub use process::{FnProcess, Process, ProcessStep, StopRaiser};
pub use simulator::{HdlSimulator, HdlSimulatorBuilder, HdlSimulatorOptions};
pub use slot::{Phase, PhaseSealed, SimTimeSlot, SlotItem};
pub use trigger::{SimTime, Trigger};
