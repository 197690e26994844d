use crate::backend::RtlBackend;

use super::HdlSimulator;

/// Scheduler-level knobs, as distinct from knobs about the circuit itself
/// (those live on the concrete `RtlBackend` implementation, not here).
///
/// Mirrors `celox::simulator::SimulatorOptions` in spirit: a small
/// `Default`-able struct a fluent builder carries around, sized to what the
/// design actually needs today rather than speculatively. `spec.md` has no
/// scheduler-level knob beyond the `until` duration `run` already takes as
/// a parameter, so this starts empty; future overlays (e.g. a tracing hook
/// for the callback-loop wrappers) extend it rather than replace it.
#[derive(Debug, Clone, Default)]
pub struct HdlSimulatorOptions {
    _private: (),
}

/// Fluent, fallible builder for [`HdlSimulator`], matching
/// `celox::simulator::SimulatorBuilder` / `Simulator::builder()` →
/// `SimulatorBuilder::build()`.
pub struct HdlSimulatorBuilder<B> {
    backend: B,
    options: HdlSimulatorOptions,
}

impl<B: RtlBackend> HdlSimulatorBuilder<B> {
    pub(crate) fn new(backend: B) -> Self {
        HdlSimulatorBuilder {
            backend,
            options: HdlSimulatorOptions::default(),
        }
    }

    /// Override the default scheduler options.
    pub fn options(mut self, options: HdlSimulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Finish construction. Infallible today (no option combination can be
    /// rejected), but returns `Result` like `SimulatorBuilder::build()` so a
    /// future validated option doesn't need a breaking signature change.
    pub fn build(mut self) -> Result<HdlSimulator<B>, std::convert::Infallible> {
        self.backend.set_write_only();
        Ok(HdlSimulator::new(self.backend, self.options))
    }
}
