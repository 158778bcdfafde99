//! Module interfaces
//!
//! The cyclic processing stages of `per_exec` and `ctrl_exec` implement the
//! `State` trait, so that both executables drive their stages the same way:
//! `init` once from a parameter file, then `proc` once per cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A processing stage which keeps state between cycles.
pub trait State {
    /// Passed to `init`, usually the name of the stage's parameter file.
    type InitData;
    type InitError;

    /// Everything one cycle consumes.
    type InputData;
    /// Everything one cycle produces for the rest of the system.
    type OutputData;
    /// Diagnostic values of one cycle, suitable for archiving.
    type StatusReport;
    type ProcError;

    /// Load parameters and reset the stage.
    ///
    /// The session is where the stage's archives are created.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle of the stage.
    ///
    /// An error leaves the stage usable, the next cycle may succeed.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
