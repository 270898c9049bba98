#![forbid(unsafe_code)]

//! Runtime for sift applications: the model/update/view loop, a clock that
//! tests can drive by hand, and a simulator that runs models without a
//! terminal.

pub mod clock;
pub mod program;
pub mod simulator;

pub use clock::Clock;
pub use program::{Cmd, Model, Program, ProgramConfig, TickSchedule};
pub use simulator::{CmdRecord, ProgramSimulator};
