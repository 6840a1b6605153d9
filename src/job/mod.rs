//! Background job control: one assembler run at a time, reported over a channel.

/// Job lifecycle, events and the single-job controller.
pub mod controller;
/// Preview requests and the default-player launcher.
pub mod preview;
