/// Snapshot-to-video assembly with progress, failure policies and cancellation.
pub mod assembler;
