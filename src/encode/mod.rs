//! Encoding side: codec resolution, the frame-writer contract and its backends.
//!
//! Sinks consume decoded frames in playback order and are opened by the assembler once the
//! canonical frame size is known.

/// Container/codec enums, output settings and the resolution table.
pub mod codec;
/// `ffmpeg`-based sinks (system `ffmpeg` fed raw RGBA through stdin).
pub mod ffmpeg;
/// Frame-writer traits and the in-memory sink.
pub mod sink;
