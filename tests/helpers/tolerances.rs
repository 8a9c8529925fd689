//! Tolerance constants for render tests.
//!
//! Integer PCM truncates toward zero, so a decode/encode cycle may lose up to
//! one quantization step.

/// Exact operations (float passthrough, unity gain).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// One 8-bit step.
pub const INT8_EPSILON: f32 = 1.0 / 127.0;

/// One 16-bit step.
pub const INT16_EPSILON: f32 = 1.0 / 32767.0;

/// One 24-bit step.
pub const INT24_EPSILON: f32 = 1.0 / 8_388_607.0;
