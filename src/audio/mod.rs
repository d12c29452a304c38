//! Raw audio handling: frame windowing and the WAV container boundary.

pub mod frame;
pub mod wav;
