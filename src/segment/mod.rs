//! Utterance segmentation engine.
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌───────────────┐    ┌─────────────┐    ┌──────┐
//! │   Frame   │───▶│ Classifier │───▶│ State machine │───▶│ Post-filter │───▶│ Sink │
//! │ windower  │    │ (1/frame)  │    │ (candidates)  │    │ (accepted)  │    │      │
//! └───────────┘    └────────────┘    └───────────────┘    └─────────────┘    └──────┘
//! ```
//!
//! One [`session::Session`] run covers exactly one source buffer.

pub mod post_filter;
pub mod session;
pub mod sink;
pub mod state_machine;
