//! Snapstrip Capture Engine
//!
//! Owns the live camera feed and runs the countdown-then-capture cycle that
//! fills a photo session. The camera device is held exclusively for the
//! duration of a shoot and released deterministically on every exit path.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │             CaptureSequencer              │
//! │   countdown ─▶ grab ─▶ flash ─▶ repeat    │
//! │        │                  │               │
//! │        ▼                  ▼               │
//! │  ┌───────────┐    ┌───────────────┐       │
//! │  │ CameraFeed│    │ SequencerEvent│──▶ UI │
//! │  │ (v4l2/gst)│    │   channel     │       │
//! │  └───────────┘    └───────────────┘       │
//! └───────────────────────────────────────────┘
//! ```

pub mod feed;
pub mod sequencer;

pub use feed::*;
pub use sequencer::*;
