//! The countdown-then-capture sequencer.
//!
//! One run fills a [`PhotoSession`]: for each shot a visible countdown ticks
//! from `countdown_start` to 1, one frame is grabbed synchronously at zero,
//! a flash cue is emitted, and the cycle repeats. Shots are strictly
//! sequential; shot i+1 never starts before frame i is fully captured.
//!
//! Cancellation is a shared flag checked at every suspension point. When it
//! trips, pending timers stop, no further capture fires, and the camera is
//! released before the sequencer returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use snapstrip_booth_model::PhotoSession;
use snapstrip_common::error::{BoothError, BoothResult};

use crate::feed::CameraFeed;

/// Timing and shot-count configuration for a capture run.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Photos per session.
    pub photo_count: usize,

    /// Countdown start value before each shot.
    pub countdown_start: u32,

    /// Interval between countdown ticks.
    pub tick: Duration,

    /// Duration of the cosmetic flash cue. Does not gate timing; it is
    /// carried on each [`SequencerEvent::Flash`] so consumers can size
    /// the visual.
    pub flash: Duration,

    /// Pause between the last capture and session completion.
    pub completion_delay: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            photo_count: 4,
            countdown_start: 3,
            tick: Duration::from_secs(1),
            flash: Duration::from_millis(200),
            completion_delay: Duration::from_secs(1),
        }
    }
}

/// Progress events emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The visible counter changed (counts `countdown_start` down to 1).
    CountdownTick { shot: usize, value: u32 },

    /// A frame was just captured; show the flash cue for `duration`.
    Flash { shot: usize, duration: Duration },

    /// The frame landed in the session.
    FrameCaptured { shot: usize, frame_id: String },

    /// All shots captured; the completion delay has elapsed.
    SessionComplete,
}

/// How a run ended.
#[derive(Debug)]
pub enum SequenceOutcome {
    /// All shots captured; the session is complete.
    Completed(PhotoSession),

    /// The run was cancelled; any partial session was discarded.
    Cancelled,
}

/// Runs the capture cycle against a camera feed.
pub struct CaptureSequencer {
    feed: Box<dyn CameraFeed>,
    config: SequencerConfig,
    cancel_flag: Arc<AtomicBool>,
}

impl CaptureSequencer {
    pub fn new(feed: Box<dyn CameraFeed>, config: SequencerConfig) -> Self {
        Self {
            feed,
            config,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared cancellation flag; set it from anywhere to abort the run.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    /// Run the full capture cycle.
    ///
    /// The camera is acquired up front and released on every exit path:
    /// completion, cancellation, or error. A camera-acquisition failure
    /// aborts before any countdown starts.
    pub async fn run(
        mut self,
        events: mpsc::Sender<SequencerEvent>,
    ) -> BoothResult<SequenceOutcome> {
        if let Err(e) = self.feed.open() {
            self.feed.close();
            return Err(e);
        }
        let result = self.run_shots(&events).await;
        self.feed.close();
        result
    }

    async fn run_shots(
        &mut self,
        events: &mpsc::Sender<SequencerEvent>,
    ) -> BoothResult<SequenceOutcome> {
        let mut session = PhotoSession::new(self.config.photo_count);

        for shot in 0..self.config.photo_count {
            for value in (1..=self.config.countdown_start).rev() {
                if self.cancelled() {
                    tracing::info!(shot, "Capture cancelled mid-countdown");
                    return Ok(SequenceOutcome::Cancelled);
                }
                events
                    .send(SequencerEvent::CountdownTick { shot, value })
                    .await
                    .ok();
                tokio::time::sleep(self.config.tick).await;
            }

            if self.cancelled() {
                tracing::info!(shot, "Capture cancelled before grab");
                return Ok(SequenceOutcome::Cancelled);
            }

            // The counter just hit zero: capture synchronously.
            let frame = self.feed.grab_frame()?;
            let frame_id = frame.id.clone();
            session
                .push_frame(frame)
                .map_err(|e| BoothError::session(e.to_string()))?;

            tracing::info!(shot, frame_id = %frame_id, "Frame captured");
            events
                .send(SequencerEvent::Flash {
                    shot,
                    duration: self.config.flash,
                })
                .await
                .ok();
            events
                .send(SequencerEvent::FrameCaptured { shot, frame_id })
                .await
                .ok();
        }

        tokio::time::sleep(self.config.completion_delay).await;
        if self.cancelled() {
            return Ok(SequenceOutcome::Cancelled);
        }

        events.send(SequencerEvent::SessionComplete).await.ok();
        tracing::info!(frames = session.len(), "Session complete");
        Ok(SequenceOutcome::Completed(session))
    }

    fn cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }
}
