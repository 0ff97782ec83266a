//! The booth scene state machine.
//!
//! The booth cycles through four scenes for the life of the process:
//!
//! ```text
//! Landing --start--> Shooting --complete--> Processing --done--> Result
//!    ^                   |                                          |
//!    +------cancel-------+                +--------retake-----------+
//! ```
//!
//! All mutable run state (scene, captured session, caption) lives in
//! [`BoothState`] and changes only through [`BoothState::apply`], which
//! rejects events that are invalid for the current scene. There is no
//! terminal state.

use serde::{Deserialize, Serialize};

use crate::frame::PhotoSession;

/// Which screen of the booth is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    /// Idle; no session data held.
    Landing,
    /// Capture sequencer is running.
    Shooting,
    /// Cosmetic "developing" pause between capture and reveal.
    Processing,
    /// Strip is on display; caption and download available.
    Result,
}

/// Events that drive scene transitions.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// User started a session (Landing only).
    Start,
    /// User or error aborted the shoot; discards any partial session.
    Cancel,
    /// The sequencer finished with a complete session.
    SequencerComplete(PhotoSession),
    /// The develop delay elapsed.
    ProcessingDone,
    /// The strip reveal finished; caption and download unlock.
    StripRevealed,
    /// User asked for an AI caption (single-flight).
    CaptionRequested,
    /// The caption call returned (real caption or fallback text).
    CaptionReady(String),
    /// User discarded the strip; back to Landing with everything cleared.
    Retake,
}

impl SceneEvent {
    fn name(&self) -> &'static str {
        match self {
            SceneEvent::Start => "start",
            SceneEvent::Cancel => "cancel",
            SceneEvent::SequencerComplete(_) => "sequencer_complete",
            SceneEvent::ProcessingDone => "processing_done",
            SceneEvent::StripRevealed => "strip_revealed",
            SceneEvent::CaptionRequested => "caption_requested",
            SceneEvent::CaptionReady(_) => "caption_ready",
            SceneEvent::Retake => "retake",
        }
    }
}

/// An event that is not valid in the current scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("'{event}' is not valid in the {scene:?} scene")]
    InvalidEvent { scene: Scene, event: &'static str },

    #[error("Sequencer completed with {got} of {want} frames")]
    IncompleteSession { got: usize, want: usize },

    #[error("Caption request blocked: {reason}")]
    CaptionBlocked { reason: &'static str },
}

/// All mutable booth state for one page-lifetime of the machine.
#[derive(Debug, Clone)]
pub struct BoothState {
    scene_value: Scene,
    session: Option<PhotoSession>,
    caption: Option<String>,
    caption_pending: bool,
    strip_revealed: bool,
}

impl Default for BoothState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoothState {
    /// Fresh state in the Landing scene.
    pub fn new() -> Self {
        Self {
            scene_value: Scene::Landing,
            session: None,
            caption: None,
            caption_pending: false,
            strip_revealed: false,
        }
    }

    /// Current scene.
    pub fn scene(&self) -> Scene {
        self.scene_value
    }

    /// The completed session, once the sequencer has delivered it.
    pub fn session(&self) -> Option<&PhotoSession> {
        self.session.as_ref()
    }

    /// The caption, once one has been set.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Whether a caption call is outstanding.
    pub fn caption_pending(&self) -> bool {
        self.caption_pending
    }

    /// Whether a caption request may start right now.
    ///
    /// Mirrors the trigger-control rules: only in Result, only after the
    /// strip reveal, at most one in flight, at most one caption per strip.
    pub fn can_request_caption(&self) -> bool {
        self.scene() == Scene::Result
            && self.strip_revealed
            && !self.caption_pending
            && self.caption.is_none()
    }

    /// Apply an event, transitioning the scene or rejecting the event.
    pub fn apply(&mut self, event: SceneEvent) -> Result<(), TransitionError> {
        let scene = self.scene();
        match (scene, event) {
            (Scene::Landing, SceneEvent::Start) => {
                self.scene_value = Scene::Shooting;
                tracing_transition(scene, Scene::Shooting);
                Ok(())
            }
            (Scene::Shooting, SceneEvent::Cancel) => {
                self.session = None;
                self.scene_value = Scene::Landing;
                tracing_transition(scene, Scene::Landing);
                Ok(())
            }
            (Scene::Shooting, SceneEvent::SequencerComplete(session)) => {
                if !session.is_complete() {
                    return Err(TransitionError::IncompleteSession {
                        got: session.len(),
                        want: session.capacity(),
                    });
                }
                self.session = Some(session);
                self.scene_value = Scene::Processing;
                tracing_transition(scene, Scene::Processing);
                Ok(())
            }
            (Scene::Processing, SceneEvent::ProcessingDone) => {
                self.scene_value = Scene::Result;
                tracing_transition(scene, Scene::Result);
                Ok(())
            }
            (Scene::Result, SceneEvent::StripRevealed) => {
                self.strip_revealed = true;
                Ok(())
            }
            (Scene::Result, SceneEvent::CaptionRequested) => {
                if !self.strip_revealed {
                    return Err(TransitionError::CaptionBlocked {
                        reason: "strip reveal not finished",
                    });
                }
                if self.caption_pending {
                    return Err(TransitionError::CaptionBlocked {
                        reason: "a request is already in flight",
                    });
                }
                if self.caption.is_some() {
                    return Err(TransitionError::CaptionBlocked {
                        reason: "caption already set",
                    });
                }
                self.caption_pending = true;
                Ok(())
            }
            (Scene::Result, SceneEvent::CaptionReady(text)) => {
                if !self.caption_pending {
                    return Err(TransitionError::InvalidEvent {
                        scene,
                        event: "caption_ready",
                    });
                }
                self.caption = Some(text);
                self.caption_pending = false;
                Ok(())
            }
            (Scene::Result, SceneEvent::Retake) => {
                self.session = None;
                self.caption = None;
                self.caption_pending = false;
                self.strip_revealed = false;
                self.scene_value = Scene::Landing;
                tracing_transition(scene, Scene::Landing);
                Ok(())
            }
            (scene, event) => Err(TransitionError::InvalidEvent {
                scene,
                event: event.name(),
            }),
        }
    }
}

fn tracing_transition(from: Scene, to: Scene) {
    tracing::info!(?from, ?to, "Scene transition");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CapturedFrame;

    fn complete_session(n: usize) -> PhotoSession {
        let mut session = PhotoSession::new(n);
        for _ in 0..n {
            session
                .push_frame(CapturedFrame::new(vec![0xFF, 0xD8]))
                .unwrap();
        }
        session
    }

    fn state_in_result() -> BoothState {
        let mut state = BoothState::new();
        state.apply(SceneEvent::Start).unwrap();
        state
            .apply(SceneEvent::SequencerComplete(complete_session(4)))
            .unwrap();
        state.apply(SceneEvent::ProcessingDone).unwrap();
        state
    }

    #[test]
    fn test_full_cycle() {
        let mut state = BoothState::new();
        assert_eq!(state.scene(), Scene::Landing);

        state.apply(SceneEvent::Start).unwrap();
        assert_eq!(state.scene(), Scene::Shooting);

        state
            .apply(SceneEvent::SequencerComplete(complete_session(4)))
            .unwrap();
        assert_eq!(state.scene(), Scene::Processing);
        assert!(state.session().is_some());

        state.apply(SceneEvent::ProcessingDone).unwrap();
        assert_eq!(state.scene(), Scene::Result);
    }

    #[test]
    fn test_cancel_discards_partial_session() {
        let mut state = BoothState::new();
        state.apply(SceneEvent::Start).unwrap();
        state.apply(SceneEvent::Cancel).unwrap();
        assert_eq!(state.scene(), Scene::Landing);
        assert!(state.session().is_none());
    }

    #[test]
    fn test_incomplete_session_is_rejected() {
        let mut state = BoothState::new();
        state.apply(SceneEvent::Start).unwrap();

        let mut partial = PhotoSession::new(4);
        partial
            .push_frame(CapturedFrame::new(vec![0xFF, 0xD8]))
            .unwrap();

        let err = state
            .apply(SceneEvent::SequencerComplete(partial))
            .unwrap_err();
        assert_eq!(err, TransitionError::IncompleteSession { got: 1, want: 4 });
        assert_eq!(state.scene(), Scene::Shooting);
    }

    #[test]
    fn test_retake_clears_session_and_caption() {
        let mut state = state_in_result();
        state.apply(SceneEvent::StripRevealed).unwrap();
        state.apply(SceneEvent::CaptionRequested).unwrap();
        state
            .apply(SceneEvent::CaptionReady("Pure joy captured.".into()))
            .unwrap();

        state.apply(SceneEvent::Retake).unwrap();
        assert_eq!(state.scene(), Scene::Landing);
        assert!(state.session().is_none());
        assert!(state.caption().is_none());
        assert!(!state.caption_pending());
    }

    #[test]
    fn test_retake_without_caption_also_clears() {
        let mut state = state_in_result();
        state.apply(SceneEvent::Retake).unwrap();
        assert_eq!(state.scene(), Scene::Landing);
        assert!(state.session().is_none());
        assert!(state.caption().is_none());
    }

    #[test]
    fn test_caption_guard_blocks_before_reveal() {
        let mut state = state_in_result();
        assert!(!state.can_request_caption());
        let err = state.apply(SceneEvent::CaptionRequested).unwrap_err();
        assert!(matches!(err, TransitionError::CaptionBlocked { .. }));
    }

    #[test]
    fn test_caption_guard_is_single_flight() {
        let mut state = state_in_result();
        state.apply(SceneEvent::StripRevealed).unwrap();
        assert!(state.can_request_caption());

        state.apply(SceneEvent::CaptionRequested).unwrap();
        assert!(!state.can_request_caption());
        assert!(state.apply(SceneEvent::CaptionRequested).is_err());

        state
            .apply(SceneEvent::CaptionReady("Suspicious activity detected.".into()))
            .unwrap();
        // One caption per strip: still blocked after it resolves.
        assert!(!state.can_request_caption());
        assert!(state.apply(SceneEvent::CaptionRequested).is_err());
    }

    #[test]
    fn test_invalid_events_leave_state_untouched() {
        let mut state = BoothState::new();
        assert!(state.apply(SceneEvent::Retake).is_err());
        assert!(state.apply(SceneEvent::ProcessingDone).is_err());
        assert!(state.apply(SceneEvent::Cancel).is_err());
        assert_eq!(state.scene(), Scene::Landing);
    }

    mod machine_properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_event() -> impl Strategy<Value = SceneEvent> {
            prop_oneof![
                Just(SceneEvent::Start),
                Just(SceneEvent::Cancel),
                Just(SceneEvent::SequencerComplete(complete_session(4))),
                Just(SceneEvent::ProcessingDone),
                Just(SceneEvent::StripRevealed),
                Just(SceneEvent::CaptionRequested),
                Just(SceneEvent::CaptionReady("log entry".into())),
                Just(SceneEvent::Retake),
            ]
        }

        proptest! {
            #[test]
            fn random_event_sequences_hold_invariants(events in proptest::collection::vec(arb_event(), 0..64)) {
                let mut state = BoothState::new();
                for event in events {
                    let _ = state.apply(event);

                    // Session data never survives outside Processing/Result.
                    if matches!(state.scene(), Scene::Landing | Scene::Shooting) {
                        prop_assert!(state.session().is_none());
                        prop_assert!(state.caption().is_none());
                    }
                    // A caption can only exist alongside a completed session.
                    if state.caption().is_some() {
                        prop_assert!(state.session().is_some());
                    }
                }
            }

            #[test]
            fn retake_from_result_always_lands_clean(caption in proptest::option::of("[a-zA-Z .]{1,40}")) {
                let mut state = BoothState::new();
                state.apply(SceneEvent::Start).unwrap();
                state.apply(SceneEvent::SequencerComplete(complete_session(4))).unwrap();
                state.apply(SceneEvent::ProcessingDone).unwrap();
                state.apply(SceneEvent::StripRevealed).unwrap();

                if let Some(text) = caption {
                    state.apply(SceneEvent::CaptionRequested).unwrap();
                    state.apply(SceneEvent::CaptionReady(text)).unwrap();
                }

                state.apply(SceneEvent::Retake).unwrap();
                prop_assert_eq!(state.scene(), Scene::Landing);
                prop_assert!(state.session().is_none());
                prop_assert!(state.caption().is_none());
                prop_assert!(!state.caption_pending());
            }
        }
    }
}
