//! Captured frames and photo sessions.
//!
//! A session is one run of the booth: a fixed number of stills captured in
//! shot order. Insertion order is display order, top to bottom on the strip.

use chrono::{DateTime, Utc};

/// Number of photos per session unless configured otherwise.
pub const DEFAULT_PHOTO_COUNT: usize = 4;

/// A single still captured from the camera feed.
///
/// The image bytes are an encoded JPEG, already mirrored horizontally so the
/// still matches what the sitter saw in the preview. Immutable once created.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Opaque unique identifier.
    pub id: String,

    /// Encoded JPEG bytes.
    pub jpeg: Vec<u8>,

    /// Wall-clock time of the capture.
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    /// Wrap encoded JPEG bytes captured right now.
    pub fn new(jpeg: Vec<u8>) -> Self {
        Self {
            id: frame_id(),
            jpeg,
            captured_at: Utc::now(),
        }
    }
}

/// An ordered run of captured frames with a fixed target count.
///
/// Invariant: a session handed to the compositor is complete — it holds
/// exactly `capacity` frames. `push_frame` rejects overflow.
#[derive(Debug, Clone)]
pub struct PhotoSession {
    capacity: usize,
    frames: Vec<CapturedFrame>,
}

impl PhotoSession {
    /// Create an empty session targeting `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Append the next frame in shot order.
    pub fn push_frame(&mut self, frame: CapturedFrame) -> Result<(), SessionError> {
        if self.frames.len() >= self.capacity {
            return Err(SessionError::Overflow {
                capacity: self.capacity,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Target frame count for this session.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames captured so far, in shot order.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether the session holds exactly its target count.
    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.capacity
    }

    /// Discard all frames (retake).
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for PhotoSession {
    fn default() -> Self {
        Self::new(DEFAULT_PHOTO_COUNT)
    }
}

/// Errors from session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session already holds {capacity} frames")]
    Overflow { capacity: usize },

    #[error("Session incomplete: {got} of {want} frames")]
    Incomplete { got: usize, want: usize },
}

/// Generate a simple UUID v4 without external dependency.
fn frame_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (seed & 0xFFFFFFFF) as u32,
        ((seed >> 32) & 0xFFFF) as u16,
        ((seed >> 48) & 0x0FFF) as u16,
        (((seed >> 60) & 0x3F) | 0x80) as u16 | (((seed >> 66) & 0x3FF) as u16) << 6,
        (seed >> 76) & 0xFFFFFFFFFFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_frame() -> CapturedFrame {
        CapturedFrame::new(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    #[test]
    fn test_session_fills_to_capacity() {
        let mut session = PhotoSession::new(4);
        assert!(session.is_empty());
        assert!(!session.is_complete());

        for _ in 0..4 {
            session.push_frame(dummy_frame()).unwrap();
        }
        assert!(session.is_complete());
        assert_eq!(session.len(), 4);
    }

    #[test]
    fn test_session_rejects_overflow() {
        let mut session = PhotoSession::new(2);
        session.push_frame(dummy_frame()).unwrap();
        session.push_frame(dummy_frame()).unwrap();

        let err = session.push_frame(dummy_frame()).unwrap_err();
        assert!(matches!(err, SessionError::Overflow { capacity: 2 }));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_session_preserves_shot_order() {
        let mut session = PhotoSession::new(3);
        let mut ids = vec![];
        for i in 0..3 {
            let mut frame = dummy_frame();
            frame.id = format!("shot-{i}");
            ids.push(frame.id.clone());
            session.push_frame(frame).unwrap();
        }

        let stored: Vec<_> = session.frames().iter().map(|f| f.id.clone()).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn test_clear_discards_frames() {
        let mut session = PhotoSession::new(4);
        session.push_frame(dummy_frame()).unwrap();
        session.clear();
        assert!(session.is_empty());
        assert!(!session.is_complete());
    }
}
