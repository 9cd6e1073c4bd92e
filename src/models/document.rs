//! Sprite document model: named animation tracks of frames.
//!
//! A "static" sprite is simply a document with one track holding one frame;
//! there is no separate static representation and no runtime type switching.

use crate::models::buffer::Frame;
use thiserror::Error;

/// Error type for animation-structure violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// Frame index outside the valid range for the operation.
    #[error("frame index {index} invalid for track with {len} frames")]
    InvalidIndex { index: usize, len: usize },
    /// A track must always keep at least one frame.
    #[error("cannot delete the last frame of a track")]
    CannotDeleteLastFrame,
    /// Named track does not exist in the document.
    #[error("unknown track '{0}'")]
    UnknownTrack(String),
}

/// A named, ordered sequence of frames representing one animation.
///
/// Invariant: `frames` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub name: String,
    frames: Vec<Frame>,
    pub looped: bool,
}

impl AnimationTrack {
    /// Create a track with its first frame. A track can never be empty, so
    /// construction takes the initial frame rather than starting blank.
    pub fn new(name: impl Into<String>, first_frame: Frame) -> Self {
        Self { name: name.into(), frames: vec![first_frame], looped: true }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Insert a frame at `index`, shifting later frames right.
    ///
    /// `index` may equal `frame_count()` to append.
    pub fn insert_frame(&mut self, index: usize, frame: Frame) -> Result<(), TrackError> {
        if index > self.frames.len() {
            return Err(TrackError::InvalidIndex { index, len: self.frames.len() });
        }
        self.frames.insert(index, frame);
        Ok(())
    }

    /// Delete and return the frame at `index`.
    ///
    /// Deleting the last remaining frame is rejected; a track always has at
    /// least one frame.
    pub fn delete_frame(&mut self, index: usize) -> Result<Frame, TrackError> {
        if index >= self.frames.len() {
            return Err(TrackError::InvalidIndex { index, len: self.frames.len() });
        }
        if self.frames.len() == 1 {
            return Err(TrackError::CannotDeleteLastFrame);
        }
        Ok(self.frames.remove(index))
    }
}

/// A sprite document: insertion-ordered named tracks plus free-text metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDocument {
    pub name: String,
    pub description: String,
    tracks: Vec<AnimationTrack>,
    default_track: String,
}

impl SpriteDocument {
    /// Create a document with a single initial track, which becomes the
    /// default.
    pub fn new(name: impl Into<String>, first_track: AnimationTrack) -> Self {
        let default_track = first_track.name.clone();
        Self {
            name: name.into(),
            description: String::new(),
            tracks: vec![first_track],
            default_track,
        }
    }

    /// Tracks in insertion order.
    pub fn tracks(&self) -> &[AnimationTrack] {
        &self.tracks
    }

    pub fn track(&self, name: &str) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn track_mut(&mut self, name: &str) -> Option<&mut AnimationTrack> {
        self.tracks.iter_mut().find(|t| t.name == name)
    }

    /// Add a track, preserving insertion order. A track with the same name
    /// replaces the existing one in place.
    pub fn insert_track(&mut self, track: AnimationTrack) {
        match self.tracks.iter_mut().find(|t| t.name == track.name) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    pub fn default_track_name(&self) -> &str {
        &self.default_track
    }

    pub fn default_track(&self) -> &AnimationTrack {
        // Invariant: default_track always names an existing track.
        self.tracks
            .iter()
            .find(|t| t.name == self.default_track)
            .unwrap_or(&self.tracks[0])
    }

    /// Point the default at another existing track.
    pub fn set_default_track(&mut self, name: &str) -> Result<(), TrackError> {
        if self.track(name).is_none() {
            return Err(TrackError::UnknownTrack(name.to_string()));
        }
        self.default_track = name.to_string();
        Ok(())
    }

    /// Insert a frame into a named track.
    pub fn insert_frame(
        &mut self,
        track: &str,
        index: usize,
        frame: Frame,
    ) -> Result<(), TrackError> {
        self.track_mut(track)
            .ok_or_else(|| TrackError::UnknownTrack(track.to_string()))?
            .insert_frame(index, frame)
    }

    /// Delete a frame from a named track.
    pub fn delete_frame(&mut self, track: &str, index: usize) -> Result<Frame, TrackError> {
        self.track_mut(track)
            .ok_or_else(|| TrackError::UnknownTrack(track.to_string()))?
            .delete_frame(index)
    }

    /// Whether this document is a static sprite: one track, one frame.
    pub fn is_static(&self) -> bool {
        self.tracks.len() == 1 && self.tracks[0].frame_count() == 1
    }
}
