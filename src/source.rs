//! Gesture producers.
//!
//! A [`GestureSource`] owns whatever delivers hand landmarks (a tracker, a
//! recording, a test script) and runs on its own thread, classifying each
//! frame and publishing the result into a [`GestureFeed`]. If the source
//! fails, the feed is marked degraded and the scene carries on with manual
//! toggles only.
//!
//! [`ScriptedSource`] replays a JSON-lines landmark recording:
//!
//! ```text
//! [[0.5,0.8,0.0],[0.52,0.75,0.0], ... 21 triples ...]
//! null
//! [[0.5,0.8,0.0], ...]
//! ```
//!
//! Each line is one frame; `null` means no hand was in view.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::SourceError;
use crate::gesture::{GestureClassifier, HandFrame};
use crate::sync::GestureFeed;

/// Something that produces hand landmarks until it runs out or fails.
pub trait GestureSource: Send + 'static {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Classify frames into `feed` until done. Blocking.
    fn run(self: Box<Self>, feed: GestureFeed, classifier: GestureClassifier)
        -> Result<(), SourceError>;
}

/// Run `source` on its own thread. Failure degrades `feed`.
pub fn spawn_gesture_source<G: GestureSource>(
    source: G,
    feed: GestureFeed,
    classifier: GestureClassifier,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let name = source.name().to_string();
        match Box::new(source).run(feed.clone(), classifier) {
            Ok(()) => info!(source = %name, "gesture source finished"),
            Err(err) => feed.mark_degraded(&err.to_string()),
        }
    })
}

/// A source that is known to be missing (no device, permission denied).
#[derive(Clone, Debug)]
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl GestureSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn run(self: Box<Self>, _feed: GestureFeed, _classifier: GestureClassifier) -> Result<(), SourceError> {
        Err(SourceError::Unavailable(self.reason))
    }
}

/// Replays recorded landmark frames at a fixed interval.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: Vec<Option<Vec<[f32; 3]>>>,
    interval: Duration,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Option<Vec<[f32; 3]>>>) -> Self {
        Self {
            frames,
            interval: Duration::ZERO,
        }
    }

    /// Parse JSON lines. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, SourceError> {
        let mut frames = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| SourceError::Io {
                path: "<stream>".into(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let frame = serde_json::from_str(&line).map_err(|source| SourceError::Parse {
                line: index + 1,
                source,
            })?;
            frames.push(frame);
        }
        Ok(Self::new(frames))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file)).map_err(|err| match err {
            SourceError::Io { source, .. } => SourceError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Pause between frames.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl GestureSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn run(self: Box<Self>, feed: GestureFeed, classifier: GestureClassifier) -> Result<(), SourceError> {
        if self.frames.is_empty() {
            return Err(SourceError::Unavailable("landmark script is empty".into()));
        }
        feed.mark_active();

        for (index, frame) in self.frames.iter().enumerate() {
            match frame {
                None => feed.clear(),
                Some(triples) => match HandFrame::from_triples(triples) {
                    Ok(hand) => {
                        feed.publish(classifier.classify(&hand));
                    }
                    Err(err) => debug!(frame = index, error = %err, "discarding landmark frame"),
                },
            }
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
        Ok(())
    }
}
