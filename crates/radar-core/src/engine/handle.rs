// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Thread-safe handle to a [`Radar`].
//!
//! Input handlers never touch the engine directly: they queue
//! [`DisplayIntent`]s on an unbounded channel. The render side drains the
//! queue and builds the frame inside one lock, so a frame never shows a
//! half-applied input. A quit intent cancels the shared token and no frame
//! is produced after it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{FeedCycle, Frame, Radar};
use crate::display::DisplayIntent;
use crate::registry::ReconcileReport;

/// Sending half of the intent queue.
pub type IntentSender = mpsc::UnboundedSender<DisplayIntent>;

struct Shared {
    radar: Radar,
    intents: mpsc::UnboundedReceiver<DisplayIntent>,
}

/// Cloneable handle shared by the feed loop and the front end.
#[derive(Clone)]
pub struct RadarHandle {
    shared: Arc<Mutex<Shared>>,
    sender: IntentSender,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for RadarHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadarHandle")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl RadarHandle {
    #[must_use]
    pub fn new(radar: Radar) -> Self {
        Self::with_cancellation(radar, CancellationToken::new())
    }

    /// Share an existing token, so that quitting also stops its other users.
    #[must_use]
    pub fn with_cancellation(radar: Radar, cancel_token: CancellationToken) -> Self {
        let (sender, intents) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Mutex::new(Shared { radar, intents })),
            sender,
            cancel_token,
        }
    }

    /// A sender for input handlers on other threads.
    #[must_use]
    pub fn intent_sender(&self) -> IntentSender {
        self.sender.clone()
    }

    /// Queue an intent for the next frame. Ignored once quit.
    pub fn send(&self, intent: DisplayIntent) {
        if self.cancel_token.is_cancelled() {
            return;
        }
        // The receiver lives as long as `self`
        let _ = self.sender.send(intent);
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Quit without going through the intent queue.
    pub fn shutdown(&self) {
        info!("Shutting down radar");
        self.cancel_token.cancel();
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the engine one feed cycle. Returns `None` after quit.
    pub fn ingest(&self, cycle: FeedCycle) -> Option<ReconcileReport> {
        if self.is_cancelled() {
            return None;
        }
        Some(self.lock().radar.ingest(cycle))
    }

    /// Apply queued intents, lay out a frame and paint it, all under one lock.
    ///
    /// Returns `None`, without painting, once quit has been requested.
    pub fn render<R>(&self, diameter_px: f64, paint: impl FnOnce(&Frame) -> R) -> Option<R> {
        if self.is_cancelled() {
            return None;
        }
        let mut guard = self.lock();
        let shared = &mut *guard;

        let mut applied = 0usize;
        while let Ok(intent) = shared.intents.try_recv() {
            applied += 1;
            shared.radar.apply(intent);
            if shared.radar.is_quit_requested() {
                break;
            }
        }
        if applied > 0 {
            debug!("Applied {applied} queued intents");
        }
        if shared.radar.is_quit_requested() {
            self.cancel_token.cancel();
            return None;
        }

        shared.radar.set_viewport(diameter_px);
        let frame = shared.radar.frame();
        Some(paint(&frame))
    }

    /// Like [`render`](Self::render), returning the frame itself.
    pub fn render_frame(&self, diameter_px: f64) -> Option<Frame> {
        self.render(diameter_px, Frame::clone)
    }

    /// Read-only access to the engine under the lock.
    pub fn with_radar<R>(&self, f: impl FnOnce(&Radar) -> R) -> R {
        f(&self.lock().radar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::PanelMode;
    use crate::engine::{Orientation, ViewerState};
    use crate::geo::GeoPoint;
    use crate::track::TrackFields;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn cycle() -> FeedCycle {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut aircraft = HashMap::new();
        aircraft.insert(
            "a1b2c3".to_string(),
            TrackFields {
                position: Some(GeoPoint::new(0.1, 0.1)),
                ..Default::default()
            },
        );
        FeedCycle {
            timestamp: ts,
            viewer: ViewerState {
                position: GeoPoint::new(0.0, 0.0),
                orientation: Orientation::default(),
                observed_at: ts,
            },
            aircraft,
        }
    }

    #[test]
    fn test_intents_apply_before_next_frame() {
        let handle = RadarHandle::new(Radar::default());
        let sender = handle.intent_sender();
        sender.send(DisplayIntent::Panel(PanelMode::Info)).unwrap();
        sender.send(DisplayIntent::TrailsMore).unwrap();

        // queued, not yet applied
        assert_eq!(handle.with_radar(|r| r.display().panel()), PanelMode::Summary);

        let frame = handle.render_frame(480.0).unwrap();
        assert_eq!(frame.display.panel(), PanelMode::Info);
        assert!(frame.highlights_changed);
    }

    #[test]
    fn test_ingest_then_render() {
        let handle = RadarHandle::new(Radar::default());
        let report = handle.ingest(cycle()).unwrap();
        assert_eq!(report.added, vec!["a1b2c3"]);

        let count = handle.render(480.0, Frame::in_range_count).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_quit_stops_rendering() {
        let handle = RadarHandle::new(Radar::default());
        let token = handle.cancellation_token();
        handle.send(DisplayIntent::Quit);
        handle.send(DisplayIntent::Panel(PanelMode::Details));

        let mut painted = false;
        assert!(handle.render(480.0, |_| painted = true).is_none());
        assert!(!painted);
        assert!(token.is_cancelled());
        assert!(handle.render_frame(480.0).is_none());
        assert!(handle.ingest(cycle()).is_none());
        // intents after quit are never applied
        assert_eq!(handle.with_radar(|r| r.display().panel()), PanelMode::Summary);
    }

    #[test]
    fn test_external_cancellation() {
        let token = CancellationToken::new();
        let handle = RadarHandle::with_cancellation(Radar::default(), token.clone());
        assert!(handle.render_frame(480.0).is_some());
        token.cancel();
        assert!(handle.render_frame(480.0).is_none());
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let handle = RadarHandle::new(Radar::default());
        let poisoner = handle.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.shared.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(handle.shared.is_poisoned());
        assert!(handle.render_frame(480.0).is_some());
    }
}
