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

//! Painter for the radar disc. Every position comes from the frame; this
//! module only draws.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use radar_core::{CoordinateTransform, DisplayIntent, Frame, PixelPoint, PlacedTrack, RadarHandle, RangeMode};

const BACKGROUND: Color32 = Color32::from_rgb(0, 0, 0);
const RING: Color32 = Color32::from_rgb(0, 110, 0);
const RING_LABEL: Color32 = Color32::from_rgb(0, 170, 0);
const SELF: Color32 = Color32::from_rgb(255, 64, 64);
const TRAIL: Color32 = Color32::from_rgb(110, 110, 110);
const SYMBOL: Color32 = Color32::from_rgb(165, 255, 127);
const VECTOR: Color32 = Color32::from_rgb(255, 255, 255);
const LABEL: Color32 = Color32::from_rgb(200, 200, 200);
const SELECTED: Color32 = Color32::from_rgb(255, 191, 0);
const EMERGENCY: Color32 = Color32::from_rgb(255, 0, 0);

const SELF_SIZE: f32 = 10.0;
const SYMBOL_SIZE: f32 = 6.0;

#[allow(clippy::cast_possible_truncation, reason = "screen coordinates fit in f32")]
fn to_screen(origin: Pos2, p: PixelPoint) -> Pos2 {
    origin + Vec2::new(p.x as f32, p.y as f32)
}

/// Rotate `offset` clockwise by `degrees`, screen y pointing down.
#[allow(clippy::cast_possible_truncation, reason = "angles fit in f32")]
fn rotate(offset: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = (degrees.to_radians() as f32).sin_cos();
    Vec2::new(offset.x * cos - offset.y * sin, offset.x * sin + offset.y * cos)
}

/// Selection intent for a click at screen position `pos` on a disc whose
/// top-left corner is `origin`.
fn click_intent(origin: Pos2, pos: Pos2) -> DisplayIntent {
    let local = pos - origin;
    DisplayIntent::SelectAt(PixelPoint::new(f64::from(local.x), f64::from(local.y)))
}

/// Allocate the disc, queue a selection intent on click and paint `frame`.
pub fn show(ui: &mut egui::Ui, frame: &Frame, handle: &RadarHandle) {
    #[allow(clippy::cast_possible_truncation, reason = "screen sizes fit in f32")]
    let diameter = frame.diameter_px as f32;
    let (response, painter) = ui.allocate_painter(Vec2::splat(diameter), Sense::click());
    let rect = response.rect;

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            handle.send(click_intent(rect.min, pos));
        }
    }

    paint(&painter, rect, frame);
}

pub fn paint(painter: &Painter, rect: Rect, frame: &Frame) {
    let origin = rect.min;
    let transform = CoordinateTransform::new(frame.diameter_px);
    let center = to_screen(origin, transform.center());
    #[allow(clippy::cast_possible_truncation, reason = "screen sizes fit in f32")]
    let radius = transform.radius() as f32;

    painter.circle_filled(center, radius, BACKGROUND);
    draw_rings(painter, center, frame);

    let heading = frame.viewer.map(|v| v.orientation.heading_deg);
    draw_self(painter, center, heading.unwrap_or(0.0));

    for track in &frame.placed {
        for point in &track.trail {
            let p = to_screen(origin, *point);
            painter.rect_filled(Rect::from_center_size(p, Vec2::splat(3.0)), 0.0, TRAIL);
        }
    }
    for track in &frame.placed {
        draw_track(painter, origin, track, frame.is_selected(&track.id));
    }

    painter.text(
        rect.left_bottom() + Vec2::new(2.0, -2.0),
        Align2::LEFT_BOTTOM,
        format!("{}", frame.in_range_count()),
        FontId::monospace(14.0),
        RING_LABEL,
    );
    let mode = match frame.range.mode {
        RangeMode::Auto => "auto",
        RangeMode::Manual => "manual",
    };
    painter.text(
        rect.right_bottom() + Vec2::new(-2.0, -2.0),
        Align2::RIGHT_BOTTOM,
        mode,
        FontId::monospace(12.0),
        RING_LABEL,
    );
}

fn draw_rings(painter: &Painter, center: Pos2, frame: &Frame) {
    let max = f64::from(frame.range.max_distance_km);
    for view in &frame.rings {
        #[allow(clippy::cast_possible_truncation, reason = "screen sizes fit in f32")]
        let r = view.radius_px as f32;
        painter.circle_stroke(center, r, Stroke::new(1.0, RING));

        // the outer label sits lower so it stays on the disc
        let inset = if (view.ring.distance_km - max).abs() < f64::EPSILON { 8.0 } else { 4.0 };
        painter.text(
            center + Vec2::new(0.0, -r + inset),
            Align2::CENTER_CENTER,
            &view.ring.label,
            FontId::proportional(11.0),
            RING_LABEL,
        );
    }
}

/// An arrow pointing along the viewer's heading.
fn draw_self(painter: &Painter, center: Pos2, heading_deg: f64) {
    let stroke = Stroke::new(1.5, SELF);
    let d = SELF_SIZE;
    let segments = [
        (Vec2::new(0.0, -d), Vec2::new(0.0, d)),
        (Vec2::new(-0.25 * d, 0.0), Vec2::new(0.25 * d, 0.0)),
        (Vec2::new(0.0, -d), Vec2::new(-0.5 * d, -0.5 * d)),
        (Vec2::new(0.0, -d), Vec2::new(0.5 * d, -0.5 * d)),
    ];
    for (a, b) in segments {
        painter.line_segment(
            [center + rotate(a, heading_deg), center + rotate(b, heading_deg)],
            stroke,
        );
    }
}

fn draw_track(painter: &Painter, origin: Pos2, track: &PlacedTrack, selected: bool) {
    let fields = &track.snapshot.fields;
    let pos = to_screen(origin, track.pixel);
    let color = if fields.active_emergency().is_some() { EMERGENCY } else { SYMBOL };

    if let Some(heading) = fields.heading_deg {
        let end = CoordinateTransform::heading_vector(track.pixel, heading, fields.ground_speed_kt);
        painter.line_segment([pos, to_screen(origin, end)], Stroke::new(1.0, VECTOR));
    }

    match fields.heading_deg.filter(|_| fields.category.rotates_with_heading()) {
        Some(heading) => {
            let s = SYMBOL_SIZE;
            let points = [Vec2::new(0.0, -s), Vec2::new(0.7 * s, s), Vec2::new(-0.7 * s, s)]
                .into_iter()
                .map(|v| pos + rotate(v, heading))
                .collect();
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
        None => {
            painter.rect_filled(Rect::from_center_size(pos, Vec2::splat(SYMBOL_SIZE)), 0.0, color);
        }
    }
    if selected {
        painter.circle_stroke(pos, SYMBOL_SIZE + 4.0, Stroke::new(1.5, SELECTED));
    }

    painter.text(
        pos + Vec2::new(0.0, -SYMBOL_SIZE - 1.0),
        Align2::CENTER_BOTTOM,
        fields.flight_label(),
        FontId::proportional(11.0),
        LABEL,
    );
    if let Some(altitude) = fields.altitude_ft {
        painter.text(
            pos + Vec2::new(0.0, SYMBOL_SIZE + 1.0),
            Align2::CENTER_TOP,
            altitude.to_string(),
            FontId::proportional(11.0),
            LABEL,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_clockwise() {
        let up = Vec2::new(0.0, -10.0);
        let east = rotate(up, 90.0);
        assert!((east.x - 10.0).abs() < 1e-4);
        assert!(east.y.abs() < 1e-4);
        let south = rotate(up, 180.0);
        assert!((south.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_click_selects_through_the_handle() {
        use chrono::Utc;
        use radar_core::{FeedCycle, GeoPoint, Orientation, Radar, TrackFields, ViewerState};

        let handle = RadarHandle::new(Radar::default());
        let now = Utc::now();
        let mut aircraft = std::collections::HashMap::new();
        aircraft.insert(
            "a1b2c3".to_string(),
            TrackFields {
                position: Some(GeoPoint::new(0.1, 0.0)),
                ..Default::default()
            },
        );
        handle.ingest(FeedCycle {
            timestamp: now,
            viewer: ViewerState {
                position: GeoPoint::new(0.0, 0.0),
                orientation: Orientation::default(),
                observed_at: now,
            },
            aircraft,
        });
        let frame = handle.render_frame(480.0).unwrap();
        let pixel = frame.placed[0].pixel;

        let origin = Pos2::new(100.0, 50.0);
        handle.send(click_intent(origin, to_screen(origin, pixel)));
        let frame = handle.render_frame(480.0).unwrap();
        assert_eq!(frame.selected.map(|s| s.id), Some("a1b2c3".to_string()));

        // clicks after quit are dropped, not queued
        handle.shutdown();
        handle.send(click_intent(origin, origin));
        assert!(handle.render_frame(480.0).is_none());
    }

    #[test]
    fn test_to_screen_offsets_by_origin() {
        let p = to_screen(Pos2::new(10.0, 20.0), PixelPoint::new(5.0, 7.5));
        assert_eq!(p, Pos2::new(15.0, 27.5));
    }
}
