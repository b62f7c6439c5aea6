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

//! Control bar and keyboard bindings.

use egui::{Button, Color32, Key, RichText};
use log::info;
use radar_core::{ControlHighlights, DisplayIntent, PanelMode, RadarHandle};

const PRESSED: Color32 = Color32::from_rgb(0, 120, 60);
const RELEASED: Color32 = Color32::from_rgb(40, 40, 40);
const LABEL: Color32 = Color32::from_rgb(255, 191, 0);

/// What a key press asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    Intent(DisplayIntent),
    Help,
}

const KEYS: [Key; 18] = [
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::Home,
    Key::End,
    Key::ArrowUp,
    Key::ArrowDown,
    Key::Backspace,
    Key::A,
    Key::M,
    Key::N,
    Key::F,
    Key::S,
    Key::D,
    Key::I,
    Key::P,
    Key::R,
    Key::H,
    Key::Q,
];

pub const HELP: [&str; 12] = [
    "Left/Right: fewer/more trail points",
    "Home/Backspace: no trails, End: full trails",
    "Up/Down: range up/down",
    "a: auto range, m: manual range",
    "n: range to nearest, f: range to farthest",
    "s: summary panel",
    "d: details of the selected track",
    "i: info panel",
    "p: log statistics",
    "r: reset statistics",
    "h: this help",
    "q: quit",
];

pub fn command_for_key(key: Key) -> Option<KeyCommand> {
    let intent = match key {
        Key::ArrowLeft => DisplayIntent::TrailsFewer,
        Key::ArrowRight => DisplayIntent::TrailsMore,
        Key::Home | Key::Backspace => DisplayIntent::TrailsNone,
        Key::End => DisplayIntent::TrailsAll,
        Key::ArrowUp => DisplayIntent::RangeUp,
        Key::ArrowDown => DisplayIntent::RangeDown,
        Key::A => DisplayIntent::RangeAuto,
        Key::M => DisplayIntent::RangeManual,
        Key::N => DisplayIntent::TargetNearest,
        Key::F => DisplayIntent::TargetFarthest,
        Key::S => DisplayIntent::Panel(PanelMode::Summary),
        Key::D => DisplayIntent::Panel(PanelMode::Details),
        Key::I => DisplayIntent::Panel(PanelMode::Info),
        Key::P => DisplayIntent::LogStats,
        Key::R => DisplayIntent::ResetStats,
        Key::Q => DisplayIntent::Quit,
        Key::H => return Some(KeyCommand::Help),
        _ => return None,
    };
    Some(KeyCommand::Intent(intent))
}

/// Intents for this frame's key presses, in binding order. Help is logged
/// right away.
pub fn keyboard_intents(ctx: &egui::Context) -> Vec<DisplayIntent> {
    let pressed: Vec<Key> = ctx.input(|i| KEYS.into_iter().filter(|key| i.key_pressed(*key)).collect());
    let mut intents = Vec::new();
    for key in pressed {
        match command_for_key(key) {
            Some(KeyCommand::Intent(intent)) => intents.push(intent),
            Some(KeyCommand::Help) => {
                for line in HELP {
                    info!("{line}");
                }
            }
            None => {}
        }
    }
    intents
}

struct ControlButton {
    label: &'static str,
    intent: DisplayIntent,
    lit: fn(&ControlHighlights) -> bool,
}

fn unlit(_: &ControlHighlights) -> bool {
    false
}

fn groups() -> [(&'static str, Vec<ControlButton>); 4] {
    [
        (
            "Range",
            vec![
                ControlButton { label: "Auto", intent: DisplayIntent::RangeAuto, lit: |h| h.range_auto },
                ControlButton { label: "Manual", intent: DisplayIntent::RangeManual, lit: |h| h.range_manual },
                ControlButton { label: "⏶", intent: DisplayIntent::RangeUp, lit: unlit },
                ControlButton { label: "⏷", intent: DisplayIntent::RangeDown, lit: unlit },
            ],
        ),
        (
            "Tracks",
            vec![
                ControlButton { label: "Nearest", intent: DisplayIntent::TargetNearest, lit: |h| h.target_nearest },
                ControlButton { label: "Farthest", intent: DisplayIntent::TargetFarthest, lit: |h| h.target_farthest },
            ],
        ),
        (
            "Trails",
            vec![
                ControlButton { label: "All", intent: DisplayIntent::TrailsAll, lit: |h| h.trails_all },
                ControlButton { label: "None", intent: DisplayIntent::TrailsNone, lit: |h| h.trails_none },
                ControlButton { label: "⏶", intent: DisplayIntent::TrailsMore, lit: unlit },
                ControlButton { label: "⏷", intent: DisplayIntent::TrailsFewer, lit: unlit },
            ],
        ),
        (
            "Mode",
            vec![
                ControlButton {
                    label: "Summary",
                    intent: DisplayIntent::Panel(PanelMode::Summary),
                    lit: |h| h.panel_summary,
                },
                ControlButton {
                    label: "Details",
                    intent: DisplayIntent::Panel(PanelMode::Details),
                    lit: |h| h.panel_details,
                },
                ControlButton { label: "Info", intent: DisplayIntent::Panel(PanelMode::Info), lit: |h| h.panel_info },
            ],
        ),
    ]
}

/// Draw the button bar. Clicks are queued, not applied.
pub fn show(ui: &mut egui::Ui, highlights: &ControlHighlights, handle: &RadarHandle) {
    ui.horizontal_wrapped(|ui| {
        for (title, buttons) in groups() {
            ui.group(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).color(LABEL).small());
                    ui.horizontal(|ui| {
                        for button in buttons {
                            let fill = if (button.lit)(highlights) { PRESSED } else { RELEASED };
                            if ui.add(Button::new(button.label).fill(fill)).clicked() {
                                handle.send(button.intent);
                            }
                        }
                    });
                });
            });
        }
    });
}
