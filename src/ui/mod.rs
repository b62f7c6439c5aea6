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

//! egui front end: radar disc, control bar and text panel.

pub mod controls;
pub mod info_panel;
pub mod radar_view;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::info;
use radar_core::{DisplayIntent, RadarHandle};

use self::info_panel::CpuTempSampler;

const REPAINT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct RadarApp {
    handle: RadarHandle,
    diameter_px: f32,
    started: DateTime<Utc>,
    cpu_temp: CpuTempSampler,
}

impl RadarApp {
    pub fn new(handle: RadarHandle, diameter_px: f32) -> Self {
        Self {
            handle,
            diameter_px,
            started: Utc::now(),
            cpu_temp: CpuTempSampler::default(),
        }
    }

    fn queue_input(&self, ctx: &egui::Context) {
        for intent in controls::keyboard_intents(ctx) {
            self.handle.send(intent);
        }
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Window closed");
            self.handle.send(DisplayIntent::Quit);
        }
    }
}

impl eframe::App for RadarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(REPAINT_INTERVAL);
        self.queue_input(ctx);

        // read before taking the engine lock
        let cpu_temp = self.cpu_temp.sample(Instant::now(), info_panel::cpu_temp_c);

        let mut closing = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let diameter = self.diameter_px.min(ui.available_width()).max(1.0);
                let drawn = self.handle.render(f64::from(diameter), |frame| {
                    radar_view::show(ui, frame, &self.handle);
                    controls::show(ui, &frame.highlights, &self.handle);
                    ui.separator();
                    info_panel::show(ui, frame, self.started, cpu_temp);
                });
                closing = drawn.is_none();
            });

        if closing {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
