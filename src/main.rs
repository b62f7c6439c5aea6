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

mod cli;
mod config;
mod excepts;
mod feed;
mod sensors;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use clap::Parser;
use log::{error, info, warn};
use mimalloc::MiMalloc;
use radar_core::{Radar, RadarHandle};

use crate::cli::Args;
use crate::config::{AppConfig, Settings, APP_NAME};
use crate::excepts::ExceptsLog;
use crate::feed::FeedPoller;
use crate::sensors::FixedViewer;
use crate::ui::RadarApp;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

type SharedContext = Arc<OnceLock<egui::Context>>;

fn init_logging(settings: &Settings) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(settings.log_level).parse_default_env();
    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_excepts(settings: &Settings) -> Option<ExceptsLog<Box<dyn Write + Send>>> {
    let target = settings.excepts.as_ref()?;
    match ExceptsLog::open(target) {
        Ok(log) => Some(log),
        Err(e) => {
            warn!("Cannot open excepts file: {e}");
            None
        }
    }
}

/// Run the feed poller on its own thread with its own runtime.
fn spawn_feed(settings: &Settings, handle: RadarHandle, ctx: SharedContext) -> io::Result<JoinHandle<()>> {
    let poller = FeedPoller::new(&settings.feed_path, settings.poll_interval, settings.verbose);
    let excepts = open_excepts(settings);
    let position = settings.position;
    let orientation = settings.orientation;

    std::thread::Builder::new().name("feed".to_string()).spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Cannot start feed runtime: {e}");
                handle.shutdown();
                return;
            }
        };
        runtime.block_on(async move {
            let receiver = poller.read_receiver().await;
            let viewer = FixedViewer::resolve(position, orientation, receiver.as_ref());
            let repaint = move || {
                if let Some(ctx) = ctx.get() {
                    ctx.request_repaint();
                }
            };
            poller.run(handle, Box::new(viewer), excepts, repaint).await;
        });
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let app_config = AppConfig::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &app_config)?;
    init_logging(&settings)?;

    info!("Starting {APP_NAME} {}", env!("CARGO_PKG_VERSION"));
    match AppConfig::config_path(args.config.as_deref()) {
        Ok(path) => info!("Config file: {}", path.display()),
        Err(e) => warn!("Cannot locate config file: {e}"),
    }

    let handle = RadarHandle::new(Radar::new(settings.radar.clone()));
    let ctx: SharedContext = Arc::new(OnceLock::new());
    let feed_thread = spawn_feed(&settings, handle.clone(), Arc::clone(&ctx))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_fullscreen(settings.full_screen)
            .with_title("Pocket Radar"),
        ..Default::default()
    };
    #[allow(clippy::cast_possible_truncation, reason = "screen sizes fit in f32")]
    let diameter = settings.radar.diameter_px as f32;
    let app_handle = handle.clone();
    let result = eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            if ctx.set(cc.egui_ctx.clone()).is_err() {
                warn!("Repaint context was already set");
            }
            Ok(Box::new(RadarApp::new(app_handle, diameter)))
        }),
    );

    handle.shutdown();
    if feed_thread.join().is_err() {
        error!("Feed thread panicked");
    }
    result?;
    info!("Exiting");
    Ok(())
}
