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

//! Engine for a terminal-control departure board and weather display.
//!
//! Everything here is headless: the front end only measures, draws and
//! forwards clicks. The crate is split into layers that can be used on
//! their own:
//!
//! - **Positions**: the static sector/position catalog and resolution of a
//!   clicked button (following aliases) to the content it shows
//! - **Layout**: section geometry from a measured container height, with a
//!   resize debouncer
//! - **Departures**: the per-section filter, sort and pagination pipeline
//! - **Weather**: display text for METAR-derived reports, the panel model
//!   and the SVG wind dial
//! - **Scheduler/Controller**: tokio refresh timers and the single owner of
//!   the current selection
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use deplist_core::{
//!     ApiClient, DisplayController, PositionCatalog, RefreshScheduler, ResizeDebouncer,
//!     SchedulerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = PositionCatalog::builtin().unwrap();
//!     let api = ApiClient::new(
//!         "http://localhost:5000/api",
//!         "http://localhost:5000",
//!         Duration::from_secs(5),
//!     )
//!     .unwrap();
//!     let scheduler = RefreshScheduler::new(
//!         tokio::runtime::Handle::current(),
//!         api,
//!         SchedulerConfig::default(),
//!     );
//!     let mut controller = DisplayController::new(catalog, scheduler, ResizeDebouncer::default());
//!     controller.select_sector("TC_NORTH");
//!
//!     loop {
//!         controller.pump_events(chrono::Utc::now());
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ```
//! use deplist_core::weather::{format_temperature, wind_dial, Wind};
//!
//! assert_eq!(format_temperature(-3.0), "M03");
//!
//! let wind = Wind {
//!     variable_from: Some(350.0),
//!     variable_to: Some(20.0),
//!     ..Wind::default()
//! };
//! assert_eq!(wind_dial::active_segments(&wind), vec![0, 10, 20, 350]);
//! ```

pub mod api;
pub mod controller;
pub mod departures;
pub mod layout;
pub mod positions;
pub mod scheduler;
pub mod status;
pub mod weather;

pub use api::{health_base_for, ApiClient, ApiError, DEFAULT_API_BASE};
pub use controller::{DisplayContent, DisplayController};
pub use departures::{DepartureBoard, DepartureSnapshot};
pub use layout::{ResizeDebouncer, HEADER_HEIGHT, ROW_HEIGHT};
pub use positions::{CatalogError, PositionCatalog, ResolvedPosition};
pub use scheduler::{Generation, RefreshEvent, RefreshScheduler, SchedulerConfig};
pub use status::{ConnectionStatus, DisplayStatus};
pub use weather::WeatherPanel;
