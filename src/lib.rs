// Drone Wx Profile - METAR/SPECI and PIREP summaries for drone operations
// Copyright (C) 2025 FiendishDrWu
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Drone Wx Profile
//!
//! Reduces METAR/SPECI observations and pilot reports near a launch area to
//! the handful of numbers a drone operator cares about: ceiling, visibility,
//! flight category and any cloud bases/tops pilots mentioned.

pub mod awc_api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod geo;
pub mod logging;
pub mod metar_parse;
pub mod pirep_parse;
pub mod profile;
pub mod report;

pub use awc_api::{AwcClient, ReportSource};
pub use cache::CachedSource;
pub use config::Config;
pub use error::WxError;
pub use geo::BoundingBox;
pub use metar_parse::FlightCategory;
pub use report::{RawReport, ReportText};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, WxError>;
