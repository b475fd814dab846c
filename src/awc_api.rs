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

use reqwest::{blocking::Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::WxError;
use crate::geo::BoundingBox;
use crate::report::RawReport;
use crate::Result;

pub const AWC_BASE_URL: &str = "https://aviationweather.gov";
const METAR_PATH: &str = "/api/data/metar";
const PIREP_PATH: &str = "/api/data/pirep";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Where raw reports come from. The AviationWeather.gov client is the real
/// implementation; tests and the cache wrap or replace it.
pub trait ReportSource {
    /// METAR/SPECI reports for one station over the last `hours`.
    fn metars(&self, station: &str, hours: u32) -> Result<Vec<RawReport>>;

    /// Pilot reports inside `bbox` over the last `hours`.
    fn pireps(&self, bbox: &BoundingBox, hours: u32) -> Result<Vec<RawReport>>;
}

impl<S: ReportSource + ?Sized> ReportSource for &S {
    fn metars(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        (**self).metars(station, hours)
    }

    fn pireps(&self, bbox: &BoundingBox, hours: u32) -> Result<Vec<RawReport>> {
        (**self).pireps(bbox, hours)
    }
}

/// Blocking client for the AviationWeather.gov Data API.
#[derive(Debug, Clone)]
pub struct AwcClient {
    client: Client,
    base_url: String,
}

impl AwcClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("dronewx/{}", crate::VERSION))
            .build()
            .map_err(|e| WxError::config(format!("Could not build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_reports(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<RawReport>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?params, "querying AWC data API");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|e| {
                warn!(%url, error = %e, "AWC request failed");
                WxError::api(None, url.as_str(), e.to_string())
            })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .map_err(|e| WxError::api(Some(status.as_u16()), final_url.as_str(), e.to_string()))?;

        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => {}
            _ => {
                warn!(url = %final_url, status = status.as_u16(), "AWC returned an error status");
                return Err(WxError::api(Some(status.as_u16()), final_url, body));
            }
        }

        let reports = parse_reports(&body)
            .map_err(|e| WxError::api(Some(status.as_u16()), final_url.as_str(), e.to_string()))?;
        debug!(url = %final_url, count = reports.len(), "AWC reports received");
        Ok(reports)
    }
}

impl ReportSource for AwcClient {
    fn metars(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        let params = metar_query(station, hours)?;
        self.get_reports(METAR_PATH, &params)
    }

    fn pireps(&self, bbox: &BoundingBox, hours: u32) -> Result<Vec<RawReport>> {
        let params = pirep_query(bbox, hours)?;
        self.get_reports(PIREP_PATH, &params)
    }
}

/// Station ids are case-insensitive on input and always sent uppercase.
pub fn normalize_station(station: &str) -> String {
    station.trim().to_uppercase()
}

pub fn metar_query(station: &str, hours: u32) -> Result<Vec<(&'static str, String)>> {
    let station = normalize_station(station);
    if station.is_empty() {
        return Err(WxError::validation("Please enter a station identifier."));
    }
    check_hours(hours)?;

    Ok(vec![
        ("ids", station),
        ("hours", hours.to_string()),
        ("format", "json".to_string()),
    ])
}

pub fn pirep_query(bbox: &BoundingBox, hours: u32) -> Result<Vec<(&'static str, String)>> {
    check_hours(hours)?;

    Ok(vec![
        ("bbox", bbox.to_query_param()),
        ("hours", hours.to_string()),
        ("format", "json".to_string()),
    ])
}

fn check_hours(hours: u32) -> Result<()> {
    if hours == 0 {
        return Err(WxError::validation("Lookback window must be at least one hour."));
    }
    Ok(())
}

/// The API answers with an array of records, occasionally a bare object,
/// and an empty body when nothing matched.
pub fn parse_reports(body: &str) -> serde_json::Result<Vec<RawReport>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let reports = match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(RawReport::new(map)),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![RawReport::new(map)],
        _ => Vec::new(),
    };
    Ok(reports)
}
