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

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

use crate::awc_api::{normalize_station, AWC_BASE_URL};
use crate::error::WxError;
use crate::geo::validate_lat_lon;
use crate::profile::SiteQuery;
use crate::Result;

pub const CONFIG_FILE: &str = "config.json";

pub const RADIUS_RANGE_NM: RangeInclusive<f64> = 5.0..=100.0;
pub const LOOKBACK_RANGE_HOURS: RangeInclusive<u32> = 1..=12;

/// A launch point the user wants to come back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSite {
    pub name: String,
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_nm: f64,
    pub metar_hours: u32,
    pub pirep_hours: u32,
    pub api_base_url: String,
    pub saved_sites: Vec<SavedSite>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station: "KTRI".to_string(),
            latitude: 36.4752,
            longitude: -82.4074,
            radius_nm: 25.0,
            metar_hours: 3,
            pirep_hours: 6,
            api_base_url: AWC_BASE_URL.to_string(),
            saved_sites: Vec::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if normalize_station(&self.station).is_empty() {
            return Err(WxError::config("station must not be empty"));
        }
        validate_lat_lon(self.latitude, self.longitude)
            .map_err(|e| WxError::config(e.to_string()))?;
        if !RADIUS_RANGE_NM.contains(&self.radius_nm) {
            return Err(WxError::config(format!(
                "radius_nm must be between {} and {}",
                RADIUS_RANGE_NM.start(),
                RADIUS_RANGE_NM.end()
            )));
        }
        for (name, hours) in [("metar_hours", self.metar_hours), ("pirep_hours", self.pirep_hours)] {
            if !LOOKBACK_RANGE_HOURS.contains(&hours) {
                return Err(WxError::config(format!(
                    "{} must be between {} and {}",
                    name,
                    LOOKBACK_RANGE_HOURS.start(),
                    LOOKBACK_RANGE_HOURS.end()
                )));
            }
        }
        if self.api_base_url.trim().is_empty() {
            return Err(WxError::config("api_base_url must not be empty"));
        }
        Ok(())
    }

    pub fn site_query(&self) -> SiteQuery {
        SiteQuery {
            station: normalize_station(&self.station),
            latitude: self.latitude,
            longitude: self.longitude,
            radius_nm: self.radius_nm,
            metar_hours: self.metar_hours,
            pirep_hours: self.pirep_hours,
        }
    }

    /// Make a saved site the current launch area.
    pub fn use_site(&mut self, site: &SavedSite) {
        self.station = normalize_station(&site.station);
        self.latitude = site.latitude;
        self.longitude = site.longitude;
    }

    /// Adds the site, replacing any existing one with the same name.
    pub fn save_site(&mut self, site: SavedSite) -> Result<()> {
        if site.name.trim().is_empty() {
            return Err(WxError::validation("Site name must not be empty."));
        }
        validate_lat_lon(site.latitude, site.longitude)?;

        let site = SavedSite {
            name: site.name.trim().to_string(),
            station: normalize_station(&site.station),
            ..site
        };
        match self
            .saved_sites
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&site.name))
        {
            Some(existing) => *existing = site,
            None => self.saved_sites.push(site),
        }
        Ok(())
    }

    /// Returns whether anything was removed.
    pub fn delete_site(&mut self, name: &str) -> bool {
        let before = self.saved_sites.len();
        self.saved_sites.retain(|s| !s.name.eq_ignore_ascii_case(name.trim()));
        self.saved_sites.len() != before
    }

    pub fn find_site(&self, name: &str) -> Option<&SavedSite> {
        self.saved_sites
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Reads the config, writing out the defaults on first run.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        save_config(path, &config)?;
        info!(path = %path.display(), "created default configuration");
        return Ok(config);
    }

    let data = fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    config.validate()?;
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
