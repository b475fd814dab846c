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

use crate::error::WxError;

/// Nautical miles per degree of latitude.
const NM_PER_DEGREE: f64 = 60.0;

/// Keeps the longitude denominator away from zero near the poles.
const MIN_COS_LAT: f64 = 0.1;

/// Rectangular lat/lon query region in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

/// Flat-earth box around a point. Good enough for the short radii a drone
/// operator cares about at mid latitudes; it degrades towards the poles.
pub fn bbox_from_point(lat: f64, lon: f64, radius_nm: f64) -> BoundingBox {
    let dlat = radius_nm / NM_PER_DEGREE;
    let dlon = radius_nm / (NM_PER_DEGREE * lat.to_radians().cos().max(MIN_COS_LAT));

    BoundingBox {
        lat_min: lat - dlat,
        lon_min: lon - dlon,
        lat_max: lat + dlat,
        lon_max: lon + dlon,
    }
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// `lat_min,lon_min,lat_max,lon_max` with four decimals, as the
    /// `bbox` query parameter expects.
    pub fn to_query_param(&self) -> String {
        format!(
            "{:.4},{:.4},{:.4},{:.4}",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3},{:.3}) to ({:.3},{:.3})",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

pub fn validate_lat_lon(lat: f64, lon: f64) -> Result<(f64, f64), WxError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok((lat, lon))
    } else {
        Err(WxError::validation(
            "Latitude must be between -90 and 90, and longitude must be between -180 and 180.",
        ))
    }
}
