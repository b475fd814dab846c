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

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::awc_api::{normalize_station, ReportSource};
use crate::geo::{bbox_from_point, BoundingBox};
use crate::metar_parse::{ceiling_ft, flight_category, visibility_sm, FlightCategory};
use crate::pirep_parse::bases_tops;
use crate::report::{RawReport, ReportText};
use crate::Result;

/// The combined summary only looks at the most recent couple of hours.
pub const SUMMARY_METAR_HOURS: u32 = 2;

/// How many of the lowest bases/tops the summary lists.
pub const SUMMARY_LIST_LIMIT: usize = 8;

/// Everything needed to ask about one launch area.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteQuery {
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_nm: f64,
    pub metar_hours: u32,
    pub pirep_hours: u32,
}

impl SiteQuery {
    pub fn bbox(&self) -> BoundingBox {
        bbox_from_point(self.latitude, self.longitude, self.radius_nm)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetarRow {
    pub station: Option<String>,
    pub observed: Option<String>,
    pub raw: String,
    pub ceiling_ft: Option<u32>,
    pub visibility_sm: Option<f64>,
    pub category: FlightCategory,
}

impl MetarRow {
    pub fn from_report(report: &RawReport) -> Self {
        let raw = report.raw_text();
        let ceiling = ceiling_ft(raw);
        let visibility = visibility_sm(raw);

        Self {
            station: report.get_str("icaoId").map(str::to_string),
            observed: observed_time(report, &["obsTime", "reportTime"]),
            raw: raw.to_string(),
            ceiling_ft: ceiling,
            visibility_sm: visibility,
            category: flight_category(ceiling, visibility),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PirepRow {
    pub observed: Option<String>,
    pub raw: String,
    pub bases: Vec<u32>,
    pub tops: Vec<u32>,
}

impl PirepRow {
    pub fn from_report(report: &RawReport) -> Self {
        let raw = report.raw_text();
        let (bases, tops) = bases_tops(raw);

        Self {
            observed: observed_time(report, &["obsTime", "receiptTime"]),
            raw: raw.to_string(),
            bases,
            tops,
        }
    }
}

pub fn metar_rows(reports: &[RawReport]) -> Vec<MetarRow> {
    reports.iter().map(MetarRow::from_report).collect()
}

pub fn pirep_rows(reports: &[RawReport]) -> Vec<PirepRow> {
    reports.iter().map(PirepRow::from_report).collect()
}

pub fn fetch_metar_rows<S: ReportSource>(source: &S, query: &SiteQuery) -> Result<Vec<MetarRow>> {
    let reports = source.metars(&query.station, query.metar_hours)?;
    Ok(metar_rows(&reports))
}

pub fn fetch_pirep_rows<S: ReportSource>(source: &S, query: &SiteQuery) -> Result<Vec<PirepRow>> {
    let reports = source.pireps(&query.bbox(), query.pirep_hours)?;
    Ok(pirep_rows(&reports))
}

// AWC sends epoch seconds in obsTime and ISO strings in the *Time text fields
fn observed_time(report: &RawReport, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match report.fields().get(*key)? {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%MZ").to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSummary {
    pub category: FlightCategory,
    pub visibility_sm: Option<f64>,
    pub ceiling_ft: Option<u32>,
    pub raw: String,
}

/// Lowest reported bases and tops around the launch area, in hundreds of feet.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudSummary {
    pub bases: Vec<u32>,
    pub tops: Vec<u32>,
}

/// `None` on either side means that half could not be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub station: String,
    pub surface: Option<SurfaceSummary>,
    pub clouds: Option<CloudSummary>,
}

pub fn summarize_surface(reports: &[RawReport]) -> Option<SurfaceSummary> {
    // newest observation comes first
    let latest = reports.first()?;
    let row = MetarRow::from_report(latest);

    Some(SurfaceSummary {
        category: row.category,
        visibility_sm: row.visibility_sm,
        ceiling_ft: row.ceiling_ft,
        raw: row.raw,
    })
}

pub fn summarize_clouds(reports: &[RawReport]) -> CloudSummary {
    let mut bases = Vec::new();
    let mut tops = Vec::new();
    for report in reports {
        let (b, t) = bases_tops(report.raw_text());
        bases.extend(b);
        tops.extend(t);
    }

    bases.sort_unstable();
    tops.sort_unstable();
    bases.truncate(SUMMARY_LIST_LIMIT);
    tops.truncate(SUMMARY_LIST_LIMIT);

    CloudSummary { bases, tops }
}

pub fn build_summary<S: ReportSource>(source: &S, query: &SiteQuery) -> Summary {
    let surface = match source.metars(&query.station, SUMMARY_METAR_HOURS) {
        Ok(reports) => summarize_surface(&reports),
        Err(e) => {
            warn!(station = %query.station, error = %e, "surface summary unavailable");
            None
        }
    };

    let clouds = match source.pireps(&query.bbox(), query.pirep_hours) {
        Ok(reports) => Some(summarize_clouds(&reports)),
        Err(e) => {
            warn!(error = %e, "PIREP summary unavailable");
            None
        }
    };

    Summary {
        station: normalize_station(&query.station),
        surface,
        clouds,
    }
}

impl Summary {
    /// Plain-text lines for the terminal and the summary tab.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        match &self.surface {
            Some(surface) => {
                lines.push(format!(
                    "Surface near {}: {} | vis ~ {} SM | ceiling ~ {} ft AGL",
                    self.station,
                    surface.category,
                    display_visibility(surface.visibility_sm),
                    display_ceiling(surface.ceiling_ft),
                ));
                lines.push(surface.raw.clone());
            }
            None => lines.push("Surface: unavailable".to_string()),
        }

        match &self.clouds {
            Some(clouds) => {
                lines.push(list_line("bases", &clouds.bases));
                lines.push(list_line("tops", &clouds.tops));
            }
            None => lines.push("PIREPs: unavailable".to_string()),
        }

        lines
    }
}

fn list_line(label: &str, values: &[u32]) -> String {
    if values.is_empty() {
        format!("Nearby PIREP {}: none explicitly found", label)
    } else {
        format!(
            "Nearby PIREP {} (heuristic): ~{} (hundreds of ft)",
            label,
            join_heights(values)
        )
    }
}

pub fn join_heights(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| format!("{:03}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_visibility(visibility: Option<f64>) -> String {
    match visibility {
        Some(v) if v.fract() == 0.0 => format!("{}", v as u32),
        Some(v) => format!("{:.2}", v).trim_end_matches('0').to_string(),
        None => "n/a".to_string(),
    }
}

pub fn display_ceiling(ceiling: Option<u32>) -> String {
    ceiling.map_or_else(|| "none".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WxError;
    use serde_json::json;

    fn reports(values: Vec<Value>) -> Vec<RawReport> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn query() -> SiteQuery {
        SiteQuery {
            station: "ktri".to_string(),
            latitude: 36.4752,
            longitude: -82.4074,
            radius_nm: 25.0,
            metar_hours: 3,
            pirep_hours: 6,
        }
    }

    struct FakeSource {
        metars: Option<Vec<RawReport>>,
        pireps: Option<Vec<RawReport>>,
    }

    impl ReportSource for FakeSource {
        fn metars(&self, _station: &str, _hours: u32) -> Result<Vec<RawReport>> {
            self.metars
                .clone()
                .ok_or_else(|| WxError::api(Some(500), "http://fake/metar", "boom"))
        }

        fn pireps(&self, _bbox: &BoundingBox, _hours: u32) -> Result<Vec<RawReport>> {
            self.pireps
                .clone()
                .ok_or_else(|| WxError::api(None, "http://fake/pirep", "timeout"))
        }
    }

    #[test]
    fn metar_row_extracts_everything() {
        let rs = reports(vec![json!({
            "icaoId": "KTRI",
            "obsTime": 1729187580,
            "rawOb": "METAR KTRI 171753Z 24008KT 2 1/2SM BR BKN008 OVC015 12/11 A2998"
        })]);
        let rows = metar_rows(&rs);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.station.as_deref(), Some("KTRI"));
        assert_eq!(row.observed.as_deref(), Some("2024-10-17 17:53Z"));
        assert_eq!(row.ceiling_ft, Some(800));
        assert_eq!(row.visibility_sm, Some(2.5));
        assert_eq!(row.category, FlightCategory::Ifr);
    }

    #[test]
    fn record_without_text_is_unknown_not_an_error() {
        let rows = metar_rows(&reports(vec![json!({"icaoId": "KTRI"})]));
        assert_eq!(rows[0].raw, "");
        assert_eq!(rows[0].category, FlightCategory::Unknown);
    }

    #[test]
    fn pirep_row_keeps_receipt_time_text() {
        let rs = reports(vec![json!({
            "receiptTime": "2024-10-17T18:02:00.000Z",
            "rawOb": "TRI UA /OV TRI/TM 1800/FL070/TP C172/SK BASES 040 TOPS 065"
        })]);
        let row = &pirep_rows(&rs)[0];
        assert_eq!(row.observed.as_deref(), Some("2024-10-17T18:02:00.000Z"));
        assert_eq!(row.bases, vec![40]);
        assert_eq!(row.tops, vec![65]);
    }

    #[test]
    fn cloud_summary_sorts_and_truncates() {
        let rs = reports(vec![
            json!({"rawOb": "BASES 090 TOPS 120 BASE 030"}),
            json!({"text": "BASE 050 BASE 010 BASE 070 BASE 020 BASE 060 BASE 080 BASE 040"}),
            json!({"report": "TOP 045"}),
            json!({"icaoId": "no text at all"}),
        ]);
        let clouds = summarize_clouds(&rs);
        assert_eq!(clouds.bases, vec![10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(clouds.tops, vec![45, 120]);
    }

    #[test]
    fn surface_summary_uses_first_record() {
        let rs = reports(vec![
            json!({"rawOb": "KTRI 171853Z 10SM OVC004"}),
            json!({"rawOb": "KTRI 171753Z 10SM CLR"}),
        ]);
        let surface = summarize_surface(&rs).unwrap();
        assert_eq!(surface.category, FlightCategory::Lifr);
        assert_eq!(surface.ceiling_ft, Some(400));
        assert!(summarize_surface(&[]).is_none());
    }

    #[test]
    fn summary_lines_report_both_sides() {
        let source = FakeSource {
            metars: Some(reports(vec![json!({"rawOb": "KTRI 171753Z 24008KT 10SM BKN031 21/12"})])),
            pireps: Some(reports(vec![json!({"rawOb": "UA /OV TRI/SK BASES 020 TOPS 045"})])),
        };
        let summary = build_summary(&source, &query());
        assert_eq!(summary.station, "KTRI");
        let lines = summary.lines();
        assert_eq!(
            lines[0],
            "Surface near KTRI: VFR | vis ~ 10 SM | ceiling ~ 3100 ft AGL"
        );
        assert_eq!(lines[1], "KTRI 171753Z 24008KT 10SM BKN031 21/12");
        assert_eq!(lines[2], "Nearby PIREP bases (heuristic): ~020 (hundreds of ft)");
        assert_eq!(lines[3], "Nearby PIREP tops (heuristic): ~045 (hundreds of ft)");
    }

    #[test]
    fn summary_degrades_per_side() {
        let source = FakeSource {
            metars: None,
            pireps: Some(Vec::new()),
        };
        let lines = build_summary(&source, &query()).lines();
        assert_eq!(lines[0], "Surface: unavailable");
        assert_eq!(lines[1], "Nearby PIREP bases: none explicitly found");
        assert_eq!(lines[2], "Nearby PIREP tops: none explicitly found");

        let source = FakeSource {
            metars: Some(Vec::new()),
            pireps: None,
        };
        let lines = build_summary(&source, &query()).lines();
        assert_eq!(lines, vec!["Surface: unavailable", "PIREPs: unavailable"]);
    }

    #[test]
    fn fetch_errors_propagate_for_tables() {
        let source = FakeSource {
            metars: None,
            pireps: None,
        };
        assert!(matches!(
            fetch_metar_rows(&source, &query()),
            Err(WxError::Api { status: Some(500), .. })
        ));
        assert!(fetch_pirep_rows(&source, &query()).is_err());
    }

    #[test]
    fn display_helpers() {
        assert_eq!(display_visibility(Some(10.0)), "10");
        assert_eq!(display_visibility(Some(1.5)), "1.5");
        assert_eq!(display_visibility(Some(0.75)), "0.75");
        assert_eq!(display_visibility(None), "n/a");
        assert_eq!(display_ceiling(Some(800)), "800");
        assert_eq!(display_ceiling(None), "none");
    }
}
