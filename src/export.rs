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

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::profile::{join_heights, MetarRow, PirepRow};
use crate::Result;

const METAR_HEADER: [&str; 6] = ["station", "observed", "category", "ceiling_ft", "visibility_sm", "raw"];
const PIREP_HEADER: [&str; 4] = ["observed", "bases_hundreds_ft", "tops_hundreds_ft", "raw"];

pub fn write_metar_csv<W: Write>(writer: W, rows: &[MetarRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(METAR_HEADER)?;
    for row in rows {
        csv.write_record([
            row.station.clone().unwrap_or_default(),
            row.observed.clone().unwrap_or_default(),
            row.category.to_string(),
            row.ceiling_ft.map(|c| c.to_string()).unwrap_or_default(),
            row.visibility_sm.map(|v| v.to_string()).unwrap_or_default(),
            row.raw.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_pirep_csv<W: Write>(writer: W, rows: &[PirepRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(PIREP_HEADER)?;
    for row in rows {
        csv.write_record([
            row.observed.clone().unwrap_or_default(),
            join_heights(&row.bases),
            join_heights(&row.tops),
            row.raw.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn save_metar_csv(path: &Path, rows: &[MetarRow]) -> Result<()> {
    write_metar_csv(std::fs::File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "METAR table exported");
    Ok(())
}

pub fn save_pirep_csv(path: &Path, rows: &[PirepRow]) -> Result<()> {
    write_pirep_csv(std::fs::File::create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "PIREP table exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metar_parse::FlightCategory;

    #[test]
    fn metar_csv_leaves_missing_values_blank() {
        let rows = vec![
            MetarRow {
                station: Some("KTRI".to_string()),
                observed: Some("2024-10-17 17:53Z".to_string()),
                raw: "KTRI 171753Z 3/4SM FG OVC003".to_string(),
                ceiling_ft: Some(300),
                visibility_sm: Some(0.75),
                category: FlightCategory::Lifr,
            },
            MetarRow {
                station: None,
                observed: None,
                raw: String::new(),
                ceiling_ft: None,
                visibility_sm: None,
                category: FlightCategory::Unknown,
            },
        ];

        let mut out = Vec::new();
        write_metar_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "station,observed,category,ceiling_ft,visibility_sm,raw");
        assert_eq!(lines[1], "KTRI,2024-10-17 17:53Z,LIFR,300,0.75,KTRI 171753Z 3/4SM FG OVC003");
        assert!(lines[2].starts_with(",,Unknown,,,"));
    }

    #[test]
    fn pirep_csv_quotes_height_lists() {
        let rows = vec![PirepRow {
            observed: None,
            raw: "UA /OV TRI/SK BASES 020 TOPS 045 TOP 080".to_string(),
            bases: vec![20],
            tops: vec![45, 80],
        }];

        let mut out = Vec::new();
        write_pirep_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",020,\"045, 080\",UA /OV TRI/SK BASES 020 TOPS 045 TOP 080"));
    }

    #[test]
    fn saves_to_disk() {
        let path = std::env::temp_dir().join(format!("dronewx-export-{}.csv", std::process::id()));
        save_pirep_csv(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "observed,bases_hundreds_ft,tops_hundreds_ft,raw");
        std::fs::remove_file(&path).ok();
    }
}
