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
use serde_json::{Map, Value};

/// Field names the encoded report text has been seen under, in the order
/// they are tried. Matching ignores case, so `rawOb` covers `rawob` too.
pub const RAW_TEXT_KEYS: [&str; 5] = ["rawOb", "raw", "text", "raw_text", "report"];

/// One record exactly as the data API returned it. Everything besides the
/// raw text is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReport {
    fields: Map<String, Value>,
}

impl RawReport {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Case-insensitive lookup of a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        lookup_str(&self.fields, key)
    }
}

impl From<Map<String, Value>> for RawReport {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Anything a raw report's encoded text can be pulled out of.
pub trait ReportText {
    /// First populated candidate from [`RAW_TEXT_KEYS`]; an empty string
    /// when none is present. Never an error.
    fn raw_text(&self) -> &str;
}

impl ReportText for Map<String, Value> {
    fn raw_text(&self) -> &str {
        RAW_TEXT_KEYS
            .iter()
            .find_map(|key| lookup_str_where(self, key, |text| !text.trim().is_empty()))
            .unwrap_or("")
    }
}

impl ReportText for Value {
    fn raw_text(&self) -> &str {
        match self {
            Value::Object(map) => map.raw_text(),
            _ => "",
        }
    }
}

impl ReportText for RawReport {
    fn raw_text(&self) -> &str {
        self.fields.raw_text()
    }
}

impl<T: ReportText> ReportText for Option<T> {
    fn raw_text(&self) -> &str {
        self.as_ref().map_or("", ReportText::raw_text)
    }
}

fn lookup_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    lookup_str_where(map, key, |_| true)
}

// The exact spelling wins, then any other casing of the key. Only string
// values that `accept` takes are considered.
fn lookup_str_where<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    if let Some(text) = map.get(key).and_then(Value::as_str).filter(|text| accept(*text)) {
        return Some(text);
    }
    map.iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(key))
        .find_map(|(_, v)| v.as_str().filter(|text| accept(*text)))
}
