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

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// Ceiling-forming layers only: broken, overcast, vertical visibility
static CEILING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(BKN|OVC|VV)([0-9]{3})\b").unwrap());

// Visibility forms, tried in this order. The whole-number form would
// otherwise grab the "1" out of "1 1/2SM".
static VIS_MIXED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})\s([0-9])/([0-9])SM\b").unwrap());
static VIS_FRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9])/([0-9])SM\b").unwrap());
static VIS_WHOLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})SM\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlightCategory {
    #[serde(rename = "LIFR")]
    Lifr,
    #[serde(rename = "IFR")]
    Ifr,
    #[serde(rename = "MVFR")]
    Mvfr,
    #[serde(rename = "VFR")]
    Vfr,
    Unknown,
}

impl FlightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Vfr => "VFR",
            FlightCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowest BKN/OVC/VV layer in feet AGL, or `None` when the report has no
/// ceiling at all. A `VV000` comes back as `Some(0)`, not `None`.
pub fn ceiling_ft(raw: &str) -> Option<u32> {
    CEILING_RE
        .captures_iter(raw)
        .filter_map(|caps| caps[2].parse::<u32>().ok())
        .map(|hundreds| hundreds * 100)
        .min()
}

/// Prevailing visibility in statute miles.
pub fn visibility_sm(raw: &str) -> Option<f64> {
    if let Some(caps) = VIS_MIXED_RE.captures(raw) {
        let whole: f64 = caps[1].parse().ok()?;
        return fraction(&caps[2], &caps[3]).map(|frac| whole + frac);
    }
    if let Some(caps) = VIS_FRACTION_RE.captures(raw) {
        return fraction(&caps[1], &caps[2]);
    }
    if let Some(caps) = VIS_WHOLE_RE.captures(raw) {
        return caps[1].parse().ok();
    }
    None
}

fn fraction(num: &str, den: &str) -> Option<f64> {
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Standard FAA bands. Either condition alone puts a report in a band, and
/// the most restrictive band wins.
pub fn flight_category(ceiling_ft: Option<u32>, visibility_sm: Option<f64>) -> FlightCategory {
    let (Some(ceiling), Some(vis)) = (ceiling_ft, visibility_sm) else {
        return FlightCategory::Unknown;
    };

    if ceiling < 500 || vis < 1.0 {
        FlightCategory::Lifr
    } else if ceiling < 1000 || vis < 3.0 {
        FlightCategory::Ifr
    } else if ceiling < 3000 || vis < 5.0 {
        FlightCategory::Mvfr
    } else {
        FlightCategory::Vfr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("KTRI 171753Z 24008KT 10SM BKN031 21/12 A3001", Some(3100))]
    #[case("KTRI 171753Z 00000KT 2SM BR OVC008 12/11 A2998", Some(800))]
    #[case("KTRI 171753Z 00000KT 1/4SM FG VV002 09/09 A3010", Some(200))]
    #[case("BKN020 OVC008", Some(800))]
    #[case("OVC008 BKN020 VV015", Some(800))]
    #[case("KTRI 171753Z 24008KT 10SM FEW050 SCT250 21/12 A3001", None)]
    #[case("KTRI 171753Z 24008KT 10SM CLR 21/12 A3001", None)]
    #[case("KTRI 171753Z 00000KT 0SM FG VV000 09/09 A3010", Some(0))]
    #[case("", None)]
    fn ceiling_cases(#[case] raw: &str, #[case] expected: Option<u32>) {
        assert_eq!(ceiling_ft(raw), expected);
    }

    #[test]
    fn ceiling_requires_whole_word_three_digit_layers() {
        assert_eq!(ceiling_ft("BKN0310"), None);
        assert_eq!(ceiling_ft("XBKN031"), None);
        assert_eq!(ceiling_ft("BKN31"), None);
        // cumulonimbus suffix breaks the word boundary
        assert_eq!(ceiling_ft("BKN025CB"), None);
    }

    #[rstest]
    #[case("1 1/2SM", Some(1.5))]
    #[case("3/4SM", Some(0.75))]
    #[case("10SM", Some(10.0))]
    #[case("KTRI 171753Z 24008KT 2 1/4SM -RA BR BKN009", Some(2.25))]
    #[case("KTRI 171753Z 24008KT 1/2SM FG", Some(0.5))]
    #[case("KTRI 171753Z 24008KT 6SM HZ", Some(6.0))]
    #[case("EGLL 171750Z 24008KT 9999 FEW040", None)]
    #[case("", None)]
    fn visibility_cases(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(visibility_sm(raw), expected);
    }

    #[test]
    fn mixed_form_beats_whole_number_form() {
        // the whole-number pattern alone would stop at the leading "1"
        assert_eq!(visibility_sm("KXYZ 1 1/2SM BR"), Some(1.5));
    }

    #[test]
    fn only_ascii_digits_count() {
        // Arabic-Indic one in front of a plain fraction
        assert_eq!(visibility_sm("\u{0661} 1/2SM"), Some(0.5));
        assert_eq!(visibility_sm("\u{0661}\u{0660}SM"), None);
        assert_eq!(ceiling_ft("OVC\u{0660}\u{0660}\u{0668} BKN020"), Some(2000));
    }

    #[test]
    fn fraction_with_zero_denominator_is_absent() {
        assert_eq!(visibility_sm("3/0SM"), None);
    }

    #[rstest]
    #[case(Some(400), Some(2.0), FlightCategory::Lifr)]
    #[case(Some(2500), Some(10.0), FlightCategory::Mvfr)]
    #[case(Some(5000), Some(0.5), FlightCategory::Lifr)]
    #[case(Some(800), Some(10.0), FlightCategory::Ifr)]
    #[case(Some(5000), Some(2.0), FlightCategory::Ifr)]
    #[case(Some(5000), Some(4.0), FlightCategory::Mvfr)]
    #[case(Some(3000), Some(5.0), FlightCategory::Vfr)]
    #[case(Some(500), Some(1.0), FlightCategory::Ifr)]
    #[case(Some(1000), Some(3.0), FlightCategory::Mvfr)]
    #[case(None, Some(10.0), FlightCategory::Unknown)]
    #[case(Some(5000), None, FlightCategory::Unknown)]
    #[case(None, None, FlightCategory::Unknown)]
    fn category_cases(
        #[case] ceiling: Option<u32>,
        #[case] vis: Option<f64>,
        #[case] expected: FlightCategory,
    ) {
        assert_eq!(flight_category(ceiling, vis), expected);
    }

    #[test]
    fn extractors_are_idempotent() {
        let raw = "SPECI KTRI 171812Z 27012G20KT 1 3/4SM -TSRA BKN012CB OVC020 18/17 A2990";
        assert_eq!(ceiling_ft(raw), ceiling_ft(raw));
        assert_eq!(visibility_sm(raw), visibility_sm(raw));
        assert_eq!(ceiling_ft(raw), Some(2000));
        assert_eq!(visibility_sm(raw), Some(1.75));
    }

    #[test]
    fn category_labels() {
        assert_eq!(FlightCategory::Lifr.to_string(), "LIFR");
        assert_eq!(FlightCategory::Unknown.to_string(), "Unknown");
        assert_eq!(serde_json::to_string(&FlightCategory::Mvfr).unwrap(), "\"MVFR\"");
    }
}
