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
use std::sync::LazyLock;

static BASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bBASES?\s?([0-9]{2,5})\b").unwrap());
static TOPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bTOPS?\s?([0-9]{2,5})\b").unwrap());

/// Cloud bases and tops mentioned anywhere in a PIREP, in the order they
/// appear. Values stay in hundreds of feet exactly as the pilot wrote them,
/// and the two lists are independent: a base is not paired with a top.
pub fn bases_tops(raw: &str) -> (Vec<u32>, Vec<u32>) {
    (collect_heights(&BASE_RE, raw), collect_heights(&TOPS_RE, raw))
}

fn collect_heights(re: &Regex, raw: &str) -> Vec<u32> {
    re.captures_iter(raw)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BASES 020 TOPS 045 TOP 080", vec![20], vec![45, 80])]
    #[case("", vec![], vec![])]
    #[case(
        "TRI UA /OV TRI180010/TM 1748/FL060/TP C172/SK BKN040-TOP065/TB NEG",
        vec![],
        vec![65]
    )]
    #[case(
        "TRI UA /OV TRI/TM 1900/FL080/TP PA28/SK OVC BASE 035 TOPS 070 BASE 110",
        vec![35, 110],
        vec![70]
    )]
    #[case("bases 25 tops 9000", vec![25], vec![9000])]
    #[case("TOPS UNKN BASE 5", vec![], vec![])]
    #[case("BASES  030", vec![], vec![])]
    fn bases_tops_cases(
        #[case] raw: &str,
        #[case] bases: Vec<u32>,
        #[case] tops: Vec<u32>,
    ) {
        assert_eq!(bases_tops(raw), (bases, tops));
    }

    #[test]
    fn digits_must_end_on_a_word_boundary() {
        // six digits is too many for a height
        assert_eq!(bases_tops("TOP 123456"), (vec![], vec![]));
        // "STOPS" is not a tops report
        assert_eq!(bases_tops("STOPS 040"), (vec![], vec![]));
    }

    #[test]
    fn only_ascii_digits_count() {
        let raw = "BASE \u{0660}\u{0663}\u{0660} TOPS \u{0660}\u{0664}\u{0665} TOPS 045";
        assert_eq!(bases_tops(raw), (vec![], vec![45]));
    }

    #[test]
    fn lists_are_not_sorted_or_deduplicated() {
        let (bases, tops) = bases_tops("BASE 080 BASE 020 BASE 080 TOPS 100 TOPS 050");
        assert_eq!(bases, vec![80, 20, 80]);
        assert_eq!(tops, vec![100, 50]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let raw = "UA /OV TRI/SK SCT030 BASES 028 TOPS 042";
        assert_eq!(bases_tops(raw), bases_tops(raw));
    }
}
