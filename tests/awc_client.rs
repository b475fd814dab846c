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

//! Runs the real HTTP client against a local one-shot server.

use std::thread::{self, JoinHandle};

use dronewx::error::BODY_CONTEXT_CHARS;
use dronewx::geo::bbox_from_point;
use dronewx::profile::{build_summary, fetch_metar_rows, SiteQuery};
use dronewx::{AwcClient, FlightCategory, ReportSource, ReportText, WxError};

/// Answers `count` requests with `status` and `body`, handing back the
/// request urls it saw.
fn serve(count: usize, status: u16, body: &str) -> (String, JoinHandle<Vec<String>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..count {
            let request = server.recv().unwrap();
            seen.push(request.url().to_string());
            let response = tiny_http::Response::from_string(body.clone())
                .with_status_code(status)
                .with_header(
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                );
            request.respond(response).unwrap();
        }
        seen
    });

    (format!("http://127.0.0.1:{}/", port), handle)
}

const METARS: &str = r#"[
  {"icaoId": "KTRI", "obsTime": 1729187580, "rawOb": "KTRI 171753Z 24008KT 10SM BKN031 OVC250 18/09 A3012"},
  {"icaoId": "KTRI", "obsTime": 1729184280, "rawOb": "KTRI 171658Z 24006KT 1 1/2SM BR OVC008 17/09 A3013"}
]"#;

#[test]
fn metar_request_reaches_the_data_api() {
    let (base, server) = serve(1, 200, METARS);
    let client = AwcClient::new(&base).unwrap();
    assert!(!client.base_url().ends_with('/'));

    let reports = client.metars(" ktri", 3).unwrap();
    let urls = server.join().unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].raw_text().starts_with("KTRI 171753Z"));
    assert!(urls[0].starts_with("/api/data/metar?"));
    assert!(urls[0].contains("ids=KTRI"));
    assert!(urls[0].contains("hours=3"));
    assert!(urls[0].contains("format=json"));
}

#[test]
fn pirep_request_sends_the_bbox() {
    let (base, server) = serve(1, 200, r#"[{"rawOb": "TRI UA /OV TRI/TM 1800/FL050/TP C172/SK BKN025-TOP045"}]"#);
    let client = AwcClient::new(&base).unwrap();
    let bbox = bbox_from_point(36.4752, -82.4074, 25.0);

    let reports = client.pireps(&bbox, 6).unwrap();
    let urls = server.join().unwrap();

    assert_eq!(reports.len(), 1);
    assert!(urls[0].starts_with("/api/data/pirep?"));
    let expected = format!("bbox={}", bbox.to_query_param().replace(',', "%2C"));
    assert!(urls[0].contains(&expected), "{} missing from {}", expected, urls[0]);
    assert!(urls[0].contains("hours=6"));
}

#[test]
fn error_status_keeps_code_and_trimmed_body() {
    let long_body = "upstream exploded ".repeat(60);
    let (base, server) = serve(1, 500, &long_body);
    let client = AwcClient::new(&base).unwrap();

    let err = client.metars("KTRI", 2).unwrap_err();
    server.join().unwrap();

    match err {
        WxError::Api { status, url, body } => {
            assert_eq!(status, Some(500));
            assert!(url.contains("/api/data/metar"));
            assert_eq!(body.chars().count(), BODY_CONTEXT_CHARS);
            assert!(long_body.starts_with(&body));
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[test]
fn no_content_means_no_reports() {
    let (base, server) = serve(1, 204, "");
    let client = AwcClient::new(&base).unwrap();

    let reports = client.metars("KTRI", 3).unwrap();
    server.join().unwrap();
    assert!(reports.is_empty());
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // bind then drop so nothing is listening on the port
    let port = {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap().port()
    };
    let client = AwcClient::new(&format!("http://127.0.0.1:{}", port)).unwrap();

    let err = client.metars("KTRI", 3).unwrap_err();
    assert!(matches!(err, WxError::Api { status: None, .. }));
}

#[test]
fn rows_and_summary_from_live_client() {
    // one request for the table, one each for the summary's METAR and PIREP calls
    let (base, server) = serve(3, 200, METARS);
    let client = AwcClient::new(&base).unwrap();
    let query = SiteQuery {
        station: "KTRI".to_string(),
        latitude: 36.4752,
        longitude: -82.4074,
        radius_nm: 25.0,
        metar_hours: 3,
        pirep_hours: 6,
    };

    let rows = fetch_metar_rows(&client, &query).unwrap();
    assert_eq!(rows[0].category, FlightCategory::Vfr);
    assert_eq!(rows[0].ceiling_ft, Some(3100));
    assert_eq!(rows[1].category, FlightCategory::Ifr);
    assert_eq!(rows[1].visibility_sm, Some(1.5));

    let summary = build_summary(&client, &query);
    let urls = server.join().unwrap();

    assert!(urls[1].contains("hours=2"));
    let lines = summary.lines();
    assert_eq!(lines[0], "Surface near KTRI: VFR | vis ~ 10 SM | ceiling ~ 3100 ft AGL");
    assert_eq!(lines[2], "Nearby PIREP bases: none explicitly found");
}
