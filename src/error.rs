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

use thiserror::Error;

/// Longest slice of a response body kept on an API error.
pub const BODY_CONTEXT_CHARS: usize = 300;

#[derive(Error, Debug)]
pub enum WxError {
    /// Anything that went wrong talking to the weather API: transport
    /// failures, non-200 answers and undecodable bodies all land here.
    #[error("{}", api_display(.status, .url, .body))]
    Api {
        status: Option<u16>,
        url: String,
        body: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

fn api_display(status: &Option<u16>, url: &str, body: &str) -> String {
    match status {
        Some(code) => format!("{} from {}: {}", code, url, body),
        None => format!("request to {} failed: {}", url, body),
    }
}

impl WxError {
    pub fn api<U: Into<String>, B: AsRef<str>>(status: Option<u16>, url: U, body: B) -> Self {
        Self::Api {
            status,
            url: url.into(),
            body: truncate_chars(body.as_ref(), BODY_CONTEXT_CHARS),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Short message for the error boxes and status lines.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WxError::Api { status: Some(code), .. } => {
                format!("AviationWeather.gov answered HTTP {}. Try again shortly.", code)
            }
            WxError::Api { status: None, .. } => {
                "Unable to reach AviationWeather.gov. Please check your internet connection."
                    .to_string()
            }
            WxError::Config { message } => format!("Configuration problem: {}", message),
            WxError::Validation { message } => format!("Invalid input: {}", message),
            WxError::Io { .. } => "File operation failed. Please check file permissions.".to_string(),
            WxError::Json { .. } => "Could not read or write JSON data.".to_string(),
            WxError::Csv { .. } => "Could not write the CSV file.".to_string(),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_truncates_body() {
        let body = "x".repeat(1000);
        let err = WxError::api(Some(500), "https://example.test/api/data/metar", &body);
        match err {
            WxError::Api { status, body, .. } => {
                assert_eq!(status, Some(500));
                assert_eq!(body.len(), BODY_CONTEXT_CHARS);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(400);
        let err = WxError::api(Some(502), "u", &body);
        if let WxError::Api { body, .. } = err {
            assert_eq!(body.chars().count(), BODY_CONTEXT_CHARS);
        }
    }

    #[test]
    fn api_error_display_carries_status_and_url() {
        let err = WxError::api(Some(404), "https://aviationweather.gov/api/data/metar", "nope");
        assert_eq!(
            err.to_string(),
            "404 from https://aviationweather.gov/api/data/metar: nope"
        );

        let err = WxError::api(None, "https://aviationweather.gov/api/data/pirep", "timed out");
        assert!(err.to_string().contains("failed: timed out"));
    }

    #[test]
    fn user_messages() {
        assert!(WxError::api(Some(429), "u", "").user_message().contains("429"));
        assert!(WxError::api(None, "u", "").user_message().contains("Unable to reach"));
        assert!(WxError::validation("latitude").user_message().contains("latitude"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WxError = io_err.into();
        assert!(matches!(err, WxError::Io { .. }));
    }
}
