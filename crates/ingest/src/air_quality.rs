//! AQICN air-quality feed adapter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use telemetry::{AirQualityReading, Metric, Pollutant, PollutantLevels, Validator};
use tracing::{debug, info};

use crate::{check_response, with_deadline, IngestError};

/// Air-quality feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityConfig {
    pub base_url: String,
    pub token: String,
    pub city: String,
    pub timeout_secs: u64,
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.waqi.info".to_string(),
            token: String::new(),
            city: "paris".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    #[serde(default)]
    aqi: Value,
    city: FeedCity,
    #[serde(default)]
    iaqi: BTreeMap<String, FeedValue>,
}

#[derive(Debug, Deserialize)]
struct FeedCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeedValue {
    #[serde(default)]
    v: Value,
}

/// Parse an AQICN feed body into a reading.
///
/// A non-numeric `aqi` (the feed uses `"-"` when a station is offline) and
/// pollutants missing from `iaqi` are recorded as absent.
pub fn parse_feed(
    body: &str,
    at: DateTime<Utc>,
    validator: &Validator,
) -> Result<AirQualityReading, IngestError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)?;
    if envelope.status != "ok" {
        let reason = envelope
            .data
            .as_str()
            .map(str::to_string)
            .unwrap_or(envelope.status);
        return Err(IngestError::Upstream(reason));
    }

    let data: FeedData = serde_json::from_value(envelope.data)?;

    let mut levels = PollutantLevels::default();
    for pollutant in Pollutant::ALL {
        let value = data.iaqi.get(pollutant.as_str()).and_then(|f| f.v.as_f64());
        levels.set(pollutant, validator.check(Metric::from(pollutant), value));
    }

    let aqi = validator
        .check(Metric::Aqi, data.aqi.as_f64())
        .map(|v| v.round() as i64);

    Ok(AirQualityReading {
        id: 0,
        timestamp: at,
        city: data.city.name.clone(),
        station_name: data.city.name,
        aqi,
        levels,
        raw_data: Some(body.to_string()),
    })
}

/// HTTP client for the AQICN city feed
pub struct AirQualityClient {
    http: reqwest::Client,
    config: AirQualityConfig,
    validator: Validator,
}

impl AirQualityClient {
    pub fn new(config: AirQualityConfig) -> Result<Self, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!("Air quality client for {} via {}", config.city, config.base_url);
        Ok(Self {
            http,
            config,
            validator: Validator::default(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/feed/{}/",
            self.config.base_url.trim_end_matches('/'),
            self.config.city
        )
    }

    /// Fetch and parse the current feed
    pub async fn fetch(&self, at: DateTime<Utc>) -> Result<AirQualityReading, IngestError> {
        let body = with_deadline(self.config.timeout_secs, async {
            let resp = self
                .http
                .get(self.url())
                .query(&[("token", self.config.token.as_str())])
                .send()
                .await?;
            Ok::<_, IngestError>(check_response(resp).await?.text().await?)
        })
        .await?;

        let reading = parse_feed(&body, at, &self.validator)?;
        debug!("Air quality from {}: AQI {:?}", reading.station_name, reading.aqi);
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    const FEED: &str = r#"{
        "status": "ok",
        "data": {
            "aqi": 57,
            "idx": 5722,
            "city": { "name": "Paris", "geo": [48.856614, 2.3522219] },
            "iaqi": {
                "pm25": { "v": 57 },
                "pm10": { "v": 21.5 },
                "no2": { "v": 12.8 },
                "o3": { "v": 30.1 },
                "t": { "v": 18 }
            }
        }
    }"#;

    #[test]
    fn test_parse_feed() {
        let reading = parse_feed(FEED, at(), &Validator::default()).unwrap();
        assert_eq!(reading.city, "Paris");
        assert_eq!(reading.station_name, "Paris");
        assert_eq!(reading.aqi, Some(57));
        assert_eq!(reading.levels.pm25, Some(57.0));
        assert_eq!(reading.levels.pm10, Some(21.5));
        assert_eq!(reading.levels.so2, None);
        assert_eq!(reading.levels.nh3, None);
        assert_eq!(reading.timestamp, at());
        assert_eq!(reading.raw_data.as_deref(), Some(FEED));
    }

    #[test]
    fn test_dash_aqi_is_absent() {
        let body = r#"{"status":"ok","data":{"aqi":"-","city":{"name":"Paris"},"iaqi":{}}}"#;
        let reading = parse_feed(body, at(), &Validator::default()).unwrap();
        assert_eq!(reading.aqi, None);
        assert!(reading.levels.is_empty());
    }

    #[test]
    fn test_error_status() {
        let body = r#"{"status":"error","data":"Invalid key"}"#;
        match parse_feed(body, at(), &Validator::default()) {
            Err(IngestError::Upstream(reason)) => assert_eq!(reason, "Invalid key"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            parse_feed("<html>", at(), &Validator::default()),
            Err(IngestError::Parse(_))
        ));
        let missing_city = r#"{"status":"ok","data":{"aqi":10}}"#;
        assert!(matches!(
            parse_feed(missing_city, at(), &Validator::default()),
            Err(IngestError::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_value_dropped() {
        let body = r#"{"status":"ok","data":{"aqi":42,"city":{"name":"Paris"},"iaqi":{"pm25":{"v":-3}}}}"#;
        let reading = parse_feed(body, at(), &Validator::default()).unwrap();
        assert_eq!(reading.levels.pm25, None);
        assert_eq!(reading.aqi, Some(42));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let client = AirQualityClient::new(AirQualityConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        assert!(client.fetch(at()).await.is_err());
    }
}
