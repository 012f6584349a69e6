//! OpenWeather current-conditions adapter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use telemetry::{Metric, Validator, WeatherObservation};
use tracing::{debug, info};

use crate::{check_response, with_deadline, IngestError};

/// Weather feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    pub lat: f64,
    pub lon: f64,
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: String::new(),
            lat: 48.8566,
            lon: 2.3522,
            lang: "fr".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Main {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Clouds {
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Main,
    #[serde(default)]
    wind: Wind,
    #[serde(default)]
    clouds: Clouds,
    visibility: Option<f64>,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    name: String,
}

/// Parse an OpenWeather `data/2.5/weather` body
pub fn parse_weather(
    body: &str,
    at: DateTime<Utc>,
    validator: &Validator,
) -> Result<WeatherObservation, IngestError> {
    let current: CurrentWeather = serde_json::from_str(body)?;
    let condition = current.weather.into_iter().next();

    Ok(WeatherObservation {
        id: 0,
        timestamp: at,
        city: current.name,
        temperature: validator.check(Metric::Temperature, current.main.temp),
        feels_like: validator.check(Metric::Temperature, current.main.feels_like),
        temp_min: validator.check(Metric::Temperature, current.main.temp_min),
        temp_max: validator.check(Metric::Temperature, current.main.temp_max),
        humidity: validator.check(Metric::Humidity, current.main.humidity),
        pressure: validator.check(Metric::Pressure, current.main.pressure),
        wind_speed: validator.check(Metric::WindSpeed, current.wind.speed),
        wind_direction: current.wind.deg.filter(|d| d.is_finite()),
        clouds: current.clouds.all.filter(|c| c.is_finite()),
        visibility: current.visibility.filter(|v| v.is_finite()),
        weather_main: condition.as_ref().and_then(|c| c.main.clone()),
        weather_description: condition.and_then(|c| c.description),
        raw_data: Some(body.to_string()),
    })
}

/// HTTP client for OpenWeather current conditions
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
    validator: Validator,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!(
            "Weather client for ({}, {}) via {}",
            config.lat, config.lon, config.base_url
        );
        Ok(Self {
            http,
            config,
            validator: Validator::default(),
        })
    }

    /// Fetch and parse current conditions
    pub async fn fetch(&self, at: DateTime<Utc>) -> Result<WeatherObservation, IngestError> {
        let url = format!(
            "{}/data/2.5/weather",
            self.config.base_url.trim_end_matches('/')
        );
        let lat = self.config.lat.to_string();
        let lon = self.config.lon.to_string();

        let body = with_deadline(self.config.timeout_secs, async {
            let resp = self
                .http
                .get(&url)
                .query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("appid", self.config.api_key.as_str()),
                    ("units", "metric"),
                    ("lang", self.config.lang.as_str()),
                ])
                .send()
                .await?;
            Ok::<_, IngestError>(check_response(resp).await?.text().await?)
        })
        .await?;

        let obs = parse_weather(&body, at, &self.validator)?;
        debug!("Weather for {}: {:?} C", obs.city, obs.temperature);
        Ok(obs)
    }
}
