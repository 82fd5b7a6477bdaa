use crate::config::OpenWeatherMapConfig;
use crate::error::{CropCastError, Result};
use crate::models::{Location, WeatherSnapshot};
use serde::Deserialize;

const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
const SEARCH_LIMIT: u8 = 5;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    #[serde(default)]
    rain: Option<OwmRain>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmGeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The configured farm location, named via reverse geocoding when possible.
    pub async fn configured_location(&self) -> Location {
        let (lat, lon) = (self.config.latitude, self.config.longitude);
        match self.reverse_geocode(lat, lon).await {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocoding failed, using bare coordinates");
                Location {
                    latitude: lat,
                    longitude: lon,
                    name: format!("{:.2}, {:.2}", lat, lon),
                    country: String::new(),
                }
            }
        }
    }

    /// Current conditions in metric units.
    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        let body = self
            .get(
                &format!("{}/weather", WEATHER_BASE_URL),
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        parse_current_weather(&body)
    }

    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Location> {
        let body = self
            .get(
                &format!("{}/reverse", GEO_BASE_URL),
                &[
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        parse_geocode(&body)?
            .into_iter()
            .next()
            .map(|location| Location {
                latitude,
                longitude,
                ..location
            })
            .ok_or_else(|| CropCastError::NotFound("Location not found".into()))
    }

    pub async fn search_locations(&self, query: &str) -> Result<Vec<Location>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .get(
                &format!("{}/direct", GEO_BASE_URL),
                &[
                    ("q", query.to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;

        let locations = parse_geocode(&body)?;
        tracing::debug!(query, results = locations.len(), "Location search complete");
        Ok(locations)
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.url(
            &format!("{}/weather", WEATHER_BASE_URL),
            &[
                ("lat", self.config.latitude.to_string()),
                ("lon", self.config.longitude.to_string()),
            ],
        )?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CropCastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        Ok(response.status().is_success())
    }

    fn url(&self, base: &str, params: &[(&str, String)]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(base)
            .map_err(|e| CropCastError::Config(format!("Invalid OpenWeatherMap URL: {}", e)))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("appid", &self.config.api_key);
        Ok(url)
    }

    async fn get(&self, base: &str, params: &[(&str, String)]) -> Result<String> {
        let url = self.url(base, params)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CropCastError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropCastError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        Ok(response.text().await?)
    }
}

fn parse_current_weather(body: &str) -> Result<WeatherSnapshot> {
    let owm: OwmCurrentResponse = serde_json::from_str(body).map_err(|e| {
        CropCastError::DataSourceUnavailable(format!(
            "Failed to parse OpenWeatherMap response: {}",
            e
        ))
    })?;

    let humidity = owm.main.humidity.clamp(0.0, 100.0).round() as u8;
    let rainfall = owm.rain.map(|r| r.one_hour).unwrap_or(0.0);
    let country = owm.sys.map(|s| s.country).unwrap_or_default();

    Ok(WeatherSnapshot::new(owm.main.temp.round(), humidity, rainfall).at(owm.name, country))
}

fn parse_geocode(body: &str) -> Result<Vec<Location>> {
    let entries: Vec<OwmGeoEntry> = serde_json::from_str(body).map_err(|e| {
        CropCastError::DataSourceUnavailable(format!(
            "Failed to parse OpenWeatherMap geocoding response: {}",
            e
        ))
    })?;

    Ok(entries
        .into_iter()
        .map(|e| Location {
            latitude: e.lat,
            longitude: e.lon,
            name: e.name,
            country: e.country,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather() {
        let body = r#"{
            "main": {"temp": 27.6, "feels_like": 29.1, "humidity": 83},
            "rain": {"1h": 1.25},
            "name": "Pune",
            "sys": {"country": "IN"}
        }"#;
        let weather = parse_current_weather(body).unwrap();
        assert_eq!(weather.temperature, 28.0);
        assert_eq!(weather.humidity, 83);
        assert_eq!(weather.rainfall, 1.25);
        assert_eq!(weather.location, "Pune");
        assert_eq!(weather.country, "IN");
    }

    #[test]
    fn missing_rain_means_zero() {
        let body = r#"{"main": {"temp": 14.2, "humidity": 40}, "name": "Lima", "sys": {"country": "PE"}}"#;
        let weather = parse_current_weather(body).unwrap();
        assert_eq!(weather.rainfall, 0.0);
        assert_eq!(weather.temperature, 14.0);
    }

    #[test]
    fn malformed_weather_is_unavailable() {
        assert!(matches!(
            parse_current_weather(r#"{"cod": 401}"#),
            Err(CropCastError::DataSourceUnavailable(_))
        ));
    }

    #[test]
    fn parses_geocoding_results() {
        let body = r#"[
            {"name": "Nairobi", "lat": -1.28, "lon": 36.82, "country": "KE", "state": "Nairobi"},
            {"name": "Nairobi West", "lat": -1.31, "lon": 36.81, "country": "KE"}
        ]"#;
        let locations = parse_geocode(body).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].label(), "Nairobi, KE");
        assert_eq!(locations[1].latitude, -1.31);
    }

    #[test]
    fn empty_geocoding_result() {
        assert!(parse_geocode("[]").unwrap().is_empty());
    }
}
