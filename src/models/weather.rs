use serde::{Deserialize, Serialize};

/// Current conditions at the chosen location, as handed to the recommendation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// °C, rounded to whole degrees
    pub temperature: f64,
    /// percent, 0-100
    pub humidity: u8,
    /// mm over the last hour
    pub rainfall: f64,
    pub location: String,
    pub country: String,
}

impl WeatherSnapshot {
    pub fn new(temperature: f64, humidity: u8, rainfall: f64) -> Self {
        Self {
            temperature,
            humidity: humidity.min(100),
            rainfall,
            location: String::new(),
            country: String::new(),
        }
    }

    pub fn at(mut self, location: impl Into<String>, country: impl Into<String>) -> Self {
        self.location = location.into();
        self.country = country.into();
        self
    }
}

/// A named place with coordinates, from geocoding or configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
}

impl Location {
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.2}, {:.2})",
            self.label(),
            self.latitude,
            self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_caps_humidity() {
        assert_eq!(WeatherSnapshot::new(20.0, 120, 0.0).humidity, 100);
    }

    #[test]
    fn location_label() {
        let loc = Location {
            latitude: 28.61,
            longitude: 77.21,
            name: "New Delhi".into(),
            country: "IN".into(),
        };
        assert_eq!(loc.label(), "New Delhi, IN");
        assert_eq!(loc.to_string(), "New Delhi, IN (28.61, 77.21)");
    }
}
