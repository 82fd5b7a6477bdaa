//! Background calls to the prediction, chat and weather services.
//!
//! Each request runs on its own tokio task and reports back through a single
//! channel, so the UI loop keeps drawing while a call is in flight.

use crate::config::Config;
use crate::datasources::{ChatClient, OpenWeatherMapClient, PredictionClient};
use crate::error::Result;
use crate::models::{ChatMessage, Location, PredictionInput, PredictionResult, WeatherSnapshot};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Completion of a background request.
#[derive(Debug)]
pub enum ServiceEvent {
    Prediction {
        ticket: u64,
        input: PredictionInput,
        outcome: Result<PredictionResult>,
    },
    ChatReply(Result<String>),
    LocationResolved {
        ticket: u64,
        location: Location,
    },
    Weather {
        ticket: u64,
        location: Location,
        outcome: Result<WeatherSnapshot>,
    },
    SearchResults(Result<Vec<Location>>),
}

pub struct Collaborators {
    predictor: Arc<PredictionClient>,
    chat: Option<Arc<ChatClient>>,
    weather: Option<Arc<OpenWeatherMapClient>>,
    events: mpsc::UnboundedSender<ServiceEvent>,
}

impl Collaborators {
    pub fn new(config: &Config) -> Result<(Self, mpsc::UnboundedReceiver<ServiceEvent>)> {
        let predictor = Arc::new(PredictionClient::new(config.predictor.clone())?);

        let chat = if config.chat.enabled {
            Some(Arc::new(ChatClient::new(config.chat.clone())?))
        } else {
            tracing::info!("Chat assistant disabled in config");
            None
        };

        let weather = config
            .weather()
            .filter(|c| !c.api_key.is_empty())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured");
                Arc::new(OpenWeatherMapClient::new(c.clone()))
            });

        if weather.is_none() {
            tracing::info!("OpenWeatherMap not configured - weather-based advice will be limited");
        }

        let (events, receiver) = mpsc::unbounded_channel();

        Ok((
            Self {
                predictor,
                chat,
                weather,
                events,
            },
            receiver,
        ))
    }

    pub fn chat_enabled(&self) -> bool {
        self.chat.is_some()
    }

    pub fn weather_enabled(&self) -> bool {
        self.weather.is_some()
    }

    pub fn request_prediction(&self, ticket: u64, input: PredictionInput) {
        let predictor = Arc::clone(&self.predictor);
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = predictor.predict(&input).await;
            send(
                &events,
                ServiceEvent::Prediction {
                    ticket,
                    input,
                    outcome,
                },
            );
        });
    }

    /// Returns false when chat is disabled.
    pub fn request_chat(&self, message: String, history: Vec<ChatMessage>) -> bool {
        let Some(chat) = self.chat.as_ref().map(Arc::clone) else {
            return false;
        };
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = chat.ask(&message, &history).await;
            send(&events, ServiceEvent::ChatReply(outcome));
        });
        true
    }

    /// Resolve the configured coordinates, then fetch weather there.
    pub fn request_configured_location(&self, ticket: u64) -> bool {
        let Some(weather) = self.weather.as_ref().map(Arc::clone) else {
            return false;
        };
        let events = self.events.clone();

        tokio::spawn(async move {
            let location = weather.configured_location().await;
            send(
                &events,
                ServiceEvent::LocationResolved {
                    ticket,
                    location: location.clone(),
                },
            );

            let outcome = weather
                .current_weather(location.latitude, location.longitude)
                .await;
            send(
                &events,
                ServiceEvent::Weather {
                    ticket,
                    location,
                    outcome,
                },
            );
        });
        true
    }

    pub fn request_weather(&self, ticket: u64, location: Location) -> bool {
        let Some(weather) = self.weather.as_ref().map(Arc::clone) else {
            return false;
        };
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = weather
                .current_weather(location.latitude, location.longitude)
                .await;
            send(
                &events,
                ServiceEvent::Weather {
                    ticket,
                    location,
                    outcome,
                },
            );
        });
        true
    }

    pub fn request_search(&self, query: String) -> bool {
        let Some(weather) = self.weather.as_ref().map(Arc::clone) else {
            return false;
        };
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = weather.search_locations(&query).await;
            send(&events, ServiceEvent::SearchResults(outcome));
        });
        true
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let predictor = self.predictor.test_connection().await.unwrap_or(false);

        let chat = match &self.chat {
            Some(client) => Some(client.test_connection().await.unwrap_or(false)),
            None => None,
        };

        let weather = match &self.weather {
            Some(client) => Some(client.test_connection().await.unwrap_or(false)),
            None => None,
        };

        ConnectionStatus {
            predictor,
            chat,
            weather,
        }
    }
}

fn send(events: &mpsc::UnboundedSender<ServiceEvent>, event: ServiceEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Event receiver dropped, discarding service result");
    }
}

/// Reachability of each collaborator; `None` means not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub predictor: bool,
    pub chat: Option<bool>,
    pub weather: Option<bool>,
}

impl ConnectionStatus {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("Predictor: {}", label(Some(self.predictor)))];
        parts.push(format!("Chat: {}", label(self.chat)));
        parts.push(format!("Weather: {}", label(self.weather)));
        parts.join(" | ")
    }
}

fn label(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "OK",
        Some(false) => "OFFLINE",
        None => "OFF",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_summary_marks_unconfigured_services() {
        let status = ConnectionStatus {
            predictor: true,
            chat: Some(false),
            weather: None,
        };
        assert_eq!(
            status.summary(),
            "Predictor: OK | Chat: OFFLINE | Weather: OFF"
        );
    }

    #[tokio::test]
    async fn disabled_services_refuse_requests() {
        let mut config = Config::default();
        config.chat.enabled = false;
        config.openweathermap = None;

        let (collaborators, _events) = Collaborators::new(&config).unwrap();
        assert!(!collaborators.chat_enabled());
        assert!(!collaborators.weather_enabled());
        assert!(!collaborators.request_chat("hi".into(), Vec::new()));
        assert!(!collaborators.request_search("Pune".into()));
        assert!(!collaborators.request_configured_location(1));
        assert!(!collaborators.request_weather(
            1,
            Location {
                latitude: 0.0,
                longitude: 0.0,
                name: "Null Island".into(),
                country: String::new(),
            }
        ));
    }
}
