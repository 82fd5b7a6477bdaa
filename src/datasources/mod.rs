pub mod chat;
pub mod openweathermap;
pub mod predictor;

pub use chat::ChatClient;
pub use openweathermap::OpenWeatherMapClient;
pub use predictor::PredictionClient;
