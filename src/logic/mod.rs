pub mod anomalies;
pub mod calculations;
pub mod collaborators;
pub mod export;
pub mod history;
pub mod rules;
pub mod thresholds;

pub use anomalies::{detect_anomalies, AnomalyDetector};
pub use collaborators::{Collaborators, ServiceEvent};
pub use history::HistoryLog;
pub use rules::{generate_recommendations, RulesEngine};
