pub mod anomaly;
pub mod catalog;
pub mod chat;
pub mod history;
pub mod input;
pub mod prediction;
pub mod recommendation;
pub mod weather;

pub use anomaly::*;
pub use chat::*;
pub use history::*;
pub use input::*;
pub use prediction::*;
pub use recommendation::*;
pub use weather::*;
