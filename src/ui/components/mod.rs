pub mod gauge;
pub mod input;

pub use gauge::{confidence_gauge, factor_gauge, yield_gauge, GaugeWidget};
pub use input::{InputWidget, SelectWidget};
