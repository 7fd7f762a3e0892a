pub mod common;
pub mod market_data;

pub use common::AlpacaBar;
pub use market_data::{AlpacaPriceProvider, AlpacaPriceProviderBuilder};
