pub mod alpaca;
pub mod core;
pub mod csv_provider;
pub mod factory;
pub mod fallback;
pub mod marketstack;
pub mod mock;

pub use factory::PriceProviderFactory;
pub use mock::MockPriceProvider;
