// Market data processing modules
pub mod price_normalizer;
pub mod statistical_features;

pub use price_normalizer::{
    PriceField, PriceNormalizer, canonicalize_ticker, canonicalize_tickers, split_wide_label,
};
