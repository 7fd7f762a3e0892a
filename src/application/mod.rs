// Per-ticker feature computation
pub mod feature_engineering_service;

// Price normalization and rolling statistics
pub mod market_data;

// Training, model cache and prediction
pub mod ml;
