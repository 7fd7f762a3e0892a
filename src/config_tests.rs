use crate::config::{Config, ProviderKind};
use chrono::NaiveDate;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: &[&str] = &[
    "PRICE_PROVIDER",
    "ALPACA_API_KEY",
    "ALPACA_FEED",
    "PRICE_CSV_PATH",
    "HTTP_TIMEOUT_SECS",
    "FEATURE_LONG_WINDOW",
    "FEATURE_SHORT_WINDOW",
    "MODEL_L2_ALPHA",
    "MODEL_MIN_ROWS",
    "MODEL_MIN_FEATURE_COVERAGE",
    "DEFAULT_START_DATE",
    "DEFAULT_END_DATE",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: callers hold ENV_LOCK, so no other test touches the environment
        unsafe { env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    // SAFETY: callers hold ENV_LOCK
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.provider.kind, ProviderKind::Mock);
    assert_eq!(config.provider.alpaca_feed, "iex");
    assert!(config.provider.csv_path.is_none());
    assert_eq!(config.model.short_window, 5);
    assert_eq!(config.model.long_window, 21);
    assert_eq!(config.model.min_rows, 2);
    assert!((config.model.min_feature_coverage - 0.9).abs() < f64::EPSILON);
    assert!((config.model.l2_alpha - 1.0).abs() < f64::EPSILON);
    assert_eq!(
        config.default_start_date,
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    );
    assert_eq!(
        config.default_end_date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    set("PRICE_PROVIDER", "Alpaca+Marketstack");
    set("ALPACA_API_KEY", "key");
    set("FEATURE_LONG_WINDOW", "10");
    set("MODEL_L2_ALPHA", "0.5");
    set("HTTP_TIMEOUT_SECS", "5");
    set("MODEL_MIN_FEATURE_COVERAGE", "0.75");

    let config = Config::from_env().unwrap();

    assert_eq!(config.provider.kind, ProviderKind::AlpacaWithMarketstack);
    assert_eq!(config.provider.alpaca_api_key, "key");
    assert_eq!(config.provider.http.timeout.as_secs(), 5);

    let service = config.model.service_config();
    assert_eq!(service.features.long_window, 10);
    assert!((service.trainer.l2_alpha - 0.5).abs() < f64::EPSILON);
    assert!((service.min_coverage - 0.75).abs() < f64::EPSILON);

    clear_env();
}

#[test]
fn test_config_rejects_invalid_values() {
    let _guard = get_env_lock().lock().unwrap();

    clear_env();
    set("PRICE_PROVIDER", "yahoo");
    assert!(Config::from_env().is_err());

    clear_env();
    set("FEATURE_SHORT_WINDOW", "abc");
    assert!(Config::from_env().is_err());

    clear_env();
    set("FEATURE_SHORT_WINDOW", "1");
    assert!(Config::from_env().is_err());

    clear_env();
    set("MODEL_MIN_FEATURE_COVERAGE", "1.5");
    assert!(Config::from_env().is_err());

    clear_env();
    set("DEFAULT_START_DATE", "2024-06-01");
    set("DEFAULT_END_DATE", "2024-01-01");
    assert!(Config::from_env().is_err());

    clear_env();
}
