mod settings;

pub use settings::{CacheConfig, DEFAULT_CACHE_TTL_SECS, OneBotConfig, Settings, load_settings};
