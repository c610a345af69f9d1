pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod structs;
pub mod transform;

// Re-export public API
pub use classify::classify;
pub use config::{Config, ProviderConfig, load_config, resolve_provider};
pub use error::{OutreachError, Result};
pub use extract::{ForecastSource, OpenWeatherMap, load_observations};
pub use load::{render, write_csv, write_json, write_text};
pub use structs::{
    Condition, DayOutreach, DaySummary, ForecastResult, ObservationRecord, OutputFormat,
    OutreachMethod, SimpleLogger, TemperatureUnit, WeatherLabel,
};
pub use transform::aggregate;
