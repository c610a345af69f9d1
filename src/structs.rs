use crate::error::{OutreachError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Simple logger implementation
///
/// Writes to stderr so that rendered forecasts on stdout stay clean.
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Sky condition as reported by the forecast provider.
///
/// Only `Rain` and `Clear` influence the outreach decision; every other
/// provider group is kept for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Clear,
    Rain,
    Clouds,
    Other(String),
}

impl FromStr for Condition {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Clear" => Condition::Clear,
            "Rain" => Condition::Rain,
            "Clouds" => Condition::Clouds,
            other => Condition::Other(other.to_string()),
        })
    }
}

impl From<&str> for Condition {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(condition) => condition,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Clear => write!(f, "Clear"),
            Condition::Rain => write!(f, "Rain"),
            Condition::Clouds => write!(f, "Clouds"),
            Condition::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One forecast reading for a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub condition: Condition,
}

impl ObservationRecord {
    pub fn new(timestamp: NaiveDateTime, temperature: f64, condition: Condition) -> Self {
        Self {
            timestamp,
            temperature,
            condition,
        }
    }

    /// Calendar day of the reading, time of day discarded.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Weather outlook derived for a whole day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherLabel {
    Sunny,
    Rainy,
    #[serde(rename = "Not Sunny")]
    NotSunny,
}

impl fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherLabel::Sunny => write!(f, "Sunny"),
            WeatherLabel::Rainy => write!(f, "Rainy"),
            WeatherLabel::NotSunny => write!(f, "Not Sunny"),
        }
    }
}

/// Recommended channel for contacting prospective customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutreachMethod {
    #[serde(rename = "Text Message")]
    TextMessage,
    Email,
    #[serde(rename = "Phone Call")]
    PhoneCall,
    /// The day fell outside every rule of the decision table.
    Unknown,
}

impl fmt::Display for OutreachMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutreachMethod::TextMessage => write!(f, "Text Message"),
            OutreachMethod::Email => write!(f, "Email"),
            OutreachMethod::PhoneCall => write!(f, "Phone Call"),
            OutreachMethod::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Accumulated statistics for every observation of one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub temperature_sum: i64,
    pub sample_count: u32,
    pub saw_rain: bool,
    pub saw_clear: bool,
}

impl DaySummary {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            temperature_sum: 0,
            sample_count: 0,
            saw_rain: false,
            saw_clear: false,
        }
    }

    /// Adds one reading. The temperature is truncated toward zero before it
    /// is summed, the same way the provider value was historically read.
    ///
    /// # Errors
    ///
    /// Returns `OutreachError::MalformedInput` for a NaN or infinite reading,
    /// or when the running sum no longer fits in an `i64`. The summary is left
    /// unchanged in that case.
    pub fn add(&mut self, record: &ObservationRecord) -> Result<()> {
        if !record.temperature.is_finite() {
            return Err(OutreachError::MalformedInput(format!(
                "non-finite temperature at {}",
                record.timestamp
            )));
        }
        self.temperature_sum = self
            .temperature_sum
            .checked_add(record.temperature.trunc() as i64)
            .ok_or_else(|| {
                OutreachError::MalformedInput(format!(
                    "temperature sum out of range on {}",
                    self.date_key()
                ))
            })?;
        self.sample_count += 1;
        match record.condition {
            Condition::Rain => self.saw_rain = true,
            Condition::Clear => self.saw_clear = true,
            _ => {}
        }
        Ok(())
    }

    /// Truncating integer average, never rounded.
    pub fn average_temperature(&self) -> i64 {
        self.temperature_sum / i64::from(self.sample_count.max(1))
    }

    /// Clear readings win over rain readings on the same day.
    pub fn weather(&self) -> WeatherLabel {
        if self.saw_clear {
            WeatherLabel::Sunny
        } else if self.saw_rain {
            WeatherLabel::Rainy
        } else {
            WeatherLabel::NotSunny
        }
    }

    /// Day key in `YYYY-MM-DD` form
    pub fn date_key(&self) -> String {
        self.day.format(DATE_KEY_FORMAT).to_string()
    }
}

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A day's summary together with the outreach decision taken for it
#[derive(Debug, Clone, PartialEq)]
pub struct DayOutreach {
    pub summary: DaySummary,
    pub method: OutreachMethod,
}

/// Outreach decisions keyed by calendar day, in chronological order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastResult {
    entries: Vec<DayOutreach>,
}

impl ForecastResult {
    pub fn new(entries: Vec<DayOutreach>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, day: NaiveDate) -> Option<&DayOutreach> {
        self.entries.iter().find(|e| e.summary.day == day)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayOutreach> {
        self.entries.iter()
    }

    /// `(YYYY-MM-DD, method)` pairs in chronological order
    pub fn methods(&self) -> impl Iterator<Item = (String, OutreachMethod)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.summary.date_key(), e.method))
    }
}

/// Temperature unit requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    #[serde(alias = "imperial")]
    Fahrenheit,
    #[serde(alias = "metric")]
    Celsius,
    #[serde(alias = "standard")]
    Kelvin,
}

impl TemperatureUnit {
    /// Value of the provider's `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            TemperatureUnit::Fahrenheit => "imperial",
            TemperatureUnit::Celsius => "metric",
            TemperatureUnit::Kelvin => "standard",
        }
    }
}

/// Rendering used for the forecast output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_condition_parses_by_value() {
        let owned = String::from("Rain");
        assert_eq!(Condition::from(owned.as_str()), Condition::Rain);
        assert_eq!(Condition::from("Clear"), Condition::Clear);
        assert_eq!(Condition::from("Snow"), Condition::Other("Snow".to_string()));
        // The provider never says "Rainy"; it must not count as rain.
        assert_eq!(Condition::from("Rainy"), Condition::Other("Rainy".to_string()));
    }

    #[test]
    fn test_day_ignores_time_of_day() {
        let early = ObservationRecord::new(at("2019-10-25", "00:00:00"), 50.0, Condition::Clouds);
        let late = ObservationRecord::new(at("2019-10-25", "21:00:00"), 50.0, Condition::Clouds);
        assert_eq!(early.day(), late.day());
    }

    #[test]
    fn test_summary_truncates_readings_and_average() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 25).unwrap();
        let mut summary = DaySummary::new(day);
        summary.add(&ObservationRecord::new(at("2019-10-25", "00:00:00"), 70.9, Condition::Clouds)).unwrap();
        summary.add(&ObservationRecord::new(at("2019-10-25", "03:00:00"), 71.2, Condition::Clouds)).unwrap();
        assert_eq!(summary.temperature_sum, 141);
        assert_eq!(summary.average_temperature(), 70);
        assert_eq!(summary.date_key(), "2019-10-25");
    }

    #[test]
    fn test_summary_rejects_non_finite_readings() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 25).unwrap();
        let mut summary = DaySummary::new(day);
        summary.add(&ObservationRecord::new(at("2019-10-25", "00:00:00"), 120.0, Condition::Clouds)).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = summary
                .add(&ObservationRecord::new(at("2019-10-25", "03:00:00"), bad, Condition::Clouds))
                .unwrap_err();
            assert!(matches!(err, OutreachError::MalformedInput(_)));
        }
        assert_eq!(summary.sample_count, 1);
        assert_eq!(summary.temperature_sum, 120);
    }

    #[test]
    fn test_summary_sum_overflow_is_an_error() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 25).unwrap();
        let mut summary = DaySummary::new(day);
        // Finite but far past i64; the cast saturates to i64::MAX.
        summary.add(&ObservationRecord::new(at("2019-10-25", "00:00:00"), 1e300, Condition::Clouds)).unwrap();
        let err = summary
            .add(&ObservationRecord::new(at("2019-10-25", "03:00:00"), 1e300, Condition::Clouds))
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert_eq!(summary.sample_count, 1);
    }

    #[test]
    fn test_weather_label_prefers_clear() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 25).unwrap();
        let mut summary = DaySummary::new(day);
        assert_eq!(summary.weather(), WeatherLabel::NotSunny);
        summary.saw_rain = true;
        assert_eq!(summary.weather(), WeatherLabel::Rainy);
        summary.saw_clear = true;
        assert_eq!(summary.weather(), WeatherLabel::Sunny);
    }

    #[test]
    fn test_labels_display() {
        assert_eq!(OutreachMethod::TextMessage.to_string(), "Text Message");
        assert_eq!(OutreachMethod::PhoneCall.to_string(), "Phone Call");
        assert_eq!(WeatherLabel::NotSunny.to_string(), "Not Sunny");
        assert_eq!(TemperatureUnit::Fahrenheit.as_query(), "imperial");
    }
}
