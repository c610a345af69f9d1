use crate::config::ProviderConfig;
use crate::error::{OutreachError, Result};
use crate::structs::{Condition, ObservationRecord};
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ureq::Agent;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Deserialize)]
struct ForecastPayload {
    list: Vec<ForecastEntry>,
}

#[derive(Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    main: MainValues,
    weather: Vec<WeatherValues>,
}

#[derive(Deserialize)]
struct MainValues {
    temp: f64,
}

#[derive(Deserialize)]
struct WeatherValues {
    main: String,
}

#[derive(Deserialize)]
struct SnapshotRow {
    dt_txt: String,
    temp: f64,
    condition: String,
}

/// Where the observations for a run come from
#[derive(Debug, Clone)]
pub enum ForecastSource {
    Api(ProviderConfig),
    JsonFile(PathBuf),
    CsvFile(PathBuf),
}

impl ForecastSource {
    /// Picks a snapshot source from the file extension; anything not `.csv`
    /// is read as a provider JSON payload.
    pub fn from_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            ForecastSource::CsvFile(path.to_path_buf())
        } else {
            ForecastSource::JsonFile(path.to_path_buf())
        }
    }
}

/// Loads and decodes all observations of a forecast source.
///
/// # Errors
///
/// Returns the source's transport, I/O or decoding error. Decoding either
/// succeeds for every record or fails as a whole.
pub fn load_observations(source: &ForecastSource) -> Result<Vec<ObservationRecord>> {
    let records = match source {
        ForecastSource::Api(config) => OpenWeatherMap::new(config)?.fetch()?,
        ForecastSource::JsonFile(path) => {
            debug!("Reading forecast payload: {}", path.display());
            decode_payload(&fs::read_to_string(path)?)?
        }
        ForecastSource::CsvFile(path) => {
            debug!("Reading forecast snapshot: {}", path.display());
            read_snapshot(File::open(path)?)?
        }
    };
    info!("Loaded {} observations", records.len());
    Ok(records)
}

/// Client for the OpenWeatherMap 5 day / 3 hour forecast
pub struct OpenWeatherMap {
    agent: Agent,
    config: ProviderConfig,
}

impl OpenWeatherMap {
    /// Returns a client ready for fetching forecasts for the configured city
    ///
    /// # Arguments
    ///
    /// * `config` - provider settings; validated here
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let agent = agent_config.into();

        Ok(Self {
            agent,
            config: config.clone(),
        })
    }

    /// Requests the forecast and decodes it into observations.
    ///
    /// Failures are returned as-is; no retry is attempted.
    pub fn fetch(&self) -> Result<Vec<ObservationRecord>> {
        info!(
            "Requesting {} forecast for {}",
            self.config.units.as_query(),
            self.config.city
        );

        let json = self
            .agent
            .get(self.config.base_url.as_str())
            .query("q", &self.config.city)
            .query("appid", &self.config.api_key)
            .query("units", self.config.units.as_query())
            .call()?
            .body_mut()
            .read_to_string()?;

        debug!("Received {} bytes", json.len());
        decode_payload(&json)
    }
}

/// Decodes a provider forecast payload.
///
/// Each entry of the top-level `list` must carry a `dt_txt` timestamp, a
/// `main.temp` reading and at least one `weather` group; the first group's
/// `main` label is used as the condition.
///
/// # Errors
///
/// Returns `OutreachError::Json` if the document does not have that shape and
/// `OutreachError::MalformedInput` for an unparseable timestamp, a non-finite
/// temperature or an entry without weather groups.
pub fn decode_payload(json: &str) -> Result<Vec<ObservationRecord>> {
    let payload: ForecastPayload = serde_json::from_str(json)?;

    payload
        .list
        .into_iter()
        .enumerate()
        .map(|(i, entry)| -> Result<ObservationRecord> {
            let timestamp = parse_timestamp(&entry.dt_txt).map_err(|e| {
                OutreachError::MalformedInput(format!(
                    "entry {}: bad timestamp {:?}: {}",
                    i, entry.dt_txt, e
                ))
            })?;
            if !entry.main.temp.is_finite() {
                return Err(OutreachError::MalformedInput(format!(
                    "entry {}: non-finite temperature",
                    i
                )));
            }
            let label = entry.weather.first().ok_or_else(|| {
                OutreachError::MalformedInput(format!("entry {}: no weather condition", i))
            })?;
            Ok(ObservationRecord::new(
                timestamp,
                entry.main.temp,
                Condition::from(label.main.as_str()),
            ))
        })
        .collect()
}

/// Reads a CSV snapshot with a `dt_txt,temp,condition` header.
///
/// # Errors
///
/// Returns `OutreachError::Csv` for rows that do not match the header and
/// `OutreachError::MalformedInput` for an unparseable timestamp or a `NaN` /
/// `inf` temperature.
pub fn read_snapshot<R: Read>(reader: R) -> Result<Vec<ObservationRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (i, row) in rdr.deserialize::<SnapshotRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.dt_txt).map_err(|e| {
            OutreachError::MalformedInput(format!(
                "row {}: bad timestamp {:?}: {}",
                i + 1,
                row.dt_txt,
                e
            ))
        })?;
        if !row.temp.is_finite() {
            return Err(OutreachError::MalformedInput(format!(
                "row {}: non-finite temperature",
                i + 1
            )));
        }
        records.push(ObservationRecord::new(
            timestamp,
            row.temp,
            Condition::from(row.condition.as_str()),
        ));
    }

    Ok(records)
}

/// Parses a provider timestamp such as `2019-10-25 18:00:00`.
fn parse_timestamp(raw: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT)
}
