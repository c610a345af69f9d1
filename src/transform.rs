use crate::classify::classify;
use crate::error::{OutreachError, Result};
use crate::structs::{DayOutreach, DaySummary, ForecastResult, ObservationRecord, OutreachMethod};
use log::{debug, warn};
use rayon::prelude::*;

/// Groups an ordered forecast into calendar days and decides an outreach
/// method for each day.
///
/// The records are split into runs sharing the same calendar day, each run is
/// folded into a `DaySummary` and every summary is classified independently
/// (in parallel). The resulting entries keep the chronological order in which
/// each day first appears.
///
/// # Arguments
///
/// * `records` - Observations sorted by timestamp, non-decreasing
///
/// # Returns
///
/// Returns a `ForecastResult` with exactly one entry per distinct calendar day.
///
/// # Errors
///
/// Returns `OutreachError::MalformedInput` if:
/// - `records` is empty
/// - any timestamp is earlier than the one before it
/// - a temperature is NaN or infinite, or a day's sum leaves the `i64` range
///
/// No partial result is produced in either case. A day that falls outside the
/// decision table is not an error; it is reported as `OutreachMethod::Unknown`.
pub fn aggregate(records: &[ObservationRecord]) -> Result<ForecastResult> {
    validate_order(records)?;

    let partitions: Vec<&[ObservationRecord]> = partition_by_day(records);
    debug!(
        "Grouped {} observations into {} days",
        records.len(),
        partitions.len()
    );

    let entries: Vec<DayOutreach> = partitions
        .into_par_iter()
        .map(|partition| summarize_day(partition).map(decide))
        .collect::<Result<Vec<DayOutreach>>>()?;

    Ok(ForecastResult::new(entries))
}

/// Rejects empty or out-of-order input.
fn validate_order(records: &[ObservationRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(OutreachError::MalformedInput(
            "observation sequence is empty".to_string(),
        ));
    }

    if let Some(index) = records
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(OutreachError::MalformedInput(format!(
            "observations out of order at index {}: {} follows {}",
            index + 1,
            records[index + 1].timestamp,
            records[index].timestamp
        )));
    }

    Ok(())
}

/// Splits sorted records into maximal runs of the same calendar day.
///
/// Two records share a day when their date components are equal, whatever
/// their time of day.
fn partition_by_day(records: &[ObservationRecord]) -> Vec<&[ObservationRecord]> {
    records.chunk_by(|a, b| a.day() == b.day()).collect()
}

/// Folds all of one day's observations into a summary.
///
/// `partition` comes from `partition_by_day` and is never empty.
fn summarize_day(partition: &[ObservationRecord]) -> Result<DaySummary> {
    let day = partition[0].day();
    partition
        .iter()
        .try_fold(DaySummary::new(day), |mut summary, record| {
            summary.add(record)?;
            Ok(summary)
        })
}

/// Classifies a finished day and logs anomalies.
fn decide(summary: DaySummary) -> DayOutreach {
    let average = summary.average_temperature();
    let weather = summary.weather();
    let method = classify(average, weather);

    if method == OutreachMethod::Unknown {
        warn!(
            "No outreach rule matched {}: avg={} weather={}",
            summary.date_key(),
            average,
            weather
        );
    } else {
        debug!(
            "{}: {} samples avg={} weather={} -> {}",
            summary.date_key(),
            summary.sample_count,
            average,
            weather,
            method
        );
    }

    DayOutreach { summary, method }
}
