use crate::error::Result;
use crate::structs::{ForecastResult, OutputFormat, OutreachMethod, WeatherLabel};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

/// One rendered day of the forecast
#[derive(Debug, Serialize)]
struct ForecastRow {
    date: String,
    avg_temp: i64,
    samples: u32,
    weather: WeatherLabel,
    outreach: OutreachMethod,
}

fn rows(result: &ForecastResult) -> Vec<ForecastRow> {
    result
        .iter()
        .map(|entry| ForecastRow {
            date: entry.summary.date_key(),
            avg_temp: entry.summary.average_temperature(),
            samples: entry.summary.sample_count,
            weather: entry.summary.weather(),
            outreach: entry.method,
        })
        .collect()
}

/// Writes one `YYYY-MM-DD, Method` line per day in chronological order.
pub fn write_text<W: Write>(result: &ForecastResult, mut out: W) -> Result<()> {
    for (day, method) in result.methods() {
        writeln!(out, "{}, {}", day, method)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the forecast as CSV with the day's inputs next to the decision.
///
/// # Errors
/// Returns error if the writer fails.
pub fn write_csv<W: Write>(result: &ForecastResult, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);

    writer.write_record(["Date", "Avg_Temp", "Samples", "Weather", "Outreach"])?;

    for row in rows(result) {
        writer.write_record(&[
            row.date,
            row.avg_temp.to_string(),
            row.samples.to_string(),
            row.weather.to_string(),
            row.outreach.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the forecast as a pretty-formatted JSON array.
///
/// # Errors
/// Returns error if serialization or the writer fails.
pub fn write_json<W: Write>(result: &ForecastResult, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, &rows(result))?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Renders the forecast in the requested format.
pub fn render<W: Write>(result: &ForecastResult, format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(result, out),
        OutputFormat::Csv => write_csv(result, out),
        OutputFormat::Json => write_json(result, out),
    }
}
