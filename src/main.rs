use clap::Parser;
use lib::{
    ForecastSource, OutputFormat, OutreachError, SimpleLogger, TemperatureUnit, aggregate,
    load_config, load_observations, render, resolve_provider,
};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file with a [provider] section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Provider API key (overrides the config file)
    #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// City query for the provider, e.g. "Minneapolis,us" (overrides the config file)
    #[arg(long)]
    city: Option<String>,

    /// Temperature unit requested from the provider (overrides the config file)
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Saved forecast to replay instead of calling the provider (.json payload or .csv snapshot)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), OutreachError> {
    let total_start = Instant::now();
    log::set_logger(&LOGGER)?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    // Pick the forecast source
    let source = match &args.input {
        Some(path) => {
            debug!("Replaying saved forecast: {}", path.display());
            ForecastSource::from_path(path)
        }
        None => {
            let file_config = match &args.config {
                Some(path) => {
                    debug!("Loading configuration: {}", path.display());
                    Some(load_config(path)?)
                }
                None => None,
            };
            let provider =
                resolve_provider(file_config, args.api_key.clone(), args.city.clone(), args.unit)?;
            debug!(
                "Provider: {} | City: {} | Unit: {:?}",
                provider.base_url, provider.city, provider.units
            );
            ForecastSource::Api(provider)
        }
    };

    let fetch_start = Instant::now();
    let records = load_observations(&source)?;
    debug!("Retrieval took {:.2?}", fetch_start.elapsed());

    let transform_start = Instant::now();
    let result = aggregate(&records)?;
    info!(
        "Planned outreach for {} days in {:.2?}",
        result.len(),
        transform_start.elapsed()
    );

    match &args.output {
        Some(path) => {
            render(&result, args.format, BufWriter::new(File::create(path)?))?;
            info!("Wrote forecast to {}", path.display());
        }
        None => render(&result, args.format, io::stdout().lock())?,
    }

    debug!("Total runtime: {:.2?}", total_start.elapsed());
    Ok(())
}
