use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fare_engine::fares::{FareConfig, FareService, SelectionPolicy};
use fare_engine::feed::{load_feed, load_itinerary};

/// Price an itinerary against a GTFS fare feed.
#[derive(Debug, Parser)]
#[command(name = "fare-engine")]
struct Args {
    /// Fare feed JSON (fare_attributes and fare_rules)
    feed: PathBuf,

    /// Itinerary JSON with the rides to price
    itinerary: PathBuf,

    /// Product choice when several match one group of rides
    #[arg(long, value_enum, default_value_t = SelectionPolicy::Cheapest)]
    selection: SelectionPolicy,

    /// Ignore fare transfer counts and transfer windows
    #[arg(long)]
    no_transfer_policy: bool,

    /// Longest itinerary accepted, in rides
    #[arg(long, default_value_t = FareConfig::default().max_rides)]
    max_rides: usize,
}

impl Args {
    fn config(&self) -> FareConfig {
        FareConfig::new(self.selection, !self.no_transfer_policy, self.max_rides)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load fare tables
    let feed = match load_feed(&args.feed) {
        Ok(feed) => feed,
        Err(e) => {
            error!("failed to load feed: {e}");
            return ExitCode::from(1);
        }
    };
    let service = FareService::from_report(feed.ingest(), args.config());
    info!(products = service.snapshot().len(), "fare table ready");

    // Load the itinerary to price
    let itinerary = match load_itinerary(&args.itinerary) {
        Ok(itinerary) => itinerary,
        Err(e) => {
            error!("failed to load itinerary: {e}");
            return ExitCode::from(1);
        }
    };

    match service.price(itinerary.rides()) {
        Ok(quote) => {
            println!("{} {}", quote.total, quote.currency);
            for group in &quote.groups {
                println!(
                    "  rides {}..{}: {} {} {}",
                    group.rides.start, group.rides.end, group.fare_id, group.price, group.currency
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("pricing failed: {e}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_library_config() {
        let args = Args::try_parse_from(["fare-engine", "feed.json", "trip.json"]).unwrap();
        assert_eq!(args.feed, PathBuf::from("feed.json"));
        assert_eq!(args.itinerary, PathBuf::from("trip.json"));
        assert_eq!(args.config(), FareConfig::default());
    }

    #[test]
    fn flags_reach_config() {
        let args = Args::try_parse_from([
            "fare-engine",
            "feed.json",
            "trip.json",
            "--selection",
            "most-specific",
            "--no-transfer-policy",
            "--max-rides",
            "8",
        ])
        .unwrap();
        assert_eq!(
            args.config(),
            FareConfig::new(SelectionPolicy::MostSpecific, false, 8)
        );
    }

    #[test]
    fn missing_itinerary_is_usage_error() {
        assert!(Args::try_parse_from(["fare-engine", "feed.json"]).is_err());
        let bad_selection = ["fare-engine", "a", "b", "--selection", "priciest"];
        assert!(Args::try_parse_from(bad_selection).is_err());
    }
}
