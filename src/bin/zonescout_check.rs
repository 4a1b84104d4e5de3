//! Connectivity check for the Google APIs used by zonescout.
//!
//! Usage:
//!   zonescout-check [path/to/zonescout.toml]

use zonescout::config::keys::{mask_key, AI_STUDIO_KEY, GROQ_API_KEY};
use zonescout::core::geocoding::GoogleGeocoder;
use zonescout::core::http::build_client;
use zonescout::core::places::GooglePlacesClient;
use zonescout::core::Geocoder;
use zonescout::utils::logger;
use zonescout::{ApiKeys, ScoutConfig};

const GEOCODE_PROBE: &str = "New York";
const PLACES_PROBE: &str = "Cafe in New York";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_cli_logger(false);

    let config_path = std::env::args().nth(1);
    let config = ScoutConfig::load(config_path.as_deref())?;
    let keys = ApiKeys::from_env();

    println!("--- 🔍 DIAGNOSTIC MODE ---");

    let google_key = match keys.google() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    println!("🔑 Key loaded: {}", mask_key(google_key));

    for name in keys.missing() {
        match name {
            GROQ_API_KEY => println!("⚠️ {} is not set: lead audits will fail", name),
            AI_STUDIO_KEY => println!("⚠️ {} is not set: map screenshots are disabled", name),
            _ => {}
        }
    }

    let client = build_client(config.request_timeout())?;
    let mut failures = 0;

    println!("\n1️⃣ Testing Geocoding API ('{}')...", GEOCODE_PROBE);
    let geocoder = GoogleGeocoder::from_config(client.clone(), &config, &keys)?;
    match geocoder.bbox_from_pincode(GEOCODE_PROBE).await {
        Ok(bbox) => println!("✅ Geocoding API is WORKING! ({})", bbox),
        Err(e) => {
            failures += 1;
            println!("❌ Geocoding FAILED: {}", e.user_friendly_message());
            println!("   💡 {}", e.recovery_suggestion());
        }
    }

    println!("\n2️⃣ Testing Places API (New) ('{}')...", PLACES_PROBE);
    let places = GooglePlacesClient::from_config(client, &config, &keys)?;
    match places.search_unrestricted(PLACES_PROBE).await {
        Ok(found) => println!("✅ Places API is WORKING! ({} results)", found.len()),
        Err(e) => {
            failures += 1;
            println!("❌ Places API FAILED: {}", e.user_friendly_message());
            if let zonescout::ScoutError::PlacesApiError { body, .. } = &e {
                println!("   Response: {}", body);
            }
            println!("   💡 {}", e.recovery_suggestion());
        }
    }

    if failures > 0 {
        println!("\n❌ {} check(s) failed", failures);
        std::process::exit(1);
    }

    println!("\n✅ All checks passed");
    Ok(())
}
