//! Full travel-planning pipeline demo.
//!
//! Research agent, document retrieval and final synthesis, wired from
//! environment configuration.

use itinera::config::PlannerConfig;
use itinera::pipeline::TravelPlanner;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    itinera::init_logging();

    let config = PlannerConfig::from_env()?;
    let planner = TravelPlanner::from_config(config)?;

    let input = "I am traveling to London in August 2026. Build me a travel itinerary \
                 with events taking place during the trip and the price of a flight \
                 from Sao Paulo to London.";

    let itinerary = planner.plan(input).await?;
    println!("------");
    println!("{itinerary}");
    println!("------");
    Ok(())
}
