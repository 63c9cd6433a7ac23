//! Reverse geocoding command

use crate::console::CliConsole;
use motofix_sdk::{Coordinates, MotofixClient};

pub async fn lookup(
    client: &MotofixClient,
    console: &CliConsole,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<()> {
    let coords = Coordinates::new(latitude, longitude)
        .ok_or_else(|| anyhow::anyhow!("Invalid position {}, {}", latitude, longitude))?;

    if !client.config().geocoder.enabled {
        console.info("Geocoding is disabled; showing coordinates");
    }
    println!("{}", client.describe_location(coords).await);
    Ok(())
}
