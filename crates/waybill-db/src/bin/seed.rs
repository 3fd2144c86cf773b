//! # Seed Data Generator
//!
//! Populates a development database with a small but realistic catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./waybill_dev.db
//! cargo run -p waybill-db --bin seed
//!
//! # Specify database path
//! cargo run -p waybill-db --bin seed -- --db ./data/waybill.db
//! ```
//!
//! ## Generated Catalog
//! Every method gets a tiered table in every zone:
//! - Weight brackets: 0-999g, 1000-4999g, 5000-19999g, 20000g+
//! - Two total bands: under the free threshold and above it
//! - Heavier brackets and farther zones cost more
//!
//! Brackets are disjoint per pair, so the catalog satisfies the
//! no-overlap rule without going through the engine.

use std::env;
use waybill_core::{pricing, resolver, Interval, NewShippingMethod, NewShippingRate, NewShippingZone, RateRange};
use waybill_db::{Database, DbConfig};

/// (name, carrier, base charge in minor units)
const METHODS: &[(&str, &str, i64)] = &[
    ("Standard", "Royal Mail", 295),
    ("Tracked 48", "Royal Mail", 395),
    ("Next Day", "DPD", 695),
];

/// (name, regions, distance multiplier in percent)
const ZONES: &[(&str, &[&str], i64)] = &[
    ("United Kingdom", &["GB"], 100),
    ("Europe", &["FR", "DE", "ES", "IT", "NL", "BE", "IE"], 250),
    ("North America", &["US", "CA"], 400),
    ("Rest of World", &[], 550),
];

/// (min grams, max grams, weight multiplier in percent)
const WEIGHT_BRACKETS: &[(i64, Option<i64>, i64)] = &[
    (0, Some(999), 100),
    (1000, Some(4999), 160),
    (5000, Some(19999), 300),
    (20000, None, 600),
];

/// Order total at which shipping becomes free, in minor units.
const FREE_THRESHOLD: i64 = 5000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./waybill_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Waybill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./waybill_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Waybill Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.rates().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} rates", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut methods = Vec::new();
    for (order, (name, carrier, base)) in METHODS.iter().enumerate() {
        let method = db
            .methods()
            .insert(&NewShippingMethod {
                name: name.to_string(),
                carrier: carrier.to_string(),
                is_active: true,
                display_order: order as i64,
            })
            .await?;
        methods.push((method, *base));
    }
    println!("✓ {} shipping methods", methods.len());

    let mut zones = Vec::new();
    for (name, regions, multiplier) in ZONES {
        let zone = db
            .zones()
            .insert(&NewShippingZone {
                name: name.to_string(),
                regions: regions.iter().map(|r| r.to_string()).collect(),
            })
            .await?;
        zones.push((zone, *multiplier));
    }
    println!("✓ {} shipping zones", zones.len());

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (method, base) in &methods {
        for (zone, distance) in &zones {
            for (min_weight, max_weight, heft) in WEIGHT_BRACKETS {
                let charge = base * distance / 100 * heft / 100;
                let weight = Interval::new(*min_weight, *max_weight);

                let below = NewShippingRate::new(
                    method.id,
                    zone.id,
                    RateRange::new(weight, Interval::new(0, Some(FREE_THRESHOLD - 1))),
                    charge,
                );
                // Above the threshold only the domestic zone ships free
                let mut above = NewShippingRate::new(
                    method.id,
                    zone.id,
                    RateRange::new(weight, Interval::at_least(FREE_THRESHOLD)),
                    charge,
                );
                if *distance == 100 {
                    above = above.with_free_threshold(FREE_THRESHOLD);
                }

                for candidate in [below, above] {
                    if let Err(e) = db.rates().insert(&candidate).await {
                        eprintln!(
                            "Failed to insert rate for {} / {}: {}",
                            method.name, zone.name, e
                        );
                        continue;
                    }
                    generated += 1;
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} rates in {:?}", generated, elapsed);

    // Spot check: 2kg parcel, 30.00 basket, Standard to the UK
    let (standard, _) = &methods[0];
    let (uk, _) = &zones[0];
    let rates = db.rates().find_active_for(standard.id, uk.id).await?;
    let rate = resolver::resolve(&rates, standard.id, uk.id, 2000, 3000)?;
    let charge = pricing::cost(rate, 3000);
    println!();
    println!(
        "Spot check: {} / {}, 2000g, total 3000 → rate #{} costs {}",
        standard.name,
        uk.name,
        rate.id,
        charge.cost.minor()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
