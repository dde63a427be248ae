//! # Seed Data Generator
//!
//! Populates the database with demo stock for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 SKUs (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockroom-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Each SKU is `SSI-{STYLE}-{SIZE}-{COLOR}`, e.g. `SSI-D00791015-LL-BWH`,
//! with a buy price, a sell price 10-40% above it and 0-100 units on hand.

use std::env;
use stockroom_core::{Money, StockItem};
use stockroom_db::{Database, DbConfig};

/// Style code and display name.
const STYLES: &[(&str, &str)] = &[
    ("D00791015", "Zalekia Plain Casual Blouse"),
    ("D00791016", "Zalekia Striped Blouse"),
    ("D00852011", "Deklia Plain Casual Blouse"),
    ("D00852012", "Deklia Linen Shirt"),
    ("D01002210", "Salsa Floral Dress"),
    ("D01002211", "Salsa Midi Skirt"),
    ("D01130450", "Vatika Denim Jacket"),
    ("D01130451", "Vatika Chino Pants"),
    ("D01245007", "Lunera Knit Cardigan"),
    ("D01245008", "Lunera Pleated Skirt"),
];

/// Size code and display name.
const SIZES: &[(&str, &str)] = &[("S", "S"), ("M", "M"), ("LL", "L"), ("XL", "XL"), ("XXL", "XXL")];

/// Color code and display name.
const COLORS: &[(&str, &str)] = &[
    ("BWH", "Broken White"),
    ("BLK", "Black"),
    ("NAV", "Navy"),
    ("RED", "Red"),
    ("KHK", "Khaki"),
    ("OLV", "Olive"),
    ("MRN", "Maroon"),
    ("PNK", "Pink"),
    ("GRY", "Grey"),
    ("YLW", "Yellow"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of SKUs to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("SKUs:     {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let repo = db.stock();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = repo.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} SKUs", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating stock...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    let combinations = STYLES.iter().enumerate().flat_map(|(style_idx, style)| {
        SIZES.iter().enumerate().flat_map(move |(size_idx, size)| {
            COLORS
                .iter()
                .enumerate()
                .map(move |(color_idx, color)| {
                    (style_idx * 100 + size_idx * 10 + color_idx, *style, *size, *color)
                })
        })
    });

    for (seed, style, size, color) in combinations.take(count) {
        let item = generate_item(seed, style, size, color);

        if let Err(e) = repo.insert(&item).await {
            eprintln!("Failed to insert {}: {}", item.sku, e);
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {} SKUs...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} SKUs in {:?}", generated, elapsed);

    let total = repo
        .find_all()
        .await?
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.stock_value()?));
    match total {
        Some(total) => println!("  Stock value at buy price: {}", total),
        None => println!("  Stock value at buy price: too large to compute"),
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single stock record with deterministic pseudo-random data.
fn generate_item(
    seed: usize,
    (style_code, style_name): (&str, &str),
    (size_code, size_name): (&str, &str),
    (color_code, color_name): (&str, &str),
) -> StockItem {
    let sku = format!("SSI-{}-{}-{}", style_code, size_code, color_code);
    let name = format!("{} ({},{})", style_name, size_name, color_name);

    // Buy price: 50,000.00 - 129,000.00 in steps of 1,000.00
    let buy_cents = (50 + ((seed * 17) % 80) as i64) * 1_000_00;

    // Sell price: 10-40% markup
    let markup_pct = 110 + (seed % 31) as i64;
    let sell_cents = buy_cents * markup_pct / 100;

    let quantity = (seed % 101) as i64;

    StockItem::new(
        sku,
        name,
        quantity,
        Money::from_cents(buy_cents),
        Money::from_cents(sell_cents),
    )
}
