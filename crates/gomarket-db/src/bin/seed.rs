//! # Demo Cart Seeder
//!
//! Writes a sample cart snapshot into the device database for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./gomarket_dev.db under the default key
//! cargo run -p gomarket-db --bin seed
//!
//! # Specify database path and key
//! cargo run -p gomarket-db --bin seed -- --db ./data/cart.db --key @GoMarket:products
//!
//! # Overwrite an existing snapshot
//! cargo run -p gomarket-db --bin seed -- --force
//! ```

use std::env;

use gomarket_core::{Cart, NewLineItem, DEFAULT_STORAGE_KEY};
use gomarket_db::{Database, DbConfig, KeyValueStore};

/// Sample catalog: (id, title, price)
const PRODUCTS: &[(&str, &str, f64)] = &[
    ("1", "Camiseta Hipster", 59.9),
    ("2", "Tenis de Caminhada", 179.9),
    ("3", "Boné Aba Reta", 39.9),
    ("4", "Meia Cano Alto", 12.5),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gomarket_dev.db");
    let mut key = String::from(DEFAULT_STORAGE_KEY);
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--key" | "-k" => {
                if i + 1 < args.len() {
                    key = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("GoMarket Demo Cart Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./gomarket_dev.db)");
                println!("  -k, --key <KEY>    Storage key (default: {})", DEFAULT_STORAGE_KEY);
                println!("  -f, --force        Overwrite an existing snapshot");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    gomarket_core::validation::validate_storage_key(&key)?;

    println!("GoMarket Demo Cart Seeder");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Key:      {}", key);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let store = db.key_values();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if store.get_item(&key).await?.is_some() && !force {
        println!("⚠ A snapshot already exists under {}", key);
        println!("  Pass --force to overwrite it.");
        return Ok(());
    }

    // Every product once, the first one twice so a merged line shows up.
    let mut cart = Cart::new();
    for (id, title, price) in PRODUCTS {
        let image_url = format!("https://cdn.gomarket.dev/products/{}.png", id);
        cart.add_item(NewLineItem::new(*id, *title, image_url, *price));
    }
    if let Some((id, title, price)) = PRODUCTS.first() {
        let image_url = format!("https://cdn.gomarket.dev/products/{}.png", id);
        cart.add_item(NewLineItem::new(*id, *title, image_url, *price));
    }

    let payload = serde_json::to_string(cart.items())?;
    store.set_item(&key, &payload).await?;

    println!();
    println!(
        "✓ Stored {} line items ({} units)",
        cart.item_count(),
        cart.total_quantity()
    );

    db.close().await;
    Ok(())
}
