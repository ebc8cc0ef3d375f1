//! # Seed Data
//!
//! Populates a fresh database with the café menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kopi_dev.db with 8 tables
//! cargo run -p kopi-db --bin seed
//!
//! # Custom database, table count and QR origin
//! cargo run -p kopi-db --bin seed -- --db ./data/kopi.db --tables 12 --origin https://kopi.example
//! ```
//!
//! ## What Gets Seeded
//! - 12 menu items across espresso, signature, manual brew and pastries
//! - 4 add-ons (Extra Espresso Shot, Oat Milk, Vanilla Syrup, Caramel Drizzle)
//! - Dining tables `1..=N`, each with its `/pos?table=N` QR payload
//! - One inventory row per product; the pastries start below their minimum
//!   so the dashboard shows low stock

use std::env;

use kopi_core::table::qr_payload;
use kopi_db::{Database, DbConfig};

/// (name, description, price_cents, category, featured, popular)
const MENU: &[(&str, &str, i64, &str, bool, bool)] = &[
    ("Caramel Macchiato", "Espresso with vanilla & caramel", 450, "espresso", true, false),
    ("Caffè Latte", "Rich espresso, steamed milk, and a light layer of foam.", 450, "espresso", false, false),
    ("Americano", "Espresso shots topped with hot water, creating a light layer of crema.", 375, "espresso", false, false),
    ("Cappuccino", "A perfect balance of espresso, steamed milk, and foam.", 450, "espresso", false, false),
    ("Kopi Susu Gula Aren", "Our signature iced coffee with creamy milk and palm sugar.", 500, "signature", true, false),
    ("Signature Aren Latte", "Rich espresso, steamed milk, and sweet palm sugar.", 350, "signature", true, false),
    ("V60 Pour Over", "Single origin coffee brewed to perfection.", 500, "manual-brew", false, false),
    ("Almond Croissant", "Flaky, buttery, and fresh", 300, "pastries", false, true),
    ("Cinnamon Roll", "Sweet, fluffy & warm", 375, "pastries", false, false),
    ("Croissant", "Flaky, buttery, and fresh", 300, "pastries", false, false),
    ("Triple Choc Muffin", "Rich and moist chocolate", 250, "pastries", false, true),
    ("Choco Muffin", "Rich and moist chocolate", 325, "pastries", false, false),
];

const ADD_ONS: &[(&str, i64)] = &[
    ("Extra Espresso Shot", 100),
    ("Oat Milk", 75),
    ("Vanilla Syrup", 50),
    ("Caramel Drizzle", 50),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./kopi_dev.db");
    let mut table_count: u32 = 8;
    let mut origin = String::from("http://localhost:8080");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    table_count = args[i + 1].parse().unwrap_or(8);
                    i += 1;
                }
            }
            "--origin" | "-o" => {
                if i + 1 < args.len() {
                    origin = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Sudut Kopi Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./kopi_dev.db)");
                println!("  -t, --tables <N>      Number of dining tables (default: 8)");
                println!("  -o, --origin <URL>    Origin for table QR payloads (default: http://localhost:8080)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Sudut Kopi Seed Data");
    println!("====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.catalog().count_products().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = db.catalog();
    let inventory = db.inventory();

    for (name, description, price_cents, category, featured, popular) in MENU {
        let product = catalog
            .insert_product(name, Some(description), *price_cents, category, *featured, *popular)
            .await?;

        // Pastries are baked in small batches
        let (quantity, minimum) = if *category == "pastries" { (6, 10) } else { (100, 20) };
        inventory.set_level(&product.id, quantity, minimum).await?;
    }
    println!("✓ {} menu items", MENU.len());

    for (name, price_cents) in ADD_ONS {
        catalog.insert_add_on(name, *price_cents).await?;
    }
    println!("✓ {} add-ons", ADD_ONS.len());

    let tables = db.tables();
    for n in 1..=table_count {
        let number = n.to_string();
        tables.create(&number, 4, &qr_payload(&origin, &number)).await?;
    }
    println!("✓ {} tables", table_count);

    let low = inventory.count_low_stock().await?;
    println!();
    println!("Done. {} products start below minimum stock.", low);

    db.close().await;
    Ok(())
}
