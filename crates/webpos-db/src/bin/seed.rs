//! # Seed Data Generator
//!
//! Populates a database with a demo tenant for development.
//!
//! ## Usage
//! ```bash
//! # Default: 500 products into ./webpos_dev.db
//! cargo run -p webpos-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p webpos-db --bin seed -- --count 2000 --db ./data/webpos.db
//! ```
//!
//! ## Generated Data
//! One tenant ("Demo Retail") with two stores, a category tree, products
//! with deterministic SKUs/barcodes, inventory rows with an opening
//! restock movement, and a handful of gift cards.

use chrono::Utc;
use std::env;

use webpos_core::{
    new_id, Category, GiftCard, Inventory, Product, StockMovement, Store, Tenant,
    DEFAULT_MINIMUM_STOCK_LEVEL, DEFAULT_SUPPLY_PCU,
};
use webpos_db::{Database, DbConfig};

/// Category names with product stems for realistic test data.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Beverages",
        &[
            "Coca-Cola 330ml",
            "Pepsi 330ml",
            "Sprite 330ml",
            "Still Water 500ml",
            "Orange Juice 1L",
            "Iced Tea 500ml",
            "Energy Drink 250ml",
            "Apple Juice 1L",
        ],
    ),
    (
        "Snacks",
        &[
            "Salted Chips 120g",
            "Tortilla Chips 200g",
            "Chocolate Bar 50g",
            "Gummy Bears 100g",
            "Cookies 150g",
            "Pretzels 80g",
            "Peanuts 200g",
            "Popcorn 90g",
        ],
    ),
    (
        "Dairy",
        &[
            "Whole Milk 1L",
            "Low-fat Milk 1L",
            "Cheddar 200g",
            "Mozzarella 125g",
            "Greek Yogurt 500g",
            "Butter 250g",
            "Cream 250ml",
            "Eggs Dozen",
        ],
    ),
    (
        "Grocery",
        &[
            "White Bread",
            "Wheat Bread",
            "Spaghetti 500g",
            "Rice 1kg",
            "Canned Beans 400g",
            "Canned Tomatoes 400g",
            "Sunflower Oil 1L",
            "Sugar 1kg",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./webpos_dev.db");

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
                println!("WebPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./webpos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("WebPOS Seed Data Generator");
    println!("==========================");
    println!("Database: {db_path}");
    println!("Products: {count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    if !db.tenants().list().await?.is_empty() {
        println!("⚠ Database already seeded; delete the file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    let tenant = Tenant {
        id: new_id(),
        name: "Demo Retail".to_string(),
        address: "12 Market Street".to_string(),
        phone: "+27110000000".to_string(),
        email: "owner@demo-retail.example".to_string(),
        tax_certificate: None,
        business_license: None,
        subscription_plan: "standard".to_string(),
        created_at: now,
        updated_at: now,
    };
    db.tenants().create(&tenant).await?;
    let ctx = db.tenant(&tenant.id);
    println!("✓ Tenant: {}", tenant.name);

    let mut stores = Vec::new();
    for (name, location) in [("Downtown", "12 Market Street"), ("Mall Kiosk", "Unit 14, City Mall")] {
        let store = Store {
            id: new_id(),
            tenant_id: tenant.id.clone(),
            name: name.to_string(),
            location: location.to_string(),
            created_at: now,
        };
        ctx.stores().create(&store).await?;
        stores.push(store);
    }
    println!("✓ Stores: {}", stores.len());

    let mut categories = Vec::new();
    for (name, _) in CATALOG {
        let category = Category {
            id: new_id(),
            tenant_id: tenant.id.clone(),
            name: name.to_string(),
            description: String::new(),
        };
        ctx.categories().create(&category).await?;
        categories.push(category);
    }
    println!("✓ Categories: {}", categories.len());

    println!();
    println!("Generating products...");
    let start = std::time::Instant::now();
    let mut generated = 0usize;
    let mut seq = 0usize;

    'outer: loop {
        for (cat_idx, (_, names)) in CATALOG.iter().enumerate() {
            for name in names.iter() {
                if generated >= count {
                    break 'outer;
                }
                seq += 1;

                let store = &stores[seq % stores.len()];
                let price_cents = 199 + ((seq * 37) % 2800) as i64;
                let opening = (seq % 60) as i64;

                let product = Product {
                    id: new_id(),
                    tenant_id: tenant.id.clone(),
                    store_id: store.id.clone(),
                    category_id: Some(categories[cat_idx].id.clone()),
                    name: format!("{name} #{seq}"),
                    sku: format!("DEMO-{seq:05}"),
                    barcode: format!("590{seq:010}"),
                    description: String::new(),
                    price_cents,
                    cost_price_cents: price_cents * 7 / 10,
                    quantity: opening,
                    expiry_date: None,
                    is_damaged: false,
                    damaged_quantity: 0,
                    is_discounted: seq % 9 == 0,
                    discount_percent_bps: if seq % 9 == 0 { 1000 } else { 0 },
                    surplus_quantity: 0,
                    supply_pcu: DEFAULT_SUPPLY_PCU,
                    is_virtual: false,
                    validity_days: None,
                    max_redemptions: None,
                    created_at: now,
                    updated_at: now,
                };
                ctx.products().create(&product).await?;

                let inventory = Inventory {
                    id: new_id(),
                    tenant_id: tenant.id.clone(),
                    product_id: product.id.clone(),
                    store_id: store.id.clone(),
                    quantity: 0,
                    minimum_stock_level: DEFAULT_MINIMUM_STOCK_LEVEL,
                    created_by: None,
                    updated_by: None,
                    created_at: now,
                    updated_at: now,
                };
                ctx.inventories().create(&inventory).await?;
                if opening > 0 {
                    ctx.inventories()
                        .record_movement(
                            &inventory.id,
                            StockMovement::Restock,
                            opening,
                            Some("opening stock"),
                            None,
                        )
                        .await?;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  {generated} products...");
                }
            }
        }
    }

    for n in 1..=5 {
        let card = GiftCard {
            id: new_id(),
            tenant_id: tenant.id.clone(),
            code: format!("GC-DEMO-{n:04}"),
            initial_amount_cents: 10000,
            current_balance_cents: 10000,
            issued_to: None,
            issued_by: None,
            issued_at: now,
            expires_at: None,
            is_active: true,
        };
        ctx.gift_cards().issue(&card).await?;
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {generated} products in {elapsed:?}");
    println!("✓ Gift cards: 5");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
