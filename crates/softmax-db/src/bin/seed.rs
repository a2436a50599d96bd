//! # Seed Data Generator
//!
//! Populates a development database with a small Mozambican grocery
//! catalog: categories, suppliers and products.
//!
//! ## Usage
//! ```bash
//! # Seed ./softmax_dev.db
//! cargo run -p softmax-db --bin seed
//!
//! # Specify database path
//! cargo run -p softmax-db --bin seed -- --db ./data/softmax.db
//! ```
//!
//! Accounts are not seeded: sign up through `POST /auth/sign-up`.

use std::env;

use softmax_core::{CategoryDraft, ProductDraft, SupplierDraft};
use softmax_db::{Database, DbConfig};

/// (category, description, [(product, price in cents, stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Bebidas",
        "Refrigerantes, águas e sumos",
        &[
            ("Coca-Cola 350ml", 4500, 48),
            ("Fanta Laranja 350ml", 4500, 36),
            ("Água Mineral 1.5L", 3500, 60),
            ("Sumo Compal 1L", 12000, 20),
            ("2M Cerveja 340ml", 6000, 72),
        ],
    ),
    (
        "Padaria",
        "Pão e bolos do dia",
        &[
            ("Pão Francês", 1000, 120),
            ("Pão de Forma", 8500, 15),
            ("Bolo de Chocolate", 35000, 4),
        ],
    ),
    (
        "Mercearia",
        "Produtos secos",
        &[
            ("Arroz 5kg", 45000, 25),
            ("Farinha de Milho 10kg", 60000, 18),
            ("Açúcar 2kg", 15000, 30),
            ("Óleo Alimentar 1L", 18000, 22),
            ("Feijão Manteiga 1kg", 13000, 0),
        ],
    ),
    (
        "Lacticínios",
        "Leite, queijo e iogurtes",
        &[
            ("Leite UHT 1L", 8000, 40),
            ("Queijo Flamengo 200g", 22000, 10),
            ("Iogurte Natural", 4000, 24),
        ],
    ),
];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Distribuidora Maputo", "Carlos Mondlane", "+258 84 123 4567"),
    ("Beira Alimentar", "Joana Sitoe", "+258 82 765 4321"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./softmax_dev.db".to_string();

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
                println!("SoftMax Sales Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./softmax_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SoftMax Sales Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, contact, phone) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .insert(&SupplierDraft {
                name: name.to_string(),
                contact_name: Some(contact.to_string()),
                phone: Some(phone.to_string()),
                ..Default::default()
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    let mut generated = 0;
    for (idx, (category_name, description, products)) in CATALOG.iter().enumerate() {
        let category = db
            .categories()
            .insert(&CategoryDraft {
                name: category_name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;

        for (name, price_cents, stock) in products.iter() {
            let draft = ProductDraft {
                name: name.to_string(),
                price_cents: *price_cents,
                stock: *stock,
                category_id: Some(category.id.clone()),
                supplier_id: supplier_ids.get(idx % supplier_ids.len()).cloned(),
                ..Default::default()
            };

            if let Err(e) = db.products().insert(&draft).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            generated += 1;
        }
    }

    println!("✓ {} categories", CATALOG.len());
    println!("✓ {} products", generated);

    let in_stock = db.products().list_in_stock().await?;
    println!("  In stock: {} products", in_stock.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
