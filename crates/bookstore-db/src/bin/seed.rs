//! # Seed Data Generator
//!
//! Populates a database with a demo catalog, a demo user and one order.
//!
//! ## Usage
//! ```bash
//! # 50 books (default) into ./bookstore_dev.db
//! cargo run -p bookstore-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p bookstore-db --bin seed -- --books 500 --db ./data/bookstore.db
//!
//! # Read pool and paging settings from a file
//! cargo run -p bookstore-db --bin seed -- --config ./bookstore.toml
//! ```
//!
//! ## What It Does
//! 1. Inserts `--books` books: `{Title} (Vol. N)`, $4.99 - $54.98
//! 2. Registers `demo@bookstore.local` (creates their cart)
//! 3. Fills the cart with three books, places an order
//! 4. Moves the order to PENDING and prints the order history as JSON

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookstore_core::{Book, OrderStatus};
use bookstore_db::repository::book::generate_book_id;
use bookstore_db::{Database, NewUser, StoreConfig};

const TITLES: &[(&str, &str)] = &[
    ("The Rust Programming Language", "Steve Klabnik"),
    ("Programming Rust", "Jim Blandy"),
    ("Rust for Rustaceans", "Jon Gjengset"),
    ("Zero To Production", "Luca Palmieri"),
    ("Rust in Action", "Tim McNamara"),
    ("Hands-on Rust", "Herbert Wolverson"),
    ("Rust Atomics and Locks", "Mara Bos"),
    ("Designing Data-Intensive Applications", "Martin Kleppmann"),
    ("Database Internals", "Alex Petrov"),
    ("Crafting Interpreters", "Robert Nystrom"),
];

const DEMO_EMAIL: &str = "demo@bookstore.local";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut books: usize = 50;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--books" | "-b" => {
                if i + 1 < args.len() {
                    books = parse_book_count(&args[i + 1])?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bookstore Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --books <N>      Number of books to generate (default: 50)");
                println!("  -d, --db <PATH>      Database file path (default: ./bookstore_dev.db)");
                println!("  -c, --config <PATH>  TOML config file");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = StoreConfig::load(config_path.as_deref())?;
    match db_path {
        Some(path) => config.database.path = path,
        None if config_path.is_none() => config.database.path = PathBuf::from("./bookstore_dev.db"),
        None => {}
    }

    println!("Bookstore Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database.path.display());
    println!("Books:    {}", books);
    println!();

    let db = Database::new(config.db_config()).await?;
    let service = config.configure_service(db.order_service());

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    let start = std::time::Instant::now();
    let mut inserted = Vec::with_capacity(books);
    for seed in 0..books {
        let book = generate_book(seed);
        if let Err(e) = db.books().insert(&book).await {
            eprintln!("Failed to insert {}: {}", book.isbn, e);
            continue;
        }
        inserted.push(book);
    }
    println!("Generated {} books in {:?}", inserted.len(), start.elapsed());

    if inserted.is_empty() {
        println!("No books in the catalog, skipping the demo order.");
        return Ok(());
    }

    // Demo user, cart and order
    let user = match db.users().get_by_email(DEMO_EMAIL).await? {
        Some(user) => user,
        None => {
            db.users()
                .register(&NewUser {
                    email: DEMO_EMAIL.to_string(),
                    first_name: "Demo".to_string(),
                    last_name: "Reader".to_string(),
                    shipping_address: Some("742 Evergreen Terrace".to_string()),
                })
                .await?
        }
    };

    for (quantity, book) in (1..).zip(inserted.iter().take(3)) {
        db.carts().add_item(&user.id, &book.id, quantity).await?;
    }

    let address = user
        .shipping_address
        .clone()
        .unwrap_or_else(|| "742 Evergreen Terrace".to_string());
    let order = service.place_order(&user.id, &address).await?;
    service.update_status(&order.id, OrderStatus::Pending).await?;

    let history = service.list_orders(&user.id, service.first_page()).await?;
    info!(orders = history.total_items, "Seed complete");

    println!();
    println!("Order history for {}:", user.email);
    println!("{}", serde_json::to_string_pretty(&history)?);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookstore=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parses the `--books` value. Zero and non-numbers are rejected.
fn parse_book_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("--books must be at least 1".to_string()),
        Ok(count) => Ok(count),
        Err(_) => Err(format!("--books expects a positive number, got '{}'", value)),
    }
}

/// Generates a single book with deterministic data.
fn generate_book(seed: usize) -> Book {
    let now = Utc::now();
    let (title, author) = TITLES[seed % TITLES.len()];
    let volume = seed / TITLES.len() + 1;

    // $4.99 - $54.98
    let price_cents = 499 + ((seed * 37) % 5000) as i64;

    Book {
        id: generate_book_id(),
        title: format!("{} (Vol. {})", title, volume),
        author: author.to_string(),
        isbn: format!("978{:010}", seed),
        price_cents,
        description: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_count() {
        assert_eq!(parse_book_count("500"), Ok(500));
        assert!(parse_book_count("0").is_err());
        assert!(parse_book_count("-3").is_err());
        assert!(parse_book_count("lots").is_err());
    }
}
