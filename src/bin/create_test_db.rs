use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use shared_ledger::{
    PasswordHash, ValidatedPassword,
    account::create_account,
    initialize_db,
    transaction::{Transaction, TransactionType, create_transaction},
    user::{UserDetails, create_user},
};

/// A utility for creating a test database for the REST API server of shared_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test accounts...");
    let checking = create_account("Checking", &conn)?;
    let savings = create_account("Savings", &conn)?;

    println!("Creating test users with the password \"test\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let alice = create_user(
        UserDetails {
            name: "Alice".to_owned(),
            email: Some("alice@example.com".to_owned()),
            shared: false,
            public: true,
        },
        &password_hash,
        &conn,
    )?;
    let bob = create_user(
        UserDetails {
            name: "Bob".to_owned(),
            email: None,
            shared: false,
            public: false,
        },
        &password_hash,
        &conn,
    )?;
    let household = create_user(
        UserDetails {
            name: "Household".to_owned(),
            email: None,
            shared: true,
            public: false,
        },
        &password_hash,
        &conn,
    )?;

    println!("Creating test transactions...");
    let transactions = [
        Transaction::build(Decimal::new(250_000, 2), checking.id, alice.id)
            .description("Salary")
            .date(date!(2025 - 01 - 15))
            .tags(vec!["work".to_owned()])
            .kind(TransactionType::Income),
        Transaction::build(Decimal::new(4_599, 2), checking.id, alice.id)
            .description("Books")
            .date(date!(2025 - 01 - 18))
            .tags(vec!["hobbies".to_owned()]),
        Transaction::build(Decimal::new(180_000, 2), savings.id, bob.id)
            .description("Salary")
            .date(date!(2025 - 01 - 15))
            .tags(vec!["work".to_owned()])
            .kind(TransactionType::Income),
        Transaction::build(Decimal::new(120_000, 2), checking.id, household.id)
            .description("Rent")
            .date(date!(2025 - 02 - 01))
            .tags(vec!["housing".to_owned()]),
        Transaction::build(Decimal::new(15_430, 2), checking.id, household.id)
            .description("Groceries")
            .date(date!(2025 - 02 - 03))
            .tags(vec!["food".to_owned(), "weekly".to_owned()]),
    ];

    for transaction in transactions {
        create_transaction(transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
