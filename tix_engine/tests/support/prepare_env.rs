use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tix_common::{Cents, Percent};
use tix_engine::{
    db_types::{Business, Event, NewBusiness, NewEvent, NewTicketType, TicketType},
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("tix_test_store_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn drop_database(db: SqliteDatabase) {
    let url = db.url().to_string();
    db.pool().close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Could not remove test database {url}: {e:?}");
    }
}

/// A connected business with the given tax rate, and an active event with a single legacy ticket price.
pub async fn seed_event(db: &SqliteDatabase, price: i64, tickets: i64, tax: Percent) -> (Business, Event) {
    let business = NewBusiness::new("Lakeside Promotions", "events@lakeside.example")
        .with_stripe_account("acct_lakeside")
        .with_tax(tax);
    let business = db.insert_business(business).await.expect("Error inserting business");
    let event = NewEvent::new(business.id, "Summer Jazz Night", Cents::from(price), tickets);
    let event = db.insert_event(event).await.expect("Error inserting event");
    (business, event)
}

pub async fn seed_ticket_type(db: &SqliteDatabase, event_id: i64, name: &str, price: i64, qty: i64) -> TicketType {
    db.insert_ticket_type(NewTicketType::new(event_id, name, Cents::from(price), qty))
        .await
        .expect("Error inserting ticket type")
}
