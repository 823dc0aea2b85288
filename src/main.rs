#[macro_use]
extern crate rocket;

use std::sync::Arc;

use postboard::config::AppConfig;
use postboard::repo::SqlitePostRepository;
use postboard::{create_rocket, db};

#[launch]
fn rocket() -> _ {
    let config = AppConfig::from_env();
    let db_path = config.database_path.clone();
    std::fs::create_dir_all(std::path::Path::new(&db_path).parent().unwrap_or(std::path::Path::new("."))).ok();
    let conn = rusqlite::Connection::open(&db_path).expect("Failed to open database");
    db::initialize(&conn).expect("Failed to initialize database");

    create_rocket(Arc::new(SqlitePostRepository::new(conn)), config)
}
