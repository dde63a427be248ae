//! Shared fixtures for the service tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use stockroom_core::{Money, SkuInput};
use stockroom_db::{Database, DbConfig};
use uuid::Uuid;

use crate::InventoryService;

/// A service over a fresh in-memory database.
pub(crate) async fn service() -> InventoryService {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    InventoryService::from_database(db)
}

/// `SkuInput` with prices in cents.
pub(crate) fn sku(code: &str, quantity: i64, buy: i64, sell: i64) -> SkuInput {
    SkuInput::new(code, quantity, Money::from_cents(buy), Money::from_cents(sell))
}

/// Registers `(sku, quantity, buy_cents, sell_cents)` rows.
pub(crate) async fn seed(svc: &InventoryService, rows: &[(&str, i64, i64, i64)]) {
    for (code, quantity, buy, sell) in rows {
        svc.add_sku(sku(code, *quantity, *buy, *sell)).await.unwrap();
    }
}

/// A service over a fresh SQLite file in the temp directory, with a
/// multi-connection pool.
pub(crate) async fn file_service() -> (InventoryService, PathBuf) {
    let path = std::env::temp_dir().join(format!("stockroom-{}.db", Uuid::new_v4()));
    let config = DbConfig::new(&path)
        .max_connections(4)
        .busy_timeout(Duration::from_secs(2));
    let db = Database::new(config).await.unwrap();
    (InventoryService::from_database(db), path)
}

/// Closes the pool and deletes the database file with its WAL companions.
pub(crate) async fn remove_database(svc: InventoryService, path: &Path) {
    svc.db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(name));
    }
}
