use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use taxfiling_admin::{AppError, db::Database};

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "taxfiling-admin-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    path
}

#[tokio::test]
async fn handle_is_lazy_until_create_all() {
    let path = temp_db_path("lazy");
    let db = Database::connect(&format!("sqlite://{}", path.display())).expect("valid url");

    assert!(!path.exists(), "connect must not open the file");
    assert_eq!(db.open_connections(), 0);

    db.create_all().await.expect("create_all");
    assert!(path.exists(), "create_all creates the database file");
    assert!(db.open_connections() >= 1);

    // No tables are declared, so nothing was executed.
    assert_eq!(db.queries_issued(), 0);

    db.close().await;
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn create_all_is_idempotent() {
    let path = temp_db_path("idempotent");
    let db = Database::connect(&format!("sqlite:{}", path.display())).expect("valid url");

    db.create_all().await.expect("first create_all");
    db.create_all().await.expect("second create_all");

    db.close().await;
    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn ping_is_counted() {
    let db = Database::connect("sqlite::memory:").expect("valid url");
    assert_eq!(db.queries_issued(), 0);

    db.ping().await.expect("ping");
    db.ping().await.expect("ping");
    assert_eq!(db.queries_issued(), 2);

    db.close().await;
}

#[tokio::test]
async fn closed_handle_fails() {
    let db = Database::connect("sqlite::memory:").expect("valid url");
    db.close().await;
    assert!(matches!(db.ping().await, Err(AppError::DatabaseError(_))));
}
