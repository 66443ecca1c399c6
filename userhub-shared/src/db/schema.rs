/// Schema bootstrap
///
/// The service carries no migration history; the one table it owns is
/// created at startup with `CREATE TABLE IF NOT EXISTS`, so running this
/// repeatedly is safe.
use sqlx::AnyPool;
use tracing::info;

use super::pool::Dialect;

/// Server DDL: native auto-increment plus explicit engine/charset clauses.
/// Timestamps are DATETIME(6); the repository formats and parses them as
/// text with microsecond precision.
const DDL_MYSQL: &str = "\
CREATE TABLE IF NOT EXISTS users (
  id BIGINT PRIMARY KEY AUTO_INCREMENT,
  username VARCHAR(255) NOT NULL UNIQUE,
  email    VARCHAR(255) NOT NULL UNIQUE,
  feature  TEXT NULL,
  created_at DATETIME(6) NOT NULL,
  updated_at DATETIME(6) NOT NULL
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

/// Embedded-store DDL: same logical schema, SQLite's auto-increment
/// convention, timestamps stored as ISO-8601 text.
const DDL_SQLITE: &str = "\
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  email    TEXT NOT NULL UNIQUE,
  feature  TEXT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)";

/// Creates the `users` table if it does not exist yet.
///
/// Both DDL variants declare the identical logical schema; only the
/// auto-increment syntax, column types, and storage clauses differ.
pub async fn init_schema(pool: &AnyPool, dialect: Dialect) -> Result<(), sqlx::Error> {
    let ddl = match dialect {
        Dialect::MySql => DDL_MYSQL,
        Dialect::Sqlite => DDL_SQLITE,
    };

    sqlx::query(ddl).execute(pool).await?;

    info!(dialect = ?dialect, "Schema initialized");
    Ok(())
}
