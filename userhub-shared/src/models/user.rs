/// User model and repository operations
///
/// This module provides the `User` model and dialect-aware CRUD over the
/// `users` table. Usernames and emails are unique; duplicates are rejected
/// by the store's constraints, not checked up front.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id         BIGINT PRIMARY KEY AUTO_INCREMENT,  -- INTEGER AUTOINCREMENT on SQLite
///     username   VARCHAR(255) NOT NULL UNIQUE,
///     email      VARCHAR(255) NOT NULL UNIQUE,
///     feature    TEXT NULL,
///     created_at DATETIME(6) NOT NULL,               -- TEXT on SQLite
///     updated_at DATETIME(6) NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use userhub_shared::db::pool::{create_pool, DatabaseConfig, Dialect};
/// use userhub_shared::models::user::{CreateUser, User};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig::default();
/// let dialect = Dialect::from_url(&config.url);
/// let pool = create_pool(config).await?;
///
/// User::create(
///     &pool,
///     dialect,
///     CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         feature: None,
///     },
/// )
/// .await?;
///
/// let all = User::list(&pool, dialect).await?;
/// println!("{} users", all.len());
/// # Ok(())
/// # }
/// ```
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use crate::db::pool::Dialect;

/// The loosely-typed `feature` attribute of a user.
///
/// The column is plain text. Structured values (objects, arrays, any
/// non-string JSON) are stored as JSON text; plain strings are stored
/// verbatim. On read, text that parses as JSON comes back structured
/// (a stored `"123"` decodes to the number 123) and anything else stays
/// opaque. Parse failures are never surfaced.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// A JSON value, serialized to the column as JSON text
    Structured(Value),

    /// Text that is not valid JSON, stored as-is
    Opaque(String),
}

impl Feature {
    /// Text form stored in the `feature` column.
    pub fn to_column(&self) -> String {
        match self {
            Feature::Structured(value) => value.to_string(),
            Feature::Opaque(text) => text.clone(),
        }
    }

    /// Decodes a stored column value. A successful JSON parse wins;
    /// otherwise the original text is kept.
    pub fn from_column(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Feature::Structured(value),
            Err(_) => Feature::Opaque(text),
        }
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Feature::Structured(value) => value.serialize(serializer),
            Feature::Opaque(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Feature::Opaque(text),
            value => Feature::Structured(value),
        })
    }
}

/// User model representing one row of the `users` table.
///
/// Timestamps are carried in their stored textual form, which differs per
/// dialect (space-separated for the server, `T`-separated with a trailing
/// `Z` for the embedded store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Surrogate primary key, generated by the store, never reused
    pub id: i64,

    /// Unique username
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Optional loosely-typed payload
    pub feature: Option<Feature>,

    /// Set once at creation
    pub created_at: String,

    /// Refreshed on every update
    pub updated_at: String,
}

/// Input for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub feature: Option<Feature>,
}

/// Input for partially updating a user
///
/// These three fields are the complete set of mutable columns; both the
/// HTTP layer and the UPDATE builder work from this struct, so there is
/// no second whitelist to drift.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    /// New username
    pub username: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New feature value; `Some(None)` (an explicit JSON null) clears the
    /// column, `None` leaves it untouched
    #[serde(default, deserialize_with = "double_option")]
    pub feature: Option<Option<Feature>>,
}

impl UpdateUser {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.feature.is_none()
    }
}

/// Distinguishes an absent key (outer `None`, via `#[serde(default)]`)
/// from an explicit null (inner `None`).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Feature>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Feature>::deserialize(deserializer).map(Some)
}

/// Current instant rendered the way the active dialect stores it.
///
/// MySQL DATETIME(6) takes `YYYY-MM-DD HH:MM:SS.ffffff`. The embedded
/// store keeps ISO-8601 text with a trailing literal `Z`; the instant is
/// the naive UTC now and the `Z` is appended without any timezone
/// conversion, kept that way for compatibility with rows written by
/// earlier versions of this service.
fn now_stamp(dialect: Dialect) -> String {
    let now = Utc::now().naive_utc();
    match dialect {
        Dialect::MySql => now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        Dialect::Sqlite => format!("{}Z", now.format("%Y-%m-%dT%H:%M:%S%.6f")),
    }
}

/// SELECT list shared by the read operations.
///
/// The model carries timestamps as text while the server stores
/// DATETIME(6), and MySQL reports TEXT columns as blobs on the wire, so
/// the server variant casts those columns to CHAR. SQLite stores plain
/// TEXT throughout and needs no casts.
fn select_columns(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => {
            "id, username, email, CAST(feature AS CHAR) AS feature, \
             CAST(created_at AS CHAR) AS created_at, \
             CAST(updated_at AS CHAR) AS updated_at"
        }
        Dialect::Sqlite => "id, username, email, feature, created_at, updated_at",
    }
}

fn from_row(row: &AnyRow) -> Result<User, sqlx::Error> {
    let feature: Option<String> = row.try_get("feature")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        feature: feature.map(Feature::from_column),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Builds the UPDATE statement touching exactly the supplied columns plus
/// `updated_at`. Placeholder order must match the bind order in
/// [`User::update`].
fn build_update_sql(data: &UpdateUser) -> String {
    let mut assignments = Vec::new();
    if data.username.is_some() {
        assignments.push("username = ?");
    }
    if data.email.is_some() {
        assignments.push("email = ?");
    }
    if data.feature.is_some() {
        assignments.push("feature = ?");
    }
    assignments.push("updated_at = ?");
    format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "))
}

impl User {
    /// Inserts a new user, stamping both timestamp columns.
    ///
    /// # Errors
    ///
    /// A duplicate username or email surfaces as a database error with
    /// `ErrorKind::UniqueViolation` (see
    /// [`crate::db::is_unique_violation`]); no row is written in that
    /// case.
    pub async fn create(
        pool: &AnyPool,
        dialect: Dialect,
        data: CreateUser,
    ) -> Result<(), sqlx::Error> {
        let now = now_stamp(dialect);
        let feature = data.feature.as_ref().map(Feature::to_column);

        sqlx::query(
            "INSERT INTO users (username, email, feature, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(data.username)
        .bind(data.email)
        .bind(feature)
        .bind(now.clone())
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Returns every user, newest first (`ORDER BY id DESC`).
    pub async fn list(pool: &AnyPool, dialect: Dialect) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id DESC",
            select_columns(dialect)
        );

        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.iter().map(from_row).collect()
    }

    /// Returns the user with the given id, or `None`.
    pub async fn find_by_id(
        pool: &AnyPool,
        dialect: Dialect,
        id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", select_columns(dialect));

        let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
        row.as_ref().map(from_row).transpose()
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// The caller guarantees at least one field is supplied; an id with no
    /// matching row updates nothing and still succeeds.
    ///
    /// # Errors
    ///
    /// A username/email collision with another row surfaces as a
    /// `UniqueViolation` database error.
    pub async fn update(
        pool: &AnyPool,
        dialect: Dialect,
        id: i64,
        data: UpdateUser,
    ) -> Result<(), sqlx::Error> {
        let sql = build_update_sql(&data);

        let mut query = sqlx::query(&sql);
        if let Some(username) = data.username {
            query = query.bind(username);
        }
        if let Some(email) = data.email {
            query = query.bind(email);
        }
        if let Some(feature) = data.feature {
            query = query.bind(feature.as_ref().map(Feature::to_column));
        }
        query = query.bind(now_stamp(dialect)).bind(id);

        query.execute(pool).await?;
        Ok(())
    }

    /// Deletes by id. Deleting a missing id is not an error; zero rows
    /// affected is indistinguishable from success.
    pub async fn delete(pool: &AnyPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_structured_to_column() {
        let feature = Feature::Structured(json!({"role": "admin"}));
        assert_eq!(feature.to_column(), r#"{"role":"admin"}"#);

        let feature = Feature::Structured(json!(["a", "b"]));
        assert_eq!(feature.to_column(), r#"["a","b"]"#);
    }

    #[test]
    fn test_feature_opaque_roundtrips_verbatim() {
        let feature = Feature::Opaque("not json at all".to_string());
        assert_eq!(feature.to_column(), "not json at all");
        assert_eq!(
            Feature::from_column("not json at all".to_string()),
            Feature::Opaque("not json at all".to_string())
        );
    }

    #[test]
    fn test_feature_from_column_prefers_json() {
        assert_eq!(
            Feature::from_column(r#"{"role":"editor"}"#.to_string()),
            Feature::Structured(json!({"role": "editor"}))
        );
        // Bare numbers are valid JSON, so stored "123" decodes structured
        assert_eq!(
            Feature::from_column("123".to_string()),
            Feature::Structured(json!(123))
        );
    }

    #[test]
    fn test_feature_deserialize_string_is_opaque() {
        let feature: Feature = serde_json::from_value(json!("plain text")).unwrap();
        assert_eq!(feature, Feature::Opaque("plain text".to_string()));

        let feature: Feature = serde_json::from_value(json!({"k": "v"})).unwrap();
        assert_eq!(feature, Feature::Structured(json!({"k": "v"})));
    }

    #[test]
    fn test_feature_serialize_shapes() {
        let structured = Feature::Structured(json!({"role": "admin"}));
        assert_eq!(serde_json::to_value(&structured).unwrap(), json!({"role": "admin"}));

        let opaque = Feature::Opaque("hello".to_string());
        assert_eq!(serde_json::to_value(&opaque).unwrap(), json!("hello"));
    }

    #[test]
    fn test_update_user_feature_null_vs_absent() {
        let update: UpdateUser = serde_json::from_str(r#"{"username": "bob"}"#).unwrap();
        assert_eq!(update.username.as_deref(), Some("bob"));
        assert!(update.feature.is_none());
        assert!(!update.is_empty());

        let update: UpdateUser = serde_json::from_str(r#"{"feature": null}"#).unwrap();
        assert_eq!(update.feature, Some(None));
        assert!(!update.is_empty());

        let update: UpdateUser = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_now_stamp_formats() {
        let mysql = now_stamp(Dialect::MySql);
        // "2025-08-28 22:50:30.123456"
        assert_eq!(mysql.len(), 26);
        assert_eq!(&mysql[10..11], " ");
        assert_eq!(&mysql[19..20], ".");

        let sqlite = now_stamp(Dialect::Sqlite);
        // "2025-08-28T22:50:30.123456Z"
        assert_eq!(sqlite.len(), 27);
        assert_eq!(&sqlite[10..11], "T");
        assert!(sqlite.ends_with('Z'));
    }

    #[test]
    fn test_build_update_sql_touches_only_supplied_columns() {
        let data = UpdateUser {
            username: Some("bob".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_update_sql(&data),
            "UPDATE users SET username = ?, updated_at = ? WHERE id = ?"
        );

        let data = UpdateUser {
            email: Some("bob@example.com".to_string()),
            feature: Some(Some(Feature::Opaque("x".to_string()))),
            ..Default::default()
        };
        assert_eq!(
            build_update_sql(&data),
            "UPDATE users SET email = ?, feature = ?, updated_at = ? WHERE id = ?"
        );
    }
}
