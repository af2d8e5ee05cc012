//! PostgreSQL storage implementations.
//!
//! One repository per record kind, all sharing a `PgPool`. Every
//! read-modify-write runs in a transaction that locks the row with
//! `SELECT ... FOR UPDATE`; the closure runs while the lock is held and the
//! transaction only commits if it succeeds. Unique violations become the
//! matching domain error.
//!
//! # Example
//!
//! ```no_run
//! use helpdesk::stores::postgres::{self, PostgresTicketRepository};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgres://localhost/helpdesk").await?;
//! postgres::migrate(&pool).await?;
//! let tickets = PostgresTicketRepository::new(pool);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod equipment;
pub mod ticket;

// Re-exports
pub use actor::PostgresActorRepository;
pub use equipment::PostgresEquipmentRepository;
pub use ticket::PostgresTicketRepository;

use crate::error::{HelpdeskError, Result};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};
use std::str::FromStr;

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns [`HelpdeskError::Storage`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| HelpdeskError::Storage(format!("Migration failed: {e}")))?;
    Ok(())
}

/// Map a driver error to [`HelpdeskError::Storage`] with some context.
fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> HelpdeskError {
    move |e| HelpdeskError::Storage(format!("{context}: {e}"))
}

/// `true` if `err` is a unique violation of `constraint` (any constraint when
/// `None`).
fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            constraint.is_none() || db_err.constraint() == constraint
        },
        _ => false,
    }
}

/// Allocate the next value of `table`'s `id` sequence.
async fn next_id(pool: &PgPool, table: &'static str) -> Result<i64> {
    sqlx::query_scalar::<Postgres, i64>("SELECT nextval(pg_get_serial_sequence($1, 'id'))")
        .bind(table)
        .fetch_one(pool)
        .await
        .map_err(db_error("Failed to allocate id"))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| HelpdeskError::Storage(format!("Failed to read column {name}: {e}")))
}

fn parsed<T>(row: &PgRow, name: &str) -> Result<T>
where
    T: FromStr<Err = HelpdeskError>,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e| HelpdeskError::Storage(format!("Corrupt value in column {name}: {e}")))
}
