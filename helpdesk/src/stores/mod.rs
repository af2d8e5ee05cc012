//! Storage implementations for the helpdesk.
//!
//! - **PostgreSQL** (`postgres` feature) - persistent actors, equipment,
//!   tickets and comments

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
#[cfg(feature = "postgres")]
pub use postgres::{PostgresActorRepository, PostgresEquipmentRepository, PostgresTicketRepository};
