//! # Helpdesk
//!
//! Ticket and equipment lifecycle and authorization engine for an internal
//! IT helpdesk. Employees file tickets; IT staff triage, assign and resolve
//! them; the equipment inventory tracks who holds what.
//!
//! The request layer (routing, forms, sessions) lives elsewhere. It hands
//! this crate an authenticated [`Actor`] (or `None`) and typed input, and gets
//! back the resulting record or a [`HelpdeskError`].
//!
//! ## Architecture
//!
//! ```text
//! Helpdesk service ─► Gate ─► Repository::*_with(id, |record| Store ─► Reducer) ─► commit
//! ```
//!
//! - **Gate** ([`gate`]): one explicit capability check per operation
//! - **Reducers** ([`reducers`]): commands validate and dispatch events;
//!   events are the only code that mutates a record
//! - **Providers** ([`providers`]): repository traits with atomic
//!   read-modify-write
//! - **Mocks** ([`mocks`]): in-memory repositories (`test-utils` feature)
//! - **Stores** ([`stores`]): PostgreSQL repositories (`postgres` feature)
//!
//! ## Invariants
//!
//! - Equipment status is `Assigned` exactly when it has an assignee
//! - A ticket has `resolved_at` exactly when it is `Resolved` or `Closed`
//! - Serial numbers are unique
//! - A rejected operation writes nothing
//!
//! ## Example
//!
//! ```
//! use helpdesk::mocks::{MockActorRepository, MockEquipmentRepository, MockTicketRepository};
//! use helpdesk::{Helpdesk, HelpdeskEnvironment, NewTicket, Priority, TicketStatus};
//!
//! # tokio_test::block_on(async {
//! let desk = Helpdesk::new(
//!     MockActorRepository::new(),
//!     MockEquipmentRepository::new(),
//!     MockTicketRepository::new(),
//!     HelpdeskEnvironment::default(),
//! );
//!
//! let employee = desk.register_actor("emma", "emma@example.com", "employee").await?;
//! let ticket = desk
//!     .create_ticket(
//!         Some(&employee),
//!         NewTicket::new("PC Broken", "Will not boot").with_priority(Priority::High),
//!     )
//!     .await?;
//!
//! assert_eq!(ticket.status, TicketStatus::Open);
//! assert!(ticket.resolved_at.is_none());
//! # Ok::<(), helpdesk::HelpdeskError>(())
//! # });
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod providers;
pub mod reducers;
pub mod service;
pub mod state;
pub mod stores;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-exports
pub use actions::{EquipmentAction, TicketAction};
pub use config::{DatabaseConfig, HelpdeskConfig};
pub use environment::{FieldLimits, HelpdeskEnvironment};
pub use error::{HelpdeskError, Result};
pub use gate::{Decision, DenyReason, Operation, TicketScope};
pub use service::Helpdesk;
pub use state::{
    Actor, ActorId, Comment, CommentId, Equipment, EquipmentDetails, EquipmentId,
    EquipmentStatus, EquipmentType, NewEquipment, NewTicket, Priority, Role, Ticket,
    TicketChanges, TicketDetail, TicketId, TicketStatus,
};
