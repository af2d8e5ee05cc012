//! Helpdesk repository providers.
//!
//! Traits for the storage the service depends on. Each trait answers explicit
//! queries (`find_tickets_by_reporter`, `find_equipment_by_assignee`, ...) and
//! returns plain records; there is no live graph of back-references.
//!
//! # Read-modify-write
//!
//! Mutations of existing records go through `*_with` methods that hand the
//! current record to a closure and persist what it returns, all inside one
//! critical section (a row lock in PostgreSQL, the mutex in the mocks). The
//! closure runs the reducer; if it returns `Err` nothing is written.
//!
//! Implementations:
//! - **Testing**: `crate::mocks` (in-memory, deterministic)
//! - **Production**: `crate::stores::postgres` (`postgres` feature)

pub mod actor;
pub mod equipment;
pub mod ticket;

// Re-export provider traits
pub use actor::ActorRepository;
pub use equipment::EquipmentRepository;
pub use ticket::TicketRepository;
