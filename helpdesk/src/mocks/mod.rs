//! In-memory repository implementations.
//!
//! Used by unit and integration tests and by the demo binary. Each
//! repository keeps its records behind one mutex, so every `*_with` call is
//! trivially atomic. Ids are handed out sequentially from 1.

pub mod actor;
pub mod equipment;
pub mod ticket;

pub use actor::MockActorRepository;
pub use equipment::MockEquipmentRepository;
pub use ticket::MockTicketRepository;

use crate::error::HelpdeskError;

fn lock_failed() -> HelpdeskError {
    HelpdeskError::Internal("Mutex lock failed".to_string())
}
