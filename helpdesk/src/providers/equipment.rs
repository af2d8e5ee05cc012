//! Equipment repository trait.

use crate::error::Result;
use crate::state::{ActorId, Equipment, EquipmentId};
use std::future::Future;

/// Equipment repository.
///
/// Serial numbers are unique across all records; every write checks it.
pub trait EquipmentRepository: Send + Sync {
    /// Allocate the id for a new record.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn next_equipment_id(&self) -> impl Future<Output = Result<EquipmentId>> + Send;

    /// Store a new record.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The serial number is already used → `HelpdeskError::DuplicateSerial`
    /// - The backend fails
    fn insert_equipment(
        &self,
        equipment: &Equipment,
    ) -> impl Future<Output = Result<Equipment>> + Send;

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_equipment(
        &self,
        id: EquipmentId,
    ) -> impl Future<Output = Result<Option<Equipment>>> + Send;

    /// All records, by name ascending then id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn list_equipment(&self) -> impl Future<Output = Result<Vec<Equipment>>> + Send;

    /// Records issued to `assignee`, by name ascending then id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_equipment_by_assignee(
        &self,
        assignee: ActorId,
    ) -> impl Future<Output = Result<Vec<Equipment>>> + Send;

    /// Atomically read, transform and write one record.
    ///
    /// `f` receives the current record and returns the record to store plus
    /// a value passed back to the caller. The serial number it returns is
    /// checked against every other record before anything is written.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No record has `id` → `HelpdeskError::NotFound`
    /// - `f` fails (its error is returned as is)
    /// - The new serial number is taken → `HelpdeskError::DuplicateSerial`
    /// - The backend fails
    fn update_equipment_with<F, R>(
        &self,
        id: EquipmentId,
        f: F,
    ) -> impl Future<Output = Result<(Equipment, R)>> + Send
    where
        F: FnOnce(Equipment) -> Result<(Equipment, R)> + Send,
        R: Send;
}
