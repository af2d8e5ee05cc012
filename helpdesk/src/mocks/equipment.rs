//! Mock equipment repository for testing.

use super::lock_failed;
use crate::constants::entity;
use crate::error::{HelpdeskError, Result};
use crate::providers::EquipmentRepository;
use crate::state::{ActorId, Equipment, EquipmentId};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inventory {
    last_id: i64,
    records: BTreeMap<EquipmentId, Equipment>,
}

impl Inventory {
    /// Fail if another record already carries `candidate`'s serial number.
    fn check_serial(&self, candidate: &Equipment) -> Result<()> {
        let Some(serial) = candidate.serial_number.as_deref() else {
            return Ok(());
        };
        let taken = self
            .records
            .values()
            .any(|other| other.id != candidate.id && other.serial_number.as_deref() == Some(serial));
        if taken {
            return Err(HelpdeskError::DuplicateSerial {
                serial: serial.to_string(),
            });
        }
        Ok(())
    }

    fn sorted(&self, keep: impl Fn(&Equipment) -> bool) -> Vec<Equipment> {
        let mut records: Vec<_> = self.records.values().filter(|e| keep(e)).cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        records
    }
}

/// Mock equipment repository.
#[derive(Debug, Clone, Default)]
pub struct MockEquipmentRepository {
    inventory: Arc<Mutex<Inventory>>,
}

impl MockEquipmentRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn equipment_count(&self) -> Result<usize> {
        Ok(self.inventory.lock().map_err(|_| lock_failed())?.records.len())
    }
}

impl EquipmentRepository for MockEquipmentRepository {
    fn next_equipment_id(&self) -> impl Future<Output = Result<EquipmentId>> + Send {
        let inventory = Arc::clone(&self.inventory);

        async move {
            let mut guard = inventory.lock().map_err(|_| lock_failed())?;
            guard.last_id += 1;
            Ok(EquipmentId(guard.last_id))
        }
    }

    fn insert_equipment(
        &self,
        equipment: &Equipment,
    ) -> impl Future<Output = Result<Equipment>> + Send {
        let inventory = Arc::clone(&self.inventory);
        let equipment = equipment.clone();

        async move {
            let mut guard = inventory.lock().map_err(|_| lock_failed())?;

            if guard.records.contains_key(&equipment.id) {
                return Err(HelpdeskError::Storage(format!(
                    "equipment {} already exists",
                    equipment.id
                )));
            }
            guard.check_serial(&equipment)?;

            guard.last_id = guard.last_id.max(equipment.id.get());
            guard.records.insert(equipment.id, equipment.clone());
            Ok(equipment)
        }
    }

    fn find_equipment(
        &self,
        id: EquipmentId,
    ) -> impl Future<Output = Result<Option<Equipment>>> + Send {
        let inventory = Arc::clone(&self.inventory);

        async move {
            let guard = inventory.lock().map_err(|_| lock_failed())?;
            Ok(guard.records.get(&id).cloned())
        }
    }

    fn list_equipment(&self) -> impl Future<Output = Result<Vec<Equipment>>> + Send {
        let inventory = Arc::clone(&self.inventory);

        async move {
            let guard = inventory.lock().map_err(|_| lock_failed())?;
            Ok(guard.sorted(|_| true))
        }
    }

    fn find_equipment_by_assignee(
        &self,
        assignee: ActorId,
    ) -> impl Future<Output = Result<Vec<Equipment>>> + Send {
        let inventory = Arc::clone(&self.inventory);

        async move {
            let guard = inventory.lock().map_err(|_| lock_failed())?;
            Ok(guard.sorted(|e| e.assigned_to == Some(assignee)))
        }
    }

    fn update_equipment_with<F, R>(
        &self,
        id: EquipmentId,
        f: F,
    ) -> impl Future<Output = Result<(Equipment, R)>> + Send
    where
        F: FnOnce(Equipment) -> Result<(Equipment, R)> + Send,
        R: Send,
    {
        let inventory = Arc::clone(&self.inventory);

        async move {
            let mut guard = inventory.lock().map_err(|_| lock_failed())?;

            let current = guard
                .records
                .get(&id)
                .cloned()
                .ok_or(HelpdeskError::NotFound {
                    entity: entity::EQUIPMENT,
                    id: id.get(),
                })?;

            let (updated, extra) = f(current)?;
            if updated.id != id {
                return Err(HelpdeskError::Internal(format!(
                    "update of equipment {id} returned record {}",
                    updated.id
                )));
            }
            guard.check_serial(&updated)?;

            guard.records.insert(id, updated.clone());
            Ok((updated, extra))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EquipmentStatus, EquipmentType};
    use chrono::Utc;

    fn laptop(id: i64, name: &str, serial: Option<&str>) -> Equipment {
        let now = Utc::now();
        Equipment {
            id: EquipmentId(id),
            name: name.to_string(),
            equipment_type: EquipmentType::Laptop,
            serial_number: serial.map(str::to_string),
            manufacturer: None,
            model: None,
            purchase_date: None,
            warranty_expiry: None,
            status: EquipmentStatus::InStock,
            assigned_to: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn serial_clash_on_update_leaves_record_untouched() {
        let repo = MockEquipmentRepository::new();
        assert!(repo.insert_equipment(&laptop(1, "A", Some("SN-1"))).await.is_ok());
        assert!(repo.insert_equipment(&laptop(2, "B", Some("SN-2"))).await.is_ok());

        let result = repo
            .update_equipment_with(EquipmentId(2), |mut e| {
                e.serial_number = Some("SN-1".to_string());
                Ok((e, ()))
            })
            .await;

        assert_eq!(
            result.map(|(e, ())| e.id),
            Err(HelpdeskError::DuplicateSerial {
                serial: "SN-1".to_string()
            })
        );
        let stored = repo.find_equipment(EquipmentId(2)).await.ok().flatten();
        assert_eq!(stored.and_then(|e| e.serial_number), Some("SN-2".to_string()));
    }

    #[tokio::test]
    async fn keeping_own_serial_is_allowed() {
        let repo = MockEquipmentRepository::new();
        assert!(repo.insert_equipment(&laptop(1, "A", Some("SN-1"))).await.is_ok());

        let result = repo
            .update_equipment_with(EquipmentId(1), |mut e| {
                e.name = "A2".to_string();
                Ok((e, ()))
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closure_error_writes_nothing() {
        let repo = MockEquipmentRepository::new();
        assert!(repo.insert_equipment(&laptop(1, "A", None)).await.is_ok());

        let result: Result<(Equipment, ())> = repo
            .update_equipment_with(EquipmentId(1), |_| {
                Err(HelpdeskError::validation("name", "must not be blank"))
            })
            .await;

        assert!(result.is_err());
        let stored = repo.find_equipment(EquipmentId(1)).await.ok().flatten();
        assert_eq!(stored.map(|e| e.name), Some("A".to_string()));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let repo = MockEquipmentRepository::new();

        let result = repo
            .update_equipment_with(EquipmentId(9), |e| Ok((e, ())))
            .await;

        assert_eq!(
            result.map(|(e, ())| e.id),
            Err(HelpdeskError::NotFound {
                entity: "equipment",
                id: 9
            })
        );
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let repo = MockEquipmentRepository::new();
        for (id, name) in [(1, "Printer"), (2, "Dell XPS"), (3, "Monitor")] {
            assert!(repo.insert_equipment(&laptop(id, name, None)).await.is_ok());
        }

        let names: Vec<_> = repo
            .list_equipment()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Dell XPS", "Monitor", "Printer"]);
    }
}
