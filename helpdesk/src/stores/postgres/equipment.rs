//! PostgreSQL equipment repository.

use super::{column, db_error, is_unique_violation, next_id, parsed};
use crate::constants::entity;
use crate::error::{HelpdeskError, Result};
use crate::providers::EquipmentRepository;
use crate::state::{ActorId, Equipment, EquipmentId};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool};

const COLUMNS: &str = "id, name, equipment_type, serial_number, manufacturer, model, \
     purchase_date, warranty_expiry, status, assigned_to, notes, created_at, updated_at";

/// PostgreSQL equipment repository.
#[derive(Debug, Clone)]
pub struct PostgresEquipmentRepository {
    pool: PgPool,
}

impl PostgresEquipmentRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn equipment_from_row(row: &PgRow) -> Result<Equipment> {
    Ok(Equipment {
        id: EquipmentId(column(row, "id")?),
        name: column(row, "name")?,
        equipment_type: parsed(row, "equipment_type")?,
        serial_number: column(row, "serial_number")?,
        manufacturer: column(row, "manufacturer")?,
        model: column(row, "model")?,
        purchase_date: column(row, "purchase_date")?,
        warranty_expiry: column(row, "warranty_expiry")?,
        status: parsed(row, "status")?,
        assigned_to: column::<Option<i64>>(row, "assigned_to")?.map(ActorId),
        notes: column(row, "notes")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn serial_error(equipment: &Equipment, context: &'static str) -> impl FnOnce(sqlx::Error) -> HelpdeskError {
    let serial = equipment.serial_number.clone();
    move |e| match serial {
        Some(serial) if is_unique_violation(&e, Some("equipment_serial_number_key")) => {
            HelpdeskError::DuplicateSerial { serial }
        },
        _ => HelpdeskError::Storage(format!("{context}: {e}")),
    }
}

async fn write_equipment<'e>(
    executor: impl PgExecutor<'e>,
    equipment: &Equipment,
) -> std::result::Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r"
        UPDATE equipment
        SET name = $2,
            equipment_type = $3,
            serial_number = $4,
            manufacturer = $5,
            model = $6,
            purchase_date = $7,
            warranty_expiry = $8,
            status = $9,
            assigned_to = $10,
            notes = $11,
            updated_at = $12
        WHERE id = $1
        ",
    )
    .bind(equipment.id.get())
    .bind(&equipment.name)
    .bind(equipment.equipment_type.as_str())
    .bind(&equipment.serial_number)
    .bind(&equipment.manufacturer)
    .bind(&equipment.model)
    .bind(equipment.purchase_date)
    .bind(equipment.warranty_expiry)
    .bind(equipment.status.as_str())
    .bind(equipment.assigned_to.map(ActorId::get))
    .bind(&equipment.notes)
    .bind(equipment.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

impl EquipmentRepository for PostgresEquipmentRepository {
    async fn next_equipment_id(&self) -> Result<EquipmentId> {
        next_id(&self.pool, "equipment").await.map(EquipmentId)
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> Result<Equipment> {
        sqlx::query(&format!(
            "INSERT INTO equipment ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(equipment.id.get())
        .bind(&equipment.name)
        .bind(equipment.equipment_type.as_str())
        .bind(&equipment.serial_number)
        .bind(&equipment.manufacturer)
        .bind(&equipment.model)
        .bind(equipment.purchase_date)
        .bind(equipment.warranty_expiry)
        .bind(equipment.status.as_str())
        .bind(equipment.assigned_to.map(ActorId::get))
        .bind(&equipment.notes)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(serial_error(equipment, "Failed to insert equipment"))?;

        Ok(equipment.clone())
    }

    async fn find_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM equipment WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get equipment"))?;

        row.as_ref().map(equipment_from_row).transpose()
    }

    async fn list_equipment(&self) -> Result<Vec<Equipment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipment ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list equipment"))?;

        rows.iter().map(equipment_from_row).collect()
    }

    async fn find_equipment_by_assignee(&self, assignee: ActorId) -> Result<Vec<Equipment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipment WHERE assigned_to = $1 ORDER BY name ASC, id ASC"
        ))
        .bind(assignee.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list assigned equipment"))?;

        rows.iter().map(equipment_from_row).collect()
    }

    async fn update_equipment_with<F, R>(&self, id: EquipmentId, f: F) -> Result<(Equipment, R)>
    where
        F: FnOnce(Equipment) -> Result<(Equipment, R)> + Send,
        R: Send,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // Dropping `tx` on any early return rolls back
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM equipment WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock equipment"))?;

        let Some(row) = row else {
            return Err(HelpdeskError::NotFound {
                entity: entity::EQUIPMENT,
                id: id.get(),
            });
        };

        let (updated, extra) = f(equipment_from_row(&row)?)?;
        if updated.id != id {
            return Err(HelpdeskError::Internal(format!(
                "update of equipment {id} returned record {}",
                updated.id
            )));
        }

        write_equipment(&mut *tx, &updated)
            .await
            .map_err(serial_error(&updated, "Failed to update equipment"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok((updated, extra))
    }
}
