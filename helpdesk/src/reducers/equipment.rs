//! Equipment reducer.
//!
//! Owns the two equipment invariants that are not storage constraints:
//!
//! - `status == Assigned` exactly when an assignee is present. Assigning an
//!   actor always forces `Assigned`, even over `InRepair` or `Retired`;
//!   unassigning drops `Assigned` back to `InStock` and leaves other statuses
//!   alone.
//! - Descriptive edits never touch status or assignment.
//!
//! Serial-number uniqueness spans records and is enforced by the repository.

use super::{execute, normalize_optional, optional_text, required_text};
use crate::actions::EquipmentAction;
use crate::constants::equipment::{DETAIL_MAX_CHARS, NAME_MAX_CHARS};
use crate::environment::HelpdeskEnvironment;
use crate::error::{HelpdeskError, Result};
use crate::state::{
    ActorId, Equipment, EquipmentDetails, EquipmentId, EquipmentState, EquipmentStatus,
    NewEquipment,
};
use helpdesk_core::effect::Effect;
use helpdesk_core::reducer::Reducer;
use helpdesk_core::{dispatch, smallvec, SmallVec};

/// Equipment reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquipmentReducer;

impl EquipmentReducer {
    /// Create a new equipment reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn register(
        state: &EquipmentState,
        id: EquipmentId,
        input: NewEquipment,
        env: &HelpdeskEnvironment,
    ) -> Result<EquipmentAction> {
        if state.equipment.is_some() {
            return Err(HelpdeskError::Internal(format!(
                "equipment {id} is already registered"
            )));
        }

        let status = input.status.unwrap_or_default();
        if status == EquipmentStatus::Assigned {
            return Err(HelpdeskError::validation(
                "status",
                "equipment only becomes Assigned through assignment",
            ));
        }

        let details = validate_details(input.details)?;
        let now = env.now();
        let equipment = Equipment {
            id,
            name: details.name,
            equipment_type: details.equipment_type,
            serial_number: details.serial_number,
            manufacturer: details.manufacturer,
            model: details.model,
            purchase_date: details.purchase_date,
            warranty_expiry: details.warranty_expiry,
            status,
            assigned_to: None,
            notes: details.notes,
            created_at: now,
            updated_at: now,
        };

        Ok(EquipmentAction::Registered { equipment })
    }

    fn revise(
        state: &EquipmentState,
        details: EquipmentDetails,
        env: &HelpdeskEnvironment,
    ) -> Result<EquipmentAction> {
        loaded(state)?;
        Ok(EquipmentAction::Revised {
            details: validate_details(details)?,
            at: env.now(),
        })
    }

    fn assign(
        state: &EquipmentState,
        assignee: Option<ActorId>,
        env: &HelpdeskEnvironment,
    ) -> Result<EquipmentAction> {
        loaded(state)?;
        let at = env.now();
        Ok(match assignee {
            Some(assignee) => EquipmentAction::Assigned { assignee, at },
            None => EquipmentAction::Unassigned { at },
        })
    }
}

impl Reducer for EquipmentReducer {
    type State = EquipmentState;
    type Action = EquipmentAction;
    type Environment = HelpdeskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let decided = match action {
            // ═══════════════════════════════════════════════════════════
            // Commands
            // ═══════════════════════════════════════════════════════════
            EquipmentAction::Register { id, equipment } => {
                Self::register(state, id, equipment, env)
            },
            EquipmentAction::Revise { details } => Self::revise(state, details, env),
            EquipmentAction::Assign { assignee } => Self::assign(state, assignee, env),

            // ═══════════════════════════════════════════════════════════
            // Events
            // ═══════════════════════════════════════════════════════════
            EquipmentAction::Registered { equipment } => {
                state.equipment = Some(equipment);
                return SmallVec::new();
            },
            EquipmentAction::Revised { details, at } => {
                if let Some(equipment) = state.equipment.as_mut() {
                    equipment.apply_details(details);
                    equipment.updated_at = at;
                }
                return SmallVec::new();
            },
            EquipmentAction::Assigned { assignee, at } => {
                if let Some(equipment) = state.equipment.as_mut() {
                    equipment.assigned_to = Some(assignee);
                    equipment.status = EquipmentStatus::Assigned;
                    equipment.updated_at = at;
                }
                return SmallVec::new();
            },
            EquipmentAction::Unassigned { at } => {
                if let Some(equipment) = state.equipment.as_mut() {
                    equipment.assigned_to = None;
                    if equipment.status == EquipmentStatus::Assigned {
                        equipment.status = EquipmentStatus::InStock;
                    }
                    equipment.updated_at = at;
                }
                return SmallVec::new();
            },
            EquipmentAction::ValidationFailed { error } => {
                state.last_error = Some(error);
                return SmallVec::new();
            },
        };

        match decided {
            Ok(event) => smallvec![dispatch!(event)],
            Err(error) => smallvec![dispatch!(EquipmentAction::ValidationFailed { error })],
        }
    }
}

/// Result of running one equipment command to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentOutcome {
    /// The record after every event was applied.
    pub equipment: Equipment,
    /// Every processed action, command first.
    pub journal: Vec<EquipmentAction>,
}

impl EquipmentOutcome {
    /// Run `action` against `state`.
    ///
    /// # Errors
    ///
    /// Returns the validation error the command was rejected with, or
    /// [`HelpdeskError::Internal`] if no record came out of it.
    pub fn run(
        state: EquipmentState,
        action: EquipmentAction,
        env: &HelpdeskEnvironment,
    ) -> Result<Self> {
        let (state, journal) = execute(EquipmentReducer::new(), state, action, env.clone())?;
        if let Some(error) = state.last_error {
            return Err(error);
        }
        let equipment = state
            .equipment
            .ok_or_else(|| HelpdeskError::Internal("equipment command produced no record".into()))?;
        Ok(Self { equipment, journal })
    }
}

fn loaded(state: &EquipmentState) -> Result<&Equipment> {
    state
        .equipment
        .as_ref()
        .ok_or_else(|| HelpdeskError::Internal("no equipment loaded".into()))
}

fn validate_details(details: EquipmentDetails) -> Result<EquipmentDetails> {
    Ok(EquipmentDetails {
        name: required_text("name", &details.name, NAME_MAX_CHARS)?,
        equipment_type: details.equipment_type,
        serial_number: optional_text("serial_number", details.serial_number, DETAIL_MAX_CHARS)?,
        manufacturer: optional_text("manufacturer", details.manufacturer, DETAIL_MAX_CHARS)?,
        model: optional_text("model", details.model, DETAIL_MAX_CHARS)?,
        purchase_date: details.purchase_date,
        warranty_expiry: details.warranty_expiry,
        notes: normalize_optional(details.notes),
    })
}
