//! Equipment registry through the service: serial uniqueness, assignment
//! coupling, ordering.

#![allow(clippy::expect_used)] // Test code can panic

mod common;

use common::{cast, desk, Desk};
use helpdesk::{
    Actor, ActorId, Equipment, EquipmentDetails, EquipmentId, EquipmentStatus, EquipmentType,
    HelpdeskError, NewEquipment,
};

async fn laptop(desk: &Desk, staff: &Actor, name: &str, serial: Option<&str>) -> Equipment {
    let mut details = EquipmentDetails::new(name, EquipmentType::Laptop);
    if let Some(serial) = serial {
        details = details.with_serial(serial);
    }
    desk.create_equipment(Some(staff), NewEquipment::from(details))
        .await
        .expect("create equipment")
}

#[tokio::test]
async fn new_equipment_defaults_to_in_stock() {
    let desk = desk();
    let cast = cast(&desk).await;

    let equipment = laptop(&desk, &cast.support, "Dell XPS", Some("SN-1")).await;

    assert_eq!(equipment.status, EquipmentStatus::InStock);
    assert_eq!(equipment.assigned_to, None);
    assert_eq!(equipment.serial_number.as_deref(), Some("SN-1"));
}

#[tokio::test]
async fn duplicate_serial_is_rejected_on_create_and_update() {
    let desk = desk();
    let cast = cast(&desk).await;
    let first = laptop(&desk, &cast.support, "First", Some("SN-1")).await;
    let second = laptop(&desk, &cast.support, "Second", Some("SN-2")).await;

    let clash = desk
        .create_equipment(
            Some(&cast.support),
            NewEquipment::from(
                EquipmentDetails::new("Third", EquipmentType::Desktop).with_serial("SN-1"),
            ),
        )
        .await;
    assert_eq!(
        clash,
        Err(HelpdeskError::DuplicateSerial {
            serial: "SN-1".to_string()
        })
    );

    let steal = desk
        .update_equipment(
            Some(&cast.support),
            second.id,
            second.details().with_serial("SN-1"),
        )
        .await;
    assert_eq!(
        steal,
        Err(HelpdeskError::DuplicateSerial {
            serial: "SN-1".to_string()
        })
    );

    let mut renamed = first.details();
    renamed.name = "First (renamed)".to_string();
    let kept = desk
        .update_equipment(Some(&cast.support), first.id, renamed)
        .await
        .expect("keep own serial");
    assert_eq!(kept.serial_number.as_deref(), Some("SN-1"));
    assert_eq!(kept.name, "First (renamed)");
}

#[tokio::test]
async fn blank_serials_never_clash() {
    let desk = desk();
    let cast = cast(&desk).await;

    let a = laptop(&desk, &cast.support, "A", Some("  ")).await;
    let b = laptop(&desk, &cast.support, "B", None).await;

    assert_eq!(a.serial_number, None);
    assert_eq!(b.serial_number, None);
}

#[tokio::test]
async fn assign_then_unassign_returns_to_stock() {
    let desk = desk();
    let cast = cast(&desk).await;
    let equipment = laptop(&desk, &cast.support, "Dell XPS", None).await;

    let assigned = desk
        .assign_equipment(Some(&cast.support), equipment.id, Some(cast.employee1.id))
        .await
        .expect("assign");
    assert_eq!(assigned.status, EquipmentStatus::Assigned);
    assert_eq!(assigned.assigned_to, Some(cast.employee1.id));

    let returned = desk
        .assign_equipment(Some(&cast.support), equipment.id, None)
        .await
        .expect("unassign");
    assert_eq!(returned.status, EquipmentStatus::InStock);
    assert_eq!(returned.assigned_to, None);
    assert!(returned.updated_at > assigned.updated_at);
}

#[tokio::test]
async fn assignment_overrides_repair_and_unassign_keeps_it() {
    let desk = desk();
    let cast = cast(&desk).await;
    let in_repair = desk
        .create_equipment(
            Some(&cast.admin),
            NewEquipment {
                details: EquipmentDetails::new("Printer", EquipmentType::Printer),
                status: Some(EquipmentStatus::InRepair),
            },
        )
        .await
        .expect("create");

    let assigned = desk
        .assign_equipment(Some(&cast.admin), in_repair.id, Some(cast.employee2.id))
        .await
        .expect("assign");
    assert_eq!(assigned.status, EquipmentStatus::Assigned);

    let retired = desk
        .create_equipment(
            Some(&cast.admin),
            NewEquipment {
                details: EquipmentDetails::new("Old Router", EquipmentType::Router),
                status: Some(EquipmentStatus::Retired),
            },
        )
        .await
        .expect("create");
    let still_retired = desk
        .assign_equipment(Some(&cast.admin), retired.id, None)
        .await
        .expect("unassign");
    assert_eq!(still_retired.status, EquipmentStatus::Retired);
    assert!(still_retired.assignment_consistent());
}

#[tokio::test]
async fn creating_as_assigned_is_rejected() {
    let desk = desk();
    let cast = cast(&desk).await;

    let result = desk
        .create_equipment(
            Some(&cast.support),
            NewEquipment {
                details: EquipmentDetails::new("Laptop", EquipmentType::Laptop),
                status: Some(EquipmentStatus::Assigned),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(HelpdeskError::ValidationFailed { field: "status", .. })
    ));
}

#[tokio::test]
async fn assigning_to_unknown_actor_fails() {
    let desk = desk();
    let cast = cast(&desk).await;
    let equipment = laptop(&desk, &cast.support, "Dell XPS", None).await;

    let result = desk
        .assign_equipment(Some(&cast.support), equipment.id, Some(ActorId(42)))
        .await;

    assert_eq!(result, Err(HelpdeskError::ActorNotFound { id: 42 }));
    let stored = desk
        .view_equipment(Some(&cast.support), equipment.id)
        .await
        .expect("view");
    assert_eq!(stored, equipment);
}

#[tokio::test]
async fn missing_equipment_is_not_found() {
    let desk = desk();
    let cast = cast(&desk).await;

    let result = desk
        .assign_equipment(Some(&cast.support), EquipmentId(3), None)
        .await;

    assert_eq!(
        result,
        Err(HelpdeskError::NotFound {
            entity: "equipment",
            id: 3
        })
    );
}

#[tokio::test]
async fn update_leaves_status_and_holder_alone() {
    let desk = desk();
    let cast = cast(&desk).await;
    let equipment = laptop(&desk, &cast.support, "Dell XPS", None).await;
    let assigned = desk
        .assign_equipment(Some(&cast.support), equipment.id, Some(cast.employee1.id))
        .await
        .expect("assign");

    let mut details = assigned.details();
    details.notes = Some("New battery".to_string());
    let updated = desk
        .update_equipment(Some(&cast.support), equipment.id, details)
        .await
        .expect("update");

    assert_eq!(updated.status, EquipmentStatus::Assigned);
    assert_eq!(updated.assigned_to, Some(cast.employee1.id));
    assert_eq!(updated.notes.as_deref(), Some("New battery"));
}

#[tokio::test]
async fn lists_are_sorted_by_name_and_filtered() {
    let desk = desk();
    let cast = cast(&desk).await;
    let printer = laptop(&desk, &cast.support, "Printer", None).await;
    let _dell = laptop(&desk, &cast.support, "Dell", None).await;
    let _old = desk
        .create_equipment(
            Some(&cast.support),
            NewEquipment {
                details: EquipmentDetails::new("Apple II", EquipmentType::Desktop),
                status: Some(EquipmentStatus::Retired),
            },
        )
        .await
        .expect("create");

    let names = |items: Vec<Equipment>| items.into_iter().map(|e| e.name).collect::<Vec<_>>();

    let all = desk.list_equipment(Some(&cast.support)).await.expect("list");
    assert_eq!(names(all), vec!["Apple II", "Dell", "Printer"]);

    let linkable = desk
        .list_linkable_equipment(Some(&cast.employee1))
        .await
        .expect("linkable");
    assert_eq!(names(linkable), vec!["Dell", "Printer"]);

    desk.assign_equipment(Some(&cast.support), printer.id, Some(cast.employee2.id))
        .await
        .expect("assign");
    let held = desk
        .equipment_assigned_to(Some(&cast.admin), cast.employee2.id)
        .await
        .expect("held");
    assert_eq!(names(held), vec!["Printer"]);
}
