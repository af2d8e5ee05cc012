//! Helpdesk demo.
//!
//! Walks through the ticket and equipment lifecycle on the in-memory
//! repositories, logging each step:
//!
//! ```bash
//! RUST_LOG=helpdesk=debug cargo run --bin helpdesk-demo
//! ```

use helpdesk::mocks::{MockActorRepository, MockEquipmentRepository, MockTicketRepository};
use helpdesk::{
    metrics, telemetry, EquipmentDetails, EquipmentType, Helpdesk, HelpdeskConfig,
    HelpdeskEnvironment, NewEquipment, NewTicket, Priority, TicketChanges, TicketStatus,
};
use helpdesk_core::environment::SystemClock;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = HelpdeskConfig::from_env();
    telemetry::init_tracing(&config.log_level);
    metrics::register_metrics();

    info!(
        title_max_chars = config.title_max_chars,
        comment_max_chars = config.comment_max_chars,
        "Starting helpdesk demo"
    );

    let desk = Helpdesk::new(
        MockActorRepository::new(),
        MockEquipmentRepository::new(),
        MockTicketRepository::new(),
        HelpdeskEnvironment::from_config(&config, Arc::new(SystemClock)),
    );

    // Actors
    let emma = desk.register_actor("emma", "emma@example.com", "employee").await?;
    let bob = desk.register_actor("bob", "bob@example.com", "employee").await?;
    let sam = desk.register_actor("sam", "sam@example.com", "it_support").await?;
    let ada = desk.register_actor("ada", "ada@example.com", "admin").await?;

    let staff = desk.staff_directory(Some(&ada)).await?;
    info!(staff = ?staff.iter().map(|a| a.username.as_str()).collect::<Vec<_>>(), "Staff directory");

    // Equipment: assign, then take back
    let laptop = desk
        .create_equipment(
            Some(&sam),
            NewEquipment::from(
                EquipmentDetails::new("Dell XPS 13", EquipmentType::Laptop).with_serial("SN-1001"),
            ),
        )
        .await?;
    let laptop = desk.assign_equipment(Some(&sam), laptop.id, Some(emma.id)).await?;
    info!(status = laptop.status.as_str(), holder = ?laptop.assigned_to, "Laptop issued");

    let held = desk.equipment_assigned_to(Some(&sam), emma.id).await?;
    info!(count = held.len(), "Equipment held by emma");

    let laptop = desk.assign_equipment(Some(&sam), laptop.id, None).await?;
    info!(status = laptop.status.as_str(), holder = ?laptop.assigned_to, "Laptop returned");

    let duplicate = desk
        .create_equipment(
            Some(&sam),
            NewEquipment::from(
                EquipmentDetails::new("Another laptop", EquipmentType::Laptop).with_serial("SN-1001"),
            ),
        )
        .await;
    if let Err(err) = duplicate {
        warn!(error = %err, "Duplicate serial rejected");
    }

    // Ticket lifecycle
    let linkable = desk.list_linkable_equipment(Some(&emma)).await?;
    info!(count = linkable.len(), "Equipment emma can link");

    let ticket = desk
        .create_ticket(
            Some(&emma),
            NewTicket::new("PC Broken", "The laptop will not boot")
                .with_priority(Priority::High)
                .with_equipment(laptop.id),
        )
        .await?;
    info!(ticket_id = %ticket.id, status = ticket.status.as_str(), "Ticket filed");

    let ticket = desk
        .update_ticket(
            Some(&sam),
            ticket.id,
            TicketChanges::from(&ticket)
                .with_status(TicketStatus::InProgress)
                .with_assignee(Some(sam.id)),
        )
        .await?;
    desk.add_comment(Some(&emma), ticket.id, "It beeps three times on power-up").await?;
    desk.add_comment(Some(&sam), ticket.id, "Replacing the RAM").await?;

    let ticket = desk
        .update_ticket(
            Some(&sam),
            ticket.id,
            TicketChanges::from(&ticket).with_status(TicketStatus::Resolved),
        )
        .await?;
    info!(resolved_at = ?ticket.resolved_at, "Ticket resolved");

    let ticket = desk
        .update_ticket(
            Some(&ada),
            ticket.id,
            TicketChanges::from(&ticket).with_status(TicketStatus::InProgress),
        )
        .await?;
    info!(resolved_at = ?ticket.resolved_at, "Ticket reopened");

    // Visibility
    if let Err(err) = desk.view_ticket(Some(&bob), ticket.id).await {
        warn!(error = %err, "bob cannot see emma's ticket");
    }
    let detail = desk.view_ticket(Some(&emma), ticket.id).await?;
    info!(comments = detail.comments.len(), "emma sees her ticket");

    let queue = desk.tickets_assigned_to_me(Some(&sam)).await?;
    info!(count = queue.len(), "sam's queue");
    info!(
        emma = desk.list_tickets(Some(&emma)).await?.len(),
        bob = desk.list_tickets(Some(&bob)).await?.len(),
        sam = desk.list_tickets(Some(&sam)).await?.len(),
        "Visible tickets per actor"
    );

    info!("Demo finished");
    Ok(())
}
