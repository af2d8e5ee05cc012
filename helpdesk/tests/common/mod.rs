//! Shared fixtures for the service integration tests.

#![allow(dead_code)] // Not every test file uses every fixture
#![allow(clippy::expect_used)] // Test fixtures can panic on setup failure

use helpdesk::mocks::{MockActorRepository, MockEquipmentRepository, MockTicketRepository};
use helpdesk::{Actor, Helpdesk, HelpdeskEnvironment, Ticket, NewTicket};
use helpdesk_testing::stepping_clock;
use std::sync::Arc;

pub type Desk = Helpdesk<MockActorRepository, MockEquipmentRepository, MockTicketRepository>;

/// A service over empty in-memory repositories and a clock that advances one
/// second per read.
pub fn desk() -> Desk {
    desk_with(HelpdeskEnvironment::new(Arc::new(stepping_clock())))
}

/// A service over empty in-memory repositories running with `env`.
pub fn desk_with(env: HelpdeskEnvironment) -> Desk {
    helpdesk_testing::helpers::init_test_tracing();
    Helpdesk::new(
        MockActorRepository::new(),
        MockEquipmentRepository::new(),
        MockTicketRepository::new(),
        env,
    )
}

/// The actors most tests need.
pub struct Cast {
    pub employee1: Actor,
    pub employee2: Actor,
    pub support: Actor,
    pub admin: Actor,
}

pub async fn cast(desk: &Desk) -> Cast {
    Cast {
        employee1: register(desk, "employee1", "employee").await,
        employee2: register(desk, "employee2", "employee").await,
        support: register(desk, "support", "it_support").await,
        admin: register(desk, "admin", "admin").await,
    }
}

pub async fn register(desk: &Desk, username: &str, role: &str) -> Actor {
    desk.register_actor(username, &format!("{username}@example.com"), role)
        .await
        .expect("register actor")
}

pub async fn file_ticket(desk: &Desk, reporter: &Actor, title: &str) -> Ticket {
    desk.create_ticket(Some(reporter), NewTicket::new(title, "Something is wrong"))
        .await
        .expect("create ticket")
}
