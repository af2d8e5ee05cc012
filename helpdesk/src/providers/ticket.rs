//! Ticket repository trait.

use crate::error::Result;
use crate::state::{ActorId, Comment, CommentId, Ticket, TicketId};
use std::future::Future;

/// Ticket repository.
///
/// Tickets own their comments; comments are append-only.
pub trait TicketRepository: Send + Sync {
    /// Allocate the id for a new ticket.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn next_ticket_id(&self) -> impl Future<Output = Result<TicketId>> + Send;

    /// Allocate the id for a new comment.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn next_comment_id(&self) -> impl Future<Output = Result<CommentId>> + Send;

    /// Store a new ticket.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn insert_ticket(&self, ticket: &Ticket) -> impl Future<Output = Result<Ticket>> + Send;

    /// Look up a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_ticket(&self, id: TicketId) -> impl Future<Output = Result<Option<Ticket>>> + Send;

    /// All tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Tickets filed by `reporter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_tickets_by_reporter(
        &self,
        reporter: ActorId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Tickets assigned to `assignee`, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_tickets_by_assignee(
        &self,
        assignee: ActorId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Atomically read, transform and write one ticket.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No ticket has `id` → `HelpdeskError::NotFound`
    /// - `f` fails (its error is returned as is)
    /// - The backend fails
    fn update_ticket_with<F, R>(
        &self,
        id: TicketId,
        f: F,
    ) -> impl Future<Output = Result<(Ticket, R)>> + Send
    where
        F: FnOnce(Ticket) -> Result<(Ticket, R)> + Send,
        R: Send;

    /// Atomically append a comment and write the touched ticket.
    ///
    /// `f` receives the locked ticket and returns it (with its refreshed
    /// `updated_at`), the new comment, and a value for the caller. Both rows
    /// are written together or not at all.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No ticket has `ticket_id` → `HelpdeskError::NotFound`
    /// - `f` fails (its error is returned as is)
    /// - The backend fails
    fn comment_with<F, R>(
        &self,
        ticket_id: TicketId,
        f: F,
    ) -> impl Future<Output = Result<(Ticket, Comment, R)>> + Send
    where
        F: FnOnce(Ticket) -> Result<(Ticket, Comment, R)> + Send,
        R: Send;

    /// Comments on a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_comments(
        &self,
        ticket_id: TicketId,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;
}
