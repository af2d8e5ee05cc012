//! Mock ticket repository for testing.

use super::lock_failed;
use crate::constants::entity;
use crate::error::{HelpdeskError, Result};
use crate::providers::TicketRepository;
use crate::state::{ActorId, Comment, CommentId, Ticket, TicketId};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Tickets {
    last_ticket_id: i64,
    last_comment_id: i64,
    records: BTreeMap<TicketId, Ticket>,
    comments: Vec<Comment>,
}

impl Tickets {
    fn newest_first(&self, keep: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        let mut tickets: Vec<_> = self.records.values().filter(|t| keep(t)).cloned().collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tickets
    }

    fn locked(&self, id: TicketId) -> Result<Ticket> {
        self.records.get(&id).cloned().ok_or(HelpdeskError::NotFound {
            entity: entity::TICKET,
            id: id.get(),
        })
    }
}

fn check_same_ticket(id: TicketId, returned: &Ticket) -> Result<()> {
    if returned.id == id {
        Ok(())
    } else {
        Err(HelpdeskError::Internal(format!(
            "update of ticket {id} returned ticket {}",
            returned.id
        )))
    }
}

/// Mock ticket repository.
#[derive(Debug, Clone, Default)]
pub struct MockTicketRepository {
    tickets: Arc<Mutex<Tickets>>,
}

impl MockTicketRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored comments across all tickets (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn comment_count(&self) -> Result<usize> {
        Ok(self.tickets.lock().map_err(|_| lock_failed())?.comments.len())
    }
}

impl TicketRepository for MockTicketRepository {
    fn next_ticket_id(&self) -> impl Future<Output = Result<TicketId>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let mut guard = tickets.lock().map_err(|_| lock_failed())?;
            guard.last_ticket_id += 1;
            Ok(TicketId(guard.last_ticket_id))
        }
    }

    fn next_comment_id(&self) -> impl Future<Output = Result<CommentId>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let mut guard = tickets.lock().map_err(|_| lock_failed())?;
            guard.last_comment_id += 1;
            Ok(CommentId(guard.last_comment_id))
        }
    }

    fn insert_ticket(&self, ticket: &Ticket) -> impl Future<Output = Result<Ticket>> + Send {
        let tickets = Arc::clone(&self.tickets);
        let ticket = ticket.clone();

        async move {
            let mut guard = tickets.lock().map_err(|_| lock_failed())?;

            if guard.records.contains_key(&ticket.id) {
                return Err(HelpdeskError::Storage(format!(
                    "ticket {} already exists",
                    ticket.id
                )));
            }

            guard.last_ticket_id = guard.last_ticket_id.max(ticket.id.get());
            guard.records.insert(ticket.id, ticket.clone());
            Ok(ticket)
        }
    }

    fn find_ticket(&self, id: TicketId) -> impl Future<Output = Result<Option<Ticket>>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let guard = tickets.lock().map_err(|_| lock_failed())?;
            Ok(guard.records.get(&id).cloned())
        }
    }

    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let guard = tickets.lock().map_err(|_| lock_failed())?;
            Ok(guard.newest_first(|_| true))
        }
    }

    fn find_tickets_by_reporter(
        &self,
        reporter: ActorId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let guard = tickets.lock().map_err(|_| lock_failed())?;
            Ok(guard.newest_first(|t| t.reporter == reporter))
        }
    }

    fn find_tickets_by_assignee(
        &self,
        assignee: ActorId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let guard = tickets.lock().map_err(|_| lock_failed())?;
            Ok(guard.newest_first(|t| t.assignee == Some(assignee)))
        }
    }

    fn update_ticket_with<F, R>(
        &self,
        id: TicketId,
        f: F,
    ) -> impl Future<Output = Result<(Ticket, R)>> + Send
    where
        F: FnOnce(Ticket) -> Result<(Ticket, R)> + Send,
        R: Send,
    {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let mut guard = tickets.lock().map_err(|_| lock_failed())?;

            let (updated, extra) = f(guard.locked(id)?)?;
            check_same_ticket(id, &updated)?;

            guard.records.insert(id, updated.clone());
            Ok((updated, extra))
        }
    }

    fn comment_with<F, R>(
        &self,
        ticket_id: TicketId,
        f: F,
    ) -> impl Future<Output = Result<(Ticket, Comment, R)>> + Send
    where
        F: FnOnce(Ticket) -> Result<(Ticket, Comment, R)> + Send,
        R: Send,
    {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let mut guard = tickets.lock().map_err(|_| lock_failed())?;

            let (ticket, comment, extra) = f(guard.locked(ticket_id)?)?;
            check_same_ticket(ticket_id, &ticket)?;
            if comment.ticket != ticket_id {
                return Err(HelpdeskError::Internal(format!(
                    "comment for ticket {ticket_id} points at ticket {}",
                    comment.ticket
                )));
            }

            guard.last_comment_id = guard.last_comment_id.max(comment.id.get());
            guard.records.insert(ticket_id, ticket.clone());
            guard.comments.push(comment.clone());
            Ok((ticket, comment, extra))
        }
    }

    fn find_comments(
        &self,
        ticket_id: TicketId,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        let tickets = Arc::clone(&self.tickets);

        async move {
            let guard = tickets.lock().map_err(|_| lock_failed())?;
            let mut comments: Vec<_> = guard
                .comments
                .iter()
                .filter(|c| c.ticket == ticket_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(comments)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Priority, TicketStatus};
    use chrono::{Duration, Utc};

    fn ticket(id: i64, reporter: i64, minutes: i64) -> Ticket {
        let at = Utc::now() + Duration::minutes(minutes);
        Ticket {
            id: TicketId(id),
            title: format!("Ticket {id}"),
            description: "Broken".to_string(),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            reporter: ActorId(reporter),
            assignee: None,
            equipment: None,
            created_at: at,
            updated_at: at,
            resolved_at: None,
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_filters_by_reporter() {
        let repo = MockTicketRepository::new();
        for t in [ticket(1, 10, 0), ticket(2, 20, 1), ticket(3, 10, 2)] {
            assert!(repo.insert_ticket(&t).await.is_ok());
        }

        let all: Vec<_> = repo
            .list_tickets()
            .await
            .unwrap_or_default()
            .iter()
            .map(|t| t.id.get())
            .collect();
        assert_eq!(all, vec![3, 2, 1]);

        let mine: Vec<_> = repo
            .find_tickets_by_reporter(ActorId(10))
            .await
            .unwrap_or_default()
            .iter()
            .map(|t| t.id.get())
            .collect();
        assert_eq!(mine, vec![3, 1]);
    }

    #[tokio::test]
    async fn failed_comment_writes_neither_row() {
        let repo = MockTicketRepository::new();
        let original = ticket(1, 10, 0);
        assert!(repo.insert_ticket(&original).await.is_ok());

        let result: Result<(Ticket, Comment, ())> = repo
            .comment_with(TicketId(1), |_| Err(HelpdeskError::validation("body", "must not be empty")))
            .await;

        assert!(result.is_err());
        assert_eq!(repo.comment_count(), Ok(0));
        assert_eq!(repo.find_ticket(TicketId(1)).await, Ok(Some(original)));
    }

    #[tokio::test]
    async fn comments_come_back_oldest_first() {
        let repo = MockTicketRepository::new();
        let t = ticket(1, 10, 0);
        assert!(repo.insert_ticket(&t).await.is_ok());

        for (id, minutes) in [(1, 5), (2, 1)] {
            let result = repo
                .comment_with(TicketId(1), |ticket| {
                    let comment = Comment {
                        id: CommentId(id),
                        ticket: ticket.id,
                        author: ActorId(10),
                        body: format!("note {id}"),
                        created_at: t.created_at + Duration::minutes(minutes),
                    };
                    Ok((ticket, comment, ()))
                })
                .await;
            assert!(result.is_ok());
        }

        let ids: Vec<_> = repo
            .find_comments(TicketId(1))
            .await
            .unwrap_or_default()
            .iter()
            .map(|c| c.id.get())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
