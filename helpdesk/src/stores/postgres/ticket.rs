//! PostgreSQL ticket repository.

use super::{column, db_error, next_id, parsed};
use crate::constants::entity;
use crate::error::{HelpdeskError, Result};
use crate::providers::TicketRepository;
use crate::state::{ActorId, Comment, CommentId, EquipmentId, Ticket, TicketId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

const COLUMNS: &str = "id, title, description, status, priority, reporter_id, assignee_id, \
     equipment_id, created_at, updated_at, resolved_at";

/// PostgreSQL ticket repository.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, filter: &str, bind: Option<i64>) -> Result<Vec<Ticket>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM tickets {filter} ORDER BY created_at DESC, id DESC"
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list tickets"))?;

        rows.iter().map(ticket_from_row).collect()
    }

    /// Begin a transaction and lock ticket `id`.
    ///
    /// The transaction rolls back when dropped uncommitted.
    async fn lock(&self, id: TicketId) -> Result<(Transaction<'static, Postgres>, Ticket)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tickets WHERE id = $1 FOR UPDATE"))
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock ticket"))?;

        let Some(row) = row else {
            return Err(HelpdeskError::NotFound {
                entity: entity::TICKET,
                id: id.get(),
            });
        };

        let ticket = ticket_from_row(&row)?;
        Ok((tx, ticket))
    }
}

fn ticket_from_row(row: &PgRow) -> Result<Ticket> {
    Ok(Ticket {
        id: TicketId(column(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        status: parsed(row, "status")?,
        priority: parsed(row, "priority")?,
        reporter: ActorId(column(row, "reporter_id")?),
        assignee: column::<Option<i64>>(row, "assignee_id")?.map(ActorId),
        equipment: column::<Option<i64>>(row, "equipment_id")?.map(EquipmentId),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        resolved_at: column(row, "resolved_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: CommentId(column(row, "id")?),
        ticket: TicketId(column(row, "ticket_id")?),
        author: ActorId(column(row, "author_id")?),
        body: column(row, "body")?,
        created_at: column(row, "created_at")?,
    })
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

async fn write_ticket(conn: &mut PgConnection, ticket: &Ticket) -> Result<()> {
    sqlx::query(
        r"
        UPDATE tickets
        SET title = $2,
            description = $3,
            status = $4,
            priority = $5,
            assignee_id = $6,
            equipment_id = $7,
            updated_at = $8,
            resolved_at = $9
        WHERE id = $1
        ",
    )
    .bind(ticket.id.get())
    .bind(&ticket.title)
    .bind(&ticket.description)
    .bind(ticket.status.as_str())
    .bind(ticket.priority.as_str())
    .bind(ticket.assignee.map(ActorId::get))
    .bind(ticket.equipment.map(EquipmentId::get))
    .bind(ticket.updated_at)
    .bind(ticket.resolved_at)
    .execute(conn)
    .await
    .map_err(db_error("Failed to update ticket"))?;

    Ok(())
}

impl TicketRepository for PostgresTicketRepository {
    async fn next_ticket_id(&self) -> Result<TicketId> {
        next_id(&self.pool, "tickets").await.map(TicketId)
    }

    async fn next_comment_id(&self) -> Result<CommentId> {
        next_id(&self.pool, "comments").await.map(CommentId)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        sqlx::query(&format!(
            "INSERT INTO tickets ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(ticket.id.get())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.reporter.get())
        .bind(ticket.assignee.map(ActorId::get))
        .bind(ticket.equipment.map(EquipmentId::get))
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .bind(ticket.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert ticket"))?;

        Ok(ticket.clone())
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tickets WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get ticket"))?;

        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.list_where("", None).await
    }

    async fn find_tickets_by_reporter(&self, reporter: ActorId) -> Result<Vec<Ticket>> {
        self.list_where("WHERE reporter_id = $1", Some(reporter.get()))
            .await
    }

    async fn find_tickets_by_assignee(&self, assignee: ActorId) -> Result<Vec<Ticket>> {
        self.list_where("WHERE assignee_id = $1", Some(assignee.get()))
            .await
    }

    async fn update_ticket_with<F, R>(&self, id: TicketId, f: F) -> Result<(Ticket, R)>
    where
        F: FnOnce(Ticket) -> Result<(Ticket, R)> + Send,
        R: Send,
    {
        let (mut tx, current) = self.lock(id).await?;

        // Dropping `tx` on any early return below rolls back
        let (updated, extra) = f(current)?;
        check_same_ticket(id, &updated)?;
        write_ticket(&mut tx, &updated).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok((updated, extra))
    }

    async fn comment_with<F, R>(&self, ticket_id: TicketId, f: F) -> Result<(Ticket, Comment, R)>
    where
        F: FnOnce(Ticket) -> Result<(Ticket, Comment, R)> + Send,
        R: Send,
    {
        let (mut tx, current) = self.lock(ticket_id).await?;

        let (ticket, comment, extra) = f(current)?;
        check_same_ticket(ticket_id, &ticket)?;
        if comment.ticket != ticket_id {
            return Err(HelpdeskError::Internal(format!(
                "comment for ticket {ticket_id} points at ticket {}",
                comment.ticket
            )));
        }

        sqlx::query(
            r"
            INSERT INTO comments (id, ticket_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(comment.id.get())
        .bind(comment.ticket.get())
        .bind(comment.author.get())
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert comment"))?;

        write_ticket(&mut tx, &ticket).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        Ok((ticket, comment, extra))
    }

    async fn find_comments(&self, ticket_id: TicketId) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r"
            SELECT id, ticket_id, author_id, body, created_at
            FROM comments
            WHERE ticket_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(ticket_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list comments"))?;

        rows.iter().map(comment_from_row).collect()
    }
}
