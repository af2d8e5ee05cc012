//! PostgreSQL actor repository.

use super::{column, db_error, is_unique_violation, next_id, parsed};
use crate::error::{HelpdeskError, Result};
use crate::providers::ActorRepository;
use crate::state::{Actor, ActorId, Role};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

const SELECT_ACTOR: &str = "SELECT id, username, email, role, created_at FROM actors";

/// PostgreSQL actor repository.
#[derive(Debug, Clone)]
pub struct PostgresActorRepository {
    pool: PgPool,
}

impl PostgresActorRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn actor_from_row(row: &PgRow) -> Result<Actor> {
    Ok(Actor {
        id: ActorId(column(row, "id")?),
        username: column(row, "username")?,
        email: column(row, "email")?,
        role: parsed(row, "role")?,
        created_at: column(row, "created_at")?,
    })
}

impl ActorRepository for PostgresActorRepository {
    async fn next_actor_id(&self) -> Result<ActorId> {
        next_id(&self.pool, "actors").await.map(ActorId)
    }

    async fn insert_actor(&self, actor: &Actor) -> Result<Actor> {
        sqlx::query(
            r"
            INSERT INTO actors (id, username, email, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(actor.id.get())
        .bind(&actor.username)
        .bind(&actor.email)
        .bind(actor.role.as_str())
        .bind(actor.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("actors_username_key")) {
                return HelpdeskError::DuplicateActor {
                    field: "username",
                    value: actor.username.clone(),
                };
            }
            if is_unique_violation(&e, Some("actors_email_key")) {
                return HelpdeskError::DuplicateActor {
                    field: "email",
                    value: actor.email.clone(),
                };
            }
            HelpdeskError::Storage(format!("Failed to insert actor: {e}"))
        })?;

        Ok(actor.clone())
    }

    async fn find_actor(&self, id: ActorId) -> Result<Option<Actor>> {
        let row = sqlx::query(&format!("{SELECT_ACTOR} WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get actor"))?;

        row.as_ref().map(actor_from_row).transpose()
    }

    async fn find_actor_by_username(&self, username: &str) -> Result<Option<Actor>> {
        let row = sqlx::query(&format!("{SELECT_ACTOR} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get actor"))?;

        row.as_ref().map(actor_from_row).transpose()
    }

    async fn find_actors_by_roles(&self, roles: &[Role]) -> Result<Vec<Actor>> {
        let roles: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();

        let rows = sqlx::query(&format!(
            "{SELECT_ACTOR} WHERE role = ANY($1) ORDER BY username ASC, id ASC"
        ))
        .bind(roles)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list actors by role"))?;

        rows.iter().map(actor_from_row).collect()
    }
}
