//! Actor repository trait.

use crate::error::Result;
use crate::state::{Actor, ActorId, Role};
use std::future::Future;

/// Actor repository.
///
/// Actors are created by the registration flow and never modified.
pub trait ActorRepository: Send + Sync {
    /// Allocate the id for a new actor.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn next_actor_id(&self) -> impl Future<Output = Result<ActorId>> + Send;

    /// Store a new actor.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Username or email is taken → `HelpdeskError::DuplicateActor`
    /// - The backend fails
    fn insert_actor(&self, actor: &Actor) -> impl Future<Output = Result<Actor>> + Send;

    /// Look up an actor by id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_actor(&self, id: ActorId) -> impl Future<Output = Result<Option<Actor>>> + Send;

    /// Look up an actor by username.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_actor_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Actor>>> + Send;

    /// Actors holding any of `roles`, by username ascending.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_actors_by_roles(
        &self,
        roles: &[Role],
    ) -> impl Future<Output = Result<Vec<Actor>>> + Send;
}
