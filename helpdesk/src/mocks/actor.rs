//! Mock actor repository for testing.

use super::lock_failed;
use crate::error::{HelpdeskError, Result};
use crate::providers::ActorRepository;
use crate::state::{Actor, ActorId, Role};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Actors {
    last_id: i64,
    records: BTreeMap<ActorId, Actor>,
}

/// Mock actor repository.
#[derive(Debug, Clone, Default)]
pub struct MockActorRepository {
    actors: Arc<Mutex<Actors>>,
}

impl MockActorRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored actors (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn actor_count(&self) -> Result<usize> {
        Ok(self.actors.lock().map_err(|_| lock_failed())?.records.len())
    }
}

fn by_username(mut actors: Vec<Actor>) -> Vec<Actor> {
    actors.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
    actors
}

impl ActorRepository for MockActorRepository {
    fn next_actor_id(&self) -> impl Future<Output = Result<ActorId>> + Send {
        let actors = Arc::clone(&self.actors);

        async move {
            let mut guard = actors.lock().map_err(|_| lock_failed())?;
            guard.last_id += 1;
            Ok(ActorId(guard.last_id))
        }
    }

    fn insert_actor(&self, actor: &Actor) -> impl Future<Output = Result<Actor>> + Send {
        let actors = Arc::clone(&self.actors);
        let actor = actor.clone();

        async move {
            let mut guard = actors.lock().map_err(|_| lock_failed())?;

            for existing in guard.records.values() {
                if existing.username == actor.username {
                    return Err(HelpdeskError::DuplicateActor {
                        field: "username",
                        value: actor.username,
                    });
                }
                if existing.email == actor.email {
                    return Err(HelpdeskError::DuplicateActor {
                        field: "email",
                        value: actor.email,
                    });
                }
            }
            if guard.records.contains_key(&actor.id) {
                return Err(HelpdeskError::Storage(format!("actor {} already exists", actor.id)));
            }

            guard.last_id = guard.last_id.max(actor.id.get());
            guard.records.insert(actor.id, actor.clone());
            Ok(actor)
        }
    }

    fn find_actor(&self, id: ActorId) -> impl Future<Output = Result<Option<Actor>>> + Send {
        let actors = Arc::clone(&self.actors);

        async move {
            let guard = actors.lock().map_err(|_| lock_failed())?;
            Ok(guard.records.get(&id).cloned())
        }
    }

    fn find_actor_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Actor>>> + Send {
        let actors = Arc::clone(&self.actors);
        let username = username.to_string();

        async move {
            let guard = actors.lock().map_err(|_| lock_failed())?;
            Ok(guard
                .records
                .values()
                .find(|actor| actor.username == username)
                .cloned())
        }
    }

    fn find_actors_by_roles(
        &self,
        roles: &[Role],
    ) -> impl Future<Output = Result<Vec<Actor>>> + Send {
        let actors = Arc::clone(&self.actors);
        let roles = roles.to_vec();

        async move {
            let guard = actors.lock().map_err(|_| lock_failed())?;
            Ok(by_username(
                guard
                    .records
                    .values()
                    .filter(|actor| roles.contains(&actor.role))
                    .cloned()
                    .collect(),
            ))
        }
    }
}
