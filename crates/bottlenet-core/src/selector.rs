use bottlenet_types::Id;
use bottlenet_types::models::User;
use rand::Rng;
use tracing::debug;

use crate::error::{BottleError, Result};
use crate::gateway::{Bounded, Gateway};

/// Picks a uniformly random user, optionally leaving one out.
///
/// Count the eligible users, draw an offset in `[0, count)`, then fetch the
/// user at that offset in store order. Read-only.
pub struct RecipientSelector<G> {
    store: Bounded<G>,
}

impl<G> Clone for RecipientSelector<G> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<G: Gateway> RecipientSelector<G> {
    pub fn new(store: Bounded<G>) -> Self {
        Self { store }
    }

    pub async fn pick(&self, exclude: Option<Id>) -> Result<User> {
        let count = self
            .store
            .call("count_users", move |g| g.count_users(exclude.as_ref()))
            .await?;

        if count == 0 {
            return Err(BottleError::NoUsersAvailable);
        }

        let offset = rand::rng().random_range(0..count);
        debug!(
            "Picking user {} of {} (excluding {:?})",
            offset,
            count,
            exclude.map(|id| id.to_hex())
        );

        self.store
            .call("user_at", move |g| g.user_at(exclude.as_ref(), offset))
            .await?
            .ok_or(BottleError::NoUsersAvailable)
    }
}
