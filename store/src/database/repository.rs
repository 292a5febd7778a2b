//! Repository layer for the entity collections
//!
//! Each collection is one JSON array under one [`StorageKey`]. Every write
//! reads the whole array, changes it and writes the whole array back, so
//! two writers interleaving on the same collection can lose an update.
//! There is no version check to detect that.

use crate::clock::Clock;
use crate::database::models::{
    Complaint, ComplaintQuery, ComplaintStatus, ComplaintUpdate, User, UserUpdate,
};
use crate::storage::{KvStore, StorageKey};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// A record kept in a repository collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Typed partial update accepted by [`Repository::update`]
    type Update: Send;

    const STORAGE_KEY: StorageKey;

    fn id(&self) -> &str;

    fn apply_update(&mut self, update: Self::Update, now: DateTime<Utc>);
}

impl Entity for User {
    type Update = UserUpdate;

    const STORAGE_KEY: StorageKey = StorageKey::Users;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_update(&mut self, update: UserUpdate, _now: DateTime<Utc>) {
        update.apply_to(self);
    }
}

impl Entity for Complaint {
    type Update = ComplaintUpdate;

    const STORAGE_KEY: StorageKey = StorageKey::Complaints;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_update(&mut self, update: ComplaintUpdate, now: DateTime<Utc>) {
        update.apply_to(self, now);
    }
}

/// CRUD over one entity collection
pub struct Repository<T: Entity> {
    store: KvStore,
    clock: Arc<dyn Clock>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            _entity: PhantomData,
        }
    }
}

pub type UserRepository = Repository<User>;
pub type ComplaintRepository = Repository<Complaint>;

impl<T: Entity> Repository<T> {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            _entity: PhantomData,
        }
    }

    /// All readable records.
    ///
    /// A malformed record is logged and left out, and the next write of the
    /// collection drops it for good.
    pub async fn get_all(&self) -> Vec<T> {
        self.store.get_records(T::STORAGE_KEY).await
    }

    /// Replace the whole collection
    pub async fn save_all(&self, items: &[T]) -> bool {
        self.store.set(T::STORAGE_KEY, items).await
    }

    pub async fn count(&self) -> usize {
        self.get_all().await.len()
    }

    /// First record whose id equals `id`
    pub async fn get_by_id(&self, id: &str) -> Option<T> {
        self.get_all().await.into_iter().find(|item| item.id() == id)
    }

    /// Append a record. Id uniqueness is not checked here.
    pub async fn insert(&self, item: T) -> bool {
        let mut items = self.get_all().await;
        tracing::debug!("Inserting {} into {}", item.id(), T::STORAGE_KEY);
        items.push(item);
        self.save_all(&items).await
    }

    /// Merge `update` into the record with `id`.
    ///
    /// Returns `false` when no record has that id or the write fails.
    pub async fn update(&self, id: &str, update: T::Update) -> bool {
        let mut items = self.get_all().await;

        let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
            tracing::debug!("Update skipped, {} not found in {}", id, T::STORAGE_KEY);
            return false;
        };

        item.apply_update(update, self.clock.now());
        let saved = self.save_all(&items).await;

        tracing::debug!("Updated {} in {}", id, T::STORAGE_KEY);
        saved
    }

    /// Remove the record with `id`.
    ///
    /// Idempotent: deleting an id that is not present still rewrites the
    /// unchanged collection and reports `true`. Only a failed write returns
    /// `false`.
    pub async fn delete(&self, id: &str) -> bool {
        let items = self.get_all().await;
        let before = items.len();

        let remaining: Vec<T> = items.into_iter().filter(|item| item.id() != id).collect();
        if remaining.len() == before {
            tracing::debug!("Delete of absent id {} in {}", id, T::STORAGE_KEY);
        }

        self.save_all(&remaining).await
    }
}

impl Repository<Complaint> {
    /// Complaints filed by `user_id`
    pub async fn list_by_user(&self, user_id: &str) -> Vec<Complaint> {
        self.get_all()
            .await
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect()
    }

    /// Complaints matching a dashboard filter, in stored order
    pub async fn find(&self, query: &ComplaintQuery) -> Vec<Complaint> {
        self.get_all()
            .await
            .into_iter()
            .filter(|c| query.matches(c))
            .collect()
    }

    /// Record a review decision
    pub async fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
        review_notes: Option<String>,
        crime_type: Option<String>,
    ) -> bool {
        let update = ComplaintUpdate {
            status: Some(status),
            review_notes: review_notes.map(Some),
            crime_type: crime_type.map(Some),
            ..Default::default()
        };
        self.update(id, update).await
    }
}
