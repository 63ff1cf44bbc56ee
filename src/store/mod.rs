//! Typed concurrent storage for products and orders.
//!
//! Every operation is individually atomic. The store enforces no invariant
//! that spans more than one call; business-level read-modify-write sequences
//! are serialized by the order pipeline, not here.

mod entity;

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{Order, Product};
use crate::error::StoreError;

/// Trait that any domain entity must implement to be kept in an [`EntityStore`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Ord + Clone + Send + Sync + Display + Debug;

    /// Human readable name of the entity kind, used in lookup errors.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

pub struct EntityStore<T: Entity> {
    items: DashMap<T::Id, T>,
}

pub type ProductStore = EntityStore<Product>;
pub type OrderStore = EntityStore<Order>;

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    pub fn find(&self, id: &T::Id) -> Result<T, StoreError> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            })
    }

    pub fn exists(&self, id: &T::Id) -> bool {
        self.items.contains_key(id)
    }

    pub fn upsert(&self, item: T) {
        self.items.insert(item.id().clone(), item);
    }

    /// Applies `change` to the stored entity while holding its entry, so no
    /// other writer can interleave. The entity is left untouched when
    /// `change` fails. Returns the updated entity.
    pub fn update<E>(&self, id: &T::Id, change: impl FnOnce(&mut T) -> Result<(), E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut entry = self.items.get_mut(id).ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;
        let mut next = entry.value().clone();
        change(&mut next)?;
        *entry.value_mut() = next.clone();
        Ok(next)
    }

    /// Snapshot of every entity, ordered by id.
    pub fn find_all(&self) -> Vec<T> {
        let mut all: Vec<T> = self.items.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> FromIterator<T> for EntityStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let store = Self::new();
        for item in iter {
            store.upsert(item);
        }
        store
    }
}

/// Product and order stores shared between the clients and the pipeline.
#[derive(Clone, Default)]
pub struct Stores {
    pub products: Arc<ProductStore>,
    pub orders: Arc<OrderStore>,
}

impl Stores {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Arc::new(products.into_iter().collect()),
            orders: Arc::new(OrderStore::new()),
        }
    }
}
