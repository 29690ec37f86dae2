use std::{any::Any, collections::HashMap, sync::Arc};

use crate::api::{
    operations::{self, OperationDescriptor},
    types::{Device, DeviceType, Id, Software},
};

/// Identifies a cached query result: the operation name plus its serialized variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    variables: String,
}

impl CacheKey {
    /// Key of an operation without variables.
    pub fn new(op: &'static OperationDescriptor) -> Self {
        Self {
            operation: op.name,
            variables: String::new(),
        }
    }

    /// Key of an operation with the given variables.
    ///
    /// Returns `None` when the variables cannot be serialized; such results are not cached.
    pub fn with_variables<V: serde::Serialize>(op: &'static OperationDescriptor, variables: &V) -> Option<Self> {
        match serde_json::to_string(variables) {
            Ok(variables) => Some(Self {
                operation: op.name,
                variables,
            }),
            Err(error) => {
                tracing::warn!(operation = op.name, %error, "variables not serializable, result will not be cached");
                None
            }
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Entities that cached lists are reconciled by.
pub trait Identified {
    fn id(&self) -> &Id;
}

impl Identified for Device {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Identified for Software {
    fn id(&self) -> &Id {
        &self.id
    }
}

impl Identified for DeviceType {
    fn id(&self) -> &Id {
        &self.id
    }
}

/// Inserts the item or replaces the item with the same id.
pub fn upsert_by_id<T: Identified>(list: &mut Vec<T>, item: T) {
    match list.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => list.push(item),
    }
}

/// Removes all items with the given id.
pub fn remove_by_id<T: Identified>(list: &mut Vec<T>, id: &Id) {
    list.retain(|existing| existing.id() != id);
}

/// In-memory cache of query results shared by all screens.
///
/// Cloning the cache gives another handle to the same entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<parking_lot::RwLock<HashMap<CacheKey, Box<dyn Any + Send + Sync>>>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("keys", &self.entries.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a copy of the cached result, if present and of the requested type.
    pub fn get<T: Clone + 'static>(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .read()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Stores a result, overwriting any previous entry under the same key.
    pub fn insert<T: Send + Sync + 'static>(&self, key: CacheKey, value: T) {
        tracing::trace!(operation = key.operation, "caching query result");
        self.entries.write().insert(key, Box::new(value));
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drops all entries whose results the completed `mutation` makes stale.
    ///
    /// Returns the number of dropped entries.
    pub fn invalidate(&self, mutation: &OperationDescriptor) -> usize {
        self.invalidate_except(mutation, None)
    }

    /// Patches the entry under `key` in place and then drops every other entry made stale
    /// by the completed `mutation`.
    ///
    /// An entry that is missing or holds a different type is left alone. Returns `true` if the
    /// entry was patched.
    pub fn reconcile<T, F>(&self, mutation: &OperationDescriptor, key: &CacheKey, patch: F) -> bool
    where
        T: 'static,
        F: FnOnce(&mut T),
    {
        let patched = {
            let mut entries = self.entries.write();
            match entries.get_mut(key).and_then(|value| value.downcast_mut::<T>()) {
                Some(value) => {
                    patch(value);
                    true
                }
                None => false,
            }
        };

        let dropped = self.invalidate_except(mutation, patched.then_some(key));
        tracing::debug!(
            mutation = mutation.name,
            patched_entry = key.operation,
            patched,
            dropped,
            "reconciled query cache"
        );
        patched
    }

    fn invalidate_except(&self, mutation: &OperationDescriptor, keep: Option<&CacheKey>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| {
            if keep == Some(key) {
                return true;
            }
            operations::find_operation(key.operation).is_none_or(|op| !mutation.invalidates_results_of(op))
        });
        before - entries.len()
    }
}
