//! In-Memory Store
//!
//! Process-local implementations of the repository traits, used for local
//! runs (`storage.backend = "memory"`) and the HTTP test suite. Each
//! collection is a `DashMap` keyed by document ID. Relationship effects are
//! applied while holding the document's entry lock, which gives the same
//! single-document atomicity as the row lock in Postgres.

mod repositories;

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::services::{apply_effects, Document, Effect};
use crate::domain::value_objects::{Page, PageRequest};
use crate::shared::error::AppError;

pub use repositories::{
    MemoryClubRepository, MemoryEventRepository, MemoryListingRepository, MemoryPostRepository,
    MemoryUserRepository,
};

/// One collection of documents.
pub(crate) struct Collection<T> {
    docs: DashMap<i64, T>,
    kind: &'static str,
}

impl<T: Clone> Collection<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            docs: DashMap::new(),
            kind,
        }
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.kind))
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.docs.get(&id).map(|doc| doc.clone())
    }

    pub fn get_many(&self, ids: &[i64]) -> Vec<T> {
        ids.iter().filter_map(|id| self.get(*id)).collect()
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.docs
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }

    pub fn count(&self, predicate: impl Fn(&T) -> bool) -> u64 {
        self.docs.iter().filter(|entry| predicate(entry.value())).count() as u64
    }

    pub fn insert(&self, id: i64, doc: T) -> Result<T, AppError> {
        match self.docs.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(AppError::Conflict(format!("{} already exists", self.kind)))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(doc.clone());
                Ok(doc)
            }
        }
    }

    /// Replace a stored document with `update(stored)`.
    pub fn modify(&self, id: i64, update: impl FnOnce(&mut T)) -> Result<T, AppError> {
        let mut entry = self.docs.get_mut(&id).ok_or_else(|| self.not_found())?;
        update(entry.value_mut());
        Ok(entry.value().clone())
    }

    pub fn remove(&self, id: i64) -> Result<T, AppError> {
        self.docs
            .remove(&id)
            .map(|(_, doc)| doc)
            .ok_or_else(|| self.not_found())
    }

    /// Filter, order and page the collection.
    pub fn page<K: Ord>(
        &self,
        matches: impl Fn(&T) -> bool,
        sort_key: impl Fn(&T) -> K,
        page: PageRequest,
    ) -> Page<T> {
        let mut hits: Vec<T> = self
            .docs
            .iter()
            .filter(|entry| matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by_key(|doc| sort_key(doc));

        let total = hits.len() as u64;
        let items = hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Page::new(items, total)
    }
}

impl<T: Clone + Document> Collection<T> {
    /// Apply effects to one document under its entry lock. A failing effect
    /// list leaves the stored document untouched.
    pub fn apply(&self, id: i64, effects: &[Effect]) -> Result<T, AppError> {
        let mut entry = self.docs.get_mut(&id).ok_or_else(|| self.not_found())?;
        let mut scratch = entry.value().clone();
        if apply_effects(&mut scratch, effects, Utc::now())? {
            *entry.value_mut() = scratch.clone();
        }
        Ok(scratch)
    }
}

/// Case-insensitive unique index (user emails, club names).
pub(crate) struct UniqueIndex {
    keys: Mutex<HashMap<String, i64>>,
    conflict: &'static str,
}

impl UniqueIndex {
    pub fn new(conflict: &'static str) -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            conflict,
        }
    }

    fn key(value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// Claim `value` for document `id`, releasing `previous` if it was held.
    /// `write` runs while the index is locked so claim and store stay in step.
    pub fn claim<T>(
        &self,
        id: i64,
        value: &str,
        previous: Option<&str>,
        write: impl FnOnce() -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut keys = self.keys.lock();
        let key = Self::key(value);
        if matches!(keys.get(&key), Some(owner) if *owner != id) {
            return Err(AppError::Conflict(self.conflict.into()));
        }

        let written = write()?;
        if let Some(previous) = previous {
            let old = Self::key(previous);
            if old != key {
                keys.remove(&old);
            }
        }
        keys.insert(key, id);
        Ok(written)
    }

    pub fn release(&self, value: &str) {
        self.keys.lock().remove(&Self::key(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::{leave_club, toggle_like, SetField};
    use crate::domain::{Club, Post};

    fn post(id: i64) -> Post {
        Post {
            id,
            content: "hello".into(),
            author_id: 1,
            image_url: None,
            likes: vec![],
            comments: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_failed_effects_leave_document_untouched() {
        let posts = Collection::new("Post");
        posts.insert(1, post(1)).unwrap();
        posts.apply(1, &[Effect::add(SetField::Likes, 9)]).unwrap();

        let err = posts
            .apply(
                1,
                &[Effect::remove(SetField::Likes, 9), Effect::add(SetField::Members, 9)],
            )
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(posts.get(1).unwrap().likes, vec![9]);
    }

    #[test]
    fn test_toggles_computed_from_one_snapshot_cancel_out() {
        let posts = Collection::new("Post");
        posts.insert(1, post(1)).unwrap();
        let snapshot = posts.get(1).unwrap();

        let first = toggle_like(&snapshot, 4);
        let second = toggle_like(&snapshot, 4);
        assert_eq!(posts.apply(1, &first).unwrap().likes, vec![4]);
        assert!(posts.apply(1, &second).unwrap().likes.is_empty());
    }

    #[test]
    fn test_second_leave_from_one_snapshot_is_not_found() {
        let clubs = Collection::new("Club");
        let now = Utc::now();
        clubs
            .insert(
                1,
                Club {
                    id: 1,
                    name: "Chess".into(),
                    description: None,
                    members: vec![3, 4],
                    officers: vec![4],
                    created_at: now,
                    updated_at: now,
                },
            )
            .unwrap();
        let snapshot = clubs.get(1).unwrap();

        let first = leave_club(&snapshot, 4).unwrap();
        let second = leave_club(&snapshot, 4).unwrap();
        clubs.apply(1, &first).unwrap();
        let err = clubs.apply(1, &second).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        let stored = clubs.get(1).unwrap();
        assert_eq!(stored.members, vec![3]);
        assert!(stored.officers.is_empty());
    }

    #[test]
    fn test_page_counts_all_matches() {
        let posts = Collection::new("Post");
        for id in 1..=25 {
            posts.insert(id, post(id)).unwrap();
        }

        let page = posts.page(|p| p.id % 2 == 1, |p| p.id, PageRequest { page: 2, limit: 5 });
        assert_eq!(page.total, 13);
        assert_eq!(page.items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![11, 13, 15, 17, 19]);
    }

    #[test]
    fn test_unique_index_is_case_insensitive() {
        let index = UniqueIndex::new("taken");
        index.claim(1, "Chess Club", None, || Ok(())).unwrap();

        let err = index.claim(2, "  chess club ", None, || Ok(())).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // The owner may keep its own name, and a rename frees the old one.
        index.claim(1, "CHESS CLUB", Some("Chess Club"), || Ok(())).unwrap();
        index.claim(1, "Go Club", Some("CHESS CLUB"), || Ok(())).unwrap();
        index.claim(2, "Chess Club", None, || Ok(())).unwrap();
    }

    #[test]
    fn test_duplicate_insert_is_conflict() {
        let posts = Collection::new("Post");
        posts.insert(1, post(1)).unwrap();
        assert!(matches!(posts.insert(1, post(1)), Err(AppError::Conflict(_))));
    }
}
