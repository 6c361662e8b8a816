//! Repository trait implementations over [`Collection`].

use std::cmp::Reverse;

use async_trait::async_trait;

use super::{Collection, UniqueIndex};
use crate::domain::services::Effect;
use crate::domain::value_objects::{Page, PageRequest};
use crate::domain::{
    Club, ClubFilter, ClubRepository, Event, EventFilter, EventRepository, Listing,
    ListingFilter, ListingRepository, Post, PostFilter, PostRepository, SortOrder, User,
    UserFilter, UserRepository,
};
use crate::shared::error::AppError;

// ============================================================================
// Users
// ============================================================================

pub struct MemoryUserRepository {
    users: Collection<User>,
    emails: UniqueIndex,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self {
            users: Collection::new("User"),
            emails: UniqueIndex::new("A user with this email already exists"),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.get(id))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        Ok(self.users.get_many(ids))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self.users.find(|u| u.email.to_lowercase() == email))
    }

    async fn search(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, AppError> {
        Ok(self.users.page(
            |u| filter.matches(u),
            |u| Reverse((u.created_at, u.id)),
            page,
        ))
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        self.emails
            .claim(user.id, &user.email, None, || self.users.insert(user.id, user.clone()))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        // Email is immutable after signup, so the index is untouched.
        self.users.modify(user.id, |stored| *stored = user.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let removed = self.users.remove(id)?;
        self.emails.release(&removed.email);
        Ok(())
    }
}

// ============================================================================
// Events
// ============================================================================

pub struct MemoryEventRepository {
    events: Collection<Event>,
}

impl Default for MemoryEventRepository {
    fn default() -> Self {
        Self {
            events: Collection::new("Event"),
        }
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.events.get(id))
    }

    async fn search(&self, filter: &EventFilter, page: PageRequest) -> Result<Page<Event>, AppError> {
        let page = match filter.sort {
            SortOrder::Ascending => {
                self.events
                    .page(|e| filter.matches(e), |e| (e.start_time, e.id), page)
            }
            SortOrder::Descending => self.events.page(
                |e| filter.matches(e),
                |e| Reverse((e.start_time, e.id)),
                page,
            ),
        };
        Ok(page)
    }

    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        self.events.insert(event.id, event.clone())
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        // Attendance is owned by `apply`; keep the stored set.
        self.events.modify(event.id, |stored| {
            let attendees = std::mem::take(&mut stored.attendees);
            *stored = Event {
                attendees,
                ..event.clone()
            };
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.events.remove(id).map(|_| ())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Event, AppError> {
        self.events.apply(id, effects)
    }

    async fn count_hosted(&self, user_id: i64) -> Result<u64, AppError> {
        Ok(self.events.count(|e| e.is_host(user_id)))
    }

    async fn count_attending(&self, user_id: i64) -> Result<u64, AppError> {
        Ok(self.events.count(|e| e.is_attendee(user_id)))
    }
}

// ============================================================================
// Clubs
// ============================================================================

pub struct MemoryClubRepository {
    clubs: Collection<Club>,
    names: UniqueIndex,
}

impl Default for MemoryClubRepository {
    fn default() -> Self {
        Self {
            clubs: Collection::new("Club"),
            names: UniqueIndex::new("A club with this name already exists"),
        }
    }
}

#[async_trait]
impl ClubRepository for MemoryClubRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Club>, AppError> {
        Ok(self.clubs.get(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Club>, AppError> {
        let name = name.trim().to_lowercase();
        Ok(self.clubs.find(|c| c.name.to_lowercase() == name))
    }

    async fn search(&self, filter: &ClubFilter, page: PageRequest) -> Result<Page<Club>, AppError> {
        Ok(self.clubs.page(
            |c| filter.matches(c),
            |c| (c.name.to_lowercase(), c.id),
            page,
        ))
    }

    async fn create(&self, club: &Club) -> Result<Club, AppError> {
        self.names
            .claim(club.id, &club.name, None, || self.clubs.insert(club.id, club.clone()))
    }

    async fn update(&self, club: &Club) -> Result<Club, AppError> {
        let previous = self
            .clubs
            .get(club.id)
            .ok_or_else(|| AppError::NotFound("Club not found".into()))?;

        self.names.claim(club.id, &club.name, Some(&previous.name), || {
            self.clubs.modify(club.id, |stored| {
                stored.name = club.name.clone();
                stored.description = club.description.clone();
                stored.updated_at = club.updated_at;
            })
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let removed = self.clubs.remove(id)?;
        self.names.release(&removed.name);
        Ok(())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Club, AppError> {
        self.clubs.apply(id, effects)
    }

    async fn count_memberships(&self, user_id: i64) -> Result<u64, AppError> {
        Ok(self.clubs.count(|c| c.is_member(user_id)))
    }

    async fn count_officer_positions(&self, user_id: i64) -> Result<u64, AppError> {
        Ok(self.clubs.count(|c| c.is_officer(user_id)))
    }
}

// ============================================================================
// Listings
// ============================================================================

pub struct MemoryListingRepository {
    listings: Collection<Listing>,
}

impl Default for MemoryListingRepository {
    fn default() -> Self {
        Self {
            listings: Collection::new("Listing"),
        }
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Listing>, AppError> {
        Ok(self.listings.get(id))
    }

    async fn search(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, AppError> {
        Ok(self.listings.page(
            |l| filter.matches(l),
            |l| Reverse((l.created_at, l.id)),
            page,
        ))
    }

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError> {
        self.listings.insert(listing.id, listing.clone())
    }

    async fn update(&self, listing: &Listing) -> Result<Listing, AppError> {
        self.listings
            .modify(listing.id, |stored| *stored = listing.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.listings.remove(id).map(|_| ())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Listing, AppError> {
        self.listings.apply(id, effects)
    }

    async fn count_active(&self, seller_id: i64) -> Result<u64, AppError> {
        Ok(self
            .listings
            .count(|l| l.is_seller(seller_id) && l.is_available))
    }
}

// ============================================================================
// Posts
// ============================================================================

pub struct MemoryPostRepository {
    posts: Collection<Post>,
}

impl Default for MemoryPostRepository {
    fn default() -> Self {
        Self {
            posts: Collection::new("Post"),
        }
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.posts.get(id))
    }

    async fn search(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, AppError> {
        Ok(self.posts.page(
            |p| filter.matches(p),
            |p| Reverse((p.created_at, p.id)),
            page,
        ))
    }

    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        self.posts.insert(post.id, post.clone())
    }

    async fn update(&self, post: &Post) -> Result<Post, AppError> {
        // Likes and comments are owned by `apply`.
        self.posts.modify(post.id, |stored| {
            stored.content = post.content.clone();
            stored.image_url = post.image_url.clone();
            stored.updated_at = post.updated_at;
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.posts.remove(id).map(|_| ())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Post, AppError> {
        self.posts.apply(id, effects)
    }

    async fn count_by_author(&self, author_id: i64) -> Result<u64, AppError> {
        Ok(self.posts.count(|p| p.author_id == author_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::SetField;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn user(id: i64, email: &str) -> User {
        User {
            id,
            name: format!("User {}", id),
            email: email.into(),
            ..Default::default()
        }
    }

    fn event(id: i64, hours_from_now: i64) -> Event {
        let start = Utc::now() + Duration::hours(hours_from_now);
        Event {
            id,
            title: format!("Event {}", id),
            description: "desc".into(),
            location: None,
            coordinates: None,
            start_time: start,
            end_time: start + Duration::hours(1),
            host_id: 1,
            attendees: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_case_insensitive() {
        let repo = MemoryUserRepository::default();
        repo.create(&user(1, "ada@campus.edu")).await.unwrap();

        let err = repo.create(&user(2, "ADA@campus.edu")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        repo.delete(1).await.unwrap();
        repo.create(&user(2, "ada@campus.edu")).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_attends_add_user_once() {
        let repo = Arc::new(MemoryEventRepository::default());
        repo.create(&event(1, 24)).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.apply(1, &[Effect::add(SetField::Attendees, 42)]).await
                })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                applied += 1;
            }
        }

        assert_eq!(applied, 1);
        assert_eq!(repo.find_by_id(1).await.unwrap().unwrap().attendees, vec![42]);
    }

    #[tokio::test]
    async fn test_event_update_keeps_attendees() {
        let repo = MemoryEventRepository::default();
        repo.create(&event(1, 24)).await.unwrap();
        repo.apply(1, &[Effect::add(SetField::Attendees, 5)]).await.unwrap();

        let mut changed = event(1, 48);
        changed.title = "Moved".into();
        let updated = repo.update(&changed).await.unwrap();

        assert_eq!(updated.title, "Moved");
        assert_eq!(updated.attendees, vec![5]);
    }

    #[tokio::test]
    async fn test_event_search_sorts_by_start_time() {
        let repo = MemoryEventRepository::default();
        for (id, hours) in [(1, 30), (2, 10), (3, 20)] {
            repo.create(&event(id, hours)).await.unwrap();
        }

        let asc = repo
            .search(&EventFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(asc.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        let desc = repo
            .search(
                &EventFilter {
                    sort: SortOrder::Descending,
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(desc.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_club_rename_releases_old_name() {
        let repo = MemoryClubRepository::default();
        let club = Club {
            id: 1,
            name: "Chess".into(),
            description: None,
            members: vec![],
            officers: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        repo.create(&club).await.unwrap();

        let renamed = Club {
            name: "Go".into(),
            ..club.clone()
        };
        repo.update(&renamed).await.unwrap();

        let other = Club {
            id: 2,
            ..club
        };
        repo.create(&other).await.unwrap();
        assert!(repo.find_by_name("go").await.unwrap().is_some());
    }
}
