//! In-process store
//!
//! Selected with `database.url = "memory://"`. Enforces the same unique
//! and referential constraints as the PostgreSQL schema. Data is lost on
//! restart.

use super::{CreateNote, CreateUser, NoteStore, StoreError, StoreResult, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use technotes_shared::models::FIRST_TICKET;
use technotes_shared::{Note, User};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    notes: HashMap<Uuid, Note>,
    next_ticket: i64,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.username.to_lowercase() == username.to_lowercase())
    }

    fn title_taken(&self, title: &str, except: Option<Uuid>) -> bool {
        self.notes
            .values()
            .any(|n| Some(n.id) != except && n.title.to_lowercase() == title.to_lowercase())
    }
}

/// Cloneable handle to one shared set of tables
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                next_ticket: FIRST_TICKET,
                ..Tables::default()
            })),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_username_ci(&self, username: &str) -> StoreResult<Option<User>> {
        let wanted = username.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&input.username, None) {
            return Err(StoreError::Conflict("Duplicate value".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            password_hash: input.password_hash,
            roles: input.roles,
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Ok(None);
        }
        if tables.username_taken(&user.username, Some(user.id)) {
            return Err(StoreError::Conflict("Duplicate value".to_string()));
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        tables.users.insert(updated.id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.notes.values().any(|n| n.user == id) {
            return Err(StoreError::Conflict("Record is still referenced".to_string()));
        }
        Ok(tables.users.remove(&id).is_some())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let tables = self.tables.read().await;
        let mut notes: Vec<Note> = tables.notes.values().cloned().collect();
        notes.sort_by_key(|n| n.ticket);
        Ok(notes)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(self.tables.read().await.notes.get(&id).cloned())
    }

    async fn find_by_title_ci(&self, title: &str) -> StoreResult<Option<Note>> {
        let wanted = title.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .values()
            .find(|n| n.title.to_lowercase() == wanted)
            .cloned())
    }

    async fn exists_for_user(&self, user: Uuid) -> StoreResult<bool> {
        Ok(self.tables.read().await.notes.values().any(|n| n.user == user))
    }

    async fn create(&self, input: CreateNote) -> StoreResult<Note> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&input.user) {
            return Err(StoreError::Conflict("Unknown user".to_string()));
        }
        if tables.title_taken(&input.title, None) {
            return Err(StoreError::Conflict("Duplicate value".to_string()));
        }

        let now = Utc::now();
        let ticket = tables.next_ticket;
        tables.next_ticket += 1;
        let note = Note {
            id: Uuid::new_v4(),
            user: input.user,
            title: input.title,
            text: input.text,
            completed: false,
            ticket,
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, note: &Note) -> StoreResult<Option<Note>> {
        let mut tables = self.tables.write().await;
        if !tables.notes.contains_key(&note.id) {
            return Ok(None);
        }
        if tables.title_taken(&note.title, Some(note.id)) {
            return Err(StoreError::Conflict("Duplicate value".to_string()));
        }

        let mut updated = note.clone();
        updated.updated_at = Utc::now();
        tables.notes.insert(updated.id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.notes.remove(&id).is_some())
    }
}
