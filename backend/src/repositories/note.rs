//! Note repository for database operations

use super::{classify, CreateNote, NoteStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use technotes_shared::Note;
use uuid::Uuid;

/// Note record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub completed: bool,
    pub ticket: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteRecord> for Note {
    fn from(r: NoteRecord) -> Self {
        Note {
            id: r.id,
            user: r.user_id,
            title: r.title,
            text: r.text,
            completed: r.completed,
            ticket: r.ticket,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const NOTE_COLUMNS: &str = "id, user_id, title, text, completed, ticket, created_at, updated_at";

/// PostgreSQL-backed note store
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteRepository {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, NoteRecord>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes ORDER BY ticket"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(notes.into_iter().map(Note::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>> {
        let note = sqlx::query_as::<_, NoteRecord>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        Ok(note.map(Note::from))
    }

    async fn find_by_title_ci(&self, title: &str) -> StoreResult<Option<Note>> {
        let note = sqlx::query_as::<_, NoteRecord>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE lower(title) = lower($1)"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        Ok(note.map(Note::from))
    }

    async fn exists_for_user(&self, user: Uuid) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE user_id = $1)",
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(exists)
    }

    async fn create(&self, input: CreateNote) -> StoreResult<Note> {
        // ticket comes from the notes_ticket_seq default
        let note = sqlx::query_as::<_, NoteRecord>(&format!(
            r#"
            INSERT INTO notes (user_id, title, text)
            VALUES ($1, $2, $3)
            RETURNING {NOTE_COLUMNS}
            "#
        ))
        .bind(input.user)
        .bind(&input.title)
        .bind(&input.text)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(note.into())
    }

    async fn update(&self, note: &Note) -> StoreResult<Option<Note>> {
        let updated = sqlx::query_as::<_, NoteRecord>(&format!(
            r#"
            UPDATE notes SET
                user_id = $2,
                title = $3,
                text = $4,
                completed = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {NOTE_COLUMNS}
            "#
        ))
        .bind(note.id)
        .bind(note.user)
        .bind(&note.title)
        .bind(&note.text)
        .bind(note.completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        Ok(updated.map(Note::from))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(result.rows_affected() == 1)
    }
}
