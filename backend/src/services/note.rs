//! Note service
//!
//! Notes reference a user and carry a ticket number assigned by the store.
//! Titles are unique ignoring case.

use crate::error::ApiError;
use crate::repositories::{CreateNote, NoteStore, UserStore};
use technotes_shared::validation::{validate_delete, validate_new_note, validate_note_update};
use technotes_shared::{
    CreateNoteRequest, DeleteRequest, NoteResponse, NotesResponse, UpdateNoteRequest, User,
};
use tracing::info;
use uuid::Uuid;

fn note_not_found() -> ApiError {
    ApiError::NotFound("Note not found".to_string())
}

async fn assigned_user(users: &dyn UserStore, id: Uuid) -> Result<User, ApiError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {} not found", id)))
}

fn describe_count(count: usize) -> String {
    match count {
        0 => "No notes in the current list".to_string(),
        1 => "The list consists of 1 note".to_string(),
        n => format!("The list consists of {} notes", n),
    }
}

pub struct NoteService;

impl NoteService {
    pub async fn list(notes: &dyn NoteStore) -> Result<NotesResponse, ApiError> {
        let all = notes.list().await?;
        Ok(NotesResponse {
            message: describe_count(all.len()),
            notes: all,
        })
    }

    pub async fn create(
        users: &dyn UserStore,
        notes: &dyn NoteStore,
        req: &CreateNoteRequest,
    ) -> Result<NoteResponse, ApiError> {
        let input = validate_new_note(req)?;

        if notes.find_by_title_ci(input.title).await?.is_some() {
            return Err(ApiError::Conflict("Duplicate note title".to_string()));
        }

        let user = assigned_user(users, input.user).await?;
        if !user.active {
            return Err(ApiError::BadRequest(format!(
                "The user {} with id {} is currently not active",
                user.username, user.id
            )));
        }

        let note = notes
            .create(CreateNote {
                user: user.id,
                title: input.title.to_string(),
                text: input.text.to_string(),
            })
            .await?;

        info!(note_id = %note.id, ticket = note.ticket, "Note created");

        Ok(NoteResponse {
            message: format!(
                "The note with title {} is successfully created and assigned to {}",
                note.title, user.username
            ),
            note,
        })
    }

    pub async fn update(
        users: &dyn UserStore,
        notes: &dyn NoteStore,
        req: &UpdateNoteRequest,
    ) -> Result<NoteResponse, ApiError> {
        let changes = validate_note_update(req)?;

        let mut note = notes
            .find_by_id(changes.id)
            .await?
            .ok_or_else(note_not_found)?;
        let user = assigned_user(users, changes.user).await?;

        if let Some(title) = changes.title {
            if let Some(existing) = notes.find_by_title_ci(title).await? {
                if existing.id != note.id {
                    return Err(ApiError::Conflict("Duplicate note title".to_string()));
                }
            }
            note.title = title.to_string();
        }
        if let Some(text) = changes.text {
            note.text = text.to_string();
        }
        if let Some(completed) = changes.completed {
            note.completed = completed;
        }
        note.user = user.id;

        let updated = notes.update(&note).await?.ok_or_else(note_not_found)?;

        info!(note_id = %updated.id, ticket = updated.ticket, "Note updated");

        Ok(NoteResponse {
            message: format!(
                "Successfully updated note with ticket number {}",
                updated.ticket
            ),
            note: updated,
        })
    }

    pub async fn delete(
        notes: &dyn NoteStore,
        req: &DeleteRequest,
    ) -> Result<NoteResponse, ApiError> {
        let id = validate_delete(req.id.as_deref())?;

        let note = notes.find_by_id(id).await?.ok_or_else(note_not_found)?;
        if !notes.delete(id).await? {
            return Err(note_not_found());
        }

        info!(note_id = %id, ticket = note.ticket, "Note deleted");

        Ok(NoteResponse {
            message: format!("Note with ticket number {} deleted", note.ticket),
            note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{CreateUser, MemoryStore};
    use axum::http::StatusCode;
    use rstest::rstest;

    async fn seed_user(store: &MemoryStore, username: &str) -> User {
        UserStore::create(
            store,
            CreateUser {
                username: username.to_string(),
                password_hash: "hash".to_string(),
                roles: vec!["Employee".to_string()],
            },
        )
        .await
        .unwrap()
    }

    fn new_note(user: &User, title: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            user: Some(user.id.to_string()),
            title: Some(title.to_string()),
            text: Some("Out of toner".to_string()),
        }
    }

    #[rstest]
    #[case(0, "No notes in the current list")]
    #[case(1, "The list consists of 1 note")]
    #[case(3, "The list consists of 3 notes")]
    fn test_describe_count(#[case] count: usize, #[case] expected: &str) {
        assert_eq!(describe_count(count), expected);
    }

    #[tokio::test]
    async fn test_create_assigns_tickets_in_order() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;

        let first = NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap();
        let second = NoteService::create(&store, &store, &new_note(&dave, "Laptop"))
            .await
            .unwrap();

        assert_eq!(first.note.ticket, 500);
        assert_eq!(second.note.ticket, 501);
        assert!(!first.note.completed);
        assert!(first.message.ends_with("assigned to dave"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title_ignoring_case() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;
        NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap();

        let err = NoteService::create(&store, &store, &new_note(&dave, "PRINTER"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_checks_assigned_user() {
        let store = MemoryStore::new();
        let mut dave = seed_user(&store, "dave").await;

        let ghost = User {
            id: Uuid::new_v4(),
            ..dave.clone()
        };
        let err = NoteService::create(&store, &store, &new_note(&ghost, "Printer"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        dave.active = false;
        UserStore::update(&store, &dave).await.unwrap();
        let err = NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;
        let erin = seed_user(&store, "erin").await;
        let created = NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap()
            .note;

        let req = UpdateNoteRequest {
            id: Some(created.id.to_string()),
            user: Some(erin.id.to_string()),
            title: None,
            text: None,
            completed: Some(true),
        };
        let updated = NoteService::update(&store, &store, &req).await.unwrap();

        assert_eq!(updated.note.title, "Printer");
        assert_eq!(updated.note.text, "Out of toner");
        assert_eq!(updated.note.user, erin.id);
        assert!(updated.note.completed);
        assert_eq!(updated.note.ticket, created.ticket);
        assert_eq!(
            updated.message,
            "Successfully updated note with ticket number 500"
        );
    }

    #[tokio::test]
    async fn test_update_title_conflicts_only_with_other_notes() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;
        let printer = NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap()
            .note;
        NoteService::create(&store, &store, &new_note(&dave, "Laptop"))
            .await
            .unwrap();

        let mut req = UpdateNoteRequest {
            id: Some(printer.id.to_string()),
            user: Some(dave.id.to_string()),
            title: Some("printer".to_string()),
            text: None,
            completed: None,
        };
        let renamed = NoteService::update(&store, &store, &req).await.unwrap();
        assert_eq!(renamed.note.title, "printer");

        req.title = Some("LAPTOP".to_string());
        let err = NoteService::update(&store, &store, &req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_unknown_note_is_not_found() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;
        let req = UpdateNoteRequest {
            id: Some(Uuid::new_v4().to_string()),
            user: Some(dave.id.to_string()),
            ..Default::default()
        };
        let err = NoteService::update(&store, &store, &req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let dave = seed_user(&store, "dave").await;
        let created = NoteService::create(&store, &store, &new_note(&dave, "Printer"))
            .await
            .unwrap()
            .note;

        let req = DeleteRequest {
            id: Some(created.id.to_string()),
        };
        let deleted = NoteService::delete(&store, &req).await.unwrap();
        assert_eq!(deleted.note.id, created.id);

        let err = NoteService::delete(&store, &req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = NoteService::delete(&store, &DeleteRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
