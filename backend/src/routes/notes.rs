//! Note routes; any authenticated user may manage notes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::services::NoteService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use technotes_shared::{
    CreateNoteRequest, DeleteRequest, NoteResponse, NotesResponse, UpdateNoteRequest,
};

/// Create note routes
pub fn note_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_notes)
            .post(create_note)
            .patch(update_note)
            .delete(delete_note),
    )
}

async fn list_notes(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> ApiResult<Json<NotesResponse>> {
    Ok(Json(NoteService::list(state.notes()).await?))
}

async fn create_note(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiJson(req): ApiJson<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let created = NoteService::create(state.users(), state.notes(), &req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_note(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiJson(req): ApiJson<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    Ok(Json(
        NoteService::update(state.users(), state.notes(), &req).await?,
    ))
}

async fn delete_note(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    Ok(Json(NoteService::delete(state.notes(), &req).await?))
}
