use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::models::{PhotoCategory, PhotoModel};
use super::types::{CreatePhotoRequest, DeletedPhotos, Gallery, UpdatePhotoRequest};
use crate::shared::{AppError, AppState};
use crate::validation::{FieldError, Validate, ValidatedJson};

#[instrument(name = "create_photo", skip(state, request))]
pub async fn create_photo(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePhotoRequest>,
) -> Result<(StatusCode, Json<PhotoModel>), AppError> {
    let photo = state.photo_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

#[instrument(name = "list_photos", skip(state))]
pub async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<PhotoModel>>, AppError> {
    Ok(Json(state.photo_service.list().await?))
}

#[instrument(name = "get_photo", skip(state))]
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PhotoModel>, AppError> {
    Ok(Json(state.photo_service.get(id).await?))
}

#[instrument(name = "update_photo", skip(state, request))]
pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdatePhotoRequest>,
) -> Result<Json<PhotoModel>, AppError> {
    Ok(Json(state.photo_service.update(id, request).await?))
}

#[instrument(name = "delete_photo", skip(state))]
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PhotoModel>, AppError> {
    Ok(Json(state.photo_service.delete(id).await?))
}

#[instrument(name = "photo_gallery", skip(state))]
pub async fn photo_gallery(State(state): State<AppState>) -> Result<Json<Gallery>, AppError> {
    Ok(Json(state.photo_service.gallery().await?))
}

#[instrument(name = "photos_by_category", skip(state))]
pub async fn photos_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<PhotoModel>>, AppError> {
    Ok(Json(state.photo_service.by_category(&category).await?))
}

#[instrument(name = "photos_by_tournament", skip(state))]
pub async fn photos_by_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> Result<Json<Vec<PhotoModel>>, AppError> {
    Ok(Json(state.photo_service.by_tournament(tournament_id).await?))
}

#[instrument(name = "photos_by_season", skip(state))]
pub async fn photos_by_season(
    State(state): State<AppState>,
    Path(season_id): Path<i64>,
) -> Result<Json<Vec<PhotoModel>>, AppError> {
    Ok(Json(state.photo_service.by_season(season_id).await?))
}

#[instrument(name = "photos_by_player", skip(state))]
pub async fn photos_by_player(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> Result<Json<Vec<PhotoModel>>, AppError> {
    Ok(Json(state.photo_service.by_player(player_id).await?))
}

/// DELETE /fotos/torneio/:id
#[instrument(name = "delete_tournament_photos", skip(state))]
pub async fn delete_tournament_photos(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> Result<Json<DeletedPhotos>, AppError> {
    let deleted = state
        .photo_service
        .delete_by_tournament(tournament_id)
        .await?;
    Ok(Json(DeletedPhotos { deleted }))
}

struct UploadedFile {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

fn optional_id(
    fields: &HashMap<String, String>,
    name: &str,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let raw = fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(FieldError::new(name, format!("{name} must be an integer")));
            None
        }
    }
}

/// Photo fields sent next to the file; `image_url` is filled in after storage
fn upload_request(fields: &HashMap<String, String>) -> Result<CreatePhotoRequest, AppError> {
    let mut errors = Vec::new();
    let request = CreatePhotoRequest {
        image_url: String::new(),
        caption: fields.get("caption").cloned().filter(|c| !c.trim().is_empty()),
        album: fields.get("album").cloned().unwrap_or_default(),
        category: Some(
            fields
                .get("category")
                .map(|c| PhotoCategory::parse_lenient(c))
                .unwrap_or_default(),
        ),
        tournament_id: optional_id(fields, "tournament_id", &mut errors),
        season_id: optional_id(fields, "season_id", &mut errors),
        player_id: optional_id(fields, "player_id", &mut errors),
    };

    if request.album.trim().is_empty() {
        errors.push(FieldError::new("album", "album must not be empty"));
    }
    if errors.is_empty() {
        Ok(request)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// POST /admin/fotos/upload (multipart: `file` plus photo fields)
#[instrument(name = "upload_photo", skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoModel>), AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file = Some(UploadedFile {
                filename: field.file_name().map(str::to_string),
                content_type: field.content_type().map(str::to_string),
                bytes: field.bytes().await.map_err(multipart_error)?,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
        }
    }

    let Some(file) = file else {
        return Err(AppError::Validation(vec![FieldError::new(
            "file",
            "file is required",
        )]));
    };
    let mut request = upload_request(&fields)?;
    debug!(size = file.bytes.len(), "Upload received");

    let stored = state
        .upload_config
        .store(
            file.filename.as_deref(),
            file.content_type.as_deref(),
            &file.bytes,
        )
        .await?;
    request.image_url = stored.url;
    request.validate().map_err(AppError::Validation)?;

    let photo = state.photo_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}
