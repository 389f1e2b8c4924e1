//! Bootcamp API handlers.
//!
//! ```text
//! GET    /api/v1/bootcamps?averageCost[lte]=10000&select=name&page=2
//! GET    /api/v1/bootcamps/{id}
//! POST   /api/v1/bootcamps
//! PUT    /api/v1/bootcamps/{id}
//! DELETE /api/v1/bootcamps/{id}
//! GET    /api/v1/bootcamps/radius/{zipcode}/{distance}
//! PUT    /api/v1/bootcamps/{id}/photo
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures_util::TryStreamExt;

use super::access::CurrentUser;
use super::envelope::{CountedEnvelope, DataEnvelope, EmptyData};
use super::state::HttpState;
use super::ApiResult;
use crate::domain::{Bootcamp, BootcampInput, Error, ErrorEnvelope, PhotoUpload, QueryResultEnvelope};

/// Multipart field carrying the photo.
pub const PHOTO_FIELD: &str = "file";

/// List bootcamps through the listing pipeline.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys; prefix `-` for descending"),
        ("page" = Option<u32>, Query, description = "One-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Bootcamps", body = QueryResultEnvelope),
        (status = 400, description = "Malformed filter", body = ErrorEnvelope),
        (status = 500, description = "Server error", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "listBootcamps"
)]
#[get("/bootcamps")]
pub async fn list_bootcamps(
    state: web::Data<HttpState>,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<web::Json<QueryResultEnvelope>> {
    let envelope = state
        .bootcamps
        .list(&query.into_inner(), state.limits.page_limit)
        .await?;
    Ok(web::Json(envelope))
}

/// Fetch one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    responses(
        (status = 200, description = "Bootcamp", body = DataEnvelope<Bootcamp>),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "getBootcamp"
)]
#[get("/bootcamps/{id}")]
pub async fn get_bootcamp(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DataEnvelope<Bootcamp>>> {
    let bootcamp = state.bootcamps.get(&path.into_inner()).await?;
    Ok(web::Json(DataEnvelope::new(bootcamp)))
}

/// Create a bootcamp owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    request_body = BootcampInput,
    responses(
        (status = 201, description = "Created", body = DataEnvelope<Bootcamp>),
        (status = 400, description = "Validation failed or duplicate name", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Server error", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "createBootcamp"
)]
#[post("/bootcamps")]
pub async fn create_bootcamp(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: web::Json<BootcampInput>,
) -> ApiResult<HttpResponse> {
    let bootcamp = state
        .bootcamps
        .create(Some(user.0.id), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(DataEnvelope::new(bootcamp)))
}

/// Merge changes into a bootcamp.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    request_body = BootcampInput,
    responses(
        (status = 200, description = "Updated", body = DataEnvelope<Bootcamp>),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "updateBootcamp"
)]
#[put("/bootcamps/{id}")]
pub async fn update_bootcamp(
    state: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<String>,
    payload: web::Json<BootcampInput>,
) -> ApiResult<web::Json<DataEnvelope<Bootcamp>>> {
    let bootcamp = state
        .bootcamps
        .update(&path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(DataEnvelope::new(bootcamp)))
}

/// Delete a bootcamp.
#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    responses(
        (status = 200, description = "Deleted", body = DataEnvelope<EmptyData>),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "deleteBootcamp"
)]
#[delete("/bootcamps/{id}")]
pub async fn delete_bootcamp(
    state: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DataEnvelope<EmptyData>>> {
    state.bootcamps.delete(&path.into_inner()).await?;
    Ok(web::Json(DataEnvelope::empty()))
}

/// Bootcamps within `distance` miles of `zipcode`.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/radius/{zipcode}/{distance}",
    params(
        ("zipcode" = String, Path, description = "Postal code at the centre"),
        ("distance" = String, Path, description = "Radius in miles"),
    ),
    responses(
        (status = 200, description = "Nearby bootcamps", body = CountedEnvelope<Bootcamp>),
        (status = 400, description = "Bad distance or unknown zipcode", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 500, description = "Geocoder unavailable", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "bootcampsInRadius"
)]
#[get("/bootcamps/radius/{zipcode}/{distance}")]
pub async fn bootcamps_in_radius(
    state: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<CountedEnvelope<Bootcamp>>> {
    let (zipcode, distance) = path.into_inner();
    let results = state.bootcamps.within_radius(&zipcode, &distance).await?;
    Ok(web::Json(CountedEnvelope::new(results.bootcamps)))
}

/// Upload a bootcamp photo as multipart field `file`.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}/photo",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    request_body(content_type = "multipart/form-data", description = "Image in field `file`"),
    responses(
        (status = 200, description = "Stored file name", body = DataEnvelope<String>),
        (status = 400, description = "Missing, non-image, or oversize file", body = ErrorEnvelope),
        (status = 401, description = "Not signed in", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 500, description = "Storage failure", body = ErrorEnvelope)
    ),
    tags = ["bootcamps"],
    operation_id = "uploadBootcampPhoto"
)]
#[put("/bootcamps/{id}/photo")]
pub async fn upload_bootcamp_photo(
    state: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<DataEnvelope<String>>> {
    let id = path.into_inner();
    // Existence is decided before the body is read.
    state.bootcamps.get(&id).await?;
    let max_bytes = state.limits.max_file_upload;
    let upload = read_photo(payload, max_bytes).await?;
    let file_name = state.bootcamps.upload_photo(&id, upload, max_bytes).await?;
    Ok(web::Json(DataEnvelope::new(file_name)))
}

/// Read the `file` field, buffering at most `max_bytes + 1` bytes.
///
/// A body that is not multipart at all counts as "no file".
async fn read_photo(mut payload: Multipart, max_bytes: u64) -> Result<Option<PhotoUpload>, Error> {
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(error) => {
                tracing::debug!(%error, "multipart body unreadable");
                return Ok(None);
            }
        };
        if field.name() != Some(PHOTO_FIELD) {
            while field.try_next().await.map_err(invalid_upload)?.is_some() {}
            continue;
        }

        let mut upload = PhotoUpload {
            file_name: field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .map(str::to_owned),
            content_type: field.content_type().map(|mime| mime.essence_str().to_owned()),
            ..PhotoUpload::default()
        };
        while let Some(chunk) = field.try_next().await.map_err(invalid_upload)? {
            let total = upload.bytes.len().saturating_add(chunk.len());
            if u64::try_from(total).map_or(true, |total| total > max_bytes) {
                upload.oversize = true;
                break;
            }
            upload.bytes.extend_from_slice(&chunk);
        }
        return Ok(Some(upload));
    }
}

fn invalid_upload(error: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("Problem with file upload: {error}"))
}

#[cfg(test)]
#[path = "bootcamps_tests.rs"]
mod tests;
