use super::model::{BulkDeletePayload, CourseFilter, CourseInput, CoursePatch, CourseStatus, DuplicatePayload, StatusPayload};
use super::service;
use crate::error::ServiceError;
use crate::response::{failure, json_response, parse_json, service_failure, success};
use crate::store::{DocumentStore, ObjectStore};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::json;

/// Failure response for the mutating single-course routes, which report a
/// missing course as a bad request rather than 404.
fn mutation_failure(err: ServiceError) -> Result<Response<Body>, Error> {
    match err {
        e @ ServiceError::NotFound(_) => failure(StatusCode::BAD_REQUEST, e),
        e => service_failure(e),
    }
}

/// Builds list filters from query parameters. Unknown statuses and
/// unparseable limits are ignored rather than rejected.
pub fn course_filter(
    status: Option<&str>,
    category: Option<&str>,
    search: Option<&str>,
    limit: Option<&str>,
) -> CourseFilter {
    CourseFilter {
        status: status.and_then(CourseStatus::parse),
        category: category.map(str::to_string).filter(|c| !c.trim().is_empty()),
        search: search.map(str::to_string).filter(|s| !s.trim().is_empty()),
        limit: limit.and_then(|l| l.trim().parse().ok()),
    }
}

/// HTTP Handler: GET /courses
pub async fn list_courses_handler<S: DocumentStore>(
    store: &S,
    filter: &CourseFilter,
) -> Result<Response<Body>, Error> {
    match service::list_courses(store, filter).await {
        Ok(courses) => success(StatusCode::OK, &courses),
        Err(e) => {
            tracing::error!("Listing courses failed: {:?}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// HTTP Handler: POST /courses
pub async fn create_course_handler<S: DocumentStore>(store: &S, body: &[u8]) -> Result<Response<Body>, Error> {
    let input: CourseInput = match parse_json(body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match service::create_course(store, input).await {
        Ok(course) => success(StatusCode::CREATED, &course),
        Err(e) => service_failure(e),
    }
}

/// HTTP Handler: GET /courses/stats
pub async fn course_stats_handler<S: DocumentStore>(store: &S) -> Result<Response<Body>, Error> {
    match service::course_stats(store).await {
        Ok(stats) => success(StatusCode::OK, &stats),
        Err(e) => service_failure(e),
    }
}

/// HTTP Handler: POST /courses/bulk-delete
pub async fn bulk_delete_handler<S: DocumentStore, O: ObjectStore>(
    store: &S,
    objects: &O,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: BulkDeletePayload = match parse_json(body) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };
    if payload.ids.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "No course ids provided");
    }

    match service::delete_courses(store, objects, &payload.ids).await {
        Ok(deleted) => json_response(StatusCode::OK, &json!({ "success": true, "deletedCount": deleted })),
        Err(e) => mutation_failure(e),
    }
}

/// HTTP Handler: GET /courses/slug/{slug}
pub async fn get_course_by_slug_handler<S: DocumentStore>(store: &S, slug: &str) -> Result<Response<Body>, Error> {
    match service::get_course_by_slug(store, slug).await {
        Ok(course) => success(StatusCode::OK, &course),
        Err(e) => service_failure(e),
    }
}

/// HTTP Handler: GET /courses/{id}
pub async fn get_course_handler<S: DocumentStore>(store: &S, id: &str) -> Result<Response<Body>, Error> {
    match service::get_course(store, id).await {
        Ok(course) => success(StatusCode::OK, &course),
        Err(e) => service_failure(e),
    }
}

/// HTTP Handler: PUT /courses/{id}
pub async fn update_course_handler<S: DocumentStore>(
    store: &S,
    id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let patch: CoursePatch = match parse_json(body) {
        Ok(patch) => patch,
        Err(resp) => return resp,
    };

    match service::update_course(store, id, patch).await {
        Ok(course) => success(StatusCode::OK, &course),
        Err(e) => mutation_failure(e),
    }
}

/// HTTP Handler: DELETE /courses/{id}
pub async fn delete_course_handler<S: DocumentStore, O: ObjectStore>(
    store: &S,
    objects: &O,
    id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_course(store, objects, id).await {
        Ok(()) => json_response(StatusCode::OK, &json!({ "success": true })),
        Err(e) => mutation_failure(e),
    }
}

/// HTTP Handler: POST /courses/{id}/duplicate
pub async fn duplicate_course_handler<S: DocumentStore>(
    store: &S,
    id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    // The body is optional here.
    let payload: DuplicatePayload = if body.iter().all(u8::is_ascii_whitespace) {
        DuplicatePayload::default()
    } else {
        match parse_json(body) {
            Ok(payload) => payload,
            Err(resp) => return resp,
        }
    };

    match service::duplicate_course(store, id, payload.title).await {
        Ok(course) => success(StatusCode::CREATED, &course),
        Err(e) => mutation_failure(e),
    }
}

/// HTTP Handler: PATCH /courses/{id}/status
pub async fn update_status_handler<S: DocumentStore>(
    store: &S,
    id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: StatusPayload = match parse_json(body) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };

    match service::update_course_status(store, id, &payload.status).await {
        Ok(course) => success(StatusCode::OK, &course),
        Err(e) => mutation_failure(e),
    }
}
