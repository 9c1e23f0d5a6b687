use coursedesk_atoms::store::{DocumentStore, ObjectStore};
use coursedesk_atoms::{courses, media};
use coursedesk_shared::cors::{cors_origin, with_cors_headers};
use coursedesk_shared::AppState;
use lambda_http::{
    http::{header::CONTENT_TYPE, Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use std::sync::Arc;

fn finalize_response(resp: Result<Response<Body>, Error>, origin: &str) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, origin))
}

/// Main Lambda handler - routes course and upload requests
pub(crate) async fn function_handler<D: DocumentStore, O: ObjectStore>(
    event: Request,
    state: Arc<AppState<D, O>>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body: &[u8] = event.body().as_ref();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    let origin = cors_origin(&state.config, request_origin);
    tracing::info!("Course API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if *method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, &origin));
    }

    let documents = &state.documents;
    let objects = &state.objects;
    let content_type = event.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (method, parts.as_slice()) {
        // GET /courses?status&category&search&limit
        (&Method::GET, ["courses"]) => {
            let query = event.query_string_parameters();
            let filter = courses::course_filter(
                query.first("status"),
                query.first("category"),
                query.first("search"),
                query.first("limit"),
            );
            courses::list_courses_handler(documents, &filter).await
        }
        (&Method::POST, ["courses"]) => courses::create_course_handler(documents, body).await,
        (&Method::GET, ["courses", "stats"]) => courses::course_stats_handler(documents).await,
        (&Method::POST, ["courses", "bulk-delete"]) => courses::bulk_delete_handler(documents, objects, body).await,
        (&Method::GET, ["courses", "slug", slug]) => courses::get_course_by_slug_handler(documents, slug).await,
        (&Method::GET, ["courses", id]) => courses::get_course_handler(documents, id).await,
        (&Method::PUT, ["courses", id]) => courses::update_course_handler(documents, id, body).await,
        (&Method::DELETE, ["courses", id]) => courses::delete_course_handler(documents, objects, id).await,
        (&Method::POST, ["courses", id, "duplicate"]) => courses::duplicate_course_handler(documents, id, body).await,
        (&Method::PATCH, ["courses", id, "status"]) => courses::update_status_handler(documents, id, body).await,

        (&Method::POST, ["upload"]) => media::upload_handler(objects, content_type, body).await,
        (&Method::POST, ["upload", "batch"]) => media::batch_upload_handler(objects, content_type, body).await,
        (&Method::DELETE, ["upload"]) => media::delete_upload_handler(objects, body).await,

        _ => {
            tracing::warn!("No route for {} {}", method, path);
            not_found()
        }
    };

    finalize_response(resp, &origin)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"success": false, "error": "Not found"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}
