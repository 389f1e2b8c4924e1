//! Handler tests for bootcamp writes and photo uploads.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpLimits, HttpState};
use crate::inbound::http::test_utils::{memory_state, test_session_middleware};

const BOUNDARY: &str = "devcamperboundary";
const MAX_UPLOAD: u64 = 64;

struct Harness {
    state: web::Data<HttpState>,
    uploads: TempDir,
}

fn harness() -> Harness {
    let uploads = tempfile::tempdir().expect("upload dir");
    let limits = HttpLimits {
        page_limit: 25,
        max_file_upload: MAX_UPLOAD,
    };
    Harness {
        state: memory_state(uploads.path(), limits),
        uploads,
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new().app_data($harness.state.clone()).service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(configure_api),
            ),
        )
        .await
    };
}

fn multipart(field: &str, file_name: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(body);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    payload
}

fn upload_request(id: &str, cookie: &Cookie<'static>, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::put()
        .uri(&format!("/api/v1/bootcamps/{id}/photo"))
        .cookie(cookie.clone())
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

/// Register a publisher and create one bootcamp, yielding the session cookie
/// and the bootcamp id.
macro_rules! signed_in_with_bootcamp {
    ($app:expr) => {{
        let register = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "name": "Publisher",
                "email": "publisher@example.com",
                "password": "123456",
                "role": "publisher"
            }))
            .to_request();
        let res = test::call_service($app, register).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie: Cookie<'static> = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let create = test::TestRequest::post()
            .uri("/api/v1/bootcamps")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Devworks Bootcamp",
                "description": "Full stack web development",
                "address": "233 Bay State Rd, Boston, MA 02215",
                "careers": ["Web Development"]
            }))
            .to_request();
        let res = test::call_service($app, create).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let id = body["data"]["id"].as_str().expect("id").to_owned();
        (cookie, id)
    }};
}

#[actix_web::test]
async fn writes_require_a_session() {
    let harness = harness();
    let app = app!(harness);

    let req = test::TestRequest::post()
        .uri("/api/v1/bootcamps")
        .set_json(json!({ "name": "Devworks" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({ "success": false, "error": "Not authorized to access this route" })
    );
}

#[rstest]
#[case::not_an_image("file", "notes.txt", "text/plain", 16, "Please upload an image file")]
#[case::too_large("file", "big.jpg", "image/jpeg", 65, "Please upload an image less than 64 bytes")]
#[case::wrong_field("avatar", "photo.jpg", "image/jpeg", 16, "Please upload a file")]
#[actix_web::test]
async fn rejected_uploads_leave_the_bootcamp_untouched(
    #[case] field: &str,
    #[case] file_name: &str,
    #[case] content_type: &str,
    #[case] size: usize,
    #[case] message: &str,
) {
    let harness = harness();
    let app = app!(harness);
    let (cookie, id) = signed_in_with_bootcamp!(&app);

    let body = multipart(field, file_name, content_type, &vec![7_u8; size]);
    let res = test::call_service(&app, upload_request(&id, &cookie, body).to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "success": false, "error": message }));

    let stored = harness.state.bootcamps.get(&id).await.expect("still stored");
    assert_eq!(stored.photo, "no-photo.jpg");
    let files = std::fs::read_dir(harness.uploads.path())
        .expect("list uploads")
        .count();
    assert_eq!(files, 0);
}

#[actix_web::test]
async fn accepted_upload_is_stored_and_recorded() {
    let harness = harness();
    let app = app!(harness);
    let (cookie, id) = signed_in_with_bootcamp!(&app);

    let body = multipart("file", "camp.PNG", "image/png", b"not-really-a-png");
    let res = test::call_service(&app, upload_request(&id, &cookie, body).to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let expected = format!("photo_{id}.png");
    assert_eq!(body, json!({ "success": true, "data": expected }));

    let saved = std::fs::read(harness.uploads.path().join(&expected)).expect("file written");
    assert_eq!(saved, b"not-really-a-png");
    let stored = harness.state.bootcamps.get(&id).await.expect("stored");
    assert_eq!(stored.photo, expected);
}

#[rstest]
#[case::complete_body(false)]
#[case::body_cut_mid_field(true)]
#[actix_web::test]
async fn upload_to_missing_bootcamp_is_not_found(#[case] truncated: bool) {
    let harness = harness();
    let app = app!(harness);
    let (cookie, _) = signed_in_with_bootcamp!(&app);
    let missing = uuid::Uuid::new_v4().to_string();

    let mut body = multipart("file", "camp.jpg", "image/jpeg", b"jpeg");
    if truncated {
        // Drop the closing boundary so the field never terminates.
        body.truncate(body.len() - BOUNDARY.len() - 8);
    }
    let res = test::call_service(&app, upload_request(&missing, &cookie, body).to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["error"],
        json!(format!("Bootcamp not found with id of {missing}"))
    );
}
