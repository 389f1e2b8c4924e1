//! End-to-end behaviour of authentication and user administration.

// Shared helpers include functions only some suites call.
#[allow(dead_code)]
mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::json;

use support::{PASSWORD, context, init_app, register, send, sign_in_admin};

#[actix_web::test]
async fn registration_starts_a_session_without_leaking_the_hash() {
    let ctx = context();
    let app = init_app(&ctx).await;

    let cookie = register(&app, "Ada@Example.com", "publisher").await;
    let me = send(&app, TestRequest::get().uri("/api/v1/auth/me").cookie(cookie)).await;

    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["email"], json!("ada@example.com"));
    assert_eq!(me.body["data"]["role"], json!("publisher"));
    assert!(me.body["data"].get("password").is_none());
}

#[actix_web::test]
async fn registering_as_admin_is_refused() {
    let ctx = context();
    let app = init_app(&ctx).await;

    let reply = send(
        &app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": PASSWORD,
            "role": "admin"
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], json!("'admin' is not a valid role"));
}

#[actix_web::test]
async fn duplicate_emails_are_rejected_case_insensitively() {
    let ctx = context();
    let app = init_app(&ctx).await;
    register(&app, "ada@example.com", "user").await;

    let reply = send(
        &app,
        TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
            "name": "Ada Again",
            "email": "ADA@example.com",
            "password": PASSWORD
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], json!("Duplicate field value entered"));
}

#[rstest]
#[case::missing_password(json!({ "email": "ada@example.com" }), StatusCode::BAD_REQUEST, "Please provide an email and password")]
#[case::wrong_password(json!({ "email": "ada@example.com", "password": "nope" }), StatusCode::UNAUTHORIZED, "Invalid credentials")]
#[case::unknown_email(json!({ "email": "who@example.com", "password": PASSWORD }), StatusCode::UNAUTHORIZED, "Invalid credentials")]
#[actix_web::test]
async fn bad_logins_are_rejected(
    #[case] payload: serde_json::Value,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let ctx = context();
    let app = init_app(&ctx).await;
    register(&app, "ada@example.com", "user").await;

    let reply = send(&app, TestRequest::post().uri("/api/v1/auth/login").set_json(payload)).await;

    assert_eq!(reply.status, status);
    assert_eq!(reply.body, json!({ "success": false, "error": message }));
    assert!(reply.cookie.is_none());
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let cookie = register(&app, "ada@example.com", "user").await;

    let logout = send(&app, TestRequest::get().uri("/api/v1/auth/logout").cookie(cookie)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body, json!({ "success": true, "data": {} }));
    let cleared = logout.cookie.expect("removal cookie");

    let me = send(&app, TestRequest::get().uri("/api/v1/auth/me").cookie(cleared)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["error"], json!("Not authorized to access this route"));
}

#[actix_web::test]
async fn user_administration_requires_the_admin_role() {
    let ctx = context();
    let app = init_app(&ctx).await;

    let anonymous = send(&app, TestRequest::get().uri("/api/v1/users")).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let cookie = register(&app, "publisher@example.com", "publisher").await;
    let forbidden = send(&app, TestRequest::get().uri("/api/v1/users").cookie(cookie)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.body["error"],
        json!("User role publisher is not authorized to access this route")
    );
}

#[actix_web::test]
async fn admins_manage_accounts() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let admin = sign_in_admin(&app, &ctx).await;

    let created = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/users")
            .cookie(admin.clone())
            .set_json(json!({
                "name": "Grace",
                "email": "grace@example.com",
                "password": PASSWORD
            })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["role"], json!("user"));
    let id = created.body["data"]["id"].as_str().expect("id").to_owned();

    let listed = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/users?select=email&sort=email")
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], json!(2));
    assert_eq!(listed.body["data"][0]["email"], json!("admin@example.com"));
    assert!(listed.body["data"][1].get("password").is_none());

    let updated = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/users/{id}"))
            .cookie(admin.clone())
            .set_json(json!({ "role": "publisher" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["role"], json!("publisher"));
    assert_eq!(updated.body["data"]["name"], json!("Grace"));

    let login = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "grace@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "password survives updates");

    for expected in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let deleted = send(
            &app,
            TestRequest::delete()
                .uri(&format!("/api/v1/users/{id}"))
                .cookie(admin.clone()),
        )
        .await;
        assert_eq!(deleted.status, expected);
    }

    let fetched = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/users/{id}"))
            .cookie(admin),
    )
    .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(
        fetched.body["error"],
        json!(format!("User not found with id of {id}"))
    );
}

#[rstest]
#[case::range_filter("/api/v1/users?password%5Bgte%5D=%24argon2id%24")]
#[case::equality_filter("/api/v1/users?password=secret")]
#[case::sort("/api/v1/users?sort=-password")]
#[actix_web::test]
async fn password_hashes_cannot_be_filtered_or_sorted_in_listings(#[case] uri: &str) {
    let ctx = context();
    let app = init_app(&ctx).await;
    let cookie = sign_in_admin(&app, &ctx).await;

    let reply = send(&app, TestRequest::get().uri(uri).cookie(cookie)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], json!("Cannot filter or sort by 'password'"));
}
