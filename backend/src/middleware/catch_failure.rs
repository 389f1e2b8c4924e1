//! Last-resort failure capture for the request pipeline.
//!
//! Handlers signal failure by returning a domain [`DomainError`]. Anything
//! else that escapes (framework errors, errors surfaced by inner middleware,
//! or a panic while the handler runs) is converted into the same error
//! envelope so clients only ever see one failure shape.
//!
//! The middleware never holds its own handle on the request: the router
//! needs exclusive access to it while matching. Failures that arrive without
//! a response are therefore returned as a domain error and rendered by the
//! server through [`ResponseError`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpRequest, ResponseError};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use crate::domain::Error as DomainError;

/// Middleware routing every failure through the domain error responder.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use devcamper::{CatchFailure, Trace};
///
/// let _app = App::new().wrap(CatchFailure).wrap(Trace);
/// ```
#[derive(Clone)]
pub struct CatchFailure;

impl<S, B> Transform<S, ServiceRequest> for CatchFailure
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CatchFailureMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CatchFailureMiddleware { service }))
    }
}

/// Service wrapper produced by [`CatchFailure`].
pub struct CatchFailureMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CatchFailureMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => return Box::pin(ready(Err(panicked(payload.as_ref())))),
        };
        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(res)) => Ok(normalise(res)),
                Ok(Err(err)) => Err(DomainError::from(&err).into()),
                Err(payload) => Err(panicked(payload.as_ref())),
            }
        })
    }
}

fn panicked(payload: &(dyn Any + Send)) -> Error {
    error!(panic = %panic_message(payload), "handler panicked");
    DomainError::internal("handler panicked").into()
}

/// Re-render responses carrying a framework error; pass the rest through.
fn normalise<B>(res: ServiceResponse<B>) -> ServiceResponse<EitherBody<B>> {
    let foreign = res
        .response()
        .error()
        .filter(|err| err.as_error::<DomainError>().is_none())
        .map(DomainError::from);
    match foreign {
        Some(domain) => {
            let (request, _) = res.into_parts();
            render(request, &domain)
        }
        None => res.map_into_left_body(),
    }
}

fn render<B>(request: HttpRequest, error: &DomainError) -> ServiceResponse<EitherBody<B>> {
    ServiceResponse::new(request, error.error_response()).map_into_right_body()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn panics() -> HttpResponse {
        panic!("boom")
    }

    async fn fails() -> Result<HttpResponse, DomainError> {
        Err(DomainError::forbidden("User role user is not authorized to access this route"))
    }

    async fn echo(body: web::Json<Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    async fn lookup(id: web::Path<String>) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "id": id.into_inner() }))
    }

    /// Answer `req` the way the server does, rendering service errors
    /// through their `ResponseError` implementation.
    async fn call(req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .wrap(CatchFailure)
                .service(
                    web::scope("/api/v1").route("/bootcamps/{id}", web::get().to(lookup)),
                )
                .route("/panic", web::get().to(panics))
                .route("/fail", web::get().to(fails))
                .route("/echo", web::post().to(echo)),
        )
        .await;
        let (status, bytes) = match test::try_call_service(&app, req.to_request()).await {
            Ok(res) => (res.status(), test::read_body(res).await),
            Err(err) => {
                let res = err.error_response();
                let status = res.status();
                let bytes = actix_web::body::to_bytes(res.into_body())
                    .await
                    .expect("error body");
                (status, bytes)
            }
        };
        let body: Value = serde_json::from_slice(&bytes).expect("JSON body");
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn scoped_routes_with_path_parameters_are_served() {
        let (status, body) = call(test::TestRequest::get().uri("/api/v1/bootcamps/abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": "abc" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn panics_become_server_errors() {
        let (status, body) = call(test::TestRequest::get().uri("/panic")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Server Error" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn domain_errors_pass_through_unchanged() {
        let (status, body) = call(test::TestRequest::get().uri("/fail")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "User role user is not authorized to access this route"
            })
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn framework_errors_use_the_envelope() {
        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json");
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().is_some_and(|message| !message.is_empty()));
    }

    #[rstest]
    #[actix_web::test]
    async fn successful_responses_are_untouched() {
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(json!({ "name": "Devworks" }));
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "name": "Devworks" }));
    }

    #[rstest]
    #[::core::prelude::v1::test]
    fn panic_messages_are_extracted() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
