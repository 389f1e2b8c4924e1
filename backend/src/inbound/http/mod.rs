//! HTTP inbound adapter exposing REST endpoints.

pub mod access;
pub mod auth;
pub mod bootcamps;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register extractor configuration and every `/api/v1` handler.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use devcamper::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extractors::json_config())
        .app_data(extractors::query_config())
        .service(bootcamps::list_bootcamps)
        .service(bootcamps::create_bootcamp)
        .service(bootcamps::bootcamps_in_radius)
        .service(bootcamps::upload_bootcamp_photo)
        .service(bootcamps::get_bootcamp)
        .service(bootcamps::update_bootcamp)
        .service(bootcamps::delete_bootcamp)
        .service(users::list_users)
        .service(users::create_user)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me);
}
