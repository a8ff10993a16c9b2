// Shared test infrastructure
//
// Included by each test target with:
//   #[path = "../helpers/mod.rs"]
//   #[macro_use]
//   mod helpers;
//
// Contract and integration tests run against the in-memory store so they
// need no external services. MySQL-backed tests are #[ignore]d and read
// TEST_DATABASE_URL.

#![allow(dead_code, unused_imports, unused_macros)]

pub mod test_auth;
pub mod test_data;
pub mod test_store;

pub use test_auth::*;
pub use test_data::*;
pub use test_store::*;

/// Build an actix test service wired like the production server
macro_rules! init_test_app {
    ($factory:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($factory))
                .wrap(crudkit::middleware::ErrorHandler)
                .wrap(crudkit::middleware::JwtAuth::new(&$crate::helpers::jwt_config()))
                .wrap(crudkit::middleware::ReportApiVersions)
                .wrap(crudkit::middleware::RequestId)
                .configure(crudkit::modules::configure),
        )
    };
}
