use actix_web::web;

use crate::core::DataResult;
use crate::middleware::{json_error_handler, path_error_handler, query_error_handler, unsupported_api_version};
use crate::persistence::Model;

pub mod customers;
pub mod docs;
pub mod health;
pub mod orders;

use customers::Customer;
use orders::{Order, OrderLine};

/// Entities persisted by the API and their unique indexes
pub fn model() -> DataResult<Model> {
    Model::builder()
        .entity::<Customer>()
        .unique::<Customer>("email")
        .entity::<Order>()
        .entity::<OrderLine>()
        .build()
}

/// Version 1.0 resources
pub fn configure_api_v1(cfg: &mut web::ServiceConfig) {
    customers::controllers::configure(cfg);
    orders::controllers::configure(cfg);
}

/// All routes plus JSON-only extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .configure(health::controllers::configure)
        .configure(docs::controllers::configure)
        .service(web::scope("/api/v1").configure(configure_api_v1))
        .service(web::scope("/api/v1.0").configure(configure_api_v1))
        .service(web::scope(r"/api/v{version:\d+(?:\.\d+)?}").default_service(web::to(unsupported_api_version)))
        .service(web::scope("/api").configure(configure_api_v1));
}
