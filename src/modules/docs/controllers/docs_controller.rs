use actix_web::{web, HttpResponse};
use serde_json::Value;
use std::sync::OnceLock;

use crate::core::{AppError, Result};

const OPENAPI_YAML: &str = include_str!("../../../../docs/openapi.yaml");

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Crudkit API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/swagger/v1/swagger.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

/// OpenAPI document converted to JSON, parsed once
pub fn openapi_document() -> Result<&'static Value> {
    static DOCUMENT: OnceLock<std::result::Result<Value, String>> = OnceLock::new();

    DOCUMENT
        .get_or_init(|| serde_yaml::from_str(OPENAPI_YAML).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| AppError::internal(format!("Invalid OpenAPI document: {}", e)))
}

/// GET /swagger/v1/swagger.json
pub async fn openapi_json() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(openapi_document()?))
}

/// GET /swagger
pub async fn swagger_ui() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SWAGGER_UI)
}

/// Configure documentation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swagger", web::get().to(swagger_ui))
        .route("/swagger/", web::get().to(swagger_ui))
        .route("/swagger/v1/swagger.json", web::get().to(openapi_json));
}
