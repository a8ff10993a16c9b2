/// OpenAPI document checks
///
/// Validates docs/openapi.yaml against the routes and enums the API
/// actually serves.

use serde_json::Value;
use std::collections::HashSet;

use crudkit::modules::orders::OrderStatus;

const METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

fn document() -> Value {
    let openapi_yaml = include_str!("../../docs/openapi.yaml");
    serde_yaml::from_str(openapi_yaml).expect("Failed to parse OpenAPI YAML")
}

fn operations(spec: &Value) -> Vec<(String, String, Value)> {
    let paths = spec["paths"].as_object().expect("Paths should be an object");
    let mut operations = Vec::new();
    for (path, item) in paths {
        for (method, operation) in item.as_object().into_iter().flatten() {
            if METHODS.contains(&method.as_str()) {
                operations.push((method.clone(), path.clone(), operation.clone()));
            }
        }
    }
    operations
}

#[test]
fn test_openapi_version_is_3_0_x() {
    let spec = document();
    let version = spec["openapi"].as_str().expect("OpenAPI version should be a string");
    assert!(version.starts_with("3.0"), "OpenAPI version should be 3.0.x, got: {}", version);
}

#[test]
fn test_openapi_info_section() {
    let spec = document();
    assert!(spec["info"]["title"].is_string());
    assert_eq!(spec["info"]["version"], "1.0");
    assert!(spec["info"]["description"].is_string());
}

#[test]
fn test_openapi_bearer_security_applies_globally() {
    let spec = document();
    let scheme = &spec["components"]["securitySchemes"]["bearerAuth"];
    assert_eq!(scheme["type"], "http");
    assert_eq!(scheme["scheme"], "bearer");
    assert_eq!(scheme["bearerFormat"], "JWT");
    assert!(spec["security"][0].get("bearerAuth").is_some());
}

#[test]
fn test_openapi_server_is_v1() {
    let spec = document();
    assert_eq!(spec["servers"][0]["url"], "/api/v1");
}

#[test]
fn test_openapi_resource_paths_defined() {
    let spec = document();
    let paths = spec["paths"].as_object().unwrap();
    for path in [
        "/customers",
        "/customers/{id}",
        "/orders",
        "/orders/{id}",
        "/orders/{id}/lines",
    ] {
        assert!(paths.contains_key(path), "Path {} should be documented", path);
    }
}

#[test]
fn test_openapi_operation_ids_unique() {
    let spec = document();
    let mut operation_ids = HashSet::new();

    for (method, path, operation) in operations(&spec) {
        let op_id = operation["operationId"]
            .as_str()
            .unwrap_or_else(|| panic!("Operation {} {} should have an operationId", method.to_uppercase(), path));
        assert!(operation_ids.insert(op_id.to_string()), "Duplicate operationId found: {}", op_id);
    }

    assert_eq!(operation_ids.len(), 12);
}

#[test]
fn test_openapi_operations_document_unauthorized() {
    let spec = document();
    for (method, path, operation) in operations(&spec) {
        let responses = operation["responses"].as_object().expect("Responses should be an object");
        assert!(
            responses.contains_key("401"),
            "Operation {} {} should document 401",
            method.to_uppercase(),
            path
        );
    }
}

#[test]
fn test_openapi_order_status_enum_matches_implementation() {
    let spec = document();
    let documented: Vec<&str> = spec["components"]["schemas"]["OrderStatus"]["enum"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();

    for status in &documented {
        assert!(status.parse::<OrderStatus>().is_ok(), "Unknown status {}", status);
    }
    for status in [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ] {
        assert!(documented.contains(&status.to_string().as_str()));
    }
}

#[test]
fn test_openapi_error_envelope_schema() {
    let spec = document();
    let error = &spec["components"]["schemas"]["Error"];
    assert_eq!(error["required"][0], "error");
    let inner = &error["properties"]["error"]["properties"];
    assert!(inner.get("message").is_some());
    assert!(inner.get("code").is_some());
}

#[test]
fn test_openapi_served_document_matches_file() {
    let served = crudkit::modules::docs::controllers::docs_controller::openapi_document().unwrap();
    assert_eq!(served, &document());
}
