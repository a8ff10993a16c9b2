//! API version reporting
//!
//! Only version 1.0 is served. Requests under `/api/` without a version
//! segment are routed as 1.0.

use crate::core::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub const API_SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";
pub const SUPPORTED_API_VERSIONS: &str = "1.0";

/// Adds `api-supported-versions` to every response
pub struct ReportApiVersions;

impl<S, B> Transform<S, ServiceRequest> for ReportApiVersions
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ReportApiVersionsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ReportApiVersionsMiddleware { service }))
    }
}

pub struct ReportApiVersionsMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ReportApiVersionsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut().insert(
                HeaderName::from_static(API_SUPPORTED_VERSIONS_HEADER),
                HeaderValue::from_static(SUPPORTED_API_VERSIONS),
            );
            Ok(res)
        })
    }
}

/// Fallback for `/api/v{version}/...` when the version is not served
pub async fn unsupported_api_version(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let version = req.match_info().get("version").unwrap_or_default();
    Err(AppError::UnsupportedApiVersion(format!(
        "{} (supported: {})",
        version, SUPPORTED_API_VERSIONS
    )))
}
