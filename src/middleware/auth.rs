//! Bearer token authentication
//!
//! Accepts HS256-signed JWTs issued by a trusted party. Token issuance is
//! handled elsewhere; this middleware only validates.

use crate::config::JwtConfig;
use crate::core::AppError;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use futures_util::future::LocalBoxFuture;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Clock skew tolerated on `exp` and `nbf`
const LEEWAY_SECS: i64 = 60;

/// Paths reachable without a token
fn is_public_path(path: &str) -> bool {
    path == "/" || path == "/health" || path == "/ready" || path.starts_with("/swagger")
}

/// `aud` may be a single string or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Validated token claims, available to handlers through request extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: i64,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Checks signature and registered claims of HS256 tokens
pub struct JwtValidator {
    issuer: String,
    audience: String,
    secret_key: Vec<u8>,
}

impl JwtValidator {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            secret_key: config.secret_key.as_bytes().to_vec(),
        }
    }

    pub fn validate(&self, token: &str) -> crate::core::Result<Claims> {
        self.validate_at(token, chrono::Utc::now().timestamp())
    }

    pub fn validate_at(&self, token: &str, now: i64) -> crate::core::Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header_segment), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::unauthorized("Malformed bearer token"));
        };

        let header: JoseHeader = serde_json::from_slice(&decode_segment(header_segment)?)
            .map_err(|_| AppError::unauthorized("Malformed token header"))?;
        if header.alg != "HS256" {
            return Err(AppError::unauthorized(format!(
                "Unsupported token algorithm: {}",
                header.alg
            )));
        }

        let signature = decode_segment(signature)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret_key)
            .map_err(|e| AppError::internal(format!("Invalid signing key: {}", e)))?;
        mac.update(header_segment.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AppError::unauthorized("Invalid token signature"))?;

        let claims: Claims = serde_json::from_slice(&decode_segment(payload)?)
            .map_err(|_| AppError::unauthorized("Malformed token claims"))?;

        if claims.iss != self.issuer {
            return Err(AppError::unauthorized("Invalid token issuer"));
        }
        if !claims.aud.contains(&self.audience) {
            return Err(AppError::unauthorized("Invalid token audience"));
        }
        if claims.exp + LEEWAY_SECS <= now {
            return Err(AppError::unauthorized("Token expired"));
        }
        if matches!(claims.nbf, Some(nbf) if nbf - LEEWAY_SECS > now) {
            return Err(AppError::unauthorized("Token not yet valid"));
        }

        Ok(claims)
    }
}

fn decode_segment(segment: &str) -> crate::core::Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AppError::unauthorized("Malformed bearer token"))
}

/// JWT bearer authentication middleware
pub struct JwtAuth {
    validator: Arc<JwtValidator>,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(config)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    validator: Arc<JwtValidator>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let validator = self.validator.clone();

        Box::pin(async move {
            if is_public_path(req.path()) {
                return svc.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            let claims = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::unauthorized("Missing bearer token"))
                .and_then(|token| validator.validate(token.trim()));

            match claims {
                Ok(claims) => {
                    tracing::debug!(subject = ?claims.sub, "Bearer token accepted");
                    req.extensions_mut().insert(claims);
                    svc.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    tracing::warn!(path = %req.path(), error = %err, "Request rejected");
                    let (request, _) = req.into_parts();
                    let response = HttpResponse::from_error(err).map_into_right_body();
                    Ok(ServiceResponse::new(request, response))
                }
            }
        })
    }
}
