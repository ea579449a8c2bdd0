//! Session guard middleware for protected endpoints.
//!
//! Two layers, applied together on every protected route:
//! 1. [`JwtAuth`] checks the bearer token (format, signature, expiry,
//!    blacklist) and stores an [`AuthenticatedToken`] in the request
//!    extensions. It never touches the credential store.
//! 2. [`ActivePrincipalGuard`] loads the principal named by that token and
//!    rejects missing or blocked accounts, storing the [`Principal`].
//!
//! Register `JwtAuth` last so it runs first:
//! `.wrap(ActivePrincipalGuard).wrap(JwtAuth)`.
//!
//! Failures short-circuit with the same JSON envelope handlers produce.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::{BoxFuture, LocalBoxFuture};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};
use uuid::Uuid;

use gb_core::domain::entities::Principal;
use gb_core::errors::{DomainError, DomainResult, TokenError};
use gb_core::repositories::{PrincipalRepository, SessionRepository};
use gb_core::services::{AuthenticatedToken, CacheServiceTrait, SessionGuard};

use crate::handlers::ApiError;

/// Object-safe view of [`SessionGuard`] so the middleware does not carry
/// the repository type parameters
pub trait SessionGuardWrapper: Send + Sync {
    fn check_token<'a>(&'a self, authorization: Option<&'a str>)
        -> BoxFuture<'a, DomainResult<AuthenticatedToken>>;

    fn check_principal(&self, principal_id: Uuid) -> BoxFuture<'_, DomainResult<Principal>>;
}

impl<S, P, C> SessionGuardWrapper for SessionGuard<S, P, C>
where
    S: SessionRepository + 'static,
    P: PrincipalRepository + 'static,
    C: CacheServiceTrait + 'static,
{
    fn check_token<'a>(
        &'a self,
        authorization: Option<&'a str>,
    ) -> BoxFuture<'a, DomainResult<AuthenticatedToken>> {
        Box::pin(self.authenticate_bearer(authorization))
    }

    fn check_principal(&self, principal_id: Uuid) -> BoxFuture<'_, DomainResult<Principal>> {
        Box::pin(self.load_active_principal(principal_id))
    }
}

type GuardData = web::Data<Arc<dyn SessionGuardWrapper>>;

fn guard_from(req: &ServiceRequest) -> Result<GuardData, ApiError> {
    req.app_data::<GuardData>().cloned().ok_or_else(|| {
        ApiError(DomainError::Internal {
            message: "session guard not configured".to_string(),
        })
    })
}

fn reject<B>(req: ServiceRequest, error: ApiError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(error.error_response()).map_into_right_body()
}

/// Token gate middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

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
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let guard = match guard_from(&req) {
                Ok(guard) => guard,
                Err(e) => return Ok(reject(req, e)),
            };

            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match guard.check_token(authorization.as_deref()).await {
                Ok(token) => {
                    req.extensions_mut().insert(token);
                }
                Err(e) => return Ok(reject(req, ApiError(e))),
            }

            let response = service.call(req).await?;
            Ok(response.map_into_left_body())
        })
    }
}

/// Active-principal gate middleware factory. Must run after [`JwtAuth`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivePrincipalGuard;

impl<S, B> Transform<S, ServiceRequest> for ActivePrincipalGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ActivePrincipalMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ActivePrincipalMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ActivePrincipalMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ActivePrincipalMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let guard = match guard_from(&req) {
                Ok(guard) => guard,
                Err(e) => return Ok(reject(req, e)),
            };

            let principal_id = req
                .extensions()
                .get::<AuthenticatedToken>()
                .map(|token| token.principal_id);
            let principal_id = match principal_id {
                Some(id) => id,
                None => return Ok(reject(req, TokenError::MissingToken.into())),
            };

            match guard.check_principal(principal_id).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                }
                Err(e) => return Ok(reject(req, ApiError(e))),
            }

            let response = service.call(req).await?;
            Ok(response.map_into_left_body())
        })
    }
}

/// Extractor for the token established by [`JwtAuth`]
#[derive(Debug, Clone)]
pub struct CurrentToken(pub AuthenticatedToken);

impl FromRequest for CurrentToken {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedToken>()
                .cloned()
                .map(CurrentToken)
                .ok_or_else(|| TokenError::MissingToken.into()),
        )
    }
}

/// Extractor for the principal loaded by [`ActivePrincipalGuard`]
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl FromRequest for CurrentPrincipal {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .map(CurrentPrincipal)
                .ok_or_else(|| TokenError::MissingToken.into()),
        )
    }
}
