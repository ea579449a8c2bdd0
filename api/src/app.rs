//! Application state and factory
//!
//! This module wires the core services together and provides the factory
//! for the Actix-web application. Both the binary and the integration tests
//! go through [`build_components`] and [`create_app`], so they only differ
//! in which repository and collaborator implementations they pass in.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, HttpResponse,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::handlers::json_error_handler;
use crate::middleware::{create_cors, ActivePrincipalGuard, JwtAuth, SecurityHeaders, SessionGuardWrapper};
use crate::routes::{auth, otp, AppState};

use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{
    AuthService, AuthServiceConfig, CacheServiceTrait, CleanupService, CleanupServiceConfig,
    MailServiceTrait, OtpService, OtpServiceConfig, PasswordService, RevocationService,
    SessionGuard, TokenService, TokenServiceConfig,
};
use gb_shared::config::{AuthConfig, CorsConfig, Environment};
use gb_shared::errors::{error_codes, ErrorResponse};
use gb_shared::HealthResponse;

/// Everything the HTTP layer and the background reaper need
pub struct AppComponents<P, S, O, C, M>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    pub state: web::Data<AppState<P, S, O, C, M>>,
    pub guard: web::Data<Arc<dyn SessionGuardWrapper>>,
    pub cleanup: Arc<CleanupService<P, S, O>>,
}

impl<P, S, O, C, M> Clone for AppComponents<P, S, O, C, M>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            guard: self.guard.clone(),
            cleanup: Arc::clone(&self.cleanup),
        }
    }
}

/// Build the service graph over the given stores and collaborators
pub fn build_components<P, S, O, C, M>(
    principals: Arc<P>,
    sessions: Arc<S>,
    otps: Arc<O>,
    cache: Arc<C>,
    mail: Arc<M>,
    config: &AuthConfig,
) -> AppComponents<P, S, O, C, M>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let passwords = Arc::new(PasswordService::new(config.password.bcrypt_cost));
    let tokens = Arc::new(TokenService::new(
        Arc::clone(&sessions),
        TokenServiceConfig::from(&config.jwt),
    ));
    let revocation = Arc::new(RevocationService::new(Arc::clone(&cache)));

    let otp_service = Arc::new(OtpService::new(
        Arc::clone(&otps),
        Arc::clone(&principals),
        cache,
        mail,
        Arc::clone(&passwords),
        OtpServiceConfig::from(&config.otp),
    ));

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&principals),
        Arc::clone(&tokens),
        otp_service,
        Arc::clone(&revocation),
        passwords,
        AuthServiceConfig::from(&config.password),
    ));

    let guard: Arc<dyn SessionGuardWrapper> = Arc::new(SessionGuard::new(
        tokens,
        revocation,
        Arc::clone(&principals),
    ));

    let cleanup = Arc::new(CleanupService::new(
        principals,
        sessions,
        otps,
        CleanupServiceConfig::from(&config.cleanup),
    ));

    AppComponents {
        state: web::Data::new(AppState {
            auth_service,
            cookie: config.cookie.clone(),
        }),
        guard: web::Data::new(guard),
        cleanup,
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<P, S, O, C, M>(
    components: &AppComponents<P, S, O, C, M>,
    cors: &CorsConfig,
    environment: Environment,
    max_payload_size: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(json_error_handler);

    App::new()
        .app_data(components.state.clone())
        .app_data(components.guard.clone())
        .app_data(json_config)
        // Registered last so it runs first: logging wraps CORS wraps headers
        .wrap(SecurityHeaders::for_environment(environment))
        .wrap(create_cors(cors))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route(
                            "/register/worker",
                            web::post().to(auth::register_worker::<P, S, O, C, M>),
                        )
                        .route(
                            "/register/employer",
                            web::post().to(auth::register_employer::<P, S, O, C, M>),
                        )
                        .route("/login", web::post().to(auth::login::<P, S, O, C, M>))
                        .route("/refresh", web::post().to(auth::refresh::<P, S, O, C, M>))
                        .route("/logout", web::post().to(auth::logout::<P, S, O, C, M>))
                        .route(
                            "/password/reset",
                            web::post().to(auth::reset_password::<P, S, O, C, M>),
                        )
                        .service(
                            web::resource("/logout-all")
                                .wrap(ActivePrincipalGuard)
                                .wrap(JwtAuth)
                                .route(web::post().to(auth::logout_all::<P, S, O, C, M>)),
                        )
                        .service(
                            web::resource("/me")
                                .wrap(ActivePrincipalGuard)
                                .wrap(JwtAuth)
                                .route(web::get().to(auth::me)),
                        ),
                )
                .service(
                    web::scope("/otp")
                        .route("/request", web::post().to(otp::request_otp::<P, S, O, C, M>))
                        .route("/verify", web::post().to(otp::verify_otp::<P, S, O, C, M>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy("gigboard-api", env!("CARGO_PKG_VERSION")))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
