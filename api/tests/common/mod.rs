//! Shared wiring for the HTTP integration tests: the real service graph over
//! in-memory stores and collaborators.

#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    App,
};
use std::sync::Arc;
use uuid::Uuid;

use gb_api::{build_components, create_app, AppComponents};
use gb_core::domain::entities::{
    ClientMetadata, EmployerProfile, OtpPurpose, RoleProfile, TokenPair, WorkerProfile,
};
use gb_core::domain::value_objects::OtpVerification;
use gb_core::repositories::{MockOtpRepository, MockPrincipalRepository, MockSessionRepository};
use gb_core::services::mock::{MockCacheService, MockMailService};
use gb_core::services::RegistrationRequest;
use gb_shared::config::{AuthConfig, CorsConfig, Environment};

pub const PASSWORD: &str = "correct horse battery";

pub type TestComponents = AppComponents<
    MockPrincipalRepository,
    MockSessionRepository,
    MockOtpRepository,
    MockCacheService,
    MockMailService,
>;

pub fn test_config() -> AuthConfig {
    let mut config = AuthConfig::for_environment(Environment::Development);
    config.password.bcrypt_cost = 4;
    config.cleanup.enabled = false;
    config
}

pub struct TestContext {
    pub components: TestComponents,
    pub principals: Arc<MockPrincipalRepository>,
    pub sessions: Arc<MockSessionRepository>,
    pub otps: Arc<MockOtpRepository>,
    pub cache: Arc<MockCacheService>,
    pub mail: Arc<MockMailService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let principals = Arc::new(MockPrincipalRepository::new());
        let sessions = Arc::new(MockSessionRepository::new());
        let otps = Arc::new(MockOtpRepository::new());
        let cache = Arc::new(MockCacheService::new());
        let mail = Arc::new(MockMailService::new());

        let components = build_components(
            Arc::clone(&principals),
            Arc::clone(&sessions),
            Arc::clone(&otps),
            Arc::clone(&cache),
            Arc::clone(&mail),
            &config,
        );

        Self {
            components,
            principals,
            sessions,
            otps,
            cache,
            mail,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        create_app(
            &self.components,
            &CorsConfig::default(),
            Environment::Development,
            64 * 1024,
        )
    }

    /// Register a worker without verifying the email
    pub async fn register(&self, email: &str) -> Uuid {
        let auth = &self.components.state.auth_service;
        auth.register(RegistrationRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            profile: RoleProfile::Worker(WorkerProfile {
                full_name: "Jane Doe".to_string(),
                skills: vec!["plumbing".to_string()],
            }),
        })
        .await
        .expect("registration")
        .principal_id
    }

    /// Register an employer and verify its email with the mailed code
    pub async fn register_verified(&self, email: &str) -> Uuid {
        let auth = &self.components.state.auth_service;
        let id = auth
            .register(RegistrationRequest {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                profile: RoleProfile::Employer(EmployerProfile {
                    full_name: "Jane Doe".to_string(),
                    company_name: Some("Acme".to_string()),
                }),
            })
            .await
            .expect("registration")
            .principal_id;

        let code = self
            .mail
            .last_code(email, OtpPurpose::Register)
            .await
            .expect("registration code mailed");
        let outcome = auth
            .otp_service()
            .verify_otp(id, email, OtpPurpose::Register, &code)
            .await
            .expect("verification");
        assert_eq!(outcome, OtpVerification::Verified);
        id
    }

    /// Open a session for a verified account
    pub async fn login(&self, email: &str) -> TokenPair {
        self.components
            .state
            .auth_service
            .login(email, PASSWORD, ClientMetadata::default())
            .await
            .expect("login")
            .tokens
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn refresh_cookie(token: &str) -> Cookie<'static> {
    Cookie::new("refresh_token", token.to_owned())
}

/// The refresh cookie set on a response, if any
pub fn response_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "refresh_token")
        .map(|c| c.into_owned())
}
