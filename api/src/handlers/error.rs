//! Maps every `DomainError` to a status code, an error code and a client-safe
//! message. Handlers return `Result<_, ApiError>` and use `?`; middleware
//! renders the same response through `ResponseError::error_response`.

use actix_web::{
    error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError,
};
use std::fmt;
use tracing::{debug, error};

use gb_core::errors::{AuthError, DomainError, OtpError, TokenError, ValidationError};
use gb_shared::errors::{error_codes, ErrorResponse};

/// Domain error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    /// Status and machine-readable code for the wrapped error
    pub fn classify(&self) -> (StatusCode, &'static str) {
        classify(&self.0)
    }

    /// Message safe to show clients. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match &self.0 {
            DomainError::CacheUnavailable { .. } => "Service temporarily unavailable".to_string(),
            DomainError::MailDispatch { .. } => "Failed to send verification email".to_string(),
            DomainError::Hashing { .. }
            | DomainError::Persistence { .. }
            | DomainError::Internal { .. }
            | DomainError::Token(TokenError::TokenGenerationFailed) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    fn field(&self) -> Option<&str> {
        match &self.0 {
            DomainError::ValidationErr(e) => Some(e.field()),
            DomainError::Otp(OtpError::EmailMismatch) => Some("email"),
            DomainError::Otp(OtpError::UnknownPurpose { .. }) => Some("purpose"),
            _ => None,
        }
    }
}

fn classify(error: &DomainError) -> (StatusCode, &'static str) {
    match error {
        DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
        DomainError::ValidationErr(ValidationError::InvalidFormat { .. }) => {
            (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
        }
        DomainError::ValidationErr(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, error_codes::VALIDATION_ERROR)
        }
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        DomainError::CacheUnavailable { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, error_codes::CACHE_UNAVAILABLE)
        }
        DomainError::MailDispatch { .. } => (StatusCode::BAD_GATEWAY, error_codes::MAIL_DISPATCH_FAILED),
        DomainError::Hashing { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, error_codes::HASHING_FAILED)
        }
        DomainError::Persistence { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, error_codes::PERSISTENCE_FAILED)
        }
        DomainError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
        }

        DomainError::Auth(auth) => match auth {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, error_codes::INVALID_CREDENTIALS)
            }
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AuthError::UserAlreadyExists => (StatusCode::CONFLICT, error_codes::USER_EXISTS),
            AuthError::UserBlocked => (StatusCode::FORBIDDEN, error_codes::ACCOUNT_BLOCKED),
            AuthError::EmailNotVerified => (StatusCode::CONFLICT, error_codes::EMAIL_NOT_VERIFIED),
        },

        DomainError::Token(token) => match token {
            TokenError::MissingToken | TokenError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED)
            }
            TokenError::TokenRevoked => (StatusCode::UNAUTHORIZED, error_codes::TOKEN_REVOKED),
            TokenError::MissingRefreshToken | TokenError::InvalidRefreshToken => {
                (StatusCode::UNAUTHORIZED, error_codes::INVALID_REFRESH_TOKEN)
            }
            TokenError::TokenGenerationFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        },

        DomainError::Otp(otp) => match otp {
            OtpError::MissingParameters => (StatusCode::BAD_REQUEST, error_codes::MISSING_PARAMETERS),
            OtpError::UnknownPurpose { .. } | OtpError::EmailMismatch => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
            }
            OtpError::InvalidOrExpired => {
                (StatusCode::BAD_REQUEST, error_codes::OTP_INVALID_OR_EXPIRED)
            }
            OtpError::TooManyAttempts => {
                (StatusCode::TOO_MANY_REQUESTS, error_codes::OTP_TOO_MANY_ATTEMPTS)
            }
        },
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code) = self.classify();
        if status.is_server_error() {
            error!(error = %self.0, code, "request failed");
        } else {
            debug!(error = %self.0, code, "request rejected");
        }

        let mut body = ErrorResponse::new(code, self.public_message());
        if let Some(field) = self.field() {
            body = body.add_detail("field", field);
        }
        HttpResponse::build(status).json(body)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError(error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError(error.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        ApiError(error.into())
    }
}

impl From<OtpError> for ApiError {
    fn from(error: OtpError) -> Self {
        ApiError(error.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError(error.into())
    }
}

/// Schema failures reported by `validator`. The first offending field (in
/// name order) is reported, under its JSON name.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let first = field_errors.iter().min_by(|a, b| a.0.cmp(b.0));

        let (field, rule) = match first {
            Some((name, errs)) => (
                camel_case(name),
                errs.first()
                    .map(|e| e.code.to_string())
                    .unwrap_or_else(|| "invalid".to_string()),
            ),
            None => ("body".to_string(), "invalid".to_string()),
        };

        ApiError(
            ValidationError::InvalidField {
                field,
                message: format!("failed {} check", rule),
            }
            .into(),
        )
    }
}

/// Malformed or oversized JSON bodies
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError(DomainError::Validation {
        message: format!("Invalid request body: {}", err),
    })
    .into()
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
