use actix_web::HttpResponse;

use crate::dto::MeResponse;
use crate::middleware::CurrentPrincipal;

/// Handler for GET /api/v1/auth/me
///
/// Both session guard gates run before this handler, so the principal is
/// known to exist and not be blocked.
pub async fn me(principal: CurrentPrincipal) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse::from(&principal.0))
}
