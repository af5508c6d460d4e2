//! Role gate for routes and scopes.
//!
//! [`RequireRole`] resolves the caller from the cookie session through the
//! [`LoginService`](crate::domain::ports::LoginService) in [`HttpState`] and
//! only calls the wrapped service when the stored role is allowed. Refusals
//! are answered directly as error responses. The session middleware must wrap
//! the gate.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::Error as ApiError;
use crate::domain::access::{AllowedRoles, authorize};
use crate::inbound::http::session::resolve_caller;
use crate::inbound::http::state::HttpState;

/// Middleware factory parameterised by the roles it lets through.
///
/// # Examples
/// ```
/// use actix_web::{HttpResponse, web};
/// use taskhub::middleware::RequireRole;
///
/// let users = web::resource("/users")
///     .wrap(RequireRole::admin())
///     .route(web::get().to(HttpResponse::Ok));
/// ```
#[derive(Clone)]
pub struct RequireRole {
    allowed: Rc<AllowedRoles>,
}

impl RequireRole {
    /// Gate admitting exactly the roles in `allowed`.
    pub fn new(allowed: AllowedRoles) -> Self {
        Self {
            allowed: Rc::new(allowed),
        }
    }

    /// Gate that only admits administrators.
    pub fn admin() -> Self {
        Self::new(AllowedRoles::admin_only())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

/// Service wrapper produced by [`RequireRole`].
pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<AllowedRoles>,
}

async fn check(req: &ServiceRequest, allowed: &AllowedRoles) -> Result<(), ApiError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| ApiError::internal("role gate mounted without HTTP state"))?;
    let caller = resolve_caller(&req.get_session(), state.login.as_ref())
        .await?
        .ok_or_else(|| ApiError::unauthorized("login required"))?;
    authorize(&caller, allowed).inspect_err(|_| {
        debug!(user_id = %caller.user_id, role = %caller.role, path = req.path(), "role gate refused caller");
    })
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let allowed = Rc::clone(&self.allowed);
        Box::pin(async move {
            match check(&req, &allowed).await {
                Ok(()) => service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body),
                Err(error) => Ok(req.error_response(error).map_into_right_body()),
            }
        })
    }
}
