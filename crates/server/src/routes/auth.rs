use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, warn};

use service::article::ArticleRepository;
use service::auth::{domain::LoginInput, errors::AuthError, is_authorized, AccessGate, SessionContext};

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

#[derive(Clone)]
pub struct ServerState {
    pub articles: Arc<dyn ArticleRepository>,
    pub gate: Arc<AccessGate>,
}

/// Resolve the request's session cookie into a context.
pub fn session_context(state: &ServerState, jar: &CookieJar) -> SessionContext {
    state.gate.resolve(jar.get(SESSION_COOKIE).map(|c| c.value()))
}

fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Login entry point; describes the form the front end should render.
pub async fn login_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "action": LOGIN_PATH,
        "method": "POST",
        "fields": ["username", "password"],
    }))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Result<(CookieJar, Redirect), Response> {
    match state.gate.login(&input) {
        Ok(session) => {
            info!(expires_at = %session.expires_at, "session opened");
            let jar = jar.add(session_cookie(session.token));
            Ok((jar, Redirect::to(DASHBOARD_PATH)))
        }
        Err(AuthError::Unauthorized) => Err((StatusCode::UNAUTHORIZED, "Incorrect credentials").into_response()),
        Err(e) => {
            error!(code = e.code(), err = %e, "login failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "login failed").into_response())
        }
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(session_cookie(String::new()));
    info!("session closed");
    (jar, Redirect::to("/"))
}

/// Middleware for admin routes: anonymous callers are sent to the login page
/// before the handler (and therefore the store) is reached.
pub async fn require_session(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let ctx = session_context(&state, &jar);
    if !is_authorized(&ctx) {
        warn!(path = %req.uri().path(), method = %req.method(), "unauthenticated admin request; redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    }
    next.run(req).await
}
