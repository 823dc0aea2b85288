use hmac::{Hmac, Mac};
use rocket::http::{Cookie, SameSite};
use rocket::request::{FromRequest, Outcome, Request};
use sha2::Sha256;

use crate::config::AppConfig;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "postboard_session";

/// The visitor's session id, read from the session cookie or freshly issued.
#[derive(Clone)]
pub struct Session(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Cached so every guard in one request sees the same id.
        let session = req.local_cache(|| {
            let cookies = req.cookies();
            let existing = cookies
                .get(SESSION_COOKIE)
                .map(|c| c.value().trim().to_string())
                .filter(|id| !id.is_empty());
            if let Some(id) = existing {
                return Session(id);
            }
            let id = uuid::Uuid::new_v4().simple().to_string();
            cookies.add(
                Cookie::build((SESSION_COOKIE, id.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            );
            Session(id)
        });
        Outcome::Success(session.clone())
    }
}

/// CSRF token for the current session, for embedding in forms.
pub struct CsrfToken(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CsrfToken {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<AppConfig>() else {
            return Outcome::Error((rocket::http::Status::InternalServerError, ()));
        };
        let session = req.guard::<Session>().await;
        match session {
            Outcome::Success(session) => {
                Outcome::Success(CsrfToken(token_for(&config.app_key, &session.0)))
            }
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(s) => Outcome::Forward(s),
        }
    }
}

/// Where a failed submission is sent back to: the referring form page when
/// it is same-origin, otherwise `/`. Only the form page renders the errors.
pub struct Back(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Back {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let host = req.headers().get_one("Host");
        let back = req
            .headers()
            .get_one("Referer")
            .and_then(|r| same_origin_path(r, host))
            .filter(|p| is_form_page(p))
            .unwrap_or_else(|| "/".to_string());
        Outcome::Success(Back(back))
    }
}

fn same_origin_path(referer: &str, host: Option<&str>) -> Option<String> {
    let referer = referer.trim();
    let path = if referer.starts_with('/') {
        referer
    } else {
        let rest = referer
            .strip_prefix("http://")
            .or_else(|| referer.strip_prefix("https://"))?;
        let (authority, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, "/"),
        };
        if Some(authority) != host {
            return None;
        }
        path
    };
    // Protocol-relative paths would leave the site.
    if path.starts_with("//") || path.contains('\\') {
        return None;
    }
    Some(path.to_string())
}

fn is_form_page(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or("");
    path == "/"
}

pub fn token_for(key: &[u8], session_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(session_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a submitted token against the session.
pub fn verify(key: &[u8], session_id: &str, token: Option<&str>) -> bool {
    let Some(bytes) = token.and_then(|t| hex::decode(t.trim()).ok()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(session_id.as_bytes());
    mac.verify_slice(&bytes).is_ok()
}
