use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, CookieJar, SameSite, Status},
    request::{FromRequest, Outcome},
    serde::json::Json,
    Request, Route, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

const ADMIN_ROLE: &str = "admin";

pub fn routes() -> Vec<Route> {
    routes![authenticate, logout]
}

/// Raw admin credentials, received from a user. Never stored; only compared
/// against the configured hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub password: String,
}

/// Proof that a request carried a valid, unexpired admin token.
///
/// Admin routes take this as their first guard, so the credential check
/// happens before any other validation.
pub struct AdminToken;

/// Token claims: the admin role plus an expiry timestamp.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "rol")]
    role: String,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

impl AdminToken {
    /// Issue a fresh signed token wrapped in a cookie.
    #[allow(clippy::missing_panics_doc)]
    pub fn issue_cookie(config: &Config) -> Cookie<'static> {
        let claims = Claims {
            role: ADMIN_ROLE.to_string(),
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(rocket::time::Duration::seconds(
                config.auth_ttl().num_seconds(),
            ))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Verify a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let data: TokenData<Claims> = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )?;
        if data.claims.role != ADMIN_ROLE {
            return Err(Error::Unauthorized(
                "token does not grant admin rights".to_string(),
            ));
        }
        Ok(AdminToken)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return Outcome::Failure((
                Status::Unauthorized,
                Error::Unauthorized("missing admin token".to_string()),
            ));
        };

        match Self::from_cookie(cookie, config) {
            Ok(token) => Outcome::Success(token),
            Err(e) => Outcome::Failure((Status::Unauthorized, e)),
        }
    }
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
async fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    config: &State<Config>,
) -> Result<()> {
    if !config.verify_admin_password(&credentials.password) {
        return Err(Error::Unauthorized("invalid admin password".to_string()));
    }
    cookies.add(AdminToken::issue_cookie(config));
    Ok(())
}

#[delete("/auth")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, serde::json::json};

    use crate::test::{client, ADMIN_PASSWORD};

    use super::*;

    #[test]
    fn authenticate_valid() {
        let client = client();
        let response = client
            .post(uri!(authenticate))
            .header(ContentType::JSON)
            .body(json!({ "password": ADMIN_PASSWORD }).to_string())
            .dispatch();

        assert_eq!(response.status(), Status::Ok);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[test]
    fn authenticate_invalid() {
        let client = client();
        let response = client
            .post(uri!(authenticate))
            .header(ContentType::JSON)
            .body(json!({ "password": "wrong" }).to_string())
            .dispatch();

        assert_eq!(response.status(), Status::Unauthorized);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn logout_clears_token() {
        let client = client();
        client
            .post(uri!(authenticate))
            .header(ContentType::JSON)
            .body(json!({ "password": ADMIN_PASSWORD }).to_string())
            .dispatch();
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.delete(uri!(logout)).dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let client = client();

        // Any admin route will do.
        let response = client
            .post("/elections/e1/close")
            .cookie(Cookie::new(AUTH_TOKEN_COOKIE, "not-a-jwt"))
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
    }
}
