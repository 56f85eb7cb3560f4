use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    // secrets
    admin_password_hash: String,
    jwt_secret: String,
}

impl Config {
    /// Check a submitted password against the configured admin credential.
    /// The configuration stores an argon2-encoded hash, never the password.
    pub fn verify_admin_password(&self, password: &str) -> bool {
        argon2::verify_encoded(&self.admin_password_hash, password.as_bytes()).unwrap_or(false)
    }

    /// Secret key used to sign admin auth tokens.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Valid lifetime of an admin auth token in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// Written out explicitly rather than via `AdHoc::config` for control over
/// the error messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded application config");

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}
