#[macro_use]
extern crate rocket;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod system;

use config::ConfigFairing;
use logging::LoggerFairing;
use system::VotingSystem;

/// Construct the rocket instance with all routes, state, and fairings.
pub fn build() -> Rocket<Build> {
    configure(rocket::build())
}

fn configure(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(LoggerFairing)
        .manage(VotingSystem::new())
}
