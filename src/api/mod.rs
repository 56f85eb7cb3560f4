use rocket::{serde::json::Json, Catcher, Request, Route};
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod public;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(admin::routes());
    routes.extend(public::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![fallback_catcher]
}

#[derive(Serialize)]
struct CatcherBody {
    error: String,
}

/// Turn any response that did not come from a handler into JSON, so clients
/// never see Rocket's HTML error pages.
#[catch(default)]
fn fallback_catcher(status: rocket::http::Status, _req: &Request<'_>) -> Json<CatcherBody> {
    Json(CatcherBody {
        error: status
            .reason()
            .unwrap_or("Unknown Error")
            .to_string(),
    })
}
