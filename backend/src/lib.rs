pub mod routes;
pub mod config;
pub mod cors;
pub mod error;
pub mod live;
pub mod catchers;
pub use shared::{models::*, Error, ErrorCode, PollError};
pub use shared::{AggregationService, PollStore, TallyPolicy};

use rocket::{Build, Rocket, catchers, routes, fairing::AdHoc, figment::Figment};
use tracing::{error, info};

use crate::{config::AppConfig, routes::AppState};

/// Assembles the server. State is built during ignition from the `AppConfig`
/// found in `figment`; an invalid config aborts launch.
pub fn build_rocket(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("Poll state", |rocket| async move {
            let config = match rocket.figment().extract::<AppConfig>() {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to read configuration: {}", e);
                    return Err(rocket);
                }
            };
            if let Err(e) = config.validate() {
                error!("Invalid configuration: {}", e);
                return Err(rocket);
            }

            info!(
                policy = ?config.tally_policy,
                interval_ms = config.live_update_interval_ms,
                "📋 Poll store ready"
            );
            Ok(rocket.manage(AppState::new(config)))
        }))
        .attach(cors::Cors)
        .mount(
            "/api",
            routes![
                routes::create_poll,
                routes::cast_vote,
                routes::cast_votes,
                routes::get_results,
                routes::poll_updates,
                routes::list_polls,
                routes::get_poll,
                routes::all_options
            ],
        )
        .register(
            "/",
            catchers![
                catchers::bad_request,
                catchers::not_found,
                catchers::unprocessable,
                catchers::internal_error
            ],
        )
}

#[cfg(test)]
mod tests;
