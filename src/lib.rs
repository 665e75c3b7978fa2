#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, ElectionFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod election;
pub mod error;
pub mod logging;
pub mod model;

/// Assemble the server from the figment in `Rocket.toml` and `ROCKET_*` variables.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(ElectionFairing)
}

/// A figment with everything the application needs, for tests.
#[cfg(test)]
pub(crate) fn test_figment() -> rocket::figment::Figment {
    use crate::model::{
        common::phase::Timeline,
        db::admin::examples::{hash_password, EXAMPLE_ADMIN_PASSWORD},
    };

    rocket::figment::Figment::from(rocket::Config::debug_default())
        .merge(("voter_id_digits", 6))
        .merge(("auth_ttl", 3600))
        .merge(("jwt_secret", "test jwt secret"))
        .merge(("admin_password_hash", hash_password(EXAMPLE_ADMIN_PASSWORD)))
        .merge(("timeline", Timeline::example()))
}

/// A server over a fresh in-memory election, driven by the given clock.
#[cfg(test)]
pub(crate) fn rocket_for_test(clock: model::common::clock::ManualClock) -> Rocket<Build> {
    use std::sync::Arc;

    use crate::election::Election;
    use crate::model::{common::phase::Timeline, store::MemoryStore};

    let election = Election::new(
        Arc::new(MemoryStore::new()),
        Arc::new(clock),
        Timeline::example(),
    );
    rocket::custom(test_figment())
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(election)
}
