use std::sync::Arc;

use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::election::Election;
use crate::model::{
    api::auth::{Authenticator, RollNumberAuthenticator},
    common::{
        clock::{Clock, SystemClock},
        phase::Timeline,
    },
    db::admin::Admin,
    store::{ElectionStore, MemoryStore, MongoStore},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    voter_id_digits: usize,
    auth_ttl: u32,
    timeline: Timeline,
    // secrets
    jwt_secret: String,
    admin_password_hash: String,
}

impl Config {
    /// Exact length of a voter's roll number.
    pub fn voter_id_digits(&self) -> usize {
        self.voter_id_digits
    }

    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// When registration and voting open and close.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// The configured administrator.
    pub fn admin(&self) -> Admin {
        Admin::new(&self.admin_password_hash)
    }
}

/// A fairing that loads the application config and puts it in managed state,
/// along with the voter [`Authenticator`] it configures.
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
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if let Err(e) = config.timeline().validate() {
            error!("Invalid election config: {e}");
            return Err(rocket);
        }

        let authenticator: Box<dyn Authenticator> =
            Box::new(RollNumberAuthenticator::new(config.voter_id_digits()));

        // Manage the state.
        rocket = rocket.manage(config).manage(authenticator);
        Ok(rocket)
    }
}

/// Configuration for the store.
#[derive(Deserialize)]
struct StoreConfig {
    // secrets
    db_uri: Option<String>,
    db_name: Option<String>,
}

/// A fairing that sets up the election store, then builds the [`Election`]
/// over it and places it into managed state.
///
/// With a `db_uri`, the store is MongoDB; without one, everything is kept in
/// memory and lost on shutdown.
/// Must be attached after [`ConfigFairing`].
pub struct ElectionFairing;

#[rocket::async_trait]
impl Fairing for ElectionFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let Some(timeline) = rocket.state::<Config>().map(|c| c.timeline().clone()) else {
            error!("Election fairing attached before config fairing");
            return Err(rocket);
        };

        let store: Arc<dyn ElectionStore> = match config.db_uri {
            Some(db_uri) => {
                info!("Loaded database config, connecting...");
                let db_name = config.db_name.unwrap_or_else(database_name);
                match connect(&db_uri, &db_name).await {
                    Ok(store) => {
                        info!("...database connection online!");
                        Arc::new(store)
                    }
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                }
            }
            None => {
                warn!("No `db_uri` configured: votes are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(rocket.manage(Election::new(store, clock, timeline)))
    }
}

async fn connect(db_uri: &str, db_name: &str) -> Result<MongoStore, mongodb::error::Error> {
    let client = MongoClient::with_uri_str(db_uri).await?;
    let db = client.database(db_name);
    MongoStore::connect(client, &db).await
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn database_name() -> String {
    "chainvote".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}
