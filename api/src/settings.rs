use crate::{auth, sqlite};
use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub sqlite: sqlite::Settings,
    pub auth: auth::Settings,
}

impl Settings {
    /// Defaults, then `config/default.toml`, then `PORTAL_*` variables.
    /// `DATABASE_URL` wins over everything for the sqlite url.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None, std::env::var("DATABASE_URL").ok())
    }

    /// `env` replaces the process environment when given.
    fn build(
        env: Option<Map<String, String>>,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.port", 3000)?
            .set_default("sqlite.url", "sqlite://db/portal.db")?
            .set_default("sqlite.max_connections", 5)?
            .set_default("auth.admin_emails", Vec::<String>::new())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("PORTAL")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("sqlite.url", database_url)?
            .build()?
            .try_deserialize()
    }
}
