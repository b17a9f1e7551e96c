use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub identity: IdentitySettings,
    pub venue: VenueSettings,
    pub line: LineSettings,
    pub invitation: InvitationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Public URL of the web front-end, used to build invitation links.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProvider {
    Jwt,
    Line,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    pub provider: IdentityProvider,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub line_channel_id: String,
    pub line_verify_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VenueSettings {
    /// Subject id that becomes the owner when it registers.
    pub owner_subject_id: String,
    /// Offset of the venue's local time from UTC. Drives the "no past
    /// dates" rule and the default reminder date.
    pub utc_offset_minutes: i32,
    /// Bindings younger than this are left alone by slot reconciliation.
    pub reconcile_grace_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LineSettings {
    pub channel_access_token: Option<String>,
    pub push_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InvitationSettings {
    pub code_length: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("HIDEAWAY"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.base_url", "http://localhost:5173")?
            .set_default("database.backend", "mongo")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "hideaway")?
            .set_default("identity.provider", "line")?
            .set_default("identity.jwt_secret", "change-me-in-production")?
            .set_default("identity.jwt_issuer", "hideaway")?
            .set_default("identity.line_channel_id", "")?
            .set_default(
                "identity.line_verify_url",
                "https://api.line.me/oauth2/v2.1/verify",
            )?
            .set_default("venue.owner_subject_id", "")?
            .set_default("venue.utc_offset_minutes", 540)?
            .set_default("venue.reconcile_grace_seconds", 300)?
            .set_default("line.push_url", "https://api.line.me/v2/bot/message/push")?
            .set_default("invitation.code_length", 8)?
            .build()?;

        config.try_deserialize()
    }
}
