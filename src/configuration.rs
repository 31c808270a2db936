use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

/// Host and port the server binds to. Also used to build the activation
/// URL returned by the registration endpoint.
#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64, // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000_i64)?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "password")?
        .set_default("database.port", 5432_i64)?
        .set_default("database.host", "127.0.0.1")?
        .set_default("database.database_name", "gatekeeper")?
        .set_default("jwt.secret", "change-me-development-secret-key-32ch")?
        .set_default("jwt.access_token_expiry", 900_i64)?
        .set_default("jwt.refresh_token_expiry", 604800_i64)?
        .set_default("jwt.issuer", "gatekeeper")?
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_loads() {
        let settings = get_configuration().expect("Failed to load configuration");
        assert!(!settings.jwt.secret.is_empty());
        assert!(settings.jwt.access_token_expiry < settings.jwt.refresh_token_expiry);
    }

    #[test]
    fn connection_string_is_well_formed() {
        let settings = get_configuration().expect("Failed to load configuration");
        let conn = settings.database.connection_string();
        assert!(conn.starts_with("postgres://"));
        assert!(conn.ends_with(&settings.database.database_name));
    }
}
