use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Identity provider token verification. A PEM public key selects RS256,
/// otherwise the shared secret is used with HS256.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub resend_api_key: String,
    #[serde(default = "default_sender_email")]
    pub sender_email: String,
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            sender_email: default_sender_email(),
            company_name: default_company_name(),
            enabled: false,
        }
    }
}

impl EmailConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled || !self.resend_api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_public_url")]
    pub public_url: String,
    #[serde(default = "default_public_url")]
    pub frontend_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            frontend_url: default_public_url(),
        }
    }
}

fn default_sender_email() -> String {
    "no-reply@buymeadrink.app".to_string()
}

fn default_company_name() -> String {
    "BuyMeADrink".to_string()
}

fn default_public_url() -> String {
    "https://buymeadrink.app".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no file: build from environment and defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    auth: AuthConfig::default(),
                    stripe: StripeConfig::default(),
                    email: EmailConfig::default(),
                    app: AppConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables win over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_PUBLIC_KEY_PEM") {
            self.auth.jwt_public_key_pem = Some(v);
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("RESEND_API_KEY") {
            self.email.resend_api_key = v;
        }
        if let Ok(v) = env::var("SENDER_EMAIL") {
            self.email.sender_email = v;
        }
        if let Ok(v) = env::var("COMPANY_NAME") {
            self.email.company_name = v;
        }
        if let Ok(v) = env::var("EMAIL_ENABLED") {
            self.email.enabled = v == "true";
        }
        if let Ok(v) = env::var("PUBLIC_URL") {
            self.app.public_url = v;
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.app.frontend_url = v;
        }
    }
}
