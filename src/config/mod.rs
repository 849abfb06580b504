use crate::error::AppError;
use crate::services::tax::TaxPolicy;
use config::{Config as Cfg, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub common: CommonConfig,
    pub mongodb: MongoConfig,
    /// Directory holding the company profile file and the uploaded logo.
    pub assets_dir: String,
    pub tax_policy: TaxPolicy,
    /// Present only when all three sheets variables are configured.
    pub sheets: Option<SheetsConfig>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub client_email: String,
    pub private_key: String,
    pub spreadsheet_id: String,
}

impl ServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let common: CommonConfig = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let tax_policy = match get_env("TAX_POLICY", Some("per_item"), is_prod)?.as_str() {
            "per_item" => TaxPolicy::PerItem,
            "flat" => {
                let raw = get_env("FLAT_TAX_RATE", Some("18"), is_prod)?;
                let rate = Decimal::from_str(&raw).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid FLAT_TAX_RATE '{}': {}", raw, e))
                })?;
                TaxPolicy::Flat { rate }
            }
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Invalid TAX_POLICY '{}': expected per_item or flat",
                    other
                )))
            }
        };

        Ok(ServiceConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("invoice_db"), is_prod)?,
            },
            assets_dir: get_env("ASSETS_DIR", Some("assets"), is_prod)?,
            tax_policy,
            sheets: load_sheets_config()?,
        })
    }
}

/// The export sink is optional: when none of its variables are set the
/// service runs with export disabled. A partial configuration is a
/// startup error, not a silently disabled sink.
fn load_sheets_config() -> Result<Option<SheetsConfig>, AppError> {
    let client_email = env::var("GOOGLE_CLIENT_EMAIL").ok();
    let private_key = env::var("GOOGLE_PRIVATE_KEY").ok();
    let spreadsheet_id = env::var("SPREADSHEET_ID").ok();

    match (client_email, private_key, spreadsheet_id) {
        (Some(client_email), Some(private_key), Some(spreadsheet_id)) => Ok(Some(SheetsConfig {
            client_email,
            // Hosted env vars store the key with literal \n sequences.
            private_key: private_key.replace("\\n", "\n"),
            spreadsheet_id,
        })),
        (None, None, None) => Ok(None),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "Incomplete sheets export configuration: GOOGLE_CLIENT_EMAIL, GOOGLE_PRIVATE_KEY and SPREADSHEET_ID must all be set"
        ))),
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
