use serde::{Deserialize, Serialize};

/// Singleton company profile read by the renderer and mutated through the
/// admin endpoints. Persisted as a flat JSON file in the assets directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub email: String,
    /// Path reference to the uploaded logo, e.g. `/assets/company-logo.png`.
    #[serde(default)]
    pub logo: Option<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Default Company".to_string(),
            address: "Default Address".to_string(),
            gstin: "Default GSTIN".to_string(),
            email: "default@example.com".to_string(),
            logo: None,
        }
    }
}
