use serde::Deserialize;

/// Partial company profile update. Absent fields survive the merge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
}
