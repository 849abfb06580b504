//! File-backed company profile store.
//!
//! The profile is a single JSON document in the assets directory, lazily
//! seeded with defaults the first time the store is opened. All mutation
//! goes through the write lock, so two concurrent read-modify-write
//! updates serialize instead of silently dropping one writer's change;
//! the observable merge semantics stay last-write-wins per field.

use crate::dtos::CompanyUpdate;
use crate::error::AppError;
use crate::models::CompanyProfile;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

const PROFILE_FILE: &str = "company.json";
const LOGO_BASENAME: &str = "company-logo";

pub struct CompanyStore {
    assets_dir: PathBuf,
    profile_path: PathBuf,
    state: RwLock<CompanyProfile>,
}

impl CompanyStore {
    pub async fn new(assets_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let assets_dir = assets_dir.into();
        if !assets_dir.exists() {
            fs::create_dir_all(&assets_dir).await?;
        }
        let profile_path = assets_dir.join(PROFILE_FILE);

        let profile = if profile_path.exists() {
            let data = fs::read(&profile_path).await?;
            serde_json::from_slice(&data).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Corrupt company profile at {}: {}",
                    profile_path.display(),
                    e
                ))
            })?
        } else {
            let profile = CompanyProfile::default();
            write_profile(&profile_path, &profile).await?;
            tracing::info!(path = %profile_path.display(), "Seeded default company profile");
            profile
        };

        Ok(Self {
            assets_dir,
            profile_path,
            state: RwLock::new(profile),
        })
    }

    pub async fn get(&self) -> CompanyProfile {
        self.state.read().await.clone()
    }

    /// Shallow merge: only the fields present in the partial overwrite the
    /// stored profile. Field content is not validated.
    pub async fn update(&self, partial: CompanyUpdate) -> Result<CompanyProfile, AppError> {
        let mut profile = self.state.write().await;
        if let Some(name) = partial.name {
            profile.name = name;
        }
        if let Some(address) = partial.address {
            profile.address = address;
        }
        if let Some(gstin) = partial.gstin {
            profile.gstin = gstin;
        }
        if let Some(email) = partial.email {
            profile.email = email;
        }
        if let Some(logo) = partial.logo {
            profile.logo = Some(logo);
        }
        write_profile(&self.profile_path, &profile).await?;
        Ok(profile.clone())
    }

    /// Store a new logo artifact under the fixed basename. Any previous
    /// upload is overwritten; the stored extension follows the upload.
    pub async fn set_logo(
        &self,
        original_name: &str,
        data: Vec<u8>,
    ) -> Result<CompanyProfile, AppError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png");
        let filename = format!("{}.{}", LOGO_BASENAME, extension);

        let mut profile = self.state.write().await;
        fs::write(self.assets_dir.join(&filename), data).await?;
        profile.logo = Some(format!("/assets/{}", filename));
        write_profile(&self.profile_path, &profile).await?;

        tracing::info!(logo = %filename, "Company logo updated");
        Ok(profile.clone())
    }

    /// Bytes of the referenced logo, if the profile points at one and the
    /// file is readable. A dangling reference is not an error; the
    /// renderer simply omits the image.
    pub async fn logo_bytes(&self, profile: &CompanyProfile) -> Option<Vec<u8>> {
        let reference = profile.logo.as_deref()?;
        let filename = Path::new(reference).file_name()?;
        fs::read(self.assets_dir.join(filename)).await.ok()
    }
}

async fn write_profile(path: &Path, profile: &CompanyProfile) -> Result<(), AppError> {
    let data = serde_json::to_vec_pretty(profile)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode profile: {}", e)))?;
    fs::write(path, data).await?;
    Ok(())
}
