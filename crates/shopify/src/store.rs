use crate::types::OAuthConfig;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use rand::Rng;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed name the wizard config is saved under across the redirect.
pub const STORE_KEY: &str = "shopify_oauth_config";

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn open_default() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "shopify-token", "shopify-token")
            .ok_or_else(|| anyhow!("Could not determine project directories"))?;
        Ok(Self::at(proj_dirs.data_dir().join(format!("{STORE_KEY}.json"))))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<OAuthConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let encrypted = fs::read(&self.path)?;
        let decrypted = self.decrypt(&encrypted)?;
        let config: OAuthConfig = serde_json::from_slice(&decrypted)?;
        Ok(Some(config))
    }

    pub fn save(&self, config: &OAuthConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(config)?;
        let encrypted = self.encrypt(&json)?;
        write_secure_file(&self.path, &encrypted)?;
        tracing::debug!("Saved OAuth config to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn secret_key_path(&self) -> PathBuf {
        self.path.with_file_name(".secret_key")
    }

    fn get_or_create_key(&self) -> Result<[u8; 32]> {
        let path = self.secret_key_path();

        if path.exists() {
            let key_bytes = fs::read(&path)?;
            if key_bytes.len() == 32 {
                let mut key = [0u8; 32];
                key.copy_from_slice(&key_bytes);
                return Ok(key);
            }
        }

        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key);
        write_secure_file(&path, &key)?;
        Ok(key)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| anyhow!("Encryption failed"))?;

        let mut result = nonce_bytes.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        use aes_gcm::{
            aead::{Aead, KeyInit},
            Aes256Gcm, Nonce,
        };

        if ciphertext.len() < 12 {
            return Err(anyhow!("Invalid ciphertext"));
        }

        let key = self.get_or_create_key()?;
        let cipher = Aes256Gcm::new(aes_gcm::aead::Key::<Aes256Gcm>::from_slice(&key));

        let nonce = Nonce::from_slice(&ciphertext[..12]);
        let plaintext = cipher
            .decrypt(nonce, &ciphertext[12..])
            .map_err(|_| anyhow!("Decryption failed"))?;

        Ok(plaintext)
    }
}

fn write_secure_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "very-secret-value".to_string(),
            shop: "foo.myshopify.com".to_string(),
            scopes: vec!["read_orders".to_string()],
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("shopify_oauth_config.json"));
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_load_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("nested").join("shopify_oauth_config.json"));
        let config = sample_config();

        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), Some(config));

        store.clear().expect("clear");
        assert!(store.load().expect("load after clear").is_none());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn secret_is_not_stored_in_plaintext() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("shopify_oauth_config.json"));
        store.save(&sample_config()).expect("save");

        let raw = fs::read(store.path()).expect("read raw");
        let needle = b"very-secret-value";
        assert!(!raw.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::at(dir.path().join("shopify_oauth_config.json"));
        fs::write(store.path(), b"short").expect("write");
        assert!(store.load().is_err());
    }
}
