use std::path::PathBuf;
use std::sync::Arc;

use craftstory_auth::verifier::{IdentityVerifier, JwksVerifier};
use craftstory_llm::bedrock::BedrockGenerator;
use craftstory_llm::gemini::GeminiGenerator;
use craftstory_llm::generator::TextGenerator;
use craftstory_storage::local::LocalStore;
use craftstory_storage::s3::S3Store;
use craftstory_storage::store::{ImageStore, PostStore};

use crate::config::{AppConfig, AuthConfig, GeneratorConfig, StorageConfig};

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    /// `None` when authentication is switched off.
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
    pub posts: Arc<dyn PostStore>,
    pub images: Arc<dyn ImageStore>,
    /// Directory served at `/uploads` when images are stored locally.
    pub uploads_dir: Option<PathBuf>,
}

impl AppState {
    /// Construct every external client once, at startup.
    pub async fn from_config(config: &AppConfig) -> AppState {
        let generator: Arc<dyn TextGenerator> = match &config.generator {
            GeneratorConfig::Gemini {
                api_key,
                model,
                base_url,
            } => {
                if api_key.is_none() {
                    tracing::warn!("GEMINI_API_KEY is not set; generation requests will fail");
                }
                Arc::new(GeminiGenerator::new(
                    api_key.clone(),
                    model.clone(),
                    base_url.clone(),
                    config.settings,
                ))
            }
            GeneratorConfig::Bedrock { model_id } => {
                Arc::new(BedrockGenerator::from_env(model_id.clone(), config.settings).await)
            }
        };

        let verifier: Option<Arc<dyn IdentityVerifier>> = match &config.auth {
            AuthConfig::Off => None,
            AuthConfig::Required {
                project_id,
                jwks_url,
            } => Some(Arc::new(JwksVerifier::new(jwks_url.clone(), project_id.clone()))),
        };

        let (posts, images, uploads_dir) = match &config.storage {
            StorageConfig::Local { data_dir } => {
                let store = Arc::new(LocalStore::new(data_dir.clone()));
                let uploads = store.uploads_dir();
                let posts: Arc<dyn PostStore> = store.clone();
                let images: Arc<dyn ImageStore> = store;
                (posts, images, Some(uploads))
            }
            StorageConfig::S3 {
                bucket,
                public_base_url,
            } => {
                let client = craftstory_storage::client::build_client().await;
                let store = Arc::new(S3Store::new(
                    client,
                    bucket.clone(),
                    public_base_url.clone(),
                ));
                let posts: Arc<dyn PostStore> = store.clone();
                let images: Arc<dyn ImageStore> = store;
                (posts, images, None)
            }
        };

        AppState {
            generator,
            verifier,
            posts,
            images,
            uploads_dir,
        }
    }

    pub fn auth_required(&self) -> bool {
        self.verifier.is_some()
    }
}
