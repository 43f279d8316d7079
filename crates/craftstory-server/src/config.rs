//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;

use craftstory_auth::jwks::DEFAULT_JWKS_URL;
use craftstory_llm::generator::GenerationSettings;
use craftstory_llm::{bedrock, gemini};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BUCKET: &str = "craftstory";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub generator: GeneratorConfig,
    pub settings: GenerationSettings,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorConfig {
    Gemini {
        /// Missing keys are reported per request, not at startup.
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
    Bedrock {
        model_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Off,
    Required { project_id: String, jwks_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Local {
        data_dir: PathBuf,
    },
    S3 {
        bucket: String,
        public_base_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| eyre::eyre!("invalid PORT {raw:?}: {e}"))?,
            None => DEFAULT_PORT,
        };

        let generator = match var("CRAFTSTORY_GENERATOR").as_deref().map(str::trim) {
            None | Some("gemini") => GeneratorConfig::Gemini {
                api_key: var("GEMINI_API_KEY"),
                model: var("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
            },
            Some("bedrock") => GeneratorConfig::Bedrock {
                model_id: var("BEDROCK_MODEL_ID")
                    .unwrap_or_else(|| bedrock::DEFAULT_MODEL_ID.to_string()),
            },
            Some(other) => {
                return Err(eyre::eyre!(
                    "invalid CRAFTSTORY_GENERATOR {other:?} (expected gemini or bedrock)"
                ));
            }
        };

        let mut settings = GenerationSettings::default();
        if let Some(raw) = var("CRAFTSTORY_MAX_OUTPUT_TOKENS") {
            settings.max_output_tokens = raw
                .trim()
                .parse()
                .map_err(|e| eyre::eyre!("invalid CRAFTSTORY_MAX_OUTPUT_TOKENS {raw:?}: {e}"))?;
        }

        let auth = match var("CRAFTSTORY_AUTH").as_deref().map(str::trim) {
            None | Some("required") => AuthConfig::Required {
                project_id: var("FIREBASE_PROJECT_ID").ok_or_else(|| {
                    eyre::eyre!("FIREBASE_PROJECT_ID must be set when CRAFTSTORY_AUTH=required")
                })?,
                jwks_url: var("CRAFTSTORY_JWKS_URL")
                    .unwrap_or_else(|| DEFAULT_JWKS_URL.to_string()),
            },
            Some("off") => AuthConfig::Off,
            Some(other) => {
                return Err(eyre::eyre!(
                    "invalid CRAFTSTORY_AUTH {other:?} (expected required or off)"
                ));
            }
        };

        let storage = match var("CRAFTSTORY_STORAGE").as_deref().map(str::trim) {
            None | Some("local") => StorageConfig::Local {
                data_dir: PathBuf::from(
                    var("CRAFTSTORY_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
                ),
            },
            Some("s3") => {
                let bucket = var("CRAFTSTORY_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
                let public_base_url = var("CRAFTSTORY_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));
                StorageConfig::S3 {
                    bucket,
                    public_base_url,
                }
            }
            Some(other) => {
                return Err(eyre::eyre!(
                    "invalid CRAFTSTORY_STORAGE {other:?} (expected local or s3)"
                ));
            }
        };

        let log_format = match var("CRAFTSTORY_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(eyre::eyre!(
                    "invalid CRAFTSTORY_LOG_FORMAT {other:?} (expected pretty or json)"
                ));
            }
        };

        Ok(Self {
            port,
            generator,
            settings,
            auth,
            storage,
            log_format,
        })
    }
}

impl GeneratorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorConfig::Gemini { .. } => "gemini",
            GeneratorConfig::Bedrock { .. } => "bedrock",
        }
    }
}

impl AuthConfig {
    pub fn name(&self) -> &'static str {
        match self {
            AuthConfig::Off => "off",
            AuthConfig::Required { .. } => "required",
        }
    }
}

impl StorageConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StorageConfig::Local { .. } => "local",
            StorageConfig::S3 { .. } => "s3",
        }
    }
}
