//! Server configuration from Shuttle secrets

use std::time::Duration;

use shuttle_runtime::SecretStore;
use tradeline::BusinessProfile;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_VOICE: &str = "Google.en-AU-Neural2-C";
const DEFAULT_VOICE_LANGUAGE: &str = "en-AU";
const DEFAULT_TRANSCRIPT_SEPARATOR: &str = " \n ";
const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Which backend holds call records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Voice used for every spoken prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    pub voice: String,
    pub language: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            language: DEFAULT_VOICE_LANGUAGE.to_string(),
        }
    }
}

/// Downstream enquiry intake endpoint
#[derive(Debug, Clone, Default)]
pub struct EnquiriesApiConfig {
    /// None disables publishing
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub signing_secret: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Public base URL the provider calls back on
    pub base_url: String,
    pub voice: VoiceSettings,
    pub transcript_separator: String,
    pub enquiries: EnquiriesApiConfig,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Guards the debug routes; None disables auth
    pub api_key: Option<String>,
    pub store: StoreBackend,
    pub default_business: BusinessProfile,
}

impl AppConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("CALL_STORE").as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("postgres") | None => StoreBackend::Postgres,
            Some(other) => {
                tracing::warn!("Unknown CALL_STORE '{}', using postgres", other);
                StoreBackend::Postgres
            }
        };

        let publish_timeout = get("PUBLISH_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT_SECS);

        Self {
            base_url: get("BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            voice: VoiceSettings {
                voice: get("VOICE").unwrap_or_else(|| DEFAULT_VOICE.to_string()),
                language: get("VOICE_LANGUAGE")
                    .unwrap_or_else(|| DEFAULT_VOICE_LANGUAGE.to_string()),
            },
            // Not filtered: the separator is mostly whitespace
            transcript_separator: lookup("TRANSCRIPT_SEPARATOR")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_TRANSCRIPT_SEPARATOR.to_string()),
            enquiries: EnquiriesApiConfig {
                url: get("ENQUIRIES_API_URL").map(|u| u.trim_end_matches('/').to_string()),
                api_key: get("ENQUIRIES_API_KEY"),
                signing_secret: get("ENQUIRIES_SIGNING_SECRET"),
                timeout: Duration::from_secs(publish_timeout),
            },
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: get("TRADELINE_API_KEY"),
            store,
            default_business: BusinessProfile::new(
                get("DEFAULT_BUSINESS_ID").unwrap_or_else(|| "TRADIE_101".to_string()),
                get("DEFAULT_BUSINESS_NAME").unwrap_or_else(|| "Tom's Plumbing".to_string()),
                get("DEFAULT_BUSINESS_NUMBER").unwrap_or_else(|| "+61400555666".to_string()),
                get("DEFAULT_BUSINESS_FORWARD_NUMBER")
                    .unwrap_or_else(|| "+61499888777".to_string()),
            ),
        }
    }

    /// Absolute URL for a voice webhook path, e.g. `incoming`
    pub fn voice_url(&self, path: &str) -> String {
        format!("{}/webhooks/voice/{}", self.base_url, path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
