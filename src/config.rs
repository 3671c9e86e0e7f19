use std::env;

use rand::RngCore;

/// How trusted-internal traffic authenticates. Resolved once at startup,
/// never a source-edit toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Accept everything (local/dev deployments behind a trusted boundary)
    Trust,
    /// Require the configured key in `x-internal-key`
    SharedKey,
    /// Require an upstream-injected `x-forwarded-user` identity
    ForwardedContext,
}

impl AuthMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trust" => Some(AuthMode::Trust),
            "shared_key" => Some(AuthMode::SharedKey),
            "forwarded_context" => Some(AuthMode::ForwardedContext),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub auth_mode: AuthMode,
    pub internal_api_key: Option<String>,
    pub blob_root: String,
    pub screening_url: Option<String>,
    pub download_secret: Vec<u8>,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://rentdesk.db?mode=rwc".to_string()
            } else {
                format!("sqlite://rentdesk_{}.db?mode=rwc", profile)
            }
        });

        let auth_mode = env::var("AUTH_MODE")
            .ok()
            .and_then(|s| {
                let parsed = AuthMode::parse(&s);
                if parsed.is_none() {
                    tracing::warn!("Unknown AUTH_MODE '{}', falling back to 'trust'", s);
                }
                parsed
            })
            .unwrap_or(AuthMode::Trust);

        // Signed download URLs stop verifying across restarts when the
        // secret is generated instead of configured.
        let download_secret = match env::var("DOWNLOAD_SECRET") {
            Ok(s) if !s.is_empty() => s.into_bytes(),
            _ => {
                let mut secret = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                tracing::warn!(
                    "DOWNLOAD_SECRET not set, generated an ephemeral signing secret"
                );
                secret
            }
        };

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            profile,
            auth_mode,
            internal_api_key: env::var("INTERNAL_API_KEY").ok(),
            blob_root: env::var("BLOB_ROOT").unwrap_or_else(|_| "blobs".to_string()),
            screening_url: env::var("SCREENING_URL").ok(),
            download_secret,
        }
    }
}
