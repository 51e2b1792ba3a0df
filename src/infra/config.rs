use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub cors_origin: HeaderValue,
    /// Base URL of the hosted identity provider's auth API. Must end with a
    /// trailing slash (endpoints are joined onto it).
    pub identity_base_url: Url,
    /// Project api key sent with every identity call.
    pub identity_api_key: SecretString,
    /// Service-role key for admin operations (account deletion on rollback).
    pub identity_service_role_key: SecretString,
    /// Request timeout applied to every outbound identity call.
    pub identity_timeout_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    pub rate_limit_per_email: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy (Caddy, nginx).
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    /// Attempt cap for the provisioning insert retries.
    pub provisioning_max_attempts: u32,
    /// Fixed delay between provisioning retry attempts.
    pub provisioning_retry_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let identity_base_url: Url = get_env("IDENTITY_BASE_URL");
        let identity_api_key: SecretString =
            SecretString::new(get_env::<String>("IDENTITY_API_KEY").into());
        let identity_service_role_key: SecretString =
            SecretString::new(get_env::<String>("IDENTITY_SERVICE_ROLE_KEY").into());
        let identity_timeout_secs: u64 = get_env_default("IDENTITY_TIMEOUT_SECS", 10);

        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 60);
        let rate_limit_per_email: u64 = get_env_default("RATE_LIMIT_PER_EMAIL", 10);
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        let provisioning_max_attempts: u32 = get_env_default("PROVISIONING_MAX_ATTEMPTS", 3);
        let provisioning_retry_delay_ms: u64 = get_env_default("PROVISIONING_RETRY_DELAY_MS", 500);

        Self {
            bind_addr,
            database_url,
            redis_url,
            cors_origin,
            identity_base_url,
            identity_api_key,
            identity_service_role_key,
            identity_timeout_secs,
            rate_limit_window_secs,
            rate_limit_per_ip,
            rate_limit_per_email,
            trust_proxy,
            provisioning_max_attempts,
            provisioning_retry_delay_ms,
        }
    }
}
