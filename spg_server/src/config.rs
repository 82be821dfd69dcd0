use std::env;

use journal_tools::JournalApiConfig;
use log::*;
use spg_common::env_flag;
use spg_engine::{
    spg_api::processor_objects::{
        DEFAULT_CANCEL_CHECKOUT_PATH,
        DEFAULT_ECOMMERCE_URL,
        DEFAULT_ERROR_PATH,
        DEFAULT_RECEIPT_PATH,
    },
    ProcessorConfig,
};
use spgateway_tools::SpgatewayConfig;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8130;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/spg_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Spgateway credentials and the storefront URLs the gateway sends the payer back to
    pub processor: ProcessorConfig,
    pub journal_api: JournalApiConfig,
    /// If true, both the return and notify callbacks run the full notification flow. The gateway cannot reach a
    /// server running on a developer's machine, so this is the only way to place orders locally. **Never enable this
    /// in production.**
    pub local_test_mode: bool,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            processor: ProcessorConfig::default(),
            journal_api: JournalApiConfig::default(),
            local_test_mode: false,
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SPG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let processor = processor_config_from_env();
        let journal_api = JournalApiConfig::new_from_env_or_default();
        let local_test_mode = env_flag("SPG_LOCAL_TEST_MODE", false);
        if local_test_mode {
            warn!(
                "🚨️🚨️🚨️ SPG_LOCAL_TEST_MODE is enabled. Return callbacks will place orders. DO NOT run production \
                 like this. 🚨️🚨️🚨️"
            );
        }
        let use_x_forwarded_for = env_flag("SPG_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("SPG_USE_FORWARDED", false);
        Self {
            host,
            port,
            database_url,
            processor,
            journal_api,
            local_test_mode,
            use_x_forwarded_for,
            use_forwarded,
        }
    }

    pub fn callback_options(&self) -> CallbackOptions {
        CallbackOptions {
            local_test_mode: self.local_test_mode,
            use_x_forwarded_for: self.use_x_forwarded_for,
            use_forwarded: self.use_forwarded,
        }
    }
}

fn processor_config_from_env() -> ProcessorConfig {
    let gateway = SpgatewayConfig::new_from_env_or_default();
    let ecommerce_url = env_or_default("SPG_ECOMMERCE_URL", DEFAULT_ECOMMERCE_URL);
    let mut config = ProcessorConfig::new(gateway, &ecommerce_url);
    config.cancel_checkout_path = env_or_default("SPG_CANCEL_CHECKOUT_PATH", DEFAULT_CANCEL_CHECKOUT_PATH);
    config.error_path = env_or_default("SPG_ERROR_PATH", DEFAULT_ERROR_PATH);
    config.receipt_path = env_or_default("SPG_RECEIPT_PATH", DEFAULT_RECEIPT_PATH);
    config
}

fn env_or_default(var: &str, default: &str) -> String {
    env::var(var).ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
        info!("🪛️ {var} is not set. Using {default}");
        default.to_string()
    })
}

/// The subset of the configuration that the callback handlers need at request time.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallbackOptions {
    pub local_test_mode: bool,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}
