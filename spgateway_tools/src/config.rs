use log::*;
use spg_common::Secret;

use crate::consts::{DEFAULT_CREDIT_CLOSE_URL, DEFAULT_PAYMENT_PAGE_URL, HASH_IV_LEN, HASH_KEY_LEN};

/// Merchant credentials and gateway endpoints.
#[derive(Debug, Clone, Default)]
pub struct SpgatewayConfig {
    pub merchant_id: String,
    pub hash_key: Secret<String>,
    pub hash_iv: Secret<String>,
    /// Where the payer's browser is sent with the encrypted trade info
    pub payment_page_url: String,
    /// The CreditClose (capture/refund) API endpoint
    pub credit_close_url: String,
}

impl SpgatewayConfig {
    pub fn new(merchant_id: &str, hash_key: &str, hash_iv: &str) -> Self {
        Self {
            merchant_id: merchant_id.to_string(),
            hash_key: Secret::from(hash_key),
            hash_iv: Secret::from(hash_iv),
            payment_page_url: DEFAULT_PAYMENT_PAGE_URL.to_string(),
            credit_close_url: DEFAULT_CREDIT_CLOSE_URL.to_string(),
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let merchant_id = std::env::var("SPG_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("🪛️ SPG_MERCHANT_ID not set, using (probably useless) default");
            "MS00000000".to_string()
        });
        let hash_key = Secret::new(std::env::var("SPG_HASH_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SPG_HASH_KEY not set, using (probably useless) default");
            "0".repeat(HASH_KEY_LEN)
        }));
        if hash_key.len() != HASH_KEY_LEN {
            warn!("🪛️ SPG_HASH_KEY should be {HASH_KEY_LEN} characters long. Trade info encryption will fail.");
        }
        let hash_iv = Secret::new(std::env::var("SPG_HASH_IV").unwrap_or_else(|_| {
            warn!("🪛️ SPG_HASH_IV not set, using (probably useless) default");
            "0".repeat(HASH_IV_LEN)
        }));
        if hash_iv.len() != HASH_IV_LEN {
            warn!("🪛️ SPG_HASH_IV should be {HASH_IV_LEN} characters long. Trade info encryption will fail.");
        }
        let payment_page_url = std::env::var("SPG_PAYMENT_PAGE_URL").unwrap_or_else(|_| {
            info!("🪛️ SPG_PAYMENT_PAGE_URL not set, using {DEFAULT_PAYMENT_PAGE_URL}");
            DEFAULT_PAYMENT_PAGE_URL.to_string()
        });
        let credit_close_url = std::env::var("SPG_CREDIT_CLOSE_URL").unwrap_or_else(|_| {
            info!("🪛️ SPG_CREDIT_CLOSE_URL not set, using {DEFAULT_CREDIT_CLOSE_URL}");
            DEFAULT_CREDIT_CLOSE_URL.to_string()
        });
        Self { merchant_id, hash_key, hash_iv, payment_page_url, credit_close_url }
    }
}
