//! Protocol constants for the Spgateway MPG and CreditClose APIs.

/// MPG protocol version sent in `Version`.
pub const MPG_VERSION: &str = "1.5";
/// CreditClose API version.
pub const CREDIT_CLOSE_VERSION: &str = "1.1";
/// Responses are requested as JSON rather than query strings.
pub const RESPOND_TYPE: &str = "JSON";
/// Maximum length of a `MerchantOrderNo`.
pub const MAX_ORDER_LEN: usize = 30;
/// Maximum length of a product title inside `ItemDesc`.
pub const MAX_ITEM_TITLE_LEN: usize = 127;
/// The value of `Status` on successful responses.
pub const STATUS_SUCCESS: &str = "SUCCESS";
/// Spgateway pads plaintext to multiples of this many bytes before encryption.
pub const PADDING_BLOCK_SIZE: usize = 32;
/// Length of `HashKey` (AES-256 key).
pub const HASH_KEY_LEN: usize = 32;
/// Length of `HashIV` (AES block size).
pub const HASH_IV_LEN: usize = 16;

pub const DEFAULT_PAYMENT_PAGE_URL: &str = "https://ccore.spgateway.com/MPG/mpg_gateway";
pub const DEFAULT_CREDIT_CLOSE_URL: &str = "https://ccore.spgateway.com/API/CreditCard/Close";
