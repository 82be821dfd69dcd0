mod order_numbers;
mod text;
mod urls;

pub use order_numbers::{generate_order_no, sanitize_order_number};
pub use text::middle_truncate;
pub use urls::{ecommerce_url, rewrite_local_notify_url, LOCAL_NOTIFY_PREFIX, NOTIFY_PLACEHOLDER_PREFIX};
