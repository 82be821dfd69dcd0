use spgateway_tools::{consts::MAX_ORDER_LEN, generate_string};

/// Replaces every character that Spgateway does not accept in `MerchantOrderNo` with an underscore.
pub fn sanitize_order_number(order_number: &str) -> String {
    order_number.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

/// Generates a fresh merchant order number for a basket order number.
///
/// The sanitized order number is followed by an underscore and a random alphanumeric suffix, filling the result out to
/// exactly [`MAX_ORDER_LEN`] characters. Each checkout attempt gets a new number, since the gateway refuses to reuse
/// one. Over-long order numbers are cut short to leave room for at least one random character.
pub fn generate_order_no(order_number: &str) -> String {
    let mut sanitized = sanitize_order_number(order_number);
    sanitized.truncate(MAX_ORDER_LEN - 2);
    let suffix = generate_string(MAX_ORDER_LEN - sanitized.len() - 1);
    format!("{sanitized}_{suffix}")
}
