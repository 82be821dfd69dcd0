use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "SPG_HOST",
        "SPG_PORT",
        "SPG_DATABASE_URL",
        "SPG_ECOMMERCE_URL",
        "SPG_MERCHANT_ID",
        "SPG_PAYMENT_PAGE_URL",
        "SPG_CREDIT_CLOSE_URL",
        "SPG_CANCEL_CHECKOUT_PATH",
        "SPG_ERROR_PATH",
        "SPG_RECEIPT_PATH",
        "SPG_LOCAL_TEST_MODE",
        "SPG_USE_X_FORWARDED_FOR",
        "SPG_USE_FORWARDED",
        "SPG_JOURNAL_API_URL",
        "SPG_JOURNAL_API_TIMEOUT",
        "SPG_JOURNAL_CACHE_TIMEOUT",
    ];

    // Secrets are only reported as present or absent
    const SECRET_ENVS: [&str; 3] = ["SPG_HASH_KEY", "SPG_HASH_IV", "SPG_JOURNAL_API_TOKEN"];

    println!("Current environment values (secrets are hidden):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    });
    SECRET_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) if !s.is_empty() => "<set>",
            _ => "Not set",
        };
        println!("  {name:<35} {val:<15}");
    })
}
