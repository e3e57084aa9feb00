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
    const DISPLAY_ENVS: [&str; 16] = [
        "RUST_LOG",
        "CPG_HOST",
        "CPG_PORT",
        "CPG_DATABASE_URL",
        "CPG_AUTO_MIGRATE",
        "CPG_CORS_ORIGIN",
        "CPG_PENDING_ORDER_TIMEOUT",
        "CPG_WEBHOOK_FULFIL_ATTEMPTS",
        "CPG_WEBHOOK_FULFIL_DELAY_MS",
        "CPG_PROVIDER_TIMEOUT_SECS",
        "CPG_PAYPAL_BASE_URL",
        "CPG_PAYPAL_CLIENT_ID",
        "CPG_STRIPE_BASE_URL",
        "CPG_STRIPE_WEBHOOK_TOLERANCE_SECS",
        "CPG_STRIPE_SUCCESS_URL",
        "CPG_STRIPE_CANCEL_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
