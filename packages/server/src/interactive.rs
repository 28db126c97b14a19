//! Interactive mode for the server.
//!
//! Prompts for the data directory, bind address, and port before starting
//! the server.

use dialoguer::{Confirm, Input};
use ee_status_registry::paths::{DATA_DIR_ENV, data_dir};

use crate::ServerError;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a data directory, bind address, and port, sets the
/// corresponding environment variables (`EE_STATUS_DATA_DIR`, `BIND_ADDR`,
/// `PORT`), and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns a [`ServerError`] if the snapshot cannot be loaded or the
/// server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("ee-status Server");
    println!();

    let default_dir = data_dir().display().to_string();
    let dir: String = Input::new()
        .with_prompt("Data directory")
        .default(default_dir.clone())
        .interact_text()
        .unwrap_or(default_dir);

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var(DATA_DIR_ENV, &dir);
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
    }

    if !Confirm::new()
        .with_prompt(format!("Serve {dir} on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
