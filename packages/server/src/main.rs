#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the ee-status API server.
//!
//! Configuration comes from `EE_STATUS_DATA_DIR`, `BIND_ADDR`, `PORT`,
//! and `RUST_LOG`.

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    ee_status_server::run_server().await?;
    Ok(())
}
