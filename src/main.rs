//! jx - continuous delivery for Kubernetes
//!
//! The jx binary wires command-line parsing to the service layers in the
//! jx library crate.
//!
//! ## Commands
//!
//! - `jx install` - Bootstrap the platform into a cluster
//! - `jx create environment` - Create or update an Environment resource
//! - `jx get environments` - List environments by promotion order
//! - `jx get activities` - List pipeline activity
//! - `jx start pipeline` - Record a new pipeline run
//! - `jx promote` - Promote an application version into an environment
//! - `jx create repo` / `jx fork` / `jx import` - Repository workflows
//! - `jx step git credentials` - Render a git credentials file
//! - `jx completions` - Generate shell completions
//!
//! ## See Also
//!
//! - [jx crate](https://crates.io/crates/jx) - The library behind the binary

use std::process::ExitCode;

use jx::cli;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if std::env::var("JX_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
