//! # CLI Module
//!
//! Command-line access to the controllers linked into a binary.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print every registered route in lookup order, tagged with its registry:
//!
//! ```bash
//! dispatch-core routes --base-package my_service::controllers
//! ```
//!
//! ### `dispatch`
//!
//! Run one request through a full dispatch cycle and print the response:
//!
//! ```bash
//! dispatch-core dispatch --method POST --path /echo --body '{"text":"hi"}'
//! ```
//!
//! ## Global Options
//!
//! - `--config <FILE>` - YAML [`DispatchConfig`](crate::runtime_config::DispatchConfig)
//! - `--base-package <PATH>` - module path to scan, repeatable
//!
//! Environment overrides (`DISPATCH_BASE_PACKAGES`, `DISPATCH_DUPLICATE_ROUTES`)
//! apply on top of the file; `--base-package` applies last.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};
