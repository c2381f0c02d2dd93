//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init`, `status` |
//! | Roster | Pilots | `pilot add`, `pilot list`, `pilot status` |
//! | Fleet | Drones | `drone add`, `drone maintenance` |
//! | Missions | Scheduling | `mission add`, `mission assign`, `mission complete` |
//! | Engine | Matching and planning | `match`, `conflicts`, `urgent` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! fleet --verbose urgent PRJ003
//! ```
//!
//! Without `--verbose`, the `FLEET_LOG` environment variable selects the
//! log filter.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod args;
mod drone;
mod logging;
mod mission;
mod output;
mod pilot;
mod query;
mod urgent;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
