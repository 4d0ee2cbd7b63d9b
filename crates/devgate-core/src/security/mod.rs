//! Security Validator (spec.md §4.1, component C1).
//!
//! Every path and shell command the gateway touches passes through here
//! before any downstream use — no resource is opened, no process spawned, on
//! a validation failure. Grounded on `vtcode-core/src/command_safety/*`
//! (pattern tables + `bash -c` recursion), `vtcode-core/src/dotfile_protection`
//! (decision-enum rather than boolean), and
//! `vtcode-bash-runner/src/policy.rs` (separator-aware prefix containment).

pub mod command;
pub mod path;

pub use command::{validate_command, CommandCheck};
pub use path::{validate_file_path, PathOp};
