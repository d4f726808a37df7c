//! One module per subcommand.  Each exposes an `execute` function that
//! `main` dispatches to.

pub mod add;
pub mod completions;
pub mod delete;
pub mod export;
pub mod generate;
pub mod get;
pub mod init;
pub mod list;
pub mod migrate;
pub mod rotate;
pub mod seal;
pub mod strength;
pub mod unlock;
pub mod update;
pub mod version;
