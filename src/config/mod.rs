//! Layered configuration.
//!
//! Tiers are merged field-by-field, later tiers winning:
//! 1. **Defaults** - built into [`Config::default`]
//! 2. **Project** - `$CWD/todo-list/config.yaml`
//! 3. **User** - `~/.todo-list/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `TODO_LIST_CONFIG_PATH` - Explicit config file (replaces tiers 2 and 3)
//! - `PORT` - Listening port
//! - `TODO_LIST_HOST` - Listening interface
//! - `TODO_LIST_STATIC_DIR` - Static asset directory
//! - `TODO_LIST_URL` - Server URL used by the terminal client
//! - `TODO_LIST_USER_DIR` - User config dir (default: `~/.todo-list`)
//! - `TODO_LIST_PROJECT_DIR` - Project config dir (default: `./todo-list`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
