//! nsplan settings.
//!
//! Settings are merged from, lowest priority first:
//! built-in defaults, `/etc/nsplan/config.yml`, the user's
//! `nsplan/config.yml`, an explicit `--config` file, `NSPLAN_*`
//! environment variables, and finally command-line flags (applied by the
//! CLI when it builds the [`Context`](crate::context::Context)).

pub mod loader;
pub mod schema;

pub use loader::{env_layer, load_file, load_settings, validate, SettingsPaths, SYSTEM_SETTINGS_PATH};
pub use schema::{Settings, SettingsFile};
