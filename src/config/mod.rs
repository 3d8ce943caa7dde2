// config/mod.rs — Defaults from the FILEMETA environment variable
//
// FILEMETA holds ';'-separated entries:
//   M / M-     merge existing settings on -add by default (or not)
//   P / P-     also write display values to the ProgID key (or not)
//   D=<path>   definitions / saved-state file used when -d is absent
//
// Logging verbosity is controlled separately by FILEMETA_LOG.

mod env_overrides;

use std::path::PathBuf;

use crate::environment_provider::{DefaultEnvironmentProvider, EnvironmentProvider};





/// Environment variable holding switch defaults
pub const FILEMETA_ENV_VAR_NAME: &str = "FILEMETA";

/// Environment variable holding the env_logger filter
pub const FILEMETA_LOG_ENV_VAR_NAME: &str = "FILEMETA_LOG";

/// Folder under the user's application-data directory
pub const SAVED_STATE_FOLDER: &str = "FileMeta";

/// Custom profile store file name
pub const SAVED_STATE_FILE: &str = "SavedState.xml";





////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message:             String,
    pub entry:               String,
    pub invalid_text:        String,
    pub invalid_text_offset: usize,
}





#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ErrorInfo>,
}





impl ValidationResult {
    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty()
    }
}





////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// -m is implied for every -add
    pub merge:                Option<bool>,

    /// Display values are mirrored into the ProgID key
    pub write_progid_entries: Option<bool>,

    /// Definitions file to use when -d is not given
    pub definitions:          Option<PathBuf>,

    /// Validation results from last env var parse
    pub last_parse_result:    ValidationResult,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Config
//
//  Construction and the accessors the commands consult.
//
////////////////////////////////////////////////////////////////////////////////

impl Config {
    pub fn new() -> Self {
        Self::default()
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  initialize
    //
    //  Parses FILEMETA from the process environment.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn initialize(&mut self) {
        self.initialize_with_provider(&DefaultEnvironmentProvider);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  initialize_with_provider
    //
    //  Parses FILEMETA from a specific environment provider.  Invalid
    //  entries are recorded in last_parse_result and logged.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn initialize_with_provider(&mut self, provider: &dyn EnvironmentProvider) {
        self.apply_user_overrides(provider);

        for err in &self.last_parse_result.errors {
            log::warn!("{}: {} in '{}'", FILEMETA_ENV_VAR_NAME, err.message, err.entry);
        }
    }





    pub fn merge_by_default(&self) -> bool {
        self.merge.unwrap_or(false)
    }



    pub fn write_progid_entries(&self) -> bool {
        self.write_progid_entries.unwrap_or(false)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  default_store_path
    //
    //  The custom-profile store: D= if configured, else
    //  <config dir>\FileMeta\SavedState.xml.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn default_store_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.definitions {
            return Some(path.clone());
        }

        dirs::config_dir().map(|dir| dir.join(SAVED_STATE_FOLDER).join(SAVED_STATE_FILE))
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  log_filter
//
//  The env_logger filter string: FILEMETA_LOG if set, else "warn".
//
////////////////////////////////////////////////////////////////////////////////

pub fn log_filter(provider: &dyn EnvironmentProvider) -> String {
    provider
        .get_env_var(FILEMETA_LOG_ENV_VAR_NAME)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "warn".into())
}
