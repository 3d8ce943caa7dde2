// env_overrides.rs — FILEMETA environment variable parsing
//
// Extends impl Config with the methods that read FILEMETA and apply its
// switch and key=value entries.

use std::path::PathBuf;

use crate::environment_provider::EnvironmentProvider;

use super::{Config, ErrorInfo, FILEMETA_ENV_VAR_NAME};





/// Switch name, value it sets, and the Option<bool> it sets.
type SwitchAccessor = fn(&mut Config) -> &mut Option<bool>;

const SWITCH_MAPPINGS: &[(&str, bool, SwitchAccessor)] = &[
    ("m",  true,  |c| &mut c.merge),
    ("m-", false, |c| &mut c.merge),
    ("p",  true,  |c| &mut c.write_progid_entries),
    ("p-", false, |c| &mut c.write_progid_entries),
];





////////////////////////////////////////////////////////////////////////////////
//
//  impl Config — env var parsing methods
//
////////////////////////////////////////////////////////////////////////////////

impl Config {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  apply_user_overrides
    //
    //  Parse the FILEMETA environment variable for switch defaults.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub(super) fn apply_user_overrides(&mut self, provider: &dyn EnvironmentProvider) {
        self.last_parse_result.errors.clear();

        let env_value = match provider.get_env_var(FILEMETA_ENV_VAR_NAME) {
            Some(v) => v,
            None => return,
        };

        for entry_raw in env_value.split(';') {
            let entry = entry_raw.trim();
            if entry.is_empty() {
                continue;
            }
            self.process_override_entry(entry);
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  process_override_entry
    //
    //  Dispatch one entry to the switch or key=value handler.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn process_override_entry(&mut self, entry: &str) {
        if entry.starts_with('/') || entry.starts_with('-') {
            let prefix_len = if entry.starts_with("--") { 2 } else { 1 };
            self.push_error("Switch prefixes (/, -, --) are not allowed in env var", entry, &entry[..prefix_len]);
            return;
        }

        if !entry.contains('=') {
            self.process_switch_override(entry);
            return;
        }

        match parse_key_and_value(entry) {
            Some((key, value)) if key.eq_ignore_ascii_case("D") => {
                self.definitions = Some(PathBuf::from(value));
            }
            Some((key, _)) => {
                self.push_error("Invalid key (expected D)", entry, key);
            }
            None => {
                self.push_error("Invalid entry format (expected key = value)", entry, entry);
            }
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  process_switch_override
    //
    //  Apply a bare switch name from the env var.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn process_switch_override(&mut self, entry: &str) {
        for &(name, value, accessor) in SWITCH_MAPPINGS {
            if entry.eq_ignore_ascii_case(name) {
                *accessor(self) = Some(value);
                return;
            }
        }

        self.push_error("Invalid switch (expected M, M-, P or P-)", entry, entry);
    }





    fn push_error(&mut self, message: &str, entry: &str, invalid_text: &str) {
        self.last_parse_result.errors.push(ErrorInfo {
            message:             message.into(),
            entry:               entry.into(),
            invalid_text:        invalid_text.into(),
            invalid_text_offset: entry.find(invalid_text).unwrap_or(0),
        });
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  parse_key_and_value
//
//  Split an entry on '=' into key and value, trimming whitespace.
//
////////////////////////////////////////////////////////////////////////////////

fn parse_key_and_value(entry: &str) -> Option<(&str, &str)> {
    let eq_pos = entry.find('=')?;
    let key = entry[..eq_pos].trim();
    let value = entry[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}
