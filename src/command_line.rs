// command_line.rs — CLI argument parsing (custom, no clap)
//
// Switches take '-', '--' or '/' prefixes and may use their short or long
// names interchangeably.  -p and -d take a value after '=' or ':', or as
// the following argument.  Anything else is a target extension.

use std::path::PathBuf;

use crate::config::Config;
use crate::ehm::AppError;
use crate::usage;

// ── Enums ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,       // -l, --list
    Add,        // -a, --add
    Remove,     // -r, --remove
    Help,       // -h, -?, --help
}

// ── CommandLine struct ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CommandLine {
    pub commands:    Vec<Command>,
    pub profile:     Option<String>,
    pub definitions: Option<PathBuf>,
    pub merge:       Option<bool>,
    pub extensions:  Vec<String>,
}

/// Switches that consume a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueSwitch {
    Profile,
    Definitions,
}

fn unknown_switch(arg: &str) -> AppError {
    AppError::InvalidArg(format!("Unrecognized switch '{}'. {}", arg, usage::EXACTLY_ONE_OF))
}

impl CommandLine {
    /// Parse command-line arguments into a CommandLine struct.
    /// Args should NOT include argv[0] (program name).
    pub fn parse_from<I, S>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cmd = CommandLine::default();
        let mut args = args.into_iter();

        while let Some(arg_ref) = args.next() {
            let arg = arg_ref.as_ref();
            if arg.is_empty() {
                continue;
            }

            let switch_arg = if let Some(rest) = arg.strip_prefix("--") {
                rest
            } else if let Some(rest) = arg.strip_prefix('-').or_else(|| arg.strip_prefix('/')) {
                rest
            } else {
                // Positional argument (extension)
                cmd.extensions.push(arg.to_string());
                continue;
            };

            // Split "name=value" / "name:value"
            let (name, inline_value) = match switch_arg.find(['=', ':']) {
                Some(pos) => (&switch_arg[..pos], Some(&switch_arg[pos + 1..])),
                None => (switch_arg, None),
            };

            match cmd.handle_switch(name).ok_or_else(|| unknown_switch(arg))? {
                Some(value_switch) => {
                    let value = match inline_value {
                        Some(v) => v.to_string(),
                        None => args
                            .next()
                            .map(|v| v.as_ref().to_string())
                            .ok_or_else(|| AppError::InvalidArg(format!("Missing value for switch '{}'.", arg)))?,
                    };
                    cmd.set_value(value_switch, value);
                }
                None if inline_value.is_some() => return Err(unknown_switch(arg)),
                None => {}
            }
        }

        Ok(cmd)
    }

    /// Apply defaults from Config (parsed from the FILEMETA environment
    /// variable) for anything the command line left unset.
    pub fn apply_config_defaults(&mut self, config: &Config) {
        if self.merge.is_none() {
            self.merge = config.merge;
        }
    }

    /// Route a switch name.  Returns None for an unknown switch, and
    /// Some(Some(..)) when the switch expects a value.
    fn handle_switch(&mut self, name: &str) -> Option<Option<ValueSwitch>> {
        let name = name.to_ascii_lowercase();

        let command = match name.as_str() {
            "l" | "list"   => Some(Command::List),
            "a" | "add"    => Some(Command::Add),
            "r" | "remove" => Some(Command::Remove),
            "h" | "?" | "help" => Some(Command::Help),
            _ => None,
        };

        if let Some(command) = command {
            self.commands.push(command);
            return Some(None);
        }

        match name.as_str() {
            "m" | "merge"       => { self.merge = Some(true); Some(None) }
            "p" | "profile"     => Some(Some(ValueSwitch::Profile)),
            "d" | "definitions" => Some(Some(ValueSwitch::Definitions)),
            _ => None,
        }
    }

    fn set_value(&mut self, switch: ValueSwitch, value: String) {
        match switch {
            ValueSwitch::Profile     => self.profile     = Some(value),
            ValueSwitch::Definitions => self.definitions = Some(PathBuf::from(value)),
        }
    }

    /// The single command requested.
    pub fn command(&self) -> Result<Command, AppError> {
        match self.commands.as_slice() {
            [command] => Ok(*command),
            _ => Err(AppError::invalid_parameter(usage::EXACTLY_ONE_OF)),
        }
    }

    pub fn merges(&self) -> bool {
        self.merge.unwrap_or(false)
    }
}
