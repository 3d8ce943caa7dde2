// commands.rs — Execution of the parsed command line
//
// list / add / remove / help against a populated State.  Output goes to
// the supplied writer; failures are returned as AppError for main to
// report.

use std::io::Write;

use crate::command_line::{Command, CommandLine};
use crate::config::Config;
use crate::ehm::AppError;
use crate::extension::HandlerState;
use crate::host::HostContext;
use crate::registry::RegistryProvider;
use crate::state::{State, admin_privileges_needed};
use crate::usage;





////////////////////////////////////////////////////////////////////////////////
//
//  execute
//
//  Runs the single command on the command line.
//
////////////////////////////////////////////////////////////////////////////////

pub fn execute(
    cmd: &CommandLine,
    config: &Config,
    reg: &dyn RegistryProvider,
    host: &HostContext,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let command = cmd.command()?;

    if command == Command::Help {
        usage::display_usage(out)?;
        return Ok(());
    }

    let mut state = State::new(reg, host, config.default_store_path());
    state.populate(cmd.definitions.as_deref())?;

    if command == Command::List {
        return list_extensions(&state, out);
    }

    if cmd.extensions.is_empty() {
        return Err(AppError::invalid_parameter(usage::AT_LEAST_ONE_EXTENSION));
    }

    for ext in &cmd.extensions {
        match command {
            Command::Remove => remove_extension(&mut state, ext, out)?,
            Command::Add    => add_extension(&mut state, cmd, ext, out)?,
            Command::List | Command::Help => {}
        }
    }

    Ok(())
}





////////////////////////////////////////////////////////////////////////////////
//
//  list_extensions
//
//  One line per extension with our handler, unchained ones first:
//  name, profile, handler.
//
////////////////////////////////////////////////////////////////////////////////

fn list_extensions(state: &State, out: &mut dyn Write) -> Result<(), AppError> {
    for wanted in [HandlerState::Ours, HandlerState::Chained] {
        for ext in state.extensions().iter().filter(|e| e.state() == wanted) {
            writeln!(
                out,
                "{:<5}\t{:<12}\t{}",
                ext.name,
                ext.profile.as_deref().unwrap_or(usage::NULL_PROFILE),
                ext.property_handler_display(),
            )?;
        }
    }
    Ok(())
}





fn remove_extension(state: &mut State, name: &str, out: &mut dyn Write) -> Result<(), AppError> {
    let ext = state
        .get_extension_by_name(name)
        .ok_or_else(|| AppError::invalid_parameter(usage::not_registered_extension(name)))?;

    if !ext.state().is_ours() && ext.state() != HandlerState::ProfileOnly {
        return Err(AppError::invalid_parameter(usage::does_not_have_handler(name)));
    }

    let display_name = ext.name.clone();
    if !state.remove_handler_from_extension(name)? {
        return Err(admin_privileges_needed());
    }

    writeln!(out, "{}", usage::handler_removed_ok(&display_name))?;
    Ok(())
}





////////////////////////////////////////////////////////////////////////////////
//
//  add_extension
//
//  Validates the profile, registers the extension if HKCR lacks it, and
//  installs the handler.
//
////////////////////////////////////////////////////////////////////////////////

fn add_extension(state: &mut State, cmd: &CommandLine, name: &str, out: &mut dyn Write) -> Result<(), AppError> {
    let profile_name = cmd
        .profile
        .as_deref()
        .ok_or_else(|| AppError::invalid_parameter(usage::ADD_NEEDS_PROFILE))?;

    if state.get_profile_by_name(profile_name).is_none() {
        let message = if cmd.definitions.is_some() {
            usage::not_a_profile(profile_name)
        } else {
            usage::not_a_profile_may_need_definitions(profile_name)
        };
        return Err(AppError::invalid_parameter(message));
    }

    let display_name = match state.get_extension_by_name(name) {
        Some(ext) => ext.name.clone(),
        None => match state.create_extension(name) {
            Ok(ext) => ext.name.clone(),
            Err(e) if e.is_access_denied() => return Err(admin_privileges_needed()),
            Err(e) => return Err(e),
        },
    };

    if !state.setup_handler_for_extension(name, profile_name, cmd.merges())? {
        return Err(admin_privileges_needed());
    }

    writeln!(out, "{}", usage::handler_added_ok(&display_name))?;
    Ok(())
}





#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Hive, MemoryRegistry};

    fn run(reg: &MemoryRegistry, host: &HostContext, args: &[&str]) -> (Result<(), AppError>, String) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.definitions = Some(dir.path().join("SavedState.xml"));

        let cmd = match CommandLine::parse_from(args) {
            Ok(cmd) => cmd,
            Err(e) => return (Err(e), String::new()),
        };

        let mut out = Vec::new();
        let result = execute(&cmd, &config, reg, host, &mut out);
        (result, String::from_utf8(out).unwrap())
    }





    #[test]
    fn help_prints_usage() {
        let reg = MemoryRegistry::new();
        let (result, out) = run(&reg, &HostContext::with_layout(true), &["-h"]);
        result.unwrap();
        assert!(out.contains("Usage:"));
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  add_list_remove
    //
    //  Verifies the three commands end to end on a fresh extension.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn add_list_remove() {
        let reg = MemoryRegistry::new();
        let host = HostContext::with_layout(true);

        let (result, out) = run(&reg, &host, &["-a", "-p=simple", ".fmx"]);
        result.unwrap();
        assert_eq!(out, "File Meta property handler successfully added for extension '.fmx'.\n");
        assert!(reg.key_exists(Hive::ClassesRoot, ".fmx").unwrap());

        let (result, out) = run(&reg, &host, &["--list"]);
        result.unwrap();
        assert_eq!(out, ".fmx \tSimple      \tFile Meta Property Handler\n");

        let (result, out) = run(&reg, &host, &["-r", ".FMX"]);
        result.unwrap();
        assert_eq!(out, "File Meta property handler successfully removed for extension '.fmx'.\n");
    }





    #[test]
    fn not_elevated_reports_access_denied() {
        let reg = MemoryRegistry::new();
        reg.create_key(Hive::ClassesRoot, ".fmx").unwrap();
        let mut host = HostContext::with_layout(true);
        host.elevated = false;

        let (result, _) = run(&reg, &host, &["-a", "-p=Simple", ".fmx"]);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.to_string(), usage::ADMIN_PRIVILEGES_NEEDED);
    }
}
