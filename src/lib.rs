// File Meta Association Manager
// Binds property-handler profiles to file extensions in the Windows registry

pub mod ehm;
pub mod environment_provider;
pub mod config;
pub mod property_list;
pub mod tree_item;
pub mod profile;
pub mod registry;
pub mod host;
pub mod extension;
pub mod saved_state;
pub mod state;
pub mod reg_state;
pub mod property_store;
pub mod command_line;
pub mod usage;
pub mod commands;

use std::io;

use command_line::{Command, CommandLine};
use config::Config;
use ehm::AppError;
use environment_provider::DefaultEnvironmentProvider;





////////////////////////////////////////////////////////////////////////////////
//
//  run
//
//  Main entry point for the library.  Called by main.rs; returns Result
//  for clean error handling.
//
////////////////////////////////////////////////////////////////////////////////

pub fn run() -> Result<(), AppError> {
    let filter = config::log_filter(&DefaultEnvironmentProvider);
    env_logger::Builder::new().parse_filters(&filter).init();

    let mut config = Config::new();
    config.initialize();

    let mut cmd = CommandLine::parse_from(std::env::args().skip(1))?;
    cmd.apply_config_defaults(&config);

    let mut stdout = io::stdout().lock();

    if cmd.command()? == Command::Help {
        usage::display_usage(&mut stdout)?;
        return Ok(());
    }

    run_against_registry(&cmd, &config, &mut stdout)
}





#[cfg(windows)]
fn run_against_registry(cmd: &CommandLine, config: &Config, out: &mut dyn io::Write) -> Result<(), AppError> {
    let reg  = registry::WindowsRegistry;
    let host = host::HostContext::detect(&reg, config)?;

    if !host.context_handler_registered {
        log::warn!("{}", usage::NO_CONTEXT_MENUS);
    }

    commands::execute(cmd, config, &reg, &host, out)
}



#[cfg(not(windows))]
fn run_against_registry(_cmd: &CommandLine, _config: &Config, _out: &mut dyn io::Write) -> Result<(), AppError> {
    Err(AppError::Unsupported)
}
