// usage.rs — Help screen and user-facing messages
//
// Every message the tool prints lives here, so the CLI, the extension
// state machine, and the tests agree on exact wording.

use std::io::{self, Write};

use crate::config::{FILEMETA_ENV_VAR_NAME, FILEMETA_LOG_ENV_VAR_NAME};





////////////////////////////////////////////////////////////////////////////////

pub const VERSION_STRING:    &str = env!("FILEMETA_VERSION_STRING");
pub const VERSION_YEAR:      &str = env!("FILEMETA_VERSION_YEAR");
pub const BUILD_TIMESTAMP:   &str = env!("FILEMETA_BUILD_TIMESTAMP");





////////////////////////////////////////////////////////////////////////////////

pub const ADD_NEEDS_PROFILE:        &str = "A profile must be specified for the -add command.";
pub const ADMIN_PRIVILEGES_NEEDED:  &str = "Administrator privileges required to add or remove the File Meta property handler.";
pub const AT_LEAST_ONE_EXTENSION:   &str = "-add and -remove commands require at least one extension to be specified.";
pub const CANNOT_ADD_HANDLER:       &str = "Cannot add handler - our property handler is not registered.";
pub const EXACTLY_ONE_OF:           &str = "You must specify exactly one of -list, -add, -remove or -help.";
pub const NO_CONTEXT_MENUS:         &str = "No context menus - our context handler is not registered.";
pub const NULL_PROFILE:             &str = "<None>";
pub const PROPERTY_HANDLER_NONE:    &str = "None";
pub const UNEXPECTED_EXCEPTION:     &str = "Unexpected exception:";
pub const XML_PARSE_ERROR:          &str = "Error parsing XML store of saved custom profiles.";
pub const XML_WRITE_ERROR:          &str = "Error updating XML store of saved custom profiles.";





pub fn cannot_delete_profile(name: &str) -> String {
    format!("Cannot delete '{}' as it is in use by at least one handler.", name)
}



pub fn builtin_profile_read_only(name: &str) -> String {
    format!("'{}' is a built-in profile and cannot be changed.", name)
}



pub fn does_not_have_handler(ext: &str) -> String {
    format!("Extension '{}' does not currently have the File Meta property handler.", ext)
}



pub fn extension_already_has_handler(ext: &str) -> String {
    format!("Extension '{}' already has the File Meta property handler.", ext)
}



pub fn handler_added_ok(ext: &str) -> String {
    format!("File Meta property handler successfully added for extension '{}'.", ext)
}



pub fn handler_removed_ok(ext: &str) -> String {
    format!("File Meta property handler successfully removed for extension '{}'.", ext)
}



pub fn not_a_profile(name: &str) -> String {
    format!("'{}' is not the name of a defined profile.", name)
}



pub fn not_a_profile_may_need_definitions(name: &str) -> String {
    format!("'{}' is not the name of a defined profile, you may need to specify a definitions file defining it.", name)
}



pub fn not_registered_extension(ext: &str) -> String {
    format!("Extension '{}' is not a valid registered extension.", ext)
}



pub fn profile_already_exists(name: &str) -> String {
    format!("A profile called '{}' already exists.", name)
}





////////////////////////////////////////////////////////////////////////////////
//
//  architecture
//
//  Returns the current CPU architecture as a display string.
//
////////////////////////////////////////////////////////////////////////////////

fn architecture() -> &'static str {
    if cfg!(target_arch = "x86_64") {
        "x64"
    } else if cfg!(target_arch = "aarch64") {
        "ARM64"
    } else if cfg!(target_arch = "x86") {
        "x86"
    } else {
        "unknown"
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  display_usage
//
//  Writes the help screen.  The literal's indentation is the output's.
//
////////////////////////////////////////////////////////////////////////////////

pub fn display_usage(out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "\
File Meta Association Manager version {ver} {arch} ({ts})

Usage:

   filemetaassoc {{-l|-a|-r|-h}} [-p=<profile name>]
                 [-d=<definition file name>] [-m] [<extension> ...]

Where:

   -l, --list
      List all extensions with the File Meta property handler
   -- OR --
   -a, --add
      Add the File Meta property handler for the specified extension(s)
      (Requires administrator privileges)
   -- OR --
   -r, --remove
      Remove the File Meta property handler from the specified extension(s)
      (Requires administrator privileges)
   -- OR --
   -h, --help
      Display this help

   -p=<profile name>, --profile=<profile name>
      Profile to be used for -add

   -d=<definition file name>, --definitions=<definition file name>
      Profile definitions file to be used for -add

   -m, --merge
      If set -add merges any existing settings into a new profile.
      Otherwise, profile settings are used

   <extension>
      One or more target extensions for -add or -remove, for example, .txt

Environment:

   {env}=M;P;D=<file>
      M  merge by default for -add
      P  also write display values to the extension's ProgID key
      D  default definitions file
   {log}=<level>
      Diagnostic logging (error, warn, info, debug, trace)",
        ver  = VERSION_STRING,
        arch = architecture(),
        ts   = BUILD_TIMESTAMP,
        env  = FILEMETA_ENV_VAR_NAME,
        log  = FILEMETA_LOG_ENV_VAR_NAME,
    )
}
