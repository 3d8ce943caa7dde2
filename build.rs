// build.rs — Inject version + timestamp, embed Windows version resource.
//
// On every compile:
// 1. Reads the package version from Cargo
// 2. Emits cargo:rustc-env directives so src/ can use env!() macros
// 3. On Windows targets, embeds a VERSIONINFO resource in the executable
//
// Env vars injected:
//   FILEMETA_VERSION_STRING  e.g. "0.1.0"
//   FILEMETA_VERSION_YEAR    e.g. "2026"
//   FILEMETA_BUILD_TIMESTAMP e.g. "Feb  9 2026 14:30"

use std::env;
use chrono::Local;





////////////////////////////////////////////////////////////////////////////////
//
//  build_timestamp
//
//  Returns the current local time formatted as a build timestamp string.
//
////////////////////////////////////////////////////////////////////////////////

fn build_timestamp() -> String {
    Local::now().format("%b %e %Y %H:%M").to_string()
}





////////////////////////////////////////////////////////////////////////////////
//
//  current_year
//
//  Returns the current year as a four-digit string.
//
////////////////////////////////////////////////////////////////////////////////

fn current_year() -> String {
    Local::now().format("%Y").to_string()
}





////////////////////////////////////////////////////////////////////////////////
//
//  emit_env_vars
//
//  Emits cargo:rustc-env directives for version, timestamp, and year.
//
////////////////////////////////////////////////////////////////////////////////

fn emit_env_vars(version: &str, timestamp: &str, year: &str) {
    println!("cargo:rustc-env=FILEMETA_VERSION_STRING={version}");
    println!("cargo:rustc-env=FILEMETA_VERSION_YEAR={year}");
    println!("cargo:rustc-env=FILEMETA_BUILD_TIMESTAMP={timestamp}");
}





////////////////////////////////////////////////////////////////////////////////
//
//  embed_windows_resources
//
//  Compiles a VERSIONINFO resource into the executable.  Only meaningful
//  when the target is Windows; a missing resource compiler is reported as
//  a warning rather than failing the build.
//
////////////////////////////////////////////////////////////////////////////////

fn embed_windows_resources(version: &str, year: &str) {
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set("FileDescription", "File Meta Association Manager");
    res.set("ProductName",     "File Meta");
    res.set("ProductVersion",  version);
    res.set("LegalCopyright",  &format!("Copyright {year}"));

    if let Err(e) = res.compile() {
        println!("cargo:warning=Could not embed Windows resources: {e}");
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  main
//
//  Entry point: reads version, emits env vars, embeds resources.
//
////////////////////////////////////////////////////////////////////////////////

fn main() {
    let version   = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());
    let timestamp = build_timestamp();
    let year      = current_year();



    println!("cargo:rerun-if-changed=build.rs");

    emit_env_vars(&version, &timestamp, &year);
    embed_windows_resources(&version, &year);
}
