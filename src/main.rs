// File Meta Association Manager
// Binds property-handler profiles to file extensions in the Windows registry

use std::process;

use filemeta_assoc::usage;

fn main() {
    if let Err(e) = filemeta_assoc::run() {
        if e.is_expected() {
            eprintln!("{}", e);
        } else {
            eprintln!("{}", usage::UNEXPECTED_EXCEPTION);
            eprintln!("{}", e);
        }
        process::exit(e.exit_code());
    }
}
