// registry/mod.rs — Registry access seam
//
// Everything that reads or writes the registry goes through
// RegistryProvider, so the association logic runs unchanged against the
// live Windows registry or an in-memory tree in tests.

mod memory;
#[cfg(windows)]
mod win32;

pub use memory::MemoryRegistry;
#[cfg(windows)]
pub use win32::WindowsRegistry;

use crate::ehm::AppError;





/// Registry hives (and views) the association manager touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hive {
    /// HKEY_CLASSES_ROOT
    ClassesRoot,

    /// HKEY_LOCAL_MACHINE in the process's native view
    LocalMachine,

    /// HKEY_LOCAL_MACHINE in the 32-bit (WOW6432Node) view
    LocalMachine32,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Hive
//
//  Display names used in log and error messages.
//
////////////////////////////////////////////////////////////////////////////////

impl Hive {
    pub fn name(&self) -> &'static str {
        match self {
            Hive::ClassesRoot    => "HKCR",
            Hive::LocalMachine   => "HKLM",
            Hive::LocalMachine32 => "HKLM(32)",
        }
    }



    pub fn display_path(&self, path: &str) -> String {
        if path.is_empty() {
            self.name().to_string()
        } else {
            format!("{}\\{}", self.name(), path)
        }
    }
}





/// Name of a key's default (unnamed) value.
pub const DEFAULT_VALUE: &str = "";





////////////////////////////////////////////////////////////////////////////////
//
//  RegistryProvider
//
//  String-valued registry operations.  Paths are backslash-separated and
//  relative to the hive.  Reads of missing keys or values return None or
//  an empty list; deletes of missing keys or values succeed.
//
////////////////////////////////////////////////////////////////////////////////

pub trait RegistryProvider {
    fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, AppError>;

    /// Reads a string value; `DEFAULT_VALUE` names the default value.
    fn get_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>, AppError>;

    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError>;

    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError>;

    /// Creates the key and any missing parents.
    fn create_key(&self, hive: Hive, path: &str) -> Result<(), AppError>;

    /// Writes a string value, creating the key if needed.
    fn set_string(&self, hive: Hive, path: &str, name: &str, value: &str) -> Result<(), AppError>;

    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), AppError>;

    /// Deletes a key that has no subkeys.
    fn delete_key(&self, hive: Hive, path: &str) -> Result<(), AppError>;

    fn delete_key_tree(&self, hive: Hive, path: &str) -> Result<(), AppError>;
}





////////////////////////////////////////////////////////////////////////////////
//
//  join
//
//  Joins registry path components with '\', skipping empty parts.
//
////////////////////////////////////////////////////////////////////////////////

pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<&str>>()
        .join("\\")
}





////////////////////////////////////////////////////////////////////////////////
//
//  split_parent
//
//  Splits "a\b\c" into ("a\b", "c").  A single component has an empty
//  parent.
//
////////////////////////////////////////////////////////////////////////////////

pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('\\') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}
