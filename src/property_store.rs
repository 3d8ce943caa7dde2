// property_store.rs — Per-file property store capability
//
// The shell's property store is reached through this trait so callers can
// be exercised without COM.  A store is opened on one file, read and
// written by canonical property name, and committed as a unit.  A lock
// held by another writer surfaces as AppError::LockViolation.

use std::path::Path;

use crate::ehm::AppError;





pub trait PropertyStore {
    /// Opens the store for `path`, discarding any uncommitted changes.
    fn initialize(&mut self, path: &Path) -> Result<(), AppError>;

    fn get_value(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set_value(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    /// Writes pending changes back to the file.
    fn commit(&mut self) -> Result<(), AppError>;
}
