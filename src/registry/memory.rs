// memory.rs — In-memory registry
//
// A case-insensitive key tree with string values, used by the tests and
// by dry runs on hosts without a Windows registry.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;

use super::{Hive, RegistryProvider, split_parent};
use crate::ehm::AppError;





#[derive(Debug, Clone, Default)]
struct KeyData {
    /// Path as first created, for subkey enumeration
    path:   String,

    /// Lowercase name → (name as written, value)
    values: BTreeMap<String, (String, String)>,
}





/// In-memory registry.  Keys and value names compare case-insensitively
/// and hive roots always exist.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    keys:      RefCell<BTreeMap<(Hive, String), KeyData>>,
    read_only: Cell<bool>,
}





fn normalize(path: &str) -> String {
    path.trim_matches('\\').to_ascii_lowercase()
}



fn is_child_of(candidate: &str, parent: &str) -> bool {
    if parent.is_empty() {
        return !candidate.is_empty() && !candidate.contains('\\');
    }

    match candidate.strip_prefix(parent).and_then(|rest| rest.strip_prefix('\\')) {
        Some(rest) => !rest.is_empty() && !rest.contains('\\'),
        None => false,
    }
}



fn is_descendant_of(candidate: &str, ancestor: &str) -> bool {
    candidate == ancestor
        || candidate
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('\\'))
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl MemoryRegistry
//
//  Construction and test controls.
//
////////////////////////////////////////////////////////////////////////////////

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  set_read_only
    //
    //  When set, every write fails with access denied, as it would for a
    //  process without administrator rights.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }





    fn check_writable(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        if self.read_only.get() {
            return Err(AppError::registry(
                hive.display_path(path),
                io::Error::new(io::ErrorKind::PermissionDenied, "Access is denied."),
            ));
        }
        Ok(())
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl RegistryProvider for MemoryRegistry
//
////////////////////////////////////////////////////////////////////////////////

impl RegistryProvider for MemoryRegistry {
    fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, AppError> {
        let key = normalize(path);
        Ok(key.is_empty() || self.keys.borrow().contains_key(&(hive, key)))
    }





    fn get_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>, AppError> {
        let keys = self.keys.borrow();
        Ok(keys
            .get(&(hive, normalize(path)))
            .and_then(|k| k.values.get(&name.to_ascii_lowercase()))
            .map(|(_, value)| value.clone()))
    }





    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError> {
        let keys = self.keys.borrow();
        Ok(keys
            .get(&(hive, normalize(path)))
            .map(|k| k.values.values().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }





    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError> {
        let parent = normalize(path);
        let keys = self.keys.borrow();

        Ok(keys
            .iter()
            .filter(|((h, p), _)| *h == hive && is_child_of(p, &parent))
            .map(|(_, data)| split_parent(&data.path).1.to_string())
            .collect())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  create_key
    //
    //  Creates every missing component along the path.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn create_key(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        let trimmed = path.trim_matches('\\');
        if trimmed.is_empty() {
            return Ok(());
        }

        self.check_writable(hive, path)?;

        let mut keys = self.keys.borrow_mut();
        let mut prefix = String::new();

        for component in trimmed.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(component);

            keys.entry((hive, prefix.to_ascii_lowercase()))
                .or_insert_with(|| KeyData { path: prefix.clone(), values: BTreeMap::new() });
        }

        Ok(())
    }





    fn set_string(&self, hive: Hive, path: &str, name: &str, value: &str) -> Result<(), AppError> {
        self.create_key(hive, path)?;

        let mut keys = self.keys.borrow_mut();
        if let Some(key) = keys.get_mut(&(hive, normalize(path))) {
            key.values.insert(name.to_ascii_lowercase(), (name.to_string(), value.to_string()));
        }
        Ok(())
    }





    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), AppError> {
        self.check_writable(hive, path)?;

        if let Some(key) = self.keys.borrow_mut().get_mut(&(hive, normalize(path))) {
            key.values.remove(&name.to_ascii_lowercase());
        }
        Ok(())
    }





    fn delete_key(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        self.check_writable(hive, path)?;

        if !self.subkey_names(hive, path)?.is_empty() {
            return Err(AppError::registry(
                hive.display_path(path),
                io::Error::other("Key has subkeys"),
            ));
        }

        self.keys.borrow_mut().remove(&(hive, normalize(path)));
        Ok(())
    }





    fn delete_key_tree(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        self.check_writable(hive, path)?;

        let root = normalize(path);
        self.keys
            .borrow_mut()
            .retain(|(h, p), _| *h != hive || !is_descendant_of(p, &root));
        Ok(())
    }
}
