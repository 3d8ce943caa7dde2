// win32.rs — Live Windows registry via winreg

use std::io;

use winreg::RegKey;
use winreg::enums::*;

use super::{Hive, RegistryProvider, split_parent};
use crate::ehm::AppError;





/// The process's registry, with LocalMachine32 mapped to the 32-bit view.
pub struct WindowsRegistry;





////////////////////////////////////////////////////////////////////////////////
//
//  root_and_view
//
//  Predefined key and WOW64 view flag for a hive.
//
////////////////////////////////////////////////////////////////////////////////

fn root_and_view(hive: Hive) -> (RegKey, u32) {
    match hive {
        Hive::ClassesRoot    => (RegKey::predef(HKEY_CLASSES_ROOT), 0),
        Hive::LocalMachine   => (RegKey::predef(HKEY_LOCAL_MACHINE), 0),
        Hive::LocalMachine32 => (RegKey::predef(HKEY_LOCAL_MACHINE), KEY_WOW64_32KEY),
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  open
//
//  Opens a key with the given access.  Ok(None) when it does not exist.
//
////////////////////////////////////////////////////////////////////////////////

fn open(hive: Hive, path: &str, access: u32) -> Result<Option<RegKey>, AppError> {
    let (root, view) = root_and_view(hive);

    match root.open_subkey_with_flags(path, access | view) {
        Ok(key) => Ok(Some(key)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::registry(hive.display_path(path), e)),
    }
}





fn ignore_not_found(hive: Hive, path: &str, result: io::Result<()>) -> Result<(), AppError> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::registry(hive.display_path(path), e)),
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl RegistryProvider for WindowsRegistry
//
////////////////////////////////////////////////////////////////////////////////

impl RegistryProvider for WindowsRegistry {
    fn key_exists(&self, hive: Hive, path: &str) -> Result<bool, AppError> {
        Ok(open(hive, path, KEY_READ)?.is_some())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  get_string
    //
    //  Non-string values read as absent.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn get_string(&self, hive: Hive, path: &str, name: &str) -> Result<Option<String>, AppError> {
        let Some(key) = open(hive, path, KEY_READ)? else {
            return Ok(None);
        };

        match key.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                log::debug!("{} value '{}' is not a string", hive.display_path(path), name);
                Ok(None)
            }
            Err(e) => Err(AppError::registry(hive.display_path(path), e)),
        }
    }





    fn value_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError> {
        let Some(key) = open(hive, path, KEY_READ)? else {
            return Ok(Vec::new());
        };

        key.enum_values()
            .map(|v| v.map(|(name, _)| name))
            .collect::<io::Result<Vec<String>>>()
            .map_err(|e| AppError::registry(hive.display_path(path), e))
    }





    fn subkey_names(&self, hive: Hive, path: &str) -> Result<Vec<String>, AppError> {
        let Some(key) = open(hive, path, KEY_READ)? else {
            return Ok(Vec::new());
        };

        key.enum_keys()
            .collect::<io::Result<Vec<String>>>()
            .map_err(|e| AppError::registry(hive.display_path(path), e))
    }





    fn create_key(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        let (root, view) = root_and_view(hive);

        root.create_subkey_with_flags(path, KEY_ALL_ACCESS | view)
            .map(|_| ())
            .map_err(|e| AppError::registry(hive.display_path(path), e))
    }





    fn set_string(&self, hive: Hive, path: &str, name: &str, value: &str) -> Result<(), AppError> {
        let (root, view) = root_and_view(hive);

        log::debug!("Set {} [{}] = {}", hive.display_path(path), name, value);

        let (key, _) = root
            .create_subkey_with_flags(path, KEY_ALL_ACCESS | view)
            .map_err(|e| AppError::registry(hive.display_path(path), e))?;

        key.set_value(name, &value.to_string())
            .map_err(|e| AppError::registry(hive.display_path(path), e))
    }





    fn delete_value(&self, hive: Hive, path: &str, name: &str) -> Result<(), AppError> {
        let Some(key) = open(hive, path, KEY_SET_VALUE)? else {
            return Ok(());
        };

        log::debug!("Delete {} [{}]", hive.display_path(path), name);
        ignore_not_found(hive, path, key.delete_value(name))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  delete_key
    //
    //  RegDeleteKeyEx refuses keys that still have subkeys.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn delete_key(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        let (parent, leaf) = split_parent(path);
        let (_, view) = root_and_view(hive);

        let Some(parent_key) = open(hive, parent, KEY_ALL_ACCESS)? else {
            return Ok(());
        };

        log::debug!("Delete key {}", hive.display_path(path));
        ignore_not_found(hive, path, parent_key.delete_subkey_with_flags(leaf, view))
    }





    fn delete_key_tree(&self, hive: Hive, path: &str) -> Result<(), AppError> {
        let (parent, leaf) = split_parent(path);

        let Some(parent_key) = open(hive, parent, KEY_ALL_ACCESS)? else {
            return Ok(());
        };

        log::debug!("Delete key tree {}", hive.display_path(path));
        ignore_not_found(hive, path, parent_key.delete_subkey_all(leaf))
    }
}
