// reg_state.rs — Snapshot of everything written for one extension
//
// Used to compare the registry before and after an operation, and to put
// test extensions into a known state.  Never zap or wipe a real extension.

use crate::ehm::AppError;
use crate::extension::{context_handler_path, handler_key_path, progid_key_path, system_file_associations_path};
use crate::host::*;
use crate::registry::{DEFAULT_VALUE, Hive, RegistryProvider};





/// Values found at one profile location (ProgID key or
/// SystemFileAssociations key).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationState {
    pub full_details:         Option<String>,
    pub preview_details:      Option<String>,
    pub info_tip:             Option<String>,
    pub old_full_details:     Option<String>,
    pub old_preview_details:  Option<String>,
    pub old_info_tip:         Option<String>,
    pub custom_profile:       Option<String>,
    pub context_menu_handler: Option<String>,
}





#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegState {
    /// HKCR ProgID (or extension) key
    pub clsid:                      LocationState,

    /// HKLM SystemFileAssociations key
    pub system:                     LocationState,

    pub property_handler:           Option<String>,
    pub chained_property_handler:   Option<String>,

    /// 32-bit view; only read and written on dual-handler hosts
    pub property_handler32:         Option<String>,
    pub chained_property_handler32: Option<String>,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl LocationState
//
////////////////////////////////////////////////////////////////////////////////

impl LocationState {
    fn values(&self) -> [(&'static str, &Option<String>); 7] {
        [
            (FULL_DETAILS_VALUE,        &self.full_details),
            (PREVIEW_DETAILS_VALUE,     &self.preview_details),
            (INFO_TIP_VALUE,            &self.info_tip),
            (OLD_FULL_DETAILS_VALUE,    &self.old_full_details),
            (OLD_PREVIEW_DETAILS_VALUE, &self.old_preview_details),
            (OLD_INFO_TIP_VALUE,        &self.old_info_tip),
            (CUSTOM_PROFILE_VALUE,      &self.custom_profile),
        ]
    }



    fn read(reg: &dyn RegistryProvider, hive: Hive, path: &str) -> Result<Self, AppError> {
        if !reg.key_exists(hive, path)? {
            return Ok(Self::default());
        }

        let get = |name: &str| reg.get_string(hive, path, name);

        Ok(LocationState {
            full_details:         get(FULL_DETAILS_VALUE)?,
            preview_details:      get(PREVIEW_DETAILS_VALUE)?,
            info_tip:             get(INFO_TIP_VALUE)?,
            old_full_details:     get(OLD_FULL_DETAILS_VALUE)?,
            old_preview_details:  get(OLD_PREVIEW_DETAILS_VALUE)?,
            old_info_tip:         get(OLD_INFO_TIP_VALUE)?,
            custom_profile:       get(CUSTOM_PROFILE_VALUE)?,
            context_menu_handler: reg.get_string(hive, &context_handler_path(path), DEFAULT_VALUE)?,
        })
    }



    fn zap(&self, reg: &dyn RegistryProvider, hive: Hive, path: &str) -> Result<(), AppError> {
        reg.create_key(hive, path)?;

        for (name, value) in self.values() {
            set_or_delete(reg, hive, path, name, value)?;
        }

        let handler = context_handler_path(path);
        match &self.context_menu_handler {
            Some(guid) => reg.set_string(hive, &handler, DEFAULT_VALUE, guid),
            None => reg.delete_key_tree(hive, &handler),
        }
    }
}





fn set_or_delete(reg: &dyn RegistryProvider, hive: Hive, path: &str, name: &str, value: &Option<String>) -> Result<(), AppError> {
    match value {
        Some(v) => reg.set_string(hive, path, name, v),
        None => reg.delete_value(hive, path, name),
    }
}



fn zap_handler(
    reg: &dyn RegistryProvider,
    hive: Hive,
    ext: &str,
    handler: &Option<String>,
    chained: &Option<String>,
) -> Result<(), AppError> {
    let key = handler_key_path(ext);

    if handler.is_none() && chained.is_none() {
        return reg.delete_key_tree(hive, &key);
    }

    reg.create_key(hive, &key)?;
    set_or_delete(reg, hive, &key, DEFAULT_VALUE, handler)?;
    set_or_delete(reg, hive, &key, CHAINED_VALUE, chained)
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl RegState
//
//  read / zap / wipe for one extension.
//
////////////////////////////////////////////////////////////////////////////////

impl RegState {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  read
    //
    //  Captures the extension's current registry state.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn read(reg: &dyn RegistryProvider, host: &HostContext, ext: &str) -> Result<Self, AppError> {
        let mut state = RegState::default();

        if let Some(progid) = progid_key_path(reg, ext, false)? {
            state.clsid = LocationState::read(reg, Hive::ClassesRoot, &progid)?;
        }
        state.system = LocationState::read(reg, Hive::LocalMachine, &system_file_associations_path(ext))?;

        let key = handler_key_path(ext);
        state.property_handler         = reg.get_string(Hive::LocalMachine, &key, DEFAULT_VALUE)?;
        state.chained_property_handler = reg.get_string(Hive::LocalMachine, &key, CHAINED_VALUE)?;

        if host.dual_handlers {
            state.property_handler32         = reg.get_string(Hive::LocalMachine32, &key, DEFAULT_VALUE)?;
            state.chained_property_handler32 = reg.get_string(Hive::LocalMachine32, &key, CHAINED_VALUE)?;
        }

        Ok(state)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  zap
    //
    //  Makes the registry match this snapshot: present values are set,
    //  absent ones deleted.  Handler keys with neither value are removed.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn zap(&self, reg: &dyn RegistryProvider, host: &HostContext, ext: &str) -> Result<(), AppError> {
        let progid = progid_key_path(reg, ext, true)?.unwrap_or_else(|| ext.to_string());
        self.clsid.zap(reg, Hive::ClassesRoot, &progid)?;
        self.system.zap(reg, Hive::LocalMachine, &system_file_associations_path(ext))?;

        zap_handler(reg, Hive::LocalMachine, ext, &self.property_handler, &self.chained_property_handler)?;

        if host.dual_handlers {
            zap_handler(reg, Hive::LocalMachine32, ext, &self.property_handler32, &self.chained_property_handler32)?;
        }
        Ok(())
    }





    /// Deletes every key the tool uses for `ext`.
    pub fn wipe(reg: &dyn RegistryProvider, ext: &str) -> Result<(), AppError> {
        reg.delete_key_tree(Hive::ClassesRoot, ext)?;
        reg.delete_key_tree(Hive::LocalMachine, &system_file_associations_path(ext))?;
        reg.delete_key_tree(Hive::LocalMachine, &handler_key_path(ext))?;
        reg.delete_key_tree(Hive::LocalMachine32, &handler_key_path(ext))
    }



    /// Registers `ext` under HKCR with no handler or values.
    pub fn create_minimal_extension(reg: &dyn RegistryProvider, ext: &str) -> Result<(), AppError> {
        progid_key_path(reg, ext, true).map(|_| ())
    }
}
