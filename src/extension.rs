// extension.rs — Per-extension property handler binding
//
// An extension's handler state is read from PropertyHandlers\<ext> and
// the SystemFileAssociations key.  Setup writes our handler and the
// profile's display values, hiding any pre-existing values under
// FileMetaOld* names; removal reverses exactly that.

use crate::ehm::{AppError, WindowsErrorCode};
use crate::host::*;
use crate::profile::Profile;
use crate::registry::{DEFAULT_VALUE, Hive, RegistryProvider, join};
use crate::usage;





/// What File Meta finds registered for an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerState {
    /// No property handler
    None,

    /// Our handler, with nothing chained behind it
    Ours,

    /// Another vendor's handler
    Foreign,

    /// Our handler, with the previous foreign handler chained
    Chained,

    /// No handler, but our display values or context menu remain
    ProfileOnly,
}





impl HandlerState {
    /// True for states where our handler is installed.
    pub fn is_ours(&self) -> bool {
        matches!(self, HandlerState::Ours | HandlerState::Chained)
    }
}





#[derive(Debug, Clone)]
pub struct Extension {
    pub name:      String,
    state:         HandlerState,

    /// Foreign handler CLSID (Foreign), or the chained one (Chained)
    handler_guid:  Option<String>,
    handler_title: Option<String>,

    /// Name of the profile applied, when the handler is ours
    pub profile:   Option<String>,
}





/// HKLM-relative path of an extension's property handler key.
pub fn handler_key_path(ext: &str) -> String {
    join(&[PROPERTY_HANDLERS_PATH, ext])
}



/// HKLM-relative path of an extension's SystemFileAssociations key.
pub fn system_file_associations_path(ext: &str) -> String {
    join(&[SYSTEM_FILE_ASSOCIATIONS_PATH, ext])
}



/// Path of our context handler key beneath a profile key.
pub fn context_handler_path(profile_key: &str) -> String {
    join(&[profile_key, SHELL_EX_KEY, CONTEXT_MENU_HANDLERS_KEY, CONTEXT_HANDLER_KEY])
}





////////////////////////////////////////////////////////////////////////////////
//
//  progid_key_path
//
//  The HKCR key that carries an extension's legacy display values: the
//  ProgID named by HKCR\<ext>'s default value, else HKCR\<ext> itself.
//  When `create` is set the key is created; otherwise Ok(None) is
//  returned if it does not exist.
//
////////////////////////////////////////////////////////////////////////////////

pub fn progid_key_path(reg: &dyn RegistryProvider, ext: &str, create: bool) -> Result<Option<String>, AppError> {
    let progid = if reg.key_exists(Hive::ClassesRoot, ext)? {
        reg.get_string(Hive::ClassesRoot, ext, DEFAULT_VALUE)?
    } else if create {
        None
    } else {
        return Ok(None);
    };

    let target = progid.filter(|p| !p.is_empty()).unwrap_or_else(|| ext.to_string());

    if create {
        reg.create_key(Hive::ClassesRoot, &target)?;
        Ok(Some(target))
    } else if reg.key_exists(Hive::ClassesRoot, &target)? {
        Ok(Some(target))
    } else {
        Ok(None)
    }
}





fn set_profile_string(profile: &mut Profile, value_name: &str, value: &str) {
    match value_name {
        FULL_DETAILS_VALUE    => profile.set_full_details_string(value),
        PREVIEW_DETAILS_VALUE => profile.set_preview_details_string(value),
        INFO_TIP_VALUE        => profile.set_info_tip_string(value),
        _ => {}
    }
}



fn is_non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Extension
//
//  Handler state recording and the setup / remove transitions.
//
////////////////////////////////////////////////////////////////////////////////

impl Extension {
    pub fn new(name: impl Into<String>) -> Self {
        Extension {
            name:          name.into(),
            state:         HandlerState::None,
            handler_guid:  None,
            handler_title: None,
            profile:       None,
        }
    }



    pub fn state(&self) -> HandlerState {
        self.state
    }



    pub fn handler_guid(&self) -> Option<&str> {
        self.handler_guid.as_deref()
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  record_property_handler
    //
    //  Classifies the handler found in the registry.  Our CLSID with a
    //  non-empty Chained value is Chained; our CLSID alone is Ours; any
    //  other CLSID is Foreign.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn record_property_handler(
        &mut self,
        reg: &dyn RegistryProvider,
        host: &HostContext,
        handler_guid: Option<&str>,
        chained_guid: Option<&str>,
    ) -> Result<(), AppError> {
        let handler_guid = handler_guid.filter(|g| !g.is_empty());
        let chained_guid = chained_guid.filter(|g| !g.is_empty());

        match handler_guid {
            Some(guid) if guid.eq_ignore_ascii_case(host.property_handler_guid) => match chained_guid {
                Some(chained) => {
                    let title = get_handler_title(reg, chained)?;
                    self.record(HandlerState::Chained, Some(chained.to_string()), title);
                }
                None => self.record(HandlerState::Ours, None, None),
            },
            Some(guid) => {
                let title = get_handler_title(reg, guid)?;
                self.record(HandlerState::Foreign, Some(guid.to_string()), title);
            }
            None => self.record(HandlerState::None, None, None),
        }

        Ok(())
    }





    fn record(&mut self, state: HandlerState, guid: Option<String>, title: Option<String>) {
        if state != self.state {
            log::info!("{}: {:?} -> {:?}", self.name, self.state, state);
        }

        self.state         = state;
        self.handler_guid  = guid;
        self.handler_title = title;
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  detect_profile_only
    //
    //  For a handler-less extension, switches to ProfileOnly when the
    //  SystemFileAssociations key still carries our custom-profile value,
    //  hidden originals, or our context handler.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn detect_profile_only(&mut self, reg: &dyn RegistryProvider) -> Result<(), AppError> {
        if self.state != HandlerState::None {
            return Ok(());
        }

        let sfa = system_file_associations_path(&self.name);
        if !reg.key_exists(Hive::LocalMachine, &sfa)? {
            return Ok(());
        }

        let names = reg.value_names(Hive::LocalMachine, &sfa)?;
        let has_value = |wanted: &str| names.iter().any(|n| n.eq_ignore_ascii_case(wanted));

        let remnant = has_value(CUSTOM_PROFILE_VALUE)
            || DISPLAY_VALUES.iter().any(|(_, old)| has_value(old))
            || reg.key_exists(Hive::LocalMachine, &context_handler_path(&sfa))?;

        if remnant {
            self.record(HandlerState::ProfileOnly, None, None);
        }
        Ok(())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  property_handler_display
    //
    //  Handler description for listings.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn property_handler_display(&self) -> String {
        let foreign = || {
            self.handler_title
                .clone()
                .or_else(|| self.handler_guid.clone())
                .unwrap_or_default()
        };

        match self.state {
            HandlerState::Ours    => OUR_PROPERTY_HANDLER_TITLE.to_string(),
            HandlerState::Foreign => foreign(),
            HandlerState::Chained => format!("{}{}", OUR_PROPERTY_HANDLER_PREFIX, foreign()),
            HandlerState::None | HandlerState::ProfileOnly => usage::PROPERTY_HANDLER_NONE.to_string(),
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  setup_handler_for_extension
    //
    //  Installs our handler with `selected`'s display values.  When
    //  `custom` is given, the extension's existing values are read into it
    //  and `selected` is merged on top; the result is what gets written.
    //
    //  Returns Ok(false) without a complete write when the process lacks
    //  administrator rights.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn setup_handler_for_extension(
        &mut self,
        reg: &dyn RegistryProvider,
        host: &HostContext,
        selected: &Profile,
        custom: Option<&mut Profile>,
    ) -> Result<bool, AppError> {
        if !host.property_handler_registered {
            return Err(AppError::assoc(usage::CANNOT_ADD_HANDLER, WindowsErrorCode::InvalidFunction));
        }

        if !host.elevated {
            log::warn!("{}: not elevated, handler not added", self.name);
            return Ok(false);
        }

        if self.state != HandlerState::None && self.state != HandlerState::Foreign {
            return Err(AppError::invalid_parameter(usage::extension_already_has_handler(&self.name)));
        }

        match self.write_handler_entries(reg, host, selected, custom) {
            Ok(()) => Ok(true),
            Err(e) if e.is_access_denied() => {
                log::warn!("{}: {}", self.name, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }





    fn write_handler_entries(
        &mut self,
        reg: &dyn RegistryProvider,
        host: &HostContext,
        selected: &Profile,
        mut custom: Option<&mut Profile>,
    ) -> Result<(), AppError> {
        let foreign = self.state == HandlerState::Foreign;

        // Legacy location: hide anything a foreign handler put there
        let progid = progid_key_path(reg, &self.name, true)?.unwrap_or_else(|| self.name.clone());
        if foreign {
            hide_existing_entries(reg, Hive::ClassesRoot, &progid, custom.as_deref_mut())?;
        }

        let sfa = system_file_associations_path(&self.name);
        reg.create_key(Hive::LocalMachine, &sfa)?;
        if foreign {
            hide_existing_entries(reg, Hive::LocalMachine, &sfa, custom.as_deref_mut())?;
        }

        let profile: &Profile = match custom {
            Some(c) => {
                c.merge_from(selected);
                c
            }
            None => selected,
        };

        write_profile_entries(reg, host, Hive::LocalMachine, &sfa, profile)?;
        if host.write_progid_entries {
            write_profile_entries(reg, host, Hive::ClassesRoot, &progid, profile)?;
        }

        let handler_key = handler_key_path(&self.name);

        if host.dual_handlers {
            let previous = reg.get_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE)?;

            if !foreign {
                // A lone 32-bit handler is left in place
                if !is_non_empty(&previous) {
                    reg.set_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE, host.property_handler_guid32)?;
                }
            } else {
                reg.set_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE, host.property_handler_guid32)?;

                if let Some(prev) = previous.filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(host.property_handler_guid32)) {
                    reg.set_string(Hive::LocalMachine32, &handler_key, CHAINED_VALUE, &prev)?;
                }
            }
        }

        reg.set_string(Hive::LocalMachine, &handler_key, DEFAULT_VALUE, host.property_handler_guid)?;

        if foreign {
            let chained = self.handler_guid.clone().unwrap_or_default();
            reg.set_string(Hive::LocalMachine, &handler_key, CHAINED_VALUE, &chained)?;

            let title = self.handler_title.clone();
            self.record(HandlerState::Chained, Some(chained), title);
        } else {
            self.record(HandlerState::Ours, None, None);
        }

        self.profile = Some(profile.name.clone());
        Ok(())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  update_profile_settings_for_extension
    //
    //  Rewrites the display values after the bound profile was edited.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn update_profile_settings_for_extension(
        &mut self,
        reg: &dyn RegistryProvider,
        host: &HostContext,
        profile: &Profile,
    ) -> Result<bool, AppError> {
        if !host.elevated {
            return Ok(false);
        }

        if !self.state.is_ours() {
            return Ok(true);
        }

        let sfa = system_file_associations_path(&self.name);
        let result = write_display_values(reg, Hive::LocalMachine, &sfa, profile).and_then(|()| {
            if host.write_progid_entries {
                if let Some(progid) = progid_key_path(reg, &self.name, false)? {
                    write_display_values(reg, Hive::ClassesRoot, &progid, profile)?;
                }
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                self.profile = Some(profile.name.clone());
                Ok(true)
            }
            Err(e) if e.is_access_denied() => Ok(false),
            Err(e) => Err(e),
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  remove_handler_from_extension
    //
    //  Undoes setup.  Extensions without our handler or its remnants are
    //  left alone and reported as success.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn remove_handler_from_extension(
        &mut self,
        reg: &dyn RegistryProvider,
        host: &HostContext,
    ) -> Result<bool, AppError> {
        if !self.state.is_ours() && self.state != HandlerState::ProfileOnly {
            return Ok(true);
        }

        if !host.elevated {
            log::warn!("{}: not elevated, handler not removed", self.name);
            return Ok(false);
        }

        match self.remove_handler_entries(reg, host) {
            Ok(()) => Ok(true),
            Err(e) if e.is_access_denied() => {
                log::warn!("{}: {}", self.name, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }





    fn remove_handler_entries(&mut self, reg: &dyn RegistryProvider, host: &HostContext) -> Result<(), AppError> {
        if let Some(progid) = progid_key_path(reg, &self.name, false)? {
            remove_profile_entries(reg, Hive::ClassesRoot, &progid)?;
        }

        remove_profile_entries(reg, Hive::LocalMachine, &system_file_associations_path(&self.name))?;

        self.profile = None;

        if self.state == HandlerState::ProfileOnly {
            self.record(HandlerState::None, None, None);
            return Ok(());
        }

        let handler_key = handler_key_path(&self.name);

        if host.dual_handlers {
            let current = reg.get_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE)?;
            let ours32 = current.as_deref().is_some_and(|g| g.eq_ignore_ascii_case(host.property_handler_guid32));
            let chained = reg.get_string(Hive::LocalMachine32, &handler_key, CHAINED_VALUE)?;

            match chained {
                Some(prev) if self.state == HandlerState::Chained && !prev.is_empty() => {
                    reg.set_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE, &prev)?;
                    reg.delete_value(Hive::LocalMachine32, &handler_key, CHAINED_VALUE)?;
                }
                _ if ours32 => reg.delete_key_tree(Hive::LocalMachine32, &handler_key)?,
                _ => {}
            }
        }

        match (self.state, self.handler_guid.clone()) {
            (HandlerState::Chained, Some(prev)) => {
                reg.set_string(Hive::LocalMachine, &handler_key, DEFAULT_VALUE, &prev)?;
                reg.delete_value(Hive::LocalMachine, &handler_key, CHAINED_VALUE)?;

                let title = self.handler_title.clone();
                self.record(HandlerState::Foreign, Some(prev), title);
            }
            _ => {
                reg.delete_key_tree(Hive::LocalMachine, &handler_key)?;
                self.record(HandlerState::None, None, None);
            }
        }

        Ok(())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  get_default_custom_profile
    //
    //  A profile named after the extension holding its current display
    //  values, preferring SystemFileAssociations over the ProgID key.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn get_default_custom_profile(&self, reg: &dyn RegistryProvider) -> Result<Profile, AppError> {
        let mut profile = Profile::new(self.name.clone());

        let sfa = system_file_associations_path(&self.name);
        if read_display_values(reg, Hive::LocalMachine, &sfa, &mut profile)? {
            return Ok(profile);
        }

        if let Some(progid) = progid_key_path(reg, &self.name, false)? {
            read_display_values(reg, Hive::ClassesRoot, &progid, &mut profile)?;
        }

        Ok(profile)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  identify_current_profile
    //
    //  Finds the profile bound to an extension with our handler: the
    //  custom profile named by FileMetaCustomProfile, else the built-in
    //  whose PreviewDetails string matches.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn identify_current_profile(
        &mut self,
        reg: &dyn RegistryProvider,
        builtin: &[Profile],
        custom: &[Profile],
    ) -> Result<Option<String>, AppError> {
        self.profile = None;

        if !self.state.is_ours() {
            return Ok(None);
        }

        let sfa = system_file_associations_path(&self.name);
        let custom_name = reg.get_string(Hive::LocalMachine, &sfa, CUSTOM_PROFILE_VALUE)?;
        let preview     = reg.get_string(Hive::LocalMachine, &sfa, PREVIEW_DETAILS_VALUE)?;

        self.profile = if let Some(name) = custom_name {
            custom.iter().find(|p| p.name == name).map(|p| p.name.clone())
        } else if let Some(pd) = preview {
            builtin.iter().find(|p| p.preview_details_string() == pd).map(|p| p.name.clone())
        } else {
            None
        };

        Ok(self.profile.clone())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  is_refresh_required
    //
    //  True when entries written by an older layout are present: display
    //  values on the ProgID key, or (64-bit) a missing 32-bit handler or
    //  a chained handler with no 32-bit Chained record.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn is_refresh_required(&self, reg: &dyn RegistryProvider, host: &HostContext) -> Result<bool, AppError> {
        if !host.write_progid_entries {
            if let Some(progid) = progid_key_path(reg, &self.name, false)? {
                if reg.get_string(Hive::ClassesRoot, &progid, FULL_DETAILS_VALUE)?.is_some() {
                    return Ok(true);
                }
            }
        }

        if host.dual_handlers {
            let handler_key = handler_key_path(&self.name);
            let current = reg.get_string(Hive::LocalMachine32, &handler_key, DEFAULT_VALUE)?;

            if current.is_none() {
                return Ok(true);
            }

            if self.state == HandlerState::Chained {
                let names = reg.value_names(Hive::LocalMachine32, &handler_key)?;
                if !names.iter().any(|n| n.eq_ignore_ascii_case(CHAINED_VALUE)) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  get_handler_title
//
//  Display title of a handler CLSID: its default value, "Windows Shell"
//  for the two untitled shell handlers, else its InProcServer32 path.
//
////////////////////////////////////////////////////////////////////////////////

fn get_handler_title(reg: &dyn RegistryProvider, guid: &str) -> Result<Option<String>, AppError> {
    let clsid = clsid_path(guid);
    if !reg.key_exists(Hive::ClassesRoot, &clsid)? {
        return Ok(None);
    }

    if let Some(title) = reg.get_string(Hive::ClassesRoot, &clsid, DEFAULT_VALUE)?.filter(|t| !t.is_empty()) {
        return Ok(Some(title));
    }

    if WINDOWS_SHELL_GUIDS.iter().any(|g| g.eq_ignore_ascii_case(guid)) {
        return Ok(Some(WINDOWS_SHELL_TITLE.to_string()));
    }

    reg.get_string(Hive::ClassesRoot, &join(&[&clsid, IN_PROC_SERVER32]), DEFAULT_VALUE)
}





////////////////////////////////////////////////////////////////////////////////
//
//  hide_existing_entries
//
//  Moves display values to their FileMetaOld* names, copying them into
//  `profile` when one is supplied.
//
////////////////////////////////////////////////////////////////////////////////

fn hide_existing_entries(
    reg: &dyn RegistryProvider,
    hive: Hive,
    path: &str,
    mut profile: Option<&mut Profile>,
) -> Result<(), AppError> {
    for (current, old) in DISPLAY_VALUES {
        if let Some(value) = reg.get_string(hive, path, current)? {
            reg.set_string(hive, path, old, &value)?;
            reg.delete_value(hive, path, current)?;

            if let Some(p) = profile.as_deref_mut() {
                set_profile_string(p, current, &value);
            }
        }
    }
    Ok(())
}





fn read_display_values(reg: &dyn RegistryProvider, hive: Hive, path: &str, profile: &mut Profile) -> Result<bool, AppError> {
    let mut found = false;

    for (current, _) in DISPLAY_VALUES {
        if let Some(value) = reg.get_string(hive, path, current)? {
            set_profile_string(profile, current, &value);
            found = true;
        }
    }
    Ok(found)
}





////////////////////////////////////////////////////////////////////////////////
//
//  write_display_values
//
//  Writes the three display strings, plus FileMetaCustomProfile for
//  editable profiles.
//
////////////////////////////////////////////////////////////////////////////////

fn write_display_values(reg: &dyn RegistryProvider, hive: Hive, path: &str, profile: &Profile) -> Result<(), AppError> {
    reg.set_string(hive, path, FULL_DETAILS_VALUE,    &profile.full_details_string())?;
    reg.set_string(hive, path, INFO_TIP_VALUE,        &profile.info_tip_string())?;
    reg.set_string(hive, path, PREVIEW_DETAILS_VALUE, &profile.preview_details_string())?;

    if !profile.is_read_only {
        reg.set_string(hive, path, CUSTOM_PROFILE_VALUE, &profile.name)?;
    }
    Ok(())
}





fn write_profile_entries(
    reg: &dyn RegistryProvider,
    host: &HostContext,
    hive: Hive,
    path: &str,
    profile: &Profile,
) -> Result<(), AppError> {
    write_display_values(reg, hive, path, profile)?;

    if host.context_handler_registered {
        reg.set_string(hive, &context_handler_path(path), DEFAULT_VALUE, host.context_handler_guid)?;
    }
    Ok(())
}





////////////////////////////////////////////////////////////////////////////////
//
//  remove_profile_entries
//
//  Deletes our values, restores hidden originals, and removes the context
//  handler key, then ContextMenuHandlers and ShellEx if left empty.
//
////////////////////////////////////////////////////////////////////////////////

fn remove_profile_entries(reg: &dyn RegistryProvider, hive: Hive, path: &str) -> Result<(), AppError> {
    if !reg.key_exists(hive, path)? {
        return Ok(());
    }

    for (current, _) in DISPLAY_VALUES {
        reg.delete_value(hive, path, current)?;
    }
    reg.delete_value(hive, path, CUSTOM_PROFILE_VALUE)?;

    for (current, old) in DISPLAY_VALUES {
        if let Some(value) = reg.get_string(hive, path, old)? {
            reg.set_string(hive, path, current, &value)?;
            reg.delete_value(hive, path, old)?;
        }
    }

    let shell_ex = join(&[path, SHELL_EX_KEY]);
    let handlers = join(&[&shell_ex, CONTEXT_MENU_HANDLERS_KEY]);

    if reg.key_exists(hive, &handlers)? {
        reg.delete_key_tree(hive, &context_handler_path(path))?;

        if reg.subkey_names(hive, &handlers)?.is_empty() {
            reg.delete_key(hive, &handlers)?;
        }
    }

    if reg.key_exists(hive, &shell_ex)?
        && reg.subkey_names(hive, &shell_ex)?.is_empty()
        && reg.value_names(hive, &shell_ex)?.is_empty()
    {
        reg.delete_key(hive, &shell_ex)?;
    }

    Ok(())
}
