// state.rs — Roster of extensions and profiles
//
// State is rebuilt from the registry by populate().  Custom profiles are
// loaded from the saved-state store (and an optional definitions file)
// and written back whenever one is added, edited, or bound.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ehm::{AppError, WindowsErrorCode};
use crate::extension::{Extension, HandlerState, handler_key_path};
use crate::host::{CHAINED_VALUE, HostContext, PROPERTY_HANDLERS_PATH};
use crate::profile::Profile;
use crate::registry::{DEFAULT_VALUE, Hive, RegistryProvider};
use crate::saved_state::SavedState;
use crate::usage;





/// What a selection of extensions has in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerSet {
    /// All have no handler
    None,

    /// All have our handler, chained or not
    Ours,

    /// All have a foreign handler
    Foreign,

    /// Mixed, empty, or profile-only
    Other,
}





impl HandlerSet {
    pub fn can_add(&self) -> bool {
        matches!(self, HandlerSet::None | HandlerSet::Foreign)
    }



    pub fn can_remove(&self) -> bool {
        *self == HandlerSet::Ours
    }
}





pub struct State<'a> {
    reg:        &'a dyn RegistryProvider,
    host:       &'a HostContext,
    store_path: Option<PathBuf>,

    extensions: Vec<Extension>,

    /// Lowercase extension name → index in `extensions`
    index:      HashMap<String, usize>,

    builtin:    Vec<Profile>,
    custom:     Vec<Profile>,
}





pub(crate) fn admin_privileges_needed() -> AppError {
    AppError::assoc(usage::ADMIN_PRIVILEGES_NEEDED, WindowsErrorCode::AccessDenied)
}



fn handler_rank(state: HandlerState) -> u8 {
    match state {
        HandlerState::Ours | HandlerState::Chained => 0,
        HandlerState::Foreign                      => 1,
        HandlerState::None | HandlerState::ProfileOnly => 2,
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl State
//
//  Population, lookup, and the operations that span extensions and
//  profiles.
//
////////////////////////////////////////////////////////////////////////////////

impl<'a> State<'a> {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  new
    //
    //  An empty roster.  `store_path` is where custom profiles are saved;
    //  None keeps them in memory only.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn new(reg: &'a dyn RegistryProvider, host: &'a HostContext, store_path: Option<PathBuf>) -> Self {
        State {
            reg,
            host,
            store_path,
            extensions: Vec::new(),
            index:      HashMap::new(),
            builtin:    Profile::builtin_profiles(),
            custom:     Vec::new(),
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  populate
    //
    //  Reads every HKCR extension and its property handler, loads custom
    //  profiles from the store and then `definitions` (which must exist),
    //  identifies bound profiles, and sorts.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn populate(&mut self, definitions: Option<&Path>) -> Result<(), AppError> {
        self.extensions = self
            .reg
            .subkey_names(Hive::ClassesRoot, "")?
            .into_iter()
            .filter(|name| name.starts_with('.'))
            .map(Extension::new)
            .collect();
        self.rebuild_index();

        for name in self.reg.subkey_names(Hive::LocalMachine, PROPERTY_HANDLERS_PATH)? {
            let Some(&i) = self.index.get(&name.to_lowercase()) else {
                continue;
            };

            let key     = handler_key_path(&name);
            let guid    = self.reg.get_string(Hive::LocalMachine, &key, DEFAULT_VALUE)?;
            let chained = self.reg.get_string(Hive::LocalMachine, &key, CHAINED_VALUE)?;

            self.extensions[i].record_property_handler(self.reg, self.host, guid.as_deref(), chained.as_deref())?;
        }

        for ext in &mut self.extensions {
            ext.detect_profile_only(self.reg)?;
        }

        self.load_custom_profiles(definitions)?;

        for ext in &mut self.extensions {
            ext.identify_current_profile(self.reg, &self.builtin, &self.custom)?;
        }

        self.sort_extensions();

        log::info!(
            "Populated {} extensions, {} custom profiles",
            self.extensions.len(),
            self.custom.len()
        );
        Ok(())
    }





    fn load_custom_profiles(&mut self, definitions: Option<&Path>) -> Result<(), AppError> {
        self.custom.clear();

        let mut loaded = match &self.store_path {
            Some(path) => SavedState::load_if_exists(path)?.custom_profiles,
            None => Vec::new(),
        };

        if let Some(path) = definitions {
            loaded.extend(SavedState::load(path)?.custom_profiles);
        }

        for profile in loaded {
            if self.builtin.iter().any(|b| b.name.eq_ignore_ascii_case(&profile.name)) {
                log::warn!("Ignoring custom profile '{}' that shadows a built-in", profile.name);
                continue;
            }

            match self.custom.iter_mut().find(|c| c.name.eq_ignore_ascii_case(&profile.name)) {
                Some(existing) => existing.update_from(&profile),
                None => self.custom.push(profile),
            }
        }
        Ok(())
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  sort_extensions
    //
    //  Our handler (chained or not) first, then foreign, then the rest,
    //  each group by name.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn sort_extensions(&mut self) {
        self.extensions.sort_by(|a, b| {
            match handler_rank(a.state()).cmp(&handler_rank(b.state())) {
                Ordering::Equal => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                other => other,
            }
        });
        self.rebuild_index();
    }





    fn rebuild_index(&mut self) {
        self.index = self
            .extensions
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.to_lowercase(), i))
            .collect();
    }





    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }



    pub fn custom_profiles(&self) -> &[Profile] {
        &self.custom
    }



    /// Built-in profiles, then custom ones.
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.builtin.iter().chain(self.custom.iter())
    }



    pub fn get_extension_by_name(&self, name: &str) -> Option<&Extension> {
        self.index.get(&name.to_lowercase()).map(|&i| &self.extensions[i])
    }



    pub fn get_profile_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles().find(|p| p.name.eq_ignore_ascii_case(name))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  create_extension
    //
    //  Registers a new extension key under HKCR and adds it, handler-less.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn create_extension(&mut self, name: &str) -> Result<&Extension, AppError> {
        if let Some(&i) = self.index.get(&name.to_lowercase()) {
            return Ok(&self.extensions[i]);
        }

        self.reg.create_key(Hive::ClassesRoot, name)?;
        log::info!("Created extension {}", name);

        self.extensions.push(Extension::new(name));
        self.sort_extensions();

        self.get_extension_by_name(name)
            .ok_or_else(|| AppError::invalid_parameter(usage::not_registered_extension(name)))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  classify_selection
    //
    //  Chained counts as ours; profile-only, mixed, or empty selections are
    //  Other.  Unknown names count as handler-less.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn classify_selection(&self, names: &[&str]) -> HandlerSet {
        let mut result: Option<HandlerSet> = None;

        for name in names {
            let state = self.get_extension_by_name(name).map_or(HandlerState::None, |e| e.state());
            let set = match state {
                HandlerState::None                         => HandlerSet::None,
                HandlerState::Ours | HandlerState::Chained => HandlerSet::Ours,
                HandlerState::Foreign                      => HandlerSet::Foreign,
                HandlerState::ProfileOnly                  => HandlerSet::Other,
            };

            match result {
                None => result = Some(set),
                Some(existing) if existing == set => {}
                Some(_) => return HandlerSet::Other,
            }
        }

        result.unwrap_or(HandlerSet::Other)
    }





    fn extension_index(&self, name: &str) -> Result<usize, AppError> {
        self.index
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| AppError::invalid_parameter(usage::not_registered_extension(name)))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  setup_handler_for_extension
    //
    //  Binds the named profile.  Merging applies only to extensions with a
    //  foreign handler: their existing values plus the profile's become the
    //  custom profile named after the extension.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn setup_handler_for_extension(&mut self, ext_name: &str, profile_name: &str, merge: bool) -> Result<bool, AppError> {
        let selected = self
            .get_profile_by_name(profile_name)
            .cloned()
            .ok_or_else(|| AppError::invalid_parameter(usage::not_a_profile(profile_name)))?;

        self.setup_with_profile(ext_name, selected, merge)
    }





    fn setup_with_profile(&mut self, ext_name: &str, selected: Profile, merge: bool) -> Result<bool, AppError> {
        let i = self.extension_index(ext_name)?;
        let (reg, host) = (self.reg, self.host);

        let ext = &mut self.extensions[i];

        let stored = if merge && ext.state() == HandlerState::Foreign {
            let mut custom = self
                .custom
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(&ext.name))
                .cloned()
                .unwrap_or_else(|| Profile::new(ext.name.clone()));

            if !ext.setup_handler_for_extension(reg, host, &selected, Some(&mut custom))? {
                return Ok(false);
            }
            custom
        } else {
            if !ext.setup_handler_for_extension(reg, host, &selected, None)? {
                return Ok(false);
            }
            selected
        };

        if !stored.is_read_only {
            self.store_updated_profile(stored)?;
        }

        self.sort_extensions();
        Ok(true)
    }





    pub fn remove_handler_from_extension(&mut self, ext_name: &str) -> Result<bool, AppError> {
        let i = self.extension_index(ext_name)?;
        let removed = self.extensions[i].remove_handler_from_extension(self.reg, self.host)?;

        if removed {
            self.sort_extensions();
        }
        Ok(removed)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  store_updated_profile
    //
    //  Adds or replaces a custom profile by name, ignoring case, and saves
    //  the store.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn store_updated_profile(&mut self, profile: Profile) -> Result<(), AppError> {
        match self.custom.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&profile.name)) {
            Some(existing) => existing.update_from(&profile),
            None => self.custom.push(profile),
        }
        self.save()
    }





    pub fn save(&self) -> Result<(), AppError> {
        match &self.store_path {
            Some(path) => SavedState { custom_profiles: self.custom.clone() }.save(path),
            None => {
                log::debug!("No saved-state path; {} custom profiles kept in memory", self.custom.len());
                Ok(())
            }
        }
    }





    fn custom_index(&self, name: &str) -> Result<usize, AppError> {
        if self.builtin.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(AppError::invalid_parameter(usage::builtin_profile_read_only(name)));
        }

        self.custom
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::invalid_parameter(usage::not_a_profile(name)))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  add_custom_profile
    //
    //  Adds a new editable profile; names must be unique ignoring case.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn add_custom_profile(&mut self, profile: Profile) -> Result<(), AppError> {
        if self.get_profile_by_name(&profile.name).is_some() {
            return Err(AppError::invalid_parameter(usage::profile_already_exists(&profile.name)));
        }

        let mut profile = profile;
        profile.is_read_only = false;
        self.custom.push(profile);
        self.save()
    }





    /// First "New Profile" name not already taken.
    pub fn next_new_profile_name(&self) -> String {
        (1..)
            .map(Profile::new_name)
            .find(|name| self.get_profile_by_name(name).is_none())
            .unwrap_or_else(|| Profile::new_name(1))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  delete_custom_profile
    //
    //  Built-ins and profiles bound to any extension cannot be deleted.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn delete_custom_profile(&mut self, name: &str) -> Result<(), AppError> {
        let i = self.custom_index(name)?;
        let profile_name = self.custom[i].name.clone();

        if self.extensions.iter().any(|e| e.profile.as_deref() == Some(profile_name.as_str())) {
            return Err(AppError::invalid_parameter(usage::cannot_delete_profile(&profile_name)));
        }

        self.custom.remove(i);
        self.save()
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  apply_profile_edit
    //
    //  Replaces the custom profile `original_name` with `edited` when they
    //  differ, rewrites the registry entries of every extension bound to
    //  it, and returns those extensions' names.  The profile of record
    //  changes only after every rewrite succeeded.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn apply_profile_edit(&mut self, original_name: &str, edited: &Profile) -> Result<Vec<String>, AppError> {
        let i = self.custom_index(original_name)?;
        let original = self.custom[i].name.clone();

        if !edited.name.eq_ignore_ascii_case(&original) && self.get_profile_by_name(&edited.name).is_some() {
            return Err(AppError::invalid_parameter(usage::profile_already_exists(&edited.name)));
        }

        if !self.custom[i].differs_from(edited) {
            return Ok(Vec::new());
        }

        let mut updated = self.custom[i].clone();
        updated.update_from(edited);

        let mut impacted = Vec::new();
        for ext in &mut self.extensions {
            if ext.profile.as_deref() != Some(original.as_str()) {
                continue;
            }

            if !ext.update_profile_settings_for_extension(self.reg, self.host, &updated)? {
                return Err(admin_privileges_needed());
            }
            impacted.push(ext.name.clone());
        }

        self.custom[i] = updated;
        self.save()?;
        Ok(impacted)
    }





    /// Renames a custom profile, rewriting extensions bound to it.
    pub fn rename_custom_profile(&mut self, old_name: &str, new_name: &str) -> Result<Vec<String>, AppError> {
        let i = self.custom_index(old_name)?;

        let mut edited = self.custom[i].clone();
        edited.name = new_name.to_string();
        self.apply_profile_edit(old_name, &edited)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  refresh_outdated_extensions
    //
    //  Re-applies the bound profile of every extension written in an older
    //  layout.  Returns how many were refreshed.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn refresh_outdated_extensions(&mut self) -> Result<usize, AppError> {
        let mut outdated: Vec<(String, Profile)> = Vec::new();

        for ext in self.extensions.iter().filter(|e| e.state().is_ours()) {
            if !ext.is_refresh_required(self.reg, self.host)? {
                continue;
            }

            let profile = match ext.profile.as_deref().and_then(|p| self.get_profile_by_name(p)) {
                Some(p) => p.clone(),
                None => ext.get_default_custom_profile(self.reg)?,
            };
            outdated.push((ext.name.clone(), profile));
        }

        for (name, profile) in &outdated {
            log::info!("Refreshing {} with profile '{}'", name, profile.name);

            if !self.remove_handler_from_extension(name)? || !self.setup_with_profile(name, profile.clone(), true)? {
                return Err(admin_privileges_needed());
            }
        }

        Ok(outdated.len())
    }
}





#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::system_file_associations_path;
    use crate::host::*;
    use crate::registry::MemoryRegistry;

    const OTHER_GUID: &str = "{a38b883c-1682-497e-97b0-0a3a9e801682}";

    fn registry_with(extensions: &[&str]) -> MemoryRegistry {
        let reg = MemoryRegistry::new();
        for ext in extensions {
            reg.create_key(Hive::ClassesRoot, ext).unwrap();
        }
        reg
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  populate_classifies_and_sorts
    //
    //  Verifies handler states are read and ours sort before foreign,
    //  which sort before the rest.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn populate_classifies_and_sorts() {
        let reg = registry_with(&[".zzz", ".aaa", ".mmm", ".ccc", "txtfile"]);
        reg.set_string(Hive::LocalMachine, &handler_key_path(".mmm"), "", OTHER_GUID).unwrap();
        reg.set_string(Hive::LocalMachine, &handler_key_path(".zzz"), "", OUR_PROPERTY_HANDLER_GUID64).unwrap();
        reg.set_string(Hive::LocalMachine, &handler_key_path(".nosuch"), "", OTHER_GUID).unwrap();
        reg.set_string(Hive::LocalMachine, &system_file_associations_path(".ccc"), CUSTOM_PROFILE_VALUE, "x").unwrap();

        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();

        let names: Vec<&str> = state.extensions().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, [".zzz", ".mmm", ".aaa", ".ccc"]);
        assert_eq!(state.get_extension_by_name(".ZZZ").unwrap().state(), HandlerState::Ours);
        assert_eq!(state.get_extension_by_name(".ccc").unwrap().state(), HandlerState::ProfileOnly);
        assert!(state.get_extension_by_name(".nosuch").is_none());
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  classify_selection_rules
    //
    //  Verifies uniform selections classify by state and anything else is
    //  Other.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn classify_selection_rules() {
        let reg = registry_with(&[".a", ".b", ".c", ".d"]);
        let key = |e: &str| handler_key_path(e);
        reg.set_string(Hive::LocalMachine, &key(".a"), "", OUR_PROPERTY_HANDLER_GUID64).unwrap();
        reg.set_string(Hive::LocalMachine, &key(".b"), "", OUR_PROPERTY_HANDLER_GUID64).unwrap();
        reg.set_string(Hive::LocalMachine, &key(".b"), CHAINED_VALUE, OTHER_GUID).unwrap();
        reg.set_string(Hive::LocalMachine, &key(".c"), "", OTHER_GUID).unwrap();

        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();

        assert_eq!(state.classify_selection(&[".a", ".b"]), HandlerSet::Ours);
        assert_eq!(state.classify_selection(&[".c"]), HandlerSet::Foreign);
        assert_eq!(state.classify_selection(&[".d"]), HandlerSet::None);
        assert_eq!(state.classify_selection(&[".a", ".c"]), HandlerSet::Other);
        assert_eq!(state.classify_selection(&[]), HandlerSet::Other);

        assert!(HandlerSet::Foreign.can_add());
        assert!(!HandlerSet::Ours.can_add());
        assert!(HandlerSet::Ours.can_remove());
        assert!(!HandlerSet::Other.can_remove());
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  merge_creates_extension_profile
    //
    //  Verifies a merged add against a foreign handler stores a custom
    //  profile named after the extension, and that the store reloads it
    //  as the extension's profile.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn merge_creates_extension_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("SavedState.xml");

        let reg = registry_with(&[".fmx"]);
        reg.set_string(Hive::LocalMachine, &handler_key_path(".fmx"), "", OTHER_GUID).unwrap();
        reg.set_string(Hive::LocalMachine, &system_file_associations_path(".fmx"), INFO_TIP_VALUE, "prop:System.Size").unwrap();

        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, Some(store.clone()));
        state.populate(None).unwrap();

        assert!(state.setup_handler_for_extension(".fmx", "simple", true).unwrap());
        let ext = state.get_extension_by_name(".fmx").unwrap();
        assert_eq!(ext.state(), HandlerState::Chained);
        assert_eq!(ext.profile.as_deref(), Some(".fmx"));
        assert_eq!(
            state.get_profile_by_name(".fmx").unwrap().info_tip_string(),
            "prop:System.Size;System.ItemTypeText;System.DateModified;System.Comment"
        );

        let mut reloaded = State::new(&reg, &host, Some(store));
        reloaded.populate(None).unwrap();
        assert_eq!(reloaded.get_extension_by_name(".fmx").unwrap().profile.as_deref(), Some(".fmx"));
    }





    #[test]
    fn merge_reuses_profile_named_in_other_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("SavedState.xml");

        let reg = registry_with(&[".bmp"]);
        reg.set_string(Hive::LocalMachine, &handler_key_path(".bmp"), "", OTHER_GUID).unwrap();

        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, Some(store.clone()));
        state.populate(None).unwrap();
        state.add_custom_profile(Profile::from_strings(".BMP", "", "", "prop:System.Title")).unwrap();

        assert!(state.setup_handler_for_extension(".bmp", "Simple", true).unwrap());

        let names: Vec<&str> = state.custom_profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, [".BMP"]);
        assert_eq!(state.get_extension_by_name(".bmp").unwrap().profile.as_deref(), Some(".BMP"));
        assert_eq!(SavedState::load(&store).unwrap().custom_profiles.len(), 1);
    }





    #[test]
    fn unknown_profile_and_extension_are_rejected() {
        let reg = registry_with(&[".fmx"]);
        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();

        let err = state.setup_handler_for_extension(".fmx", "nosuch", false).unwrap_err();
        assert_eq!(err.to_string(), usage::not_a_profile("nosuch"));

        let err = state.remove_handler_from_extension(".nope").unwrap_err();
        assert_eq!(err.exit_code(), 87);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  custom_profile_lifecycle
    //
    //  Verifies add, duplicate rejection, in-use protection, rename with
    //  registry rewrite, and deletion.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn custom_profile_lifecycle() {
        let reg = registry_with(&[".fmx"]);
        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();

        let name = state.next_new_profile_name();
        assert_eq!(name, "New Profile");
        state.add_custom_profile(Profile::from_strings(&name, "", "prop:System.Title", "")).unwrap();
        assert_eq!(state.next_new_profile_name(), "New Profile (2)");

        let err = state.add_custom_profile(Profile::new("new profile")).unwrap_err();
        assert_eq!(err.to_string(), usage::profile_already_exists("new profile"));

        state.setup_handler_for_extension(".fmx", &name, false).unwrap();
        let err = state.delete_custom_profile(&name).unwrap_err();
        assert_eq!(err.to_string(), usage::cannot_delete_profile(&name));

        let impacted = state.rename_custom_profile(&name, "Titles").unwrap();
        assert_eq!(impacted, [".fmx"]);
        assert_eq!(state.get_extension_by_name(".fmx").unwrap().profile.as_deref(), Some("Titles"));
        assert_eq!(
            reg.get_string(Hive::LocalMachine, &system_file_associations_path(".fmx"), CUSTOM_PROFILE_VALUE).unwrap().as_deref(),
            Some("Titles")
        );

        assert!(state.delete_custom_profile("Simple").is_err());

        state.remove_handler_from_extension(".fmx").unwrap();
        state.delete_custom_profile("titles").unwrap();
        assert!(state.get_profile_by_name("Titles").is_none());
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  edit_rewrites_bound_extensions
    //
    //  Verifies an edit reaches the registry and an unchanged edit is a
    //  no-op.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn edit_rewrites_bound_extensions() {
        let reg = registry_with(&[".fmx", ".fmy"]);
        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();

        state.add_custom_profile(Profile::from_strings("mine", "prop:System.PropGroup.Description;System.Title", "", "")).unwrap();
        state.setup_handler_for_extension(".fmx", "mine", false).unwrap();

        let unchanged = state.get_profile_by_name("mine").unwrap().clone();
        assert!(state.apply_profile_edit("mine", &unchanged).unwrap().is_empty());

        let mut edited = unchanged.clone();
        edited.add_preview_details_property("System.Title");
        assert_eq!(state.apply_profile_edit("mine", &edited).unwrap(), [".fmx"]);
        assert_eq!(
            reg.get_string(Hive::LocalMachine, &system_file_associations_path(".fmx"), PREVIEW_DETAILS_VALUE).unwrap().as_deref(),
            Some("prop:System.Title")
        );
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  failed_edit_keeps_profile_of_record
    //
    //  Verifies an edit that cannot reach the registry leaves the stored
    //  profile as it was.
    //
    ////////////////////////////////////////////////////////////////////////////

    #[test]
    fn failed_edit_keeps_profile_of_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("SavedState.xml");

        let reg = registry_with(&[".fmx"]);
        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, Some(store.clone()));
        state.populate(None).unwrap();
        state.add_custom_profile(Profile::from_strings("mine", "", "prop:System.Title", "")).unwrap();
        state.setup_handler_for_extension(".fmx", "mine", false).unwrap();

        let mut limited = HostContext::with_layout(true);
        limited.elevated = false;
        let mut state = State::new(&reg, &limited, Some(store.clone()));
        state.populate(None).unwrap();

        let before = state.get_profile_by_name("mine").unwrap().clone();
        let mut edited = before.clone();
        edited.add_preview_details_property("System.Comment");

        let err = state.apply_profile_edit("mine", &edited).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(state.get_profile_by_name("mine").unwrap(), &before);
        assert_eq!(SavedState::load(&store).unwrap().custom_profiles, [before]);
    }





    #[test]
    fn refresh_rewrites_legacy_layout() {
        let reg = registry_with(&[".fmx"]);
        let host = HostContext::with_layout(true);
        let mut state = State::new(&reg, &host, None);
        state.populate(None).unwrap();
        state.setup_handler_for_extension(".fmx", "Simple", false).unwrap();
        assert_eq!(state.refresh_outdated_extensions().unwrap(), 0);

        reg.delete_key_tree(Hive::LocalMachine32, &handler_key_path(".fmx")).unwrap();
        assert_eq!(state.refresh_outdated_extensions().unwrap(), 1);
        assert_eq!(
            reg.get_string(Hive::LocalMachine32, &handler_key_path(".fmx"), "").unwrap().as_deref(),
            Some(OUR_PROPERTY_HANDLER_GUID32)
        );
        assert_eq!(state.get_extension_by_name(".fmx").unwrap().state(), HandlerState::Ours);
    }
}
