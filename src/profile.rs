// profile.rs — Named property-display profiles
//
// A profile owns the three collections Explorer reads for an extension:
// the grouped FullDetails tree, and the flat PreviewDetails and InfoTip
// lists.  The registry strings are a projection of those collections.

use crate::property_list::{
    self, PropertyListEntry, bare_name, contains_property, get_properties_string,
    parse_properties_string,
};
use crate::tree_item::{TreeItem, group_name_of};





const FULL_DETAILS_OFFICE_PROFILE:    &str = "prop:System.PropGroup.Description;System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.PropGroup.Origin;System.Author;System.Document.LastAuthor;System.Document.RevisionNumber;System.Document.Version;System.ApplicationName;System.Company;System.Document.Manager;System.Document.DateCreated;System.Document.DateSaved;System.Document.DatePrinted;System.Document.TotalEditingTime;System.PropGroup.Content;System.ContentStatus;System.ContentType;System.Document.PageCount;System.Document.WordCount;System.Document.CharacterCount;System.Document.LineCount;System.Document.ParagraphCount;System.Document.Template;System.Document.Scale;System.Document.LinksDirty;System.Language;System.PropGroup.FileSystem;System.ItemNameDisplay;System.ItemType;System.ItemFolderPathDisplay;System.DateCreated;System.DateModified;System.Size;System.FileAttributes;System.OfflineAvailability;System.OfflineStatus;System.SharedWith;System.FileOwner;System.ComputerName";
const PREVIEW_DETAILS_OFFICE_PROFILE: &str = "prop:*System.DateModified;System.Author;System.Keywords;System.Rating;*System.Size;System.Title;System.Comment;System.Category;*System.Document.PageCount;System.ContentStatus;System.ContentType;*System.OfflineAvailability;*System.OfflineStatus;System.Subject;*System.DateCreated;*System.SharedWith";
const INFO_TIP_OFFICE_PROFILE:        &str = "prop:System.ItemTypeText;System.Size;System.DateModified;System.Document.PageCount";

const FULL_DETAILS_SIMPLE_PROFILE:    &str = "prop:System.PropGroup.Description;System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.PropGroup.Origin;System.Author;System.Document.RevisionNumber";
const PREVIEW_DETAILS_SIMPLE_PROFILE: &str = "prop:System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.Author;System.Document.RevisionNumber";
const INFO_TIP_SIMPLE_PROFILE:        &str = "prop:System.ItemTypeText;System.Size;System.DateModified;System.Comment";

pub const OFFICE_PROFILE_NAME: &str = "Office DSOfile";
pub const SIMPLE_PROFILE_NAME: &str = "Simple";

/// Base name for profiles created without an explicit name.
pub const NEW_PROFILE_NAME: &str = "New Profile";





#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name:            String,
    pub full_details:    Vec<TreeItem>,
    pub preview_details: Vec<PropertyListEntry>,
    pub info_tips:       Vec<PropertyListEntry>,
    pub is_read_only:    bool,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl Profile
//
//  String codec, merge/diff, and editing.
//
////////////////////////////////////////////////////////////////////////////////

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Profile { name: name.into(), ..Default::default() }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  from_strings
    //
    //  Builds a profile from its three registry strings.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn from_strings(name: impl Into<String>, full_details: &str, preview_details: &str, info_tip: &str) -> Self {
        let mut p = Profile::new(name);
        p.set_full_details_string(full_details);
        p.set_preview_details_string(preview_details);
        p.set_info_tip_string(info_tip);
        p
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  builtin_profiles
    //
    //  The two read-only profiles shipped with the tool.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn builtin_profiles() -> Vec<Profile> {
        let mut office = Profile::from_strings(
            OFFICE_PROFILE_NAME,
            FULL_DETAILS_OFFICE_PROFILE,
            PREVIEW_DETAILS_OFFICE_PROFILE,
            INFO_TIP_OFFICE_PROFILE,
        );
        office.is_read_only = true;

        let mut simple = Profile::from_strings(
            SIMPLE_PROFILE_NAME,
            FULL_DETAILS_SIMPLE_PROFILE,
            PREVIEW_DETAILS_SIMPLE_PROFILE,
            INFO_TIP_SIMPLE_PROFILE,
        );
        simple.is_read_only = true;

        vec![office, simple]
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  new_name
    //
    //  Candidate name for the index'th unnamed profile: "New Profile",
    //  then "New Profile (2)", "New Profile (3)", ...
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn new_name(index: usize) -> String {
        if index <= 1 {
            NEW_PROFILE_NAME.to_string()
        } else {
            format!("{} ({})", NEW_PROFILE_NAME, index)
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  set_full_details_string
    //
    //  Replaces the FullDetails tree from a registry string.  A token of the
    //  form System.PropGroup.<G> opens group <G>, or re-opens it if already
    //  present; other tokens append to the open group.  Tokens seen before
    //  any group are dropped.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn set_full_details_string(&mut self, s: &str) {
        let mut groups: Vec<TreeItem> = Vec::new();
        let mut current: Option<usize> = None;

        for token in property_list::tokens(s) {
            if let Some(group_name) = group_name_of(token) {
                current = match groups.iter().position(|g| g.name == group_name) {
                    Some(index) => Some(index),
                    None => {
                        groups.push(TreeItem::new(group_name));
                        Some(groups.len() - 1)
                    }
                };
                continue;
            }

            match current {
                Some(index) => groups[index].add_child(TreeItem::new(token)),
                None => log::debug!("Dropping ungrouped FullDetails property '{}'", token),
            }
        }

        self.full_details = groups;
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  full_details_string
    //
    //  Serializes the FullDetails tree, groups in insertion order.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn full_details_string(&self) -> String {
        let mut tokens: Vec<String> = Vec::new();

        for group in &self.full_details {
            tokens.push(group.group_token());
            tokens.extend(group.children.iter().map(|c| c.name.clone()));
        }

        format!("{}{}", property_list::PROP_PREFIX, tokens.join(";"))
    }





    pub fn set_preview_details_string(&mut self, s: &str) {
        self.preview_details = parse_properties_string(s);
    }



    pub fn preview_details_string(&self) -> String {
        get_properties_string(&self.preview_details)
    }



    pub fn set_info_tip_string(&mut self, s: &str) {
        self.info_tips = parse_properties_string(s);
    }



    pub fn info_tip_string(&self) -> String {
        get_properties_string(&self.info_tips)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  create_clone
    //
    //  Deep copy.  Clones are editable even when the source is built in.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn create_clone(&self) -> Profile {
        let mut p = self.clone();
        p.is_read_only = false;
        p
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  merge_from
    //
    //  Adds everything in `other` that this profile lacks.  Groups missing
    //  here are appended whole; existing groups gain only the properties
    //  they lack.  The flat lists keep local entries first, then append
    //  the new entries in other's order.  Names compare modulo '*'.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn merge_from(&mut self, other: &Profile) {
        for other_group in &other.full_details {
            match self.full_details.iter_mut().find(|g| g.name == other_group.name) {
                None => self.full_details.push(other_group.clone()),
                Some(local_group) => {
                    for child in &other_group.children {
                        if !local_group.has_child(&child.name) {
                            local_group.add_child(child.clone());
                        }
                    }
                }
            }
        }

        property_list::merge_lists(&mut self.preview_details, &other.preview_details);
        property_list::merge_lists(&mut self.info_tips, &other.info_tips);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  differs_from
    //
    //  True if the name or any of the three registry strings differ.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn differs_from(&self, other: &Profile) -> bool {
        self.name != other.name
            || self.full_details_string() != other.full_details_string()
            || self.preview_details_string() != other.preview_details_string()
            || self.info_tip_string() != other.info_tip_string()
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  update_from
    //
    //  Takes the name and collections of an edited copy, keeping this
    //  profile's read-only flag.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn update_from(&mut self, other: &Profile) {
        self.name            = other.name.clone();
        self.full_details    = other.full_details.clone();
        self.preview_details = other.preview_details.clone();
        self.info_tips       = other.info_tips.clone();
    }





    pub fn has_property_in_full_details(&self, name: &str) -> bool {
        self.full_details.iter().any(|g| g.has_child(name))
    }



    pub fn has_property_in_preview_details(&self, name: &str) -> bool {
        contains_property(&self.preview_details, name)
    }



    pub fn has_property_in_info_tip(&self, name: &str) -> bool {
        contains_property(&self.info_tips, name)
    }



    pub fn has_group(&self, group_name: &str) -> bool {
        self.full_details.iter().any(|g| g.name == group_name)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  add_group
    //
    //  Appends an empty group.  Returns false if it already exists.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn add_group(&mut self, group_name: &str) -> bool {
        if self.has_group(group_name) {
            return false;
        }

        self.full_details.push(TreeItem::new(group_name));
        true
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  add_full_details_property
    //
    //  Inserts a property into a group, creating the group if needed.  A
    //  property already elsewhere in the tree is moved.  `index` is clamped
    //  to the end of the group.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn add_full_details_property(&mut self, group_name: &str, name: &str, index: Option<usize>) {
        for group in &mut self.full_details {
            group.remove_child(name);
        }

        self.add_group(group_name);

        if let Some(group) = self.full_details.iter_mut().find(|g| g.name == group_name) {
            let child = TreeItem::new(bare_name(name));
            match index {
                Some(i) => group.insert_child(i, child),
                None => group.add_child(child),
            }
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  add_preview_details_property / add_info_tip_property
    //
    //  Append a list entry.  Return false if the name is already present.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn add_preview_details_property(&mut self, name_string: &str) -> bool {
        add_list_entry(&mut self.preview_details, name_string)
    }



    pub fn add_info_tip_property(&mut self, name_string: &str) -> bool {
        add_list_entry(&mut self.info_tips, name_string)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  remove_full_details_property
    //
    //  Removes a property from the tree and, by cascade, from both lists.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn remove_full_details_property(&mut self, name: &str) -> bool {
        let mut found = false;
        for group in &mut self.full_details {
            found |= group.remove_child(name);
        }

        self.remove_preview_details_property(name);
        self.remove_info_tip_property(name);
        found
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  remove_full_details_group
    //
    //  Removes a group and its properties, cascading each property to
    //  both lists.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn remove_full_details_group(&mut self, group_name: &str) -> bool {
        let Some(index) = self.full_details.iter().position(|g| g.name == group_name) else {
            return false;
        };

        let group = self.full_details.remove(index);
        for child in &group.children {
            self.remove_preview_details_property(&child.name);
            self.remove_info_tip_property(&child.name);
        }
        true
    }





    pub fn remove_preview_details_property(&mut self, name: &str) -> bool {
        remove_list_entry(&mut self.preview_details, name)
    }



    pub fn remove_info_tip_property(&mut self, name: &str) -> bool {
        remove_list_entry(&mut self.info_tips, name)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  toggle_preview_asterisk / toggle_info_tip_asterisk
    //
    //  Flip the "exclude from preview pane" marker of a list entry.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn toggle_preview_asterisk(&mut self, name: &str) -> bool {
        toggle_list_entry(&mut self.preview_details, name)
    }



    pub fn toggle_info_tip_asterisk(&mut self, name: &str) -> bool {
        toggle_list_entry(&mut self.info_tips, name)
    }
}





fn add_list_entry(list: &mut Vec<PropertyListEntry>, name_string: &str) -> bool {
    if contains_property(list, name_string) {
        return false;
    }

    list.push(PropertyListEntry::new(name_string));
    true
}



fn remove_list_entry(list: &mut Vec<PropertyListEntry>, name: &str) -> bool {
    let wanted = bare_name(name);
    let before = list.len();
    list.retain(|e| e.name != wanted);
    list.len() != before
}



fn toggle_list_entry(list: &mut [PropertyListEntry], name: &str) -> bool {
    let wanted = bare_name(name);
    match list.iter_mut().find(|e| e.name == wanted) {
        Some(entry) => {
            entry.toggle_asterisk();
            true
        }
        None => false,
    }
}
