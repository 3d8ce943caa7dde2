// tree_item.rs — Two-level FullDetails tree (group → properties)

use crate::property_list::bare_name;

/// Prefix of the three-part token that opens a property group.
pub const PROP_GROUP_PREFIX: &str = "System.PropGroup.";





/// A FullDetails node: a group owning an ordered list of property leaves.
/// Leaves use the same type with no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub name:     String,
    pub children: Vec<TreeItem>,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl TreeItem
//
//  Child management for FullDetails groups.
//
////////////////////////////////////////////////////////////////////////////////

impl TreeItem {
    pub fn new(name: impl Into<String>) -> Self {
        TreeItem { name: name.into(), children: Vec::new() }
    }



    pub fn add_child(&mut self, child: TreeItem) {
        self.children.push(child);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  insert_child
    //
    //  Inserts at `index`, clamped to the end of the list.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn insert_child(&mut self, index: usize, child: TreeItem) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  remove_child
    //
    //  Removes the named child, ignoring asterisks.  Returns true if found.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn remove_child(&mut self, name: &str) -> bool {
        let wanted = bare_name(name);
        let before = self.children.len();
        self.children.retain(|c| bare_name(&c.name) != wanted);
        self.children.len() != before
    }





    /// True if a child of this name exists, ignoring asterisks.
    pub fn has_child(&self, name: &str) -> bool {
        let wanted = bare_name(name);
        self.children.iter().any(|c| bare_name(&c.name) == wanted)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  group_token
    //
    //  The registry token for this node when it is a group.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn group_token(&self) -> String {
        format!("{}{}", PROP_GROUP_PREFIX, self.name)
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  group_name_of
//
//  If `token` is exactly System.PropGroup.<name>, returns <name>.
//
////////////////////////////////////////////////////////////////////////////////

pub fn group_name_of(token: &str) -> Option<&str> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() == 3 && parts[0] == "System" && parts[1] == "PropGroup" {
        Some(parts[2])
    } else {
        None
    }
}
