// property_list.rs — Flat property lists (PreviewDetails, InfoTip)
//
// A list is a "prop:"-prefixed, ';'-delimited sequence of canonical
// property names.  A leading '*' on an entry marks it as excluded from
// the preview pane.

/// Registry string prefix shared by all three profile strings.
pub const PROP_PREFIX: &str = "prop:";

/// List separator.
pub const SEPARATOR: char = ';';





/// One property in a PreviewDetails or InfoTip list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyListEntry {
    pub name:     String,
    pub asterisk: bool,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl PropertyListEntry
//
//  Construction from, and projection to, the registry token form.
//
////////////////////////////////////////////////////////////////////////////////

impl PropertyListEntry {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  new
    //
    //  Builds an entry from a registry token, splitting off a leading '*'.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn new(name_string: &str) -> Self {
        match name_string.strip_prefix('*') {
            Some(rest) => PropertyListEntry { name: rest.to_string(), asterisk: true },
            None       => PropertyListEntry { name: name_string.to_string(), asterisk: false },
        }
    }





    /// The registry token: the name, with '*' prepended when flagged.
    pub fn name_string(&self) -> String {
        if self.asterisk {
            format!("*{}", self.name)
        } else {
            self.name.clone()
        }
    }





    pub fn toggle_asterisk(&mut self) {
        self.asterisk = !self.asterisk;
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  strip_prop_prefix
//
//  Removes an optional leading "prop:" from a registry string.
//
////////////////////////////////////////////////////////////////////////////////

pub fn strip_prop_prefix(s: &str) -> &str {
    s.strip_prefix(PROP_PREFIX).unwrap_or(s)
}





////////////////////////////////////////////////////////////////////////////////
//
//  tokens
//
//  Splits a registry string into its non-empty tokens.
//
////////////////////////////////////////////////////////////////////////////////

pub fn tokens(s: &str) -> impl Iterator<Item = &str> {
    strip_prop_prefix(s)
        .split(SEPARATOR)
        .filter(|t| !t.is_empty())
}





////////////////////////////////////////////////////////////////////////////////
//
//  bare_name
//
//  A property name with any leading '*' removed, for name comparison.
//
////////////////////////////////////////////////////////////////////////////////

pub fn bare_name(name: &str) -> &str {
    name.strip_prefix('*').unwrap_or(name)
}





////////////////////////////////////////////////////////////////////////////////
//
//  parse_properties_string
//
//  Parses a flat list.  Empty tokens are skipped.
//
////////////////////////////////////////////////////////////////////////////////

pub fn parse_properties_string(s: &str) -> Vec<PropertyListEntry> {
    tokens(s).map(PropertyListEntry::new).collect()
}





////////////////////////////////////////////////////////////////////////////////
//
//  get_properties_string
//
//  Serializes a flat list with the "prop:" prefix and no trailing ';'.
//
////////////////////////////////////////////////////////////////////////////////

pub fn get_properties_string(entries: &[PropertyListEntry]) -> String {
    let body: Vec<String> = entries.iter().map(PropertyListEntry::name_string).collect();
    format!("{}{}", PROP_PREFIX, body.join(";"))
}





////////////////////////////////////////////////////////////////////////////////
//
//  contains_property
//
//  True if the list holds the named property, ignoring asterisks.
//
////////////////////////////////////////////////////////////////////////////////

pub fn contains_property(entries: &[PropertyListEntry], name: &str) -> bool {
    let wanted = bare_name(name);
    entries.iter().any(|e| e.name == wanted)
}





////////////////////////////////////////////////////////////////////////////////
//
//  merge_lists
//
//  Appends entries of `other` whose names are not already in `local`.
//
////////////////////////////////////////////////////////////////////////////////

pub fn merge_lists(local: &mut Vec<PropertyListEntry>, other: &[PropertyListEntry]) {
    for entry in other {
        if !contains_property(local, &entry.name) {
            local.push(entry.clone());
        }
    }
}
