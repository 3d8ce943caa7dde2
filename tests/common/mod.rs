// tests/common/mod.rs — Shared registry snapshots and CLI driver
//
// The snapshots describe what successive releases of the handler wrote for
// one test extension on a 64-bit host.  invoke() runs the command line
// against an in-memory registry exactly as main would, returning the exit
// code.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use filemeta_assoc::command_line::CommandLine;
use filemeta_assoc::commands;
use filemeta_assoc::config::Config;
use filemeta_assoc::ehm::AppError;
use filemeta_assoc::host::*;
use filemeta_assoc::profile::Profile;
use filemeta_assoc::reg_state::{LocationState, RegState};
use filemeta_assoc::registry::MemoryRegistry;
use filemeta_assoc::saved_state::SavedState;

pub const TEST_EXT: &str = ".FMfoo";

pub const OTHER_GUID: &str = "{a38b883c-1682-497e-97b0-0a3a9e801682}";

pub const FULL_DETAILS_SIMPLE:    &str = "prop:System.PropGroup.Description;System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.PropGroup.Origin;System.Author;System.Document.RevisionNumber";
pub const PREVIEW_DETAILS_SIMPLE: &str = "prop:System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.Author;System.Document.RevisionNumber";
pub const INFO_TIP_SIMPLE:        &str = "prop:System.ItemTypeText;System.Size;System.DateModified;System.Comment";

pub const FULL_DETAILS_TEST:      &str = FULL_DETAILS_SIMPLE;
pub const PREVIEW_DETAILS_TEST:   &str = PREVIEW_DETAILS_SIMPLE;
pub const INFO_TIP_TEST:          &str = "prop:System.Comment;System.Rating";

pub const FULL_DETAILS_BMP:       &str = "prop:System.PropGroup.Image;System.Image.Dimensions;System.Image.HorizontalSize;System.Image.VerticalSize;System.Image.BitDepth;System.PropGroup.FileSystem;System.ItemNameDisplay;System.ItemType;System.ItemFolderPathDisplay;System.DateCreated;System.DateModified;System.Size;System.FileAttributes;System.OfflineAvailability;System.OfflineStatus;System.SharedWith;System.FileOwner;System.ComputerName;System.PropGroup.Description;System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.PropGroup.Origin;System.Author;System.Document.RevisionNumber";
pub const PREVIEW_DETAILS_BMP:    &str = "prop:*System.DateModified;*System.Image.Dimensions;*System.Size;*System.OfflineAvailability;*System.OfflineStatus;*System.DateCreated;*System.SharedWith;System.Title;System.Subject;System.Keywords;System.Category;System.Comment;System.Rating;System.Author;System.Document.RevisionNumber";
pub const INFO_TIP_BMP:           &str = "prop:System.ItemType;*System.DateModified;*System.Image.Dimensions;*System.Size;System.ItemTypeText;System.Comment";

pub const FULL_DETAILS_TINY:      &str = "prop:System.PropGroup.Description;System.Title;System.Comment;System.PropGroup.Origin;System.Author";
pub const PREVIEW_DETAILS_TINY:   &str = "prop:System.Comment;System.Author";
pub const INFO_TIP_TINY:          &str = "prop:System.Comment";





fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}



fn display(full: &str, preview: &str, info_tip: &str) -> LocationState {
    LocationState {
        full_details:    s(full),
        preview_details: s(preview),
        info_tip:        s(info_tip),
        ..Default::default()
    }
}



fn hidden(full: &str, preview: &str, info_tip: &str) -> LocationState {
    LocationState {
        old_full_details:    s(full),
        old_preview_details: s(preview),
        old_info_tip:        s(info_tip),
        ..Default::default()
    }
}



fn simple() -> LocationState {
    display(FULL_DETAILS_SIMPLE, PREVIEW_DETAILS_SIMPLE, INFO_TIP_SIMPLE)
}



fn with_profile(mut location: LocationState, name: &str) -> LocationState {
    location.custom_profile = s(name);
    location
}



fn with_context_menu(mut location: LocationState) -> LocationState {
    location.context_menu_handler = s(OUR_CONTEXT_HANDLER_GUID64);
    location
}





////////////////////////////////////////////////////////////////////////////////
//
//  Version 1.3: values on both the ProgID key and SystemFileAssociations,
//  no 32-bit handler.
//
////////////////////////////////////////////////////////////////////////////////

pub fn v13_builtin() -> RegState {
    let mut clsid = with_context_menu(simple());
    clsid.info_tip = None;
    let mut system = with_context_menu(simple());
    system.info_tip = None;

    RegState {
        clsid,
        system,
        property_handler: s(OUR_PROPERTY_HANDLER_GUID64),
        ..Default::default()
    }
}



pub fn v13_custom_test() -> RegState {
    let location = || LocationState {
        full_details:    s(FULL_DETAILS_TEST),
        preview_details: s(PREVIEW_DETAILS_TEST),
        custom_profile:  s("test"),
        ..Default::default()
    };

    RegState {
        clsid:            location(),
        system:           location(),
        property_handler: s(OUR_PROPERTY_HANDLER_GUID64),
        ..Default::default()
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  Version 1.4: SystemFileAssociations only, no 32-bit handler.
//
////////////////////////////////////////////////////////////////////////////////

pub fn v14_builtin() -> RegState {
    RegState {
        system:           with_context_menu(simple()),
        property_handler: s(OUR_PROPERTY_HANDLER_GUID64),
        ..Default::default()
    }
}



pub fn v14_custom_test() -> RegState {
    RegState {
        system:           with_context_menu(with_profile(display(FULL_DETAILS_TEST, PREVIEW_DETAILS_TEST, INFO_TIP_TEST), "test")),
        property_handler: s(OUR_PROPERTY_HANDLER_GUID64),
        ..Default::default()
    }
}



pub fn v14_extended_bmp() -> RegState {
    let mut system = with_context_menu(with_profile(display(FULL_DETAILS_BMP, PREVIEW_DETAILS_BMP, INFO_TIP_BMP), ".bmp"));
    system.old_full_details    = s(FULL_DETAILS_SIMPLE);
    system.old_preview_details = s(PREVIEW_DETAILS_SIMPLE);
    system.old_info_tip        = s(INFO_TIP_SIMPLE);

    RegState {
        system,
        property_handler:         s(OUR_PROPERTY_HANDLER_GUID64),
        chained_property_handler: s(OTHER_GUID),
        ..Default::default()
    }
}



pub fn v14_unextended() -> RegState {
    RegState {
        system:           simple(),
        property_handler: s(OTHER_GUID),
        ..Default::default()
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  Version 1.5: SystemFileAssociations plus the 32-bit handler.
//
////////////////////////////////////////////////////////////////////////////////

pub fn v15_builtin() -> RegState {
    RegState {
        system:             with_context_menu(simple()),
        property_handler:   s(OUR_PROPERTY_HANDLER_GUID64),
        property_handler32: s(OUR_PROPERTY_HANDLER_GUID32),
        ..Default::default()
    }
}



fn custom_test_system() -> LocationState {
    with_context_menu(with_profile(display(FULL_DETAILS_TEST, PREVIEW_DETAILS_TEST, INFO_TIP_TEST), "test"))
}



pub fn v15_custom_test() -> RegState {
    RegState {
        system:             custom_test_system(),
        property_handler:   s(OUR_PROPERTY_HANDLER_GUID64),
        property_handler32: s(OUR_PROPERTY_HANDLER_GUID32),
        ..Default::default()
    }
}



/// Only a foreign 32-bit handler.
pub fn v15_initial_other32() -> RegState {
    RegState {
        property_handler32: s(OTHER_GUID),
        ..Default::default()
    }
}



/// Only a foreign 64-bit handler.
pub fn v15_initial_other64() -> RegState {
    RegState {
        property_handler: s(OTHER_GUID),
        ..Default::default()
    }
}



pub fn v15_custom_test_other32() -> RegState {
    RegState {
        system:             custom_test_system(),
        property_handler:   s(OUR_PROPERTY_HANDLER_GUID64),
        property_handler32: s(OTHER_GUID),
        ..Default::default()
    }
}



pub fn v15_custom_test_other64() -> RegState {
    RegState {
        system:                   custom_test_system(),
        property_handler:         s(OUR_PROPERTY_HANDLER_GUID64),
        chained_property_handler: s(OTHER_GUID),
        property_handler32:       s(OUR_PROPERTY_HANDLER_GUID32),
        ..Default::default()
    }
}



fn extended_bmp(clsid: LocationState, system_old: LocationState) -> RegState {
    let mut system = with_context_menu(with_profile(display(FULL_DETAILS_BMP, PREVIEW_DETAILS_BMP, INFO_TIP_BMP), ".bmp"));
    system.old_full_details    = system_old.old_full_details;
    system.old_preview_details = system_old.old_preview_details;
    system.old_info_tip        = system_old.old_info_tip;

    RegState {
        clsid,
        system,
        property_handler:           s(OUR_PROPERTY_HANDLER_GUID64),
        chained_property_handler:   s(OTHER_GUID),
        property_handler32:         s(OUR_PROPERTY_HANDLER_GUID32),
        chained_property_handler32: s(OTHER_GUID),
    }
}



fn unextended(clsid: LocationState, system: LocationState) -> RegState {
    RegState {
        clsid,
        system,
        property_handler:   s(OTHER_GUID),
        property_handler32: s(OTHER_GUID),
        ..Default::default()
    }
}



pub fn v15_extended_bmp() -> RegState {
    let old = hidden(FULL_DETAILS_SIMPLE, PREVIEW_DETAILS_SIMPLE, INFO_TIP_SIMPLE);
    extended_bmp(LocationState::default(), old)
}



pub fn v15_unextended() -> RegState {
    unextended(LocationState::default(), simple())
}



pub fn v15_extended_bmp_clsid() -> RegState {
    let old = hidden(FULL_DETAILS_SIMPLE, PREVIEW_DETAILS_SIMPLE, INFO_TIP_SIMPLE);
    extended_bmp(old, LocationState::default())
}



pub fn v15_unextended_clsid() -> RegState {
    unextended(simple(), LocationState::default())
}



pub fn v15_extended_bmp_both() -> RegState {
    let old = || hidden(FULL_DETAILS_SIMPLE, PREVIEW_DETAILS_SIMPLE, INFO_TIP_SIMPLE);
    extended_bmp(old(), old())
}



pub fn v15_unextended_both() -> RegState {
    unextended(simple(), simple())
}





////////////////////////////////////////////////////////////////////////////////
//
//  The "tiny" profile merged into an extension with a foreign handler.
//
////////////////////////////////////////////////////////////////////////////////

const FULL_DETAILS_BEFORE_TINY:    &str = "prop:System.PropGroup.Description;System.Subject;System.Keywords;System.PropGroup.Content;System.ContentStatus";
const PREVIEW_DETAILS_BEFORE_TINY: &str = "prop:System.Description;System.ContentStatus";
const INFO_TIP_BEFORE_TINY:        &str = "prop:System.Description";

pub fn v15_unextended_tiny() -> RegState {
    unextended(
        LocationState::default(),
        display(FULL_DETAILS_BEFORE_TINY, PREVIEW_DETAILS_BEFORE_TINY, INFO_TIP_BEFORE_TINY),
    )
}



pub fn v15_extended_tiny() -> RegState {
    let mut system = with_context_menu(with_profile(
        display(
            "prop:System.PropGroup.Description;System.Subject;System.Keywords;System.Title;System.Comment;System.PropGroup.Content;System.ContentStatus;System.PropGroup.Origin;System.Author",
            "prop:System.Description;System.ContentStatus;System.Comment;System.Author",
            "prop:System.Description;System.Comment",
        ),
        TEST_EXT,
    ));
    let old = hidden(FULL_DETAILS_BEFORE_TINY, PREVIEW_DETAILS_BEFORE_TINY, INFO_TIP_BEFORE_TINY);
    system.old_full_details    = old.old_full_details;
    system.old_preview_details = old.old_preview_details;
    system.old_info_tip        = old.old_info_tip;

    RegState {
        system,
        property_handler:           s(OUR_PROPERTY_HANDLER_GUID64),
        chained_property_handler:   s(OTHER_GUID),
        property_handler32:         s(OUR_PROPERTY_HANDLER_GUID32),
        chained_property_handler32: s(OTHER_GUID),
        ..Default::default()
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  Harness
//
////////////////////////////////////////////////////////////////////////////////

/// A 64-bit registry plus a scratch directory holding the profile store
/// and a definitions file with the "test", ".bmp" and "tiny" profiles.
pub struct Harness {
    pub reg:         MemoryRegistry,
    pub host:        HostContext,
    pub config:      Config,
    pub definitions: PathBuf,
    _dir:            tempfile::TempDir,
}



impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let definitions = dir.path().join("SavedState.xml");

        SavedState {
            custom_profiles: vec![
                Profile::from_strings("test", FULL_DETAILS_TEST, PREVIEW_DETAILS_TEST, INFO_TIP_TEST),
                Profile::from_strings(".bmp", FULL_DETAILS_BMP, PREVIEW_DETAILS_BMP, INFO_TIP_BMP),
                Profile::from_strings("tiny", FULL_DETAILS_TINY, PREVIEW_DETAILS_TINY, INFO_TIP_TINY),
            ],
        }
        .save(&definitions)
        .unwrap();

        let mut config = Config::new();
        config.definitions = Some(dir.path().join("FileMeta").join("Store.xml"));

        Harness {
            reg: MemoryRegistry::new(),
            host: HostContext::with_layout(true),
            config,
            definitions,
            _dir: dir,
        }
    }



    pub fn store_path(&self) -> &Path {
        self.config.definitions.as_deref().unwrap()
    }



    pub fn zap(&self, state: &RegState) {
        state.zap(&self.reg, &self.host, TEST_EXT).unwrap();
    }



    pub fn read(&self) -> RegState {
        RegState::read(&self.reg, &self.host, TEST_EXT).unwrap()
    }



    /// Runs the command line, with "{defs}" replaced by the definitions
    /// file path.  Returns the exit code and what was printed.
    pub fn invoke(&self, args: &str) -> (i32, String) {
        let defs = self.definitions.to_string_lossy();
        let args: Vec<String> = args.split_whitespace().map(|a| a.replace("{defs}", &defs)).collect();

        let mut out = Vec::new();
        let result = CommandLine::parse_from(&args).and_then(|mut cmd| {
            cmd.apply_config_defaults(&self.config);
            commands::execute(&cmd, &self.config, &self.reg, &self.host, &mut out)
        });

        let code = result.as_ref().map_or_else(AppError::exit_code, |_| 0);
        (code, String::from_utf8(out).unwrap())
    }
}
