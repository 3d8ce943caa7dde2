// host.rs — Facts about the host, computed once per run
//
// Whether our handlers are registered, whether the process is elevated,
// and whether 32-bit and 64-bit handlers are both maintained.  These are
// read once at startup and passed to every registry operation.

use crate::config::Config;
use crate::ehm::AppError;
use crate::registry::{Hive, RegistryProvider};





pub const OUR_PROPERTY_HANDLER_TITLE:  &str = "File Meta Property Handler";
pub const OUR_PROPERTY_HANDLER_PREFIX: &str = "File Meta + ";

pub const OUR_PROPERTY_HANDLER_GUID64: &str = "{D06391EE-2FEB-419B-9667-AD160D0849F3}";
pub const OUR_PROPERTY_HANDLER_GUID32: &str = "{60211757-EF87-465e-B6C1-B37CF98295F9}";
pub const OUR_CONTEXT_HANDLER_GUID64:  &str = "{28D14D00-2D80-4956-9657-9D50C8BB47A5}";
pub const OUR_CONTEXT_HANDLER_GUID32:  &str = "{DA38301B-BE91-4397-B2C8-E27A0BD80CC5}";

/// Shell handlers that carry no title of their own
pub const WINDOWS_SHELL_GUIDS: [&str; 2] = [
    "{66742402-F9B9-11D1-A202-0000F81FEDEE}",
    "{0AFCCBA6-BF90-4A4E-8482-0AC960981F5B}",
];
pub const WINDOWS_SHELL_TITLE: &str = "Windows Shell";

pub const PROPERTY_HANDLERS_PATH:        &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\PropertySystem\PropertyHandlers";
pub const SYSTEM_FILE_ASSOCIATIONS_PATH: &str = r"SOFTWARE\Classes\SystemFileAssociations";
pub const CLSID_PATH:                    &str = "CLSID";
pub const IN_PROC_SERVER32:              &str = "InProcServer32";

pub const FULL_DETAILS_VALUE:         &str = "FullDetails";
pub const PREVIEW_DETAILS_VALUE:      &str = "PreviewDetails";
pub const INFO_TIP_VALUE:             &str = "InfoTip";
pub const OLD_FULL_DETAILS_VALUE:     &str = "FileMetaOldFullDetails";
pub const OLD_PREVIEW_DETAILS_VALUE:  &str = "FileMetaOldPreviewDetails";
pub const OLD_INFO_TIP_VALUE:         &str = "FileMetaOldInfoTip";
pub const CUSTOM_PROFILE_VALUE:       &str = "FileMetaCustomProfile";
pub const CHAINED_VALUE:              &str = "Chained";

pub const SHELL_EX_KEY:               &str = "ShellEx";
pub const CONTEXT_MENU_HANDLERS_KEY:  &str = "ContextMenuHandlers";
pub const CONTEXT_HANDLER_KEY:        &str = "FileMetadata";

/// (current, backup) names of the three display values
pub const DISPLAY_VALUES: [(&str, &str); 3] = [
    (FULL_DETAILS_VALUE,    OLD_FULL_DETAILS_VALUE),
    (PREVIEW_DETAILS_VALUE, OLD_PREVIEW_DETAILS_VALUE),
    (INFO_TIP_VALUE,        OLD_INFO_TIP_VALUE),
];





/// Host facts shared by every extension operation.
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Property handler CLSID for this build's bitness
    pub property_handler_guid:       &'static str,

    /// 32-bit property handler CLSID, mirrored when dual_handlers
    pub property_handler_guid32:     &'static str,

    /// Context-menu handler CLSID for this build's bitness
    pub context_handler_guid:        &'static str,

    pub property_handler_registered: bool,
    pub context_handler_registered:  bool,
    pub elevated:                    bool,

    /// 64-bit build: also maintain the 32-bit view's handler key
    pub dual_handlers:               bool,

    /// Mirror display values into the ProgID key
    pub write_progid_entries:        bool,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl HostContext
//
//  Detection and test construction.
//
////////////////////////////////////////////////////////////////////////////////

impl HostContext {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  with_layout
    //
    //  A fully capable host of the given bitness: both handlers registered
    //  and the process elevated.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn with_layout(is_64bit: bool) -> Self {
        let (property_handler_guid, context_handler_guid) = if is_64bit {
            (OUR_PROPERTY_HANDLER_GUID64, OUR_CONTEXT_HANDLER_GUID64)
        } else {
            (OUR_PROPERTY_HANDLER_GUID32, OUR_CONTEXT_HANDLER_GUID32)
        };

        HostContext {
            property_handler_guid,
            property_handler_guid32:     OUR_PROPERTY_HANDLER_GUID32,
            context_handler_guid,
            property_handler_registered: true,
            context_handler_registered:  true,
            elevated:                    true,
            dual_handlers:               is_64bit,
            write_progid_entries:        false,
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  detect
    //
    //  Reads handler registration from HKCR\CLSID and queries elevation.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn detect(reg: &dyn RegistryProvider, config: &Config) -> Result<Self, AppError> {
        let mut host = Self::with_layout(cfg!(target_pointer_width = "64"));

        host.property_handler_registered = reg.key_exists(Hive::ClassesRoot, &clsid_path(host.property_handler_guid))?;
        host.context_handler_registered  = reg.key_exists(Hive::ClassesRoot, &clsid_path(host.context_handler_guid))?;
        host.elevated                    = is_elevated();
        host.write_progid_entries        = config.write_progid_entries();

        log::info!(
            "Property handler registered: {}, context handler registered: {}, elevated: {}",
            host.property_handler_registered,
            host.context_handler_registered,
            host.elevated,
        );

        Ok(host)
    }
}





/// HKCR-relative path of a CLSID key.
pub fn clsid_path(guid: &str) -> String {
    format!("{}\\{}", CLSID_PATH, guid)
}





////////////////////////////////////////////////////////////////////////////////
//
//  is_elevated
//
//  True if the process runs with administrator rights.
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(windows)]
fn is_elevated() -> bool {
    use windows::Win32::UI::Shell::IsUserAnAdmin;

    unsafe { IsUserAnAdmin() }.as_bool()
}



#[cfg(not(windows))]
fn is_elevated() -> bool {
    false
}
