// ehm.rs — Error handling module
//
// Expected validation failures carry a user-facing message and a Windows
// error code that becomes the process exit status.  Everything else is an
// unexpected failure and exits with -1.

use std::fmt;
use std::io;
use std::path::PathBuf;





/// Windows error codes surfaced as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WindowsErrorCode {
    Success          = 0,
    InvalidFunction  = 1,
    FileNotFound     = 2,
    AccessDenied     = 5,
    NotSupported     = 50,
    InvalidParameter = 87,
}





/// Unified error type for the association manager.
#[derive(Debug)]
pub enum AppError {
    /// Expected validation failure (user-facing message + exit code)
    Assoc { message: String, code: WindowsErrorCode },

    /// Invalid command-line argument (exit 87)
    InvalidArg(String),

    /// Definitions file does not exist (exit 2)
    PathNotFound(PathBuf),

    /// Registry operation failed on the named key
    Registry { key: String, source: io::Error },

    /// Standard I/O error
    Io(io::Error),

    /// Saved-state XML could not be read or written
    Xml(String),

    /// A property store is locked by another writer (retryable)
    LockViolation(PathBuf),

    /// Registry access is only available on Windows
    Unsupported,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl AppError
//
//  Constructors and exit-code mapping.
//
////////////////////////////////////////////////////////////////////////////////

impl AppError {

    ////////////////////////////////////////////////////////////////////////////
    //
    //  assoc
    //
    //  Builds an expected validation failure.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn assoc(message: impl Into<String>, code: WindowsErrorCode) -> Self {
        AppError::Assoc { message: message.into(), code }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  invalid_parameter
    //
    //  Shorthand for the most common validation failure.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::assoc(message, WindowsErrorCode::InvalidParameter)
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  registry
    //
    //  Wraps an I/O error raised while touching a registry key.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn registry(key: impl Into<String>, source: io::Error) -> Self {
        AppError::Registry { key: key.into(), source }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  is_expected
    //
    //  True for validation failures the user can act on.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn is_expected(&self) -> bool {
        matches!(self, AppError::Assoc { .. } | AppError::InvalidArg(_) | AppError::PathNotFound(_))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  is_access_denied
    //
    //  True when a registry or file write was refused for lack of privilege.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn is_access_denied(&self) -> bool {
        match self {
            AppError::Registry { source, .. } | AppError::Io(source) => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            AppError::Assoc { code, .. } => *code == WindowsErrorCode::AccessDenied,
            _ => false,
        }
    }





    pub fn is_lock_violation(&self) -> bool {
        matches!(self, AppError::LockViolation(_))
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  exit_code
    //
    //  Process exit status for this error.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Assoc { code, .. } => *code as i32,
            AppError::InvalidArg(_)      => WindowsErrorCode::InvalidParameter as i32,
            AppError::PathNotFound(_)    => WindowsErrorCode::FileNotFound as i32,
            AppError::Unsupported        => WindowsErrorCode::NotSupported as i32,
            _                            => -1,
        }
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl fmt::Display for AppError
//
//  Formats AppError variants for display output.
//
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Assoc { message, .. } => write!(f, "{}", message),
            AppError::InvalidArg(msg)       => write!(f, "{}", msg),
            AppError::PathNotFound(path) => {
                write!(f, "Could not find definitions file '{}'.", path.display())
            }
            AppError::Registry { key, source } => write!(f, "Registry key '{}': {}", key, source),
            AppError::Io(e)                    => write!(f, "{}", e),
            AppError::Xml(msg)                 => write!(f, "{}", msg),
            AppError::LockViolation(path) => {
                write!(f, "Property store for '{}' is locked by another process.", path.display())
            }
            AppError::Unsupported => {
                write!(f, "File Meta associations can only be managed on Windows.")
            }
        }
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl std::error::Error for AppError
//
//  Returns the underlying error source, if any.
//
////////////////////////////////////////////////////////////////////////////////

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Registry { source, .. } => Some(source),
            AppError::Io(e)                   => Some(e),
            _ => None,
        }
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl From<std::io::Error> for AppError
//
//  Converts a standard I/O error into AppError::Io.
//
////////////////////////////////////////////////////////////////////////////////

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl From<quick_xml::Error> for AppError
//
//  Converts an XML reader/writer error into AppError::Xml.
//
////////////////////////////////////////////////////////////////////////////////

impl From<quick_xml::Error> for AppError {
    fn from(e: quick_xml::Error) -> Self {
        AppError::Xml(e.to_string())
    }
}
