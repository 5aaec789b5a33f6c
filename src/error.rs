use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Discovery itself has exactly one failure mode, [`Error::HandlerNotFound`]. The remaining
/// variants cover loading the metadata model from its serialized form, the optional ambiguity
/// policy, and misuse of the write-once result slot.
///
/// # Error Categories
///
/// ## Discovery Errors
/// - [`Error::HandlerNotFound`] - No type/method pair matched any handler signature
/// - [`Error::AmbiguousHandler`] - More than one type qualified under [`crate::AmbiguityPolicy::Reject`]
/// - [`Error::AlreadyAssigned`] - The runtime structure was assigned twice
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted or inconsistent metadata model
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Error`] - Miscellaneous failures
///
/// # Examples
///
/// ```rust,no_run
/// use vmscope::{Error, EventLog, HandlerLocator, ModuleDef};
///
/// let module = ModuleDef::from_path("protected.json")?;
/// match HandlerLocator::default().discover(&module, &EventLog::new()) {
///     Ok(handler) => println!("handler at {}", handler.method().token),
///     Err(Error::HandlerNotFound) => eprintln!("unsupported protector version"),
///     Err(e) => eprintln!("discovery failed: {e}"),
/// }
/// # Ok::<(), vmscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No type in the module contains a method matching any handler signature.
    ///
    /// This is fatal for the devirtualization pipeline: the runtime structure cannot be
    /// assembled without both the owning type and the handler method.
    #[error("Could not locate the VM function handler - unsupported protector version?")]
    HandlerNotFound,

    /// More than one type contains a qualifying handler method.
    ///
    /// Only returned when the locator runs with [`crate::AmbiguityPolicy::Reject`]. The
    /// associated tokens are the qualifying types in traversal order.
    #[error("Multiple types contain a VM function handler - {0:?}")]
    AmbiguousHandler(Vec<Token>),

    /// The write-once runtime slot already holds a value.
    ///
    /// Assigning twice without an explicit reset is a programming error in the caller.
    #[error("The VM runtime structure has already been assigned")]
    AlreadyAssigned,

    /// The metadata model is damaged and could not be loaded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
