use thiserror::Error;

use crate::graph::TypeRef;

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

/// The generic Error type, covering all errors this library can return.
///
/// The reference-rewriting core is deliberately hard to fail: lens lookups are
/// total (an unmapped reference resolves to itself) and policies express
/// infeasibility by shrinking groups, not by erroring. What remains are the
/// few operations that take untrusted input — descriptor parsing and program
/// graph registration — plus lens construction against a graph that does not
/// contain the classes a merge decision names.
///
/// Invariant violations inside the core (self-moves recorded on a builder,
/// undersized groups reaching removal accounting) are programming errors and
/// are enforced with assertions, never surfaced through this type.
///
/// # Examples
///
/// ```rust
/// use refract::{Error, graph::TypeRef};
///
/// match TypeRef::from_descriptor("not a descriptor") {
///     Ok(_) => unreachable!(),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("bad descriptor: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A malformed type descriptor was provided.
    ///
    /// The error carries the source location where the malformation was
    /// detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file in which the error was detected
    /// * `line` - Source line in which the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A class was registered twice in the program graph.
    ///
    /// The program graph is a closed set keyed by type; registering the same
    /// type again indicates the front end handed us an inconsistent program.
    #[error("Duplicate class in program graph - {0}")]
    DuplicateClass(TypeRef),

    /// An operation referenced a class that is not part of the program graph.
    ///
    /// Returned when lens construction or merge finalization names a type
    /// that the closed program set does not contain.
    #[error("Class not found in program graph - {0}")]
    UnknownClass(TypeRef),
}
