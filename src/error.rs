use thiserror::Error;

/// Errors reported by fallible [`GrowableArray`](crate::GrowableArray) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayError {
    /// Requested element count exceeds what the allocation strategy can represent.
    #[error("requested length {requested} exceeds maximum {max}")]
    Length {
        /// Element count that was asked for
        requested: usize,
        /// Value of `max_size()` at the time of the request
        max: usize,
    },

    /// Checked access with an index past the last live element.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// Index that was asked for
        index: usize,
        /// Length of the array
        len: usize,
    },

    /// The allocation strategy could not satisfy a request.
    #[error("allocation of {slots} slots ({bytes} bytes) failed")]
    AllocationFailure {
        /// Number of element slots requested
        slots: usize,
        /// Size of the request in bytes, saturated on overflow
        bytes: usize,
    },
}

pub type Result<T> = std::result::Result<T, ArrayError>;
