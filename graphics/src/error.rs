//! Graphics error types.

use thiserror::Error;

/// Errors that can occur in the resource/device layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An access was outside a resource's bounds.
    #[error("access of {len} bytes at offset {offset} exceeds size {size}")]
    OutOfBounds {
        /// Requested offset in bytes.
        offset: u64,
        /// Requested length in bytes.
        len: u64,
        /// Resource size in bytes.
        size: u64,
    },
}

/// Errors returned by [`MeshPacker::pack_meshes`].
///
/// All variants are returned to the immediate caller; the packer never
/// retries or logs, and any reservation made during a failed call is
/// rolled back before the error is returned.
///
/// [`MeshPacker::pack_meshes`]: crate::pack::MeshPacker::pack_meshes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// A destination buffer could not satisfy a reservation. Recoverable:
    /// grow the destination capacity, split the batch, or retry later.
    #[error("destination out of space: {needed} bytes needed in {stream}")]
    OutOfSpace {
        /// Bytes that could not be reserved.
        needed: u64,
        /// Name of the destination stream (attribute slot or "index").
        stream: &'static str,
    },
    /// A record's layout cannot be reconciled with the batch's shared
    /// layout. Recoverable: repack the record in a separate batch.
    #[error("incompatible layout: {0}")]
    IncompatibleLayout(String),
    /// The batch's aggregate vertex or index count overflows u32.
    /// Recoverable: split the batch.
    #[error("aggregate batch count overflows u32")]
    BatchTooLarge,
    /// Malformed input record; a caller programming error.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// Destination buffer creation failed.
    #[error(transparent)]
    Device(#[from] GraphicsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = GraphicsError::InitializationFailed("no adapter found".to_string());
        assert_eq!(err.to_string(), "initialization failed: no adapter found");
    }

    #[test]
    fn test_pack_error_display() {
        let err = PackError::OutOfSpace {
            needed: 420,
            stream: "position",
        };
        assert_eq!(
            err.to_string(),
            "destination out of space: 420 bytes needed in position"
        );

        let err = PackError::from(GraphicsError::OutOfMemory);
        assert_eq!(err.to_string(), "out of GPU memory");
    }
}
