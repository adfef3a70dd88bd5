use thiserror::Error;

/// Resource creation or update failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("resource '{label}' has zero size")]
    ZeroSize { label: String },

    #[error("resource '{label}' expects {expected} bytes of data, got {found}")]
    DataSizeMismatch {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("buffer '{label}' lacks required usage {required:?}")]
    MissingUsage {
        label: String,
        required: wgpu::BufferUsages,
    },

    #[error("write of {len} bytes at offset {offset} overflows buffer '{label}' of {size} bytes")]
    OutOfBounds {
        label: String,
        offset: u64,
        len: u64,
        size: u64,
    },

    #[error("buffer writes must be 4-byte aligned (offset {offset}, len {len})")]
    Unaligned { offset: u64, len: u64 },

    #[error("texture format {0:?} cannot be uploaded from host memory")]
    UnsupportedFormat(wgpu::TextureFormat),
}
