pub mod cipher;
pub mod dictionary;
pub mod digest;
pub mod matrix;
pub mod oracle;
pub mod pipeline;
pub mod search;
pub mod token;

pub use pipeline::{
    compress, compress_with, decompress, decompress_with, CompressError, CompressOptions,
    DecodeError, DecodeOptions, FormatError, KEY_CANDIDATES, VERSION_CODE,
};
pub use search::{SearchBudget, SearchExhausted};
