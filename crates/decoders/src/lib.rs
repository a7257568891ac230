pub mod utf8;

pub use core_types::Decoder;
pub use utf8::Utf8Decoder;
