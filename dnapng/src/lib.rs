pub mod error;
pub mod alphabet;
pub mod layout;
pub mod grid;
pub mod encode;
pub mod decode;
pub mod config;
pub mod pack;
pub mod otp;

pub use config::CodecConfig;
pub use decode::{decode, strip_padding, Decoder};
pub use encode::{encode, encode_symbols};
pub use error::CodecError;
pub use grid::{PixelGrid, Rgba, RgbaImage};
pub use layout::Layout;
