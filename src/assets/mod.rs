/// Image decoding.
pub mod decode;
