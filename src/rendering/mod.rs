pub mod host;
pub mod resvg_host;

pub use host::Host;
pub use resvg_host::{DecodedImage, EncodedBlob, ResvgHost};
