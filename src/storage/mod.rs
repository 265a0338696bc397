//! Object storage layer.

mod media;

pub use media::MediaStorage;
