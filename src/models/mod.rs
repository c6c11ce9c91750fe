pub mod common;
pub mod image;
pub mod video;

pub use self::common::*;
pub use self::image::*;
pub use self::video::*;
