pub mod builder;
pub mod collections;
pub mod error;
pub mod events;
pub mod io;
pub mod primitives;
pub mod skeleton;
pub mod utils;
pub mod wasm;
pub mod wavefront;

pub use builder::SkeletonBuilder;
pub use error::{Result, SkeletonError};
pub use skeleton::{EdgeResult, PointKey, Skeleton};
