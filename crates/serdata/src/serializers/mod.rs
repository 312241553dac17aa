mod array;
mod keyframe;
mod primitive;

pub use array::*;
pub use keyframe::*;
pub use primitive::*;
