pub mod compositor;

pub use compositor::{composite, composite_onto, segment_span};
