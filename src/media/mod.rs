/// Image acquisition module
///
/// This module handles:
/// - Picking an image from the library or camera (source.rs)
/// - Resizing and encoding it into an analysis payload (transform.rs)

pub mod source;
pub mod transform;
