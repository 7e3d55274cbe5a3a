/// Presentation layer
///
/// Views only read state and emit `Message`s; all mutation happens in
/// `CompareBoats::update`.

pub mod compare;
pub mod detail;
pub mod home;
pub mod navigation;
pub mod theme;
