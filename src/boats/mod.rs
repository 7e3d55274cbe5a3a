/// Boat analysis and comparison
///
/// - Service seams and detail records (capability.rs)
/// - Analysis with fallback (analysis.rs)
/// - Comparable lookup with fallback (lookup.rs)
/// - Bundled mock services (mock.rs)

pub mod analysis;
pub mod capability;
pub mod lookup;
pub mod mock;
