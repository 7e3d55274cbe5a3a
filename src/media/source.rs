/// Image source adapter
///
/// Wraps the platform picker into one async operation per source. All
/// failure paths end up as a `PickError`; nothing here panics or throws.

use async_trait::async_trait;
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PickError;
use crate::state::data::{RawImageHandle, SourceKind};

/// Image extensions offered in the library dialog
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// Answer to a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// What the platform picker came back with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(RawImageHandle),
    Cancelled,
    /// No device or library for this source
    Unavailable,
}

/// Platform media picking/capture
#[async_trait]
pub trait MediaPicker: Send + Sync {
    async fn request_permission(&self, kind: SourceKind) -> Permission;
    async fn pick(&self, kind: SourceKind) -> PickOutcome;
}

/// Uniform, single-flight access to the platform picker
pub struct ImageSourceAdapter {
    picker: Arc<dyn MediaPicker>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the pick finishes (or its future is dropped)
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ImageSourceAdapter {
    pub fn new(picker: Arc<dyn MediaPicker>) -> Self {
        Self {
            picker,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn pick_from_library(&self) -> Result<RawImageHandle, PickError> {
        self.acquire(SourceKind::Library).await
    }

    pub async fn capture_from_camera(&self) -> Result<RawImageHandle, PickError> {
        self.acquire(SourceKind::Camera).await
    }

    /// Ask for permission, then pick.
    ///
    /// A second call while one is outstanding gets `AlreadyInProgress`
    /// instead of opening another dialog.
    pub async fn acquire(&self, kind: SourceKind) -> Result<RawImageHandle, PickError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::warn!(%kind, "pick requested while another is still open");
            return Err(PickError::AlreadyInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        if self.picker.request_permission(kind).await == Permission::Denied {
            tracing::info!(%kind, "permission denied");
            return Err(PickError::PermissionDenied);
        }

        match self.picker.pick(kind).await {
            PickOutcome::Picked(handle) => {
                tracing::info!(%kind, path = %handle.path().display(), "📷 image picked");
                Ok(handle)
            }
            PickOutcome::Cancelled => Err(PickError::UserCancelled),
            PickOutcome::Unavailable => Err(PickError::DeviceUnavailable),
        }
    }

    /// Whether a pick is currently outstanding
    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Desktop picker: native file dialog for the library, no camera
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopPicker;

#[async_trait]
impl MediaPicker for DesktopPicker {
    async fn request_permission(&self, _kind: SourceKind) -> Permission {
        // Desktop file dialogs need no runtime permission
        Permission::Granted
    }

    async fn pick(&self, kind: SourceKind) -> PickOutcome {
        match kind {
            SourceKind::Library => {
                // The native dialog blocks until the user answers
                let file = tokio::task::spawn_blocking(|| {
                    FileDialog::new()
                        .set_title("Select Boat Image")
                        .add_filter("Images", IMAGE_EXTENSIONS)
                        .pick_file()
                })
                .await;

                match file {
                    Ok(Some(path)) => PickOutcome::Picked(RawImageHandle::new(path)),
                    Ok(None) => PickOutcome::Cancelled,
                    Err(e) => {
                        tracing::error!("file dialog task failed: {}", e);
                        PickOutcome::Unavailable
                    }
                }
            }
            SourceKind::Camera => PickOutcome::Unavailable,
        }
    }
}

/// Picker that always returns the same file (headless runs)
#[derive(Debug, Clone)]
pub struct FixedPicker {
    path: PathBuf,
}

impl FixedPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MediaPicker for FixedPicker {
    async fn request_permission(&self, _kind: SourceKind) -> Permission {
        Permission::Granted
    }

    async fn pick(&self, kind: SourceKind) -> PickOutcome {
        match kind {
            SourceKind::Library => PickOutcome::Picked(RawImageHandle::new(self.path.clone())),
            SourceKind::Camera => PickOutcome::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Notify;

    /// Picker with scripted answers; optionally waits on a gate before answering
    struct ScriptedPicker {
        permission: Permission,
        outcome: PickOutcome,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl MediaPicker for ScriptedPicker {
        async fn request_permission(&self, _kind: SourceKind) -> Permission {
            self.permission
        }

        async fn pick(&self, _kind: SourceKind) -> PickOutcome {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.outcome.clone()
        }
    }

    fn adapter(permission: Permission, outcome: PickOutcome) -> ImageSourceAdapter {
        ImageSourceAdapter::new(Arc::new(ScriptedPicker {
            permission,
            outcome,
            gate: None,
        }))
    }

    #[tokio::test]
    async fn test_picked() {
        let handle = RawImageHandle::new("/photos/boat.jpg");
        let adapter = adapter(Permission::Granted, PickOutcome::Picked(handle.clone()));
        assert_eq!(adapter.pick_from_library().await, Ok(handle));
        assert!(!adapter.is_busy());
    }

    #[tokio::test]
    async fn test_outcomes_map_to_pick_errors() {
        let denied = adapter(Permission::Denied, PickOutcome::Cancelled);
        assert_eq!(denied.pick_from_library().await, Err(PickError::PermissionDenied));

        let cancelled = adapter(Permission::Granted, PickOutcome::Cancelled);
        assert_eq!(cancelled.pick_from_library().await, Err(PickError::UserCancelled));

        let unavailable = adapter(Permission::Granted, PickOutcome::Unavailable);
        assert_eq!(unavailable.capture_from_camera().await, Err(PickError::DeviceUnavailable));
    }

    #[tokio::test]
    async fn test_second_pick_while_open_is_rejected() {
        let gate = Arc::new(Notify::new());
        let handle = RawImageHandle::new("/photos/boat.jpg");
        let adapter = Arc::new(ImageSourceAdapter::new(Arc::new(ScriptedPicker {
            permission: Permission::Granted,
            outcome: PickOutcome::Picked(handle.clone()),
            gate: Some(gate.clone()),
        })));

        let first = tokio::spawn({
            let adapter = adapter.clone();
            async move { adapter.pick_from_library().await }
        });

        // Let the first pick reach the gate
        while !adapter.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(adapter.pick_from_library().await, Err(PickError::AlreadyInProgress));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Ok(handle));
        assert!(!adapter.is_busy());
    }

    #[tokio::test]
    async fn test_fixed_picker_has_no_camera() {
        let adapter = ImageSourceAdapter::new(Arc::new(FixedPicker::new("/tmp/boat.png")));
        assert!(adapter.pick_from_library().await.is_ok());
        assert_eq!(adapter.capture_from_camera().await, Err(PickError::DeviceUnavailable));
    }
}
