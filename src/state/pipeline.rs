/// The four workflow stages behind one `execute` call
///
/// Both the GUI and the headless session run steps through here, so the
/// stages are wired up in exactly one place.

use std::sync::Arc;

use crate::boats::analysis::AnalysisInvoker;
use crate::boats::capability::{BoatAnalyzer, BoatCatalog};
use crate::boats::lookup::ComparableLookup;
use crate::config::AppConfig;
use crate::media::source::{ImageSourceAdapter, MediaPicker};
use crate::media::transform::ImageTransform;
use crate::report::ErrorReporter;
use crate::state::data::SourceKind;
use crate::state::workflow::{Completion, Step};

#[derive(Clone)]
pub struct Pipeline {
    source: Arc<ImageSourceAdapter>,
    transform: ImageTransform,
    analysis: Arc<AnalysisInvoker>,
    lookup: Arc<ComparableLookup>,
}

impl Pipeline {
    pub fn new(
        source: ImageSourceAdapter,
        transform: ImageTransform,
        analysis: AnalysisInvoker,
        lookup: ComparableLookup,
    ) -> Self {
        Self {
            source: Arc::new(source),
            transform,
            analysis: Arc::new(analysis),
            lookup: Arc::new(lookup),
        }
    }

    /// Wire the stages from config and the given collaborators
    pub fn from_config(
        config: &AppConfig,
        picker: Arc<dyn MediaPicker>,
        analyzer: Arc<dyn BoatAnalyzer>,
        catalog: Arc<dyn BoatCatalog>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self::new(
            ImageSourceAdapter::new(picker),
            ImageTransform::new(config.transform.max_width, config.transform.quality),
            AnalysisInvoker::new(analyzer, reporter.clone(), config.analysis.timeout()),
            ComparableLookup::new(catalog, reporter, config.lookup.timeout()),
        )
    }

    /// Run one stage
    pub async fn execute(&self, step: Step) -> Completion {
        match step {
            Step::Pick(SourceKind::Library) => Completion::Picked(self.source.pick_from_library().await),
            Step::Pick(SourceKind::Camera) => Completion::Picked(self.source.capture_from_camera().await),
            Step::Transform(handle) => Completion::Transformed(self.transform.run(handle).await),
            Step::Analyze(payload) => Completion::Analyzed(self.analysis.analyze(&payload).await),
            Step::Lookup(result) => Completion::LookedUp(self.lookup.lookup(&result).await),
        }
    }
}
