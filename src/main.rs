use clap::Parser;
use iced::{Element, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;

mod boats;
mod config;
mod error;
mod logging;
mod media;
mod report;
mod state;
mod ui;

use boats::capability::{BoatCatalog, BoatDetails};
use boats::mock::{MockAnalyzer, MockCatalog};
use config::AppConfig;
use error::CapabilityError;
use media::source::{DesktopPicker, FixedPicker, MediaPicker};
use report::ReportLog;
use state::data::{RawImageHandle, SourceKind, Stage, WorkflowState};
use state::pipeline::Pipeline;
use state::session::Session;
use state::workflow::{Completion, Step, Ticket, WorkflowStore};
use ui::detail::{DetailState, DetailView};
use ui::navigation::{Navigator, Screen};
use ui::theme::ThemeMode;

/// Command line flags
#[derive(Debug, Parser)]
#[command(name = "ai-compare-boats", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = config::CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Analyze this image without opening a window and print the result as JSON
    #[arg(long, value_name = "IMAGE")]
    analyze: Option<PathBuf>,

    /// With --analyze: use the camera source instead of the file
    #[arg(long, requires = "analyze")]
    camera: bool,
}

/// Main application state
struct CompareBoats {
    /// Screen stack
    navigator: Navigator,
    /// Current light/dark mode
    theme: ThemeMode,
    /// Compare workflow state machine
    workflow: WorkflowStore,
    /// Stages run by the workflow
    pipeline: Pipeline,
    /// Catalog for the detail screen
    catalog: Arc<dyn BoatCatalog>,
    /// Absorbed failures
    reports: Arc<ReportLog>,
    /// Image the current compare run started from
    preview: Option<RawImageHandle>,
    /// Open detail screen, if any
    detail: Option<DetailView>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Home → Compare
    OpenCompare,
    /// Leave the current screen
    Back,
    ToggleTheme,
    /// User picked "Select Boat Image" or "Take Photo"
    SelectSource(SourceKind),
    /// A workflow stage finished
    StepDone(Ticket, Completion),
    /// "Try Again" / "Select Another Image"
    ResetWorkflow,
    /// Open a comparable boat
    OpenDetail(String),
    /// Catalog answered for a detail screen
    DetailLoaded(String, Result<Option<BoatDetails>, CapabilityError>),
}

impl CompareBoats {
    /// Create a new instance of the application
    fn new(config: AppConfig, catalog: Arc<dyn BoatCatalog>) -> (Self, Task<Message>) {
        let reports = Arc::new(ReportLog::new());
        let pipeline = Pipeline::from_config(
            &config,
            Arc::new(DesktopPicker),
            Arc::new(MockAnalyzer::new(config.analysis.mock_latency())),
            catalog.clone(),
            reports.clone(),
        );

        tracing::info!("🚤 AI Compare Boats initialized");

        (
            CompareBoats {
                navigator: Navigator::new(),
                theme: config.ui.theme,
                workflow: WorkflowStore::new(),
                pipeline,
                catalog,
                reports,
                preview: None,
                detail: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenCompare => {
                self.navigator.push(Screen::Compare);
                Task::none()
            }
            Message::Back => {
                match self.navigator.pop() {
                    // Leaving the compare screen ends its session
                    Some(Screen::Compare) => self.reset_workflow(),
                    Some(Screen::Detail(_)) => self.detail = None,
                    _ => {}
                }
                Task::none()
            }
            Message::ToggleTheme => {
                self.theme = self.theme.toggled();
                Task::none()
            }
            Message::SelectSource(kind) => match self.workflow.select_source(kind) {
                Ok((ticket, step)) => {
                    self.preview = None;
                    self.run_step(ticket, step)
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    Task::none()
                }
            },
            Message::StepDone(ticket, completion) => {
                let next = self.workflow.apply(ticket, completion);

                if let WorkflowState::Transforming(handle) = self.workflow.state() {
                    self.preview = Some(handle.clone());
                }

                match next {
                    Some(step) => self.run_step(ticket, step),
                    None => Task::none(),
                }
            }
            Message::ResetWorkflow => {
                self.reset_workflow();
                Task::none()
            }
            Message::OpenDetail(boat_id) => {
                self.detail = Some(DetailView::loading(boat_id.clone()));
                self.navigator.push(Screen::Detail(boat_id.clone()));

                let catalog = self.catalog.clone();
                Task::perform(
                    async move {
                        let result = catalog.boat_details(&boat_id).await;
                        (boat_id, result)
                    },
                    |(boat_id, result)| Message::DetailLoaded(boat_id, result),
                )
            }
            Message::DetailLoaded(boat_id, result) => {
                // Ignore answers for a screen that was already left
                if let Some(detail) = self.detail.as_mut().filter(|d| d.boat_id == boat_id) {
                    detail.state = DetailState::from_result(result);
                }
                Task::none()
            }
        }
    }

    /// Launch one workflow stage in the background
    fn run_step(&self, ticket: Ticket, step: Step) -> Task<Message> {
        let pipeline = self.pipeline.clone();
        Task::perform(async move { pipeline.execute(step).await }, move |completion| {
            Message::StepDone(ticket, completion)
        })
    }

    fn reset_workflow(&mut self) {
        self.workflow.reset();
        self.preview = None;
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match self.navigator.current() {
            Screen::Home => ui::home::view(self.theme),
            Screen::Compare => ui::compare::view(
                self.workflow.state(),
                ui::compare::CompareContext {
                    preview: self.preview.as_ref(),
                    last_report: self.reports.latest(),
                },
            ),
            Screen::Detail(_) => match &self.detail {
                Some(detail) => ui::detail::view(detail),
                None => ui::home::view(self.theme),
            },
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        self.theme.theme()
    }

    fn title(&self) -> String {
        self.navigator.current().title().to_string()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    let inventory = MockCatalog::bundled(config.analysis.mock_latency())?;
    tracing::info!("📚 {} boats in the bundled inventory", inventory.len());
    let catalog: Arc<dyn BoatCatalog> = Arc::new(inventory);

    if let Some(image) = cli.analyze {
        let kind = if cli.camera {
            SourceKind::Camera
        } else {
            SourceKind::Library
        };
        return analyze_headless(&config, catalog, image, kind);
    }

    iced::application(CompareBoats::title, CompareBoats::update, CompareBoats::view)
        .theme(CompareBoats::theme)
        .centered()
        .run_with(move || CompareBoats::new(config, catalog))?;

    Ok(())
}

/// Run one comparison without a window and print the outcome
///
/// Progress is logged as the session publishes it. Ctrl-C resets the
/// session; the stage still running finishes and its result is dropped.
fn analyze_headless(
    config: &AppConfig,
    catalog: Arc<dyn BoatCatalog>,
    image: PathBuf,
    kind: SourceKind,
) -> anyhow::Result<()> {
    let picker: Arc<dyn MediaPicker> = Arc::new(FixedPicker::new(image));
    let reports = Arc::new(ReportLog::new());
    let pipeline = Pipeline::from_config(
        config,
        picker,
        Arc::new(MockAnalyzer::new(config.analysis.mock_latency())),
        catalog,
        reports.clone(),
    );
    let session = Session::new(pipeline);

    // One cooperative thread; image work goes to the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (state, interrupted) = runtime.block_on(async {
        let mut progress = session.subscribe();
        let run = session.select_source(kind);
        tokio::pin!(run);
        let mut interrupted = false;

        loop {
            tokio::select! {
                outcome = &mut run => break outcome.map(|state| (state, interrupted)),
                Ok(()) = progress.changed() => {
                    tracing::info!("📍 {}", progress.borrow_and_update().name());
                }
                Ok(()) = tokio::signal::ctrl_c(), if !interrupted => {
                    tracing::warn!("interrupted, abandoning the comparison");
                    interrupted = true;
                    session.reset().await;
                }
            }
        }
    })?;

    if interrupted {
        anyhow::bail!("comparison interrupted");
    }

    match state {
        WorkflowState::Ready(result, comparables) => {
            let absorbed: Vec<serde_json::Value> = reports
                .snapshot()
                .iter()
                .map(|report| {
                    serde_json::json!({
                        "stage": report.stage,
                        "message": report.message,
                        "at": report.at.to_rfc3339(),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "analysis": result,
                "comparables": comparables,
                "reports": absorbed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        WorkflowState::Failed { stage, message } => {
            anyhow::bail!("{} failed: {}", stage, message)
        }
        WorkflowState::Idle => anyhow::bail!("{} was cancelled", Stage::Picking),
        other => anyhow::bail!("comparison stopped while {}", other.name()),
    }
}
