/// State management module
///
/// This module handles the compare workflow state, including:
/// - Shared data structures (data.rs)
/// - The workflow state machine and stale-result guard (workflow.rs)
/// - Stage wiring (pipeline.rs)
/// - The headless session driver (session.rs)

pub mod data;
pub mod pipeline;
pub mod session;
pub mod workflow;
