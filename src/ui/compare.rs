/// Compare screen: renders whatever state the workflow is in
use iced::widget::image::Handle as ImageHandle;
use iced::widget::{button, column, container, row, scrollable, text, Column, Image};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;
use std::path::Path;

use crate::report::Report;
use crate::state::data::{
    AnalysisResult, ComparableItem, ComparableSet, RawImageHandle, SourceKind, Stage,
    WorkflowState,
};
use crate::ui::theme;
use crate::Message;

/// Everything the compare screen needs besides the workflow state
pub struct CompareContext<'a> {
    /// Image the current run started from
    pub preview: Option<&'a RawImageHandle>,
    /// Last absorbed failure, shown when sample data is on screen
    pub last_report: Option<Report>,
}

pub fn view<'a>(state: &'a WorkflowState, ctx: CompareContext<'a>) -> Element<'a, Message> {
    let body: Element<'a, Message> = match state {
        WorkflowState::Idle => intro(),
        WorkflowState::Picking => loading("Waiting for an image..."),
        WorkflowState::Transforming(_) => loading("Preparing image..."),
        WorkflowState::Analyzing(_) => loading("Analyzing boat image..."),
        WorkflowState::LookingUp(_) => loading("Finding similar boats..."),
        WorkflowState::Ready(result, set) => results(result, set, ctx),
        WorkflowState::Failed { stage, message } => failure(*stage, message),
    };

    let header = row![
        button(text("← Back")).on_press(Message::Back).style(button::text),
        text("Compare Boats").size(24),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    column![header, body].spacing(20).padding(24).into()
}

fn intro<'a>() -> Element<'a, Message> {
    let content = column![
        text("Compare Your Boat").size(28),
        text("Take or upload a photo of a boat and our AI will analyze it and find similar boats")
            .size(16)
            .color(theme::muted()),
        row![
            button(text("Select Boat Image"))
                .on_press(Message::SelectSource(SourceKind::Library))
                .padding([12, 24]),
            button(text("Take Photo"))
                .on_press(Message::SelectSource(SourceKind::Camera))
                .style(button::secondary)
                .padding([12, 24]),
        ]
        .spacing(12),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    centered(content.into())
}

fn loading<'a>(label: &'a str) -> Element<'a, Message> {
    let content = column![
        text("⏳").size(40),
        text(label).size(16),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    centered(content.into())
}

fn failure<'a>(stage: Stage, message: &'a str) -> Element<'a, Message> {
    let title = match stage {
        Stage::Picking => "Could not get an image",
        Stage::Transforming => "Could not read this image",
        // Analysis and lookup never fail outwardly
        Stage::Analyzing | Stage::LookingUp => "Something went wrong",
    };

    let content = column![
        text(title).size(22),
        text(message).size(16).color(theme::error()),
        button(text("Try Again"))
            .on_press(Message::ResetWorkflow)
            .padding([12, 24]),
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    centered(content.into())
}

fn results<'a>(
    result: &'a AnalysisResult,
    set: &'a ComparableSet,
    ctx: CompareContext<'a>,
) -> Element<'a, Message> {
    let mut content = Column::new().spacing(16).width(Length::Fill);

    if let Some(handle) = ctx.preview {
        content = content.push(
            Image::new(ImageHandle::from_path(handle.path()))
                .width(Length::Fill)
                .height(Length::Fixed(250.0)),
        );
    }

    content = content
        .push(text("Analysis Result:").size(20))
        .push(text(format!("{} ({}% confidence)", result.category, result.confidence_percent())).size(16));

    if !result.attributes.is_empty() {
        content = content.push(
            text(result.attributes.join(" · "))
                .size(14)
                .color(theme::muted()),
        );
    }

    if result.is_fallback() || set.is_fallback() {
        let mut notice = String::from("Showing sample data: the boat service could not be reached.");
        if let Some(report) = &ctx.last_report {
            notice.push_str(&format!(" (reported {})", report.at.format("%H:%M:%S")));
        }
        content = content.push(text(notice).size(14).color(theme::error()));
    }

    content = content.push(text("Similar Boats:").size(20));

    if set.is_empty() {
        content = content.push(text("No similar boats found.").size(16));
    } else {
        let cards = set.items.iter().map(card).collect();
        content = content.push(Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0));
    }

    content = content.push(
        button(text("Select Another Image"))
            .on_press(Message::ResetWorkflow)
            .padding([12, 24]),
    );

    scrollable(content).height(Length::Fill).into()
}

/// Height of the picture on a comparable card
const CARD_IMAGE_HEIGHT: f32 = 120.0;

fn card(item: &ComparableItem) -> Element<'_, Message> {
    let info = column![
        card_picture(&item.image_ref),
        text(&item.name).size(18),
        text(&item.category).size(14).color(theme::muted()),
        text(&item.summary).size(14),
    ]
    .spacing(4)
    .width(Length::Fixed(240.0));

    button(info)
        .on_press(Message::OpenDetail(item.id.clone()))
        .style(button::secondary)
        .padding(12)
        .into()
}

/// Local picture when the reference is a file on disk, a placeholder otherwise
fn card_picture(image_ref: &str) -> Element<'_, Message> {
    match local_image(image_ref) {
        Some(path) => Image::new(ImageHandle::from_path(path))
            .width(Length::Fill)
            .height(Length::Fixed(CARD_IMAGE_HEIGHT))
            .into(),
        None => container(text("🚤").size(40))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(CARD_IMAGE_HEIGHT))
            .into(),
    }
}

/// Remote URLs and missing files have no local image
fn local_image(image_ref: &str) -> Option<&Path> {
    let image_ref = image_ref.trim();
    if image_ref.is_empty() {
        return None;
    }
    let path = Path::new(image_ref);
    path.is_file().then_some(path)
}

fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
