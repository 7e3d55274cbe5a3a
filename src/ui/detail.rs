/// Boat detail screen
use iced::widget::{button, column, container, row, scrollable, text, Column};
use iced::{Alignment, Element, Length};

use crate::boats::capability::BoatDetails;
use crate::error::CapabilityError;
use crate::ui::theme;
use crate::Message;

/// Loading state of the detail screen
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(BoatDetails),
    NotFound,
    Error(String),
}

impl DetailState {
    /// Map a catalog answer to what the screen shows
    pub fn from_result(result: Result<Option<BoatDetails>, CapabilityError>) -> Self {
        match result {
            Ok(Some(details)) => DetailState::Loaded(details),
            Ok(None) => DetailState::NotFound,
            Err(error) => {
                tracing::error!("failed to load boat details: {}", error);
                DetailState::Error("Failed to load boat details. Please try again.".to_string())
            }
        }
    }
}

/// Detail screen for one boat id
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub boat_id: String,
    pub state: DetailState,
}

impl DetailView {
    pub fn loading(boat_id: String) -> Self {
        Self {
            boat_id,
            state: DetailState::Loading,
        }
    }
}

pub fn view(detail: &DetailView) -> Element<'_, Message> {
    let header = row![
        button(text("← Back")).on_press(Message::Back).style(button::text),
        text("Boat Details").size(24),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let body: Element<'_, Message> = match &detail.state {
        DetailState::Loading => centered(text("Loading boat details...").size(16).into()),
        DetailState::Error(message) => {
            centered(text(message).size(16).color(theme::error()).into())
        }
        DetailState::NotFound => centered(text("No details found for this boat.").size(16).into()),
        DetailState::Loaded(details) => loaded(details),
    };

    column![header, body].spacing(20).padding(24).into()
}

fn loaded(details: &BoatDetails) -> Element<'_, Message> {
    let general = section(
        "General Information",
        vec![
            info_row("Manufacturer", details.manufacturer.clone()),
            info_row("Type", details.category.clone()),
            info_row("Year", details.year.to_string()),
            info_row("Length", format!("{} ft", details.length_ft)),
        ],
    );

    let specifications = section(
        "Specifications",
        details
            .specifications
            .iter()
            .map(|(key, value)| info_row(key, value.clone()))
            .collect(),
    );

    let features = section(
        "Features",
        details
            .features
            .iter()
            .map(|feature| text(format!("• {}", feature)).size(16).into())
            .collect(),
    );

    let mut content = column![text(&details.name).size(32)].spacing(20);
    if !details.description.is_empty() {
        content = content.push(text(&details.description).size(16).color(theme::muted()));
    }
    content = content.push(general).push(specifications).push(features);

    scrollable(content.width(Length::Fill)).height(Length::Fill).into()
}

fn section<'a>(title: &'a str, rows: Vec<Element<'a, Message>>) -> Element<'a, Message> {
    let rows = if rows.is_empty() {
        vec![text("None listed").size(14).color(theme::muted()).into()]
    } else {
        rows
    };

    column![text(title).size(20), Column::with_children(rows).spacing(6)]
        .spacing(10)
        .into()
}

fn info_row<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(format!("{}:", label)).width(Length::Fixed(160.0)),
        text(value),
    ]
    .spacing(8)
    .into()
}

fn centered(content: Element<'_, Message>) -> Element<'_, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
