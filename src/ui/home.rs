use iced::widget::{button, column, container, text};
use iced::{Alignment, Element, Length};

use crate::ui::theme::{self, ThemeMode};
use crate::Message;

/// Landing screen
pub fn view(mode: ThemeMode) -> Element<'static, Message> {
    let content = column![
        text("Welcome to AI Compare Boats").size(40).color(theme::primary()),
        text("Compare boats using our AI-powered image recognition technology")
            .size(16)
            .color(theme::muted()),
        button(text("Compare Boats").size(18))
            .on_press(Message::OpenCompare)
            .padding([12, 24]),
        button(text(format!("Switch to {} theme", mode.toggled().label())))
            .on_press(Message::ToggleTheme)
            .style(button::text)
            .padding(8),
    ]
    .spacing(20)
    .padding(40)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
