use iced::widget::{button, column, container, image, row, text, Column};
use iced::{Alignment, Element, Length};

use super::canvas::HandleCache;
use crate::state::data::PhotoRole;
use crate::state::profile::Profile;
use crate::Message;

/// One card per photo role with upload, replace and remove actions
pub fn view<'a>(profile: &'a Profile, handles: &'a HandleCache) -> Element<'a, Message> {
    let cards = PhotoRole::ALL.iter().map(|&role| photo_card(profile, handles, role));

    let content: Column<Message> = column![
        text("Your Photos").size(28),
        text("Upload front, side and back photos. The front view is used in the studio by default.").size(14),
        row(cards).spacing(16),
    ]
    .spacing(16)
    .padding(24);

    container(content).width(Length::Fill).into()
}

fn photo_card<'a>(profile: &'a Profile, handles: &'a HandleCache, role: PhotoRole) -> Element<'a, Message> {
    let photo = profile.by_role(role);

    let preview: Element<Message> = match photo.and_then(|p| handles.get(&p.pixels)) {
        Some(handle) => image(handle.clone()).width(Length::Fill).height(240).into(),
        None => container(text("No photo").size(14))
            .width(Length::Fill)
            .height(240)
            .center_x(Length::Fill)
            .center_y(240)
            .style(container::rounded_box)
            .into(),
    };

    let actions = match photo {
        Some(_) => row![
            button("Replace").on_press(Message::UploadPhoto(role)),
            button("Remove")
                .on_press(Message::RemovePhoto(role))
                .style(button::danger),
        ]
        .spacing(8),
        None => row![button("Upload").on_press(Message::UploadPhoto(role))],
    };

    column![text(role.label()).size(18), preview, actions]
        .spacing(8)
        .width(220)
        .align_x(Alignment::Center)
        .into()
}
