use iced::widget::canvas::{Cache, Canvas};
use iced::widget::{button, column, container, row, scrollable, slider, text, Column, Row};
use iced::{Alignment, Element, Length};

use super::canvas::{FittingCanvas, HandleCache};
use super::wardrobe::thumbnail;
use crate::interaction::ControlInput;
use crate::state::placement::LayerDirection;
use crate::state::profile::Profile;
use crate::state::session::FittingSession;
use crate::Message;

/// Wardrobe sidebar, item toolbar and the fitting canvas
pub fn view<'a>(
    session: &'a FittingSession,
    profile: &'a Profile,
    handles: &'a HandleCache,
    cache: &'a Cache,
) -> Element<'a, Message> {
    let canvas = Canvas::new(FittingCanvas {
        photo: profile.active(),
        instructions: session.draw_list(),
        handles,
        cache,
    })
    .width(Length::Fill)
    .height(Length::Fill);

    let stage = column![photo_switcher(profile), toolbar(session), canvas]
        .spacing(12)
        .width(Length::Fill);

    row![sidebar(session), stage].spacing(16).padding(16).into()
}

fn sidebar(session: &FittingSession) -> Element<'_, Message> {
    if !session.can_place() {
        return container(text("No clothes yet. Add some in the Wardrobe tab.").size(14))
            .width(220)
            .padding(8)
            .into();
    }

    let items: Column<Message> = session
        .catalog()
        .iter()
        .map(|garment| {
            button(column![thumbnail(&garment.source), text(&garment.display_name).size(13)].spacing(4))
                .on_press(Message::PlaceGarment(garment.id))
                .style(button::secondary)
                .width(Length::Fill)
                .into()
        })
        .collect::<Column<Message>>()
        .spacing(8);

    column![text("Wardrobe").size(18), scrollable(items).height(Length::Fill)]
        .spacing(8)
        .width(220)
        .into()
}

fn photo_switcher(profile: &Profile) -> Element<'_, Message> {
    let active = profile.active().map(|photo| photo.id);

    profile
        .photos()
        .iter()
        .map(|photo| {
            let style = if Some(photo.id) == active { button::primary } else { button::secondary };
            button(text(photo.role.label()).size(13))
                .on_press(Message::SelectPhoto(photo.id))
                .style(style)
                .into()
        })
        .collect::<Row<Message>>()
        .spacing(8)
        .into()
}

fn toolbar(session: &FittingSession) -> Element<'_, Message> {
    let Some(item) = session.placements().selected_item() else {
        return text("Select an item on the canvas to adjust it.").size(14).into();
    };
    let limits = session.engine().limits();
    let processing = session.is_processing(item.id);

    let mut controls = Row::new().spacing(10).align_y(Alignment::Center);

    if session.garment_for(item.id).and_then(|g| g.purchase_link()).is_some() {
        controls = controls.push(button("Buy").on_press(Message::Buy).style(button::success));
    }

    controls = controls
        .push(button("Bring Forward").on_press(Message::Control(ControlInput::Layer(LayerDirection::Up))))
        .push(button("Send Backward").on_press(Message::Control(ControlInput::Layer(LayerDirection::Down))))
        .push(
            button(if processing { "Processing..." } else { "Auto-Cut" })
                .on_press_maybe((!processing).then_some(Message::RemoveBackground)),
        )
        .push(text("Size").size(13))
        .push(
            slider(limits.min_width..=limits.max_width, item.width, |v| {
                Message::Control(ControlInput::Resize(v))
            })
            .step(1.0)
            .width(140),
        )
        .push(text("Rotate").size(13))
        .push(
            slider(-limits.rotation_limit..=limits.rotation_limit, item.rotation, |v| {
                Message::Control(ControlInput::Rotate(v))
            })
            .step(1.0)
            .width(140),
        )
        .push(
            button("Delete")
                .on_press(Message::Control(ControlInput::Delete))
                .style(button::danger),
        );

    controls.into()
}
