use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::{GarmentId, GarmentRecord, ImageSource};
use crate::Message;

/// Name and product link being edited for one garment
#[derive(Debug, Clone, PartialEq)]
pub struct GarmentEdit {
    pub id: GarmentId,
    pub name: String,
    pub product_url: String,
}

impl GarmentEdit {
    pub fn from_record(record: &GarmentRecord) -> Self {
        Self {
            id: record.id,
            name: record.display_name.clone(),
            product_url: record.purchase_url.clone().unwrap_or_default(),
        }
    }

    /// An empty link field means "no link"
    pub fn product_link(&self) -> Option<&str> {
        let url = self.product_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Text inputs on the wardrobe tab
#[derive(Debug, Clone, Default)]
pub struct WardrobeForm {
    /// Image link for a new item
    pub image_link: String,
    /// Optional shop link for a new item
    pub product_link: String,
    pub editing: Option<GarmentEdit>,
}

pub fn view<'a>(garments: &'a [GarmentRecord], form: &'a WardrobeForm) -> Element<'a, Message> {
    let add_bar = row![
        button("Upload Item").on_press(Message::UploadGarment),
        text_input("Image link (https://...)", &form.image_link)
            .on_input(Message::ImageLinkChanged)
            .on_submit(Message::AddLink)
            .width(Length::FillPortion(3)),
        text_input("Product link (optional)", &form.product_link)
            .on_input(Message::ProductLinkChanged)
            .on_submit(Message::AddLink)
            .width(Length::FillPortion(2)),
        button("Add Link").on_press_maybe((!form.image_link.trim().is_empty()).then_some(Message::AddLink)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let grid: Element<Message> = if garments.is_empty() {
        text("Your wardrobe is empty. Upload a photo of a garment or paste an image link.")
            .size(14)
            .into()
    } else {
        let cards = garments
            .iter()
            .map(|garment| garment_card(garment, form.editing.as_ref()))
            .collect();
        Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0).into()
    };

    let content: Column<Message> = column![text("Wardrobe").size(28), add_bar, scrollable(grid).height(Length::Fill)]
        .spacing(16)
        .padding(24);

    container(content).width(Length::Fill).height(Length::Fill).into()
}

fn garment_card<'a>(garment: &'a GarmentRecord, editing: Option<&'a GarmentEdit>) -> Element<'a, Message> {
    let body: Element<Message> = match editing.filter(|edit| edit.id == garment.id) {
        Some(edit) => column![
            text_input("Name", &edit.name).on_input(Message::EditNameChanged),
            text_input("Product link", &edit.product_url)
                .on_input(Message::EditProductUrlChanged)
                .on_submit(Message::SaveEdit),
            row![
                button("Save").on_press(Message::SaveEdit).style(button::success),
                button("Cancel").on_press(Message::CancelEdit).style(button::secondary),
            ]
            .spacing(8),
        ]
        .spacing(6)
        .into(),
        None => {
            let link_label = if garment.purchase_link().is_some() { "Has product link" } else { "No product link" };
            column![
                text(&garment.display_name).size(16),
                text(format!("{} · {}", garment.category.as_str(), link_label)).size(12),
                row![
                    button("Edit").on_press(Message::EditGarment(garment.id)).style(button::secondary),
                    button("Delete")
                        .on_press(Message::DeleteGarment(garment.id))
                        .style(button::danger),
                ]
                .spacing(8),
            ]
            .spacing(6)
            .into()
        }
    };

    container(column![thumbnail(&garment.source), body].spacing(8))
        .padding(8)
        .width(200)
        .style(container::rounded_box)
        .into()
}

/// Small preview of a garment. Links get a label instead of an image.
pub fn thumbnail<'a>(source: &'a ImageSource) -> Element<'a, Message> {
    match source {
        ImageSource::File(path) => image(Handle::from_path(path)).width(Length::Fill).height(140).into(),
        ImageSource::Link(_) if source.is_inline() => container(text("Embedded image").size(11))
            .width(Length::Fill)
            .height(140)
            .center_y(140)
            .into(),
        ImageSource::Link(link) => container(text(link).size(11))
            .width(Length::Fill)
            .height(140)
            .center_y(140)
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::GarmentCategory;
    use std::path::PathBuf;

    #[test]
    fn test_edit_form_blank_link_is_none() {
        let record = GarmentRecord {
            id: GarmentId::new(),
            source: ImageSource::File(PathBuf::from("a.png")),
            display_name: "a.png".into(),
            category: GarmentCategory::Top,
            purchase_url: None,
            added_at: 0,
        };

        let mut edit = GarmentEdit::from_record(&record);
        assert_eq!(edit.name, "a.png");
        assert_eq!(edit.product_link(), None);

        edit.product_url = "  https://shop.example/a  ".into();
        assert_eq!(edit.product_link(), Some("https://shop.example/a"));
    }
}
