use iced::alignment::Vertical;
use iced::widget::{Button, Column, Container, Row, Scrollable, Space, Text, button, container};
use iced::{Color, Element, Font, Length, font};

use crate::Message;
use crate::mongo::schema::{NodeKind, SchemaTree};

const INDENT: f32 = 16.0;
const TOGGLE_WIDTH: f32 = 18.0;

pub fn view(tree: &SchemaTree) -> Element<'_, Message> {
    let header_bg = Color::from_rgb8(0xef, 0xf1, 0xf5);
    let muted = Color::from_rgb8(0x6b, 0x72, 0x80);
    let bold = Font { weight: font::Weight::Bold, ..Font::DEFAULT };

    let header = Container::new(Text::new("Database Structure").size(14))
        .width(Length::Fill)
        .padding([6, 8])
        .style(move |_| container::Style {
            background: Some(header_bg.into()),
            ..Default::default()
        });

    let mut body = Column::new().spacing(2).width(Length::Fill);

    for row in tree.visible_rows() {
        let mut line = Row::new()
            .spacing(6)
            .align_y(Vertical::Center)
            .push(Space::with_width(Length::Fixed(row.depth as f32 * INDENT)));

        if row.node.children.is_empty() {
            line = line.push(Space::with_width(Length::Fixed(TOGGLE_WIDTH)));
        } else {
            let indicator = if row.expanded { "▼" } else { "▶" };
            line = line.push(
                Button::new(Text::new(indicator).size(12))
                    .padding([0, 4])
                    .style(button::text)
                    .on_press(Message::SchemaToggle(row.id)),
            );
        }

        line = match &row.node.kind {
            NodeKind::Scalar(ty) => {
                let name = row.node.label.strip_suffix(ty).unwrap_or(&row.node.label);
                line.push(Text::new(name).size(14)).push(Text::new(*ty).size(14).color(muted))
            }
            NodeKind::Database | NodeKind::Collection => {
                line.push(Text::new(row.node.label.as_str()).size(14).font(bold))
            }
            NodeKind::Object | NodeKind::Array => {
                line.push(Text::new(row.node.label.as_str()).size(14))
            }
        };

        body = body.push(line);
    }

    let scrollable = Scrollable::new(Container::new(body).padding([4, 8]))
        .width(Length::Fill)
        .height(Length::Fill);

    Column::new().spacing(2).push(header).push(scrollable).into()
}
