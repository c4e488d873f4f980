use iced::alignment::Vertical;
use iced::widget::{Column, Container, Row, Scrollable, Text, container, text_input};
use iced::{Color, Element, Length};
use iced_aw::{TabLabel, Tabs};

use crate::Message;
use crate::filter::RecordTable;
use crate::mongo::records::RecordKind;

pub fn view(tables: &[RecordTable], active: RecordKind) -> Element<'_, Message> {
    let mut tabs = Tabs::new(Message::TabSelected);
    for table in tables {
        let kind = table.kind();
        tabs = tabs.push(kind, TabLabel::Text(kind.title().to_string()), table_view(table));
    }
    tabs.set_active_tab(&active).height(Length::Fill).into()
}

fn table_view(table: &RecordTable) -> Element<'_, Message> {
    let kind = table.kind();
    let row_color_a = Color::from_rgb8(0xfe, 0xfe, 0xfe);
    let row_color_b = Color::from_rgb8(0xf9, 0xfd, 0xf9);
    let header_bg = Color::from_rgb8(0xef, 0xf1, 0xf5);

    let search = Row::new()
        .spacing(8)
        .align_y(Vertical::Center)
        .push(Text::new("Search:").size(14))
        .push(
            text_input("", table.query())
                .padding([4, 6])
                .on_input(move |value| Message::SearchChanged(kind, value))
                .width(Length::Fill),
        );

    let status =
        Text::new(format!("Showing {} of {}", table.visible_count(), table.total_count())).size(12);

    let header_row = kind.columns().iter().fold(Row::new().width(Length::Fill), |row, column| {
        row.push(cell(Text::new(*column).size(14)))
    });
    let header = Container::new(header_row).width(Length::Fill).style(move |_| container::Style {
        background: Some(header_bg.into()),
        ..Default::default()
    });

    let mut body = Column::new().spacing(1).width(Length::Fill);
    for (index, values) in table.visible_rows().enumerate() {
        let background = if index % 2 == 0 { row_color_a } else { row_color_b };
        let content = values.iter().fold(Row::new().width(Length::Fill), |row, value| {
            row.push(cell(Text::new(value.as_str()).size(14)))
        });
        body = body.push(Container::new(content).width(Length::Fill).style(move |_| {
            container::Style { background: Some(background.into()), ..Default::default() }
        }));
    }

    Column::new()
        .spacing(6)
        .padding(8)
        .push(search)
        .push(status)
        .push(header)
        .push(Scrollable::new(body).width(Length::Fill).height(Length::Fill))
        .into()
}

fn cell<'a>(content: Text<'a>) -> Container<'a, Message> {
    Container::new(content).width(Length::FillPortion(1)).padding([6, 8])
}
