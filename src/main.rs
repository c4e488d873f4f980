mod filter;
mod logging;
mod mongo;
mod settings;
mod ui;

use iced::widget::pane_grid::{self, ResizeEvent};
use iced::widget::{Column, Container};
use iced::{Element, Length, Size, Task, Theme, border};

use crate::filter::RecordTable;
use crate::mongo::connection::{self, Connection};
use crate::mongo::records::{self, RecordKind, RecordSource};
use crate::mongo::schema::{self, NodeId, SchemaSource, SchemaTree};
use crate::settings::AppSettings;

const WINDOW_TITLE: &str = "MongoDB Manager";
const WINDOW_SIZE: Size = Size::new(1200.0, 800.0);
const SIDEBAR_RATIO: f32 = 1.0 / 3.0;

fn main() -> iced::Result {
    let (mut settings, settings_error) = match settings::load_from_disk() {
        Ok(settings) => (settings, None),
        Err(error) => (AppSettings::default(), Some(error)),
    };
    settings.apply_env_override();
    logging::init(&settings);

    if let Some(error) = settings_error {
        log::warn!(
            "Failed to read {}: {error}; using defaults",
            settings::settings_path().display()
        );
    }

    let connection = match connection::connect(&settings) {
        Ok(connection) => connection,
        Err(error) => {
            log::error!("MongoDB connection failed: {error}");
            std::process::exit(1);
        }
    };
    log::info!("MongoDB connection established ({})", connection.db_name);

    let app = App::load(connection);

    iced::application(App::title, App::update, App::view)
        .theme(App::theme)
        .window_size(WINDOW_SIZE)
        .run_with(move || (app, Task::none()))
}

pub(crate) struct App {
    // Held so the driver client lives as long as the window.
    _connection: Option<Connection>,
    panes: pane_grid::State<PaneContent>,
    schema: SchemaTree,
    tables: Vec<RecordTable>,
    active_tab: RecordKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaneContent {
    Sidebar,
    Main,
}

#[derive(Debug, Clone)]
pub(crate) enum Message {
    PaneResized(ResizeEvent),
    SchemaToggle(NodeId),
    TabSelected(RecordKind),
    SearchChanged(RecordKind, String),
}

impl App {
    fn load(connection: Connection) -> Self {
        let mut app = Self::load_from(&connection.db_name, &connection.database);
        app._connection = Some(connection);
        app
    }

    /// Builds the schema tree and runs every loader, blocking until done.
    /// Each loader is independent of the others' failures.
    pub(crate) fn load_from<S>(db_name: &str, source: &S) -> Self
    where
        S: SchemaSource + RecordSource + ?Sized,
    {
        let schema = schema::build_schema_tree(db_name, source);
        let tables = RecordKind::ALL
            .into_iter()
            .map(|kind| RecordTable::new(kind, records::load(source, kind)))
            .collect();

        Self::from_parts(schema, tables)
    }

    pub(crate) fn from_parts(schema: SchemaTree, tables: Vec<RecordTable>) -> Self {
        let (mut panes, sidebar) = pane_grid::State::new(PaneContent::Sidebar);
        if let Some((_, split)) = panes.split(pane_grid::Axis::Vertical, sidebar, PaneContent::Main)
        {
            panes.resize(split, SIDEBAR_RATIO);
        }

        Self { _connection: None, panes, schema, tables, active_tab: RecordKind::Users }
    }

    fn title(&self) -> String {
        WINDOW_TITLE.to_string()
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PaneResized(event) => {
                self.panes.resize(event.split, event.ratio);
            }
            Message::SchemaToggle(node_id) => {
                self.schema.toggle(node_id);
            }
            Message::TabSelected(kind) => {
                self.active_tab = kind;
            }
            Message::SearchChanged(kind, query) => {
                if let Some(table) = self.table_mut(kind) {
                    table.set_query(query);
                }
            }
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let content_grid =
            pane_grid::PaneGrid::new(&self.panes, |_, pane_state, _| match pane_state {
                PaneContent::Sidebar => {
                    pane_grid::Content::new(Self::pane(ui::schema_view::view(&self.schema)))
                }
                PaneContent::Main => pane_grid::Content::new(Self::pane(
                    ui::record_tabs::view(&self.tables, self.active_tab),
                )),
            })
            .on_resize(8, Message::PaneResized)
            .spacing(8)
            .height(Length::Fill);

        Column::new().push(content_grid).padding(8).height(Length::Fill).into()
    }

    fn theme(&self) -> Theme {
        Theme::default()
    }

    fn pane(content: Element<'_, Message>) -> Element<'_, Message> {
        Container::new(content)
            .padding(8)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(Self::pane_style)
            .into()
    }

    fn pane_style(theme: &Theme) -> iced::widget::container::Style {
        let palette = theme.extended_palette();

        iced::widget::container::Style {
            background: Some(palette.background.weak.color.into()),
            border: border::rounded(6).width(1).color(palette.primary.weak.color),
            ..Default::default()
        }
    }

    fn table_mut(&mut self, kind: RecordKind) -> Option<&mut RecordTable> {
        self.tables.iter_mut().find(|table| table.kind() == kind)
    }
}
