// src/main.rs
use iced::widget::{
    button, checkbox, column, container, pick_list, progress_bar, row, scrollable, text,
    text_input, Column, Row, Space,
};
use iced::{
    alignment::Horizontal, executor, theme, window, Alignment, Application, Background, Color,
    Command, Element, Event, Length, Settings, Subscription, Theme,
};
use log::{debug, warn};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod config;
mod configurator;
mod data_source;
mod format;
mod loader;
mod render;
mod ui;
mod view_state;

use config::{ColumnAlign, ColumnSpec, DataProvider, FileRef, Mode, TableConfig, TableOptions, Tag};
use configurator::{
    ConfigTarget, Configurator, DataCommand, DataInput, EditCommand, EditInput, LinkParams,
};
use data_source::{snapshot_ref_from_path, DataAdapter, StoreAdapter};
use loader::LoadResult;
use render::{CellTone, DisplayColumn};
use ui::Styles;
use view_state::ViewState;

const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);
const FOOTER_HEIGHT: f32 = 50.0;

pub fn main() -> iced::Result {
    let flags = parse_flags(std::env::args().skip(1));
    let level = if flags.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    let mut settings = Settings::with_flags(flags);
    settings.window.size = (1024, 768);
    TableBlock::run(settings)
}

fn parse_flags(args: impl Iterator<Item = String>) -> AppFlags {
    let mut flags = AppFlags::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lazy-load" => flags.lazy_load = true,
            "--verbose" => flags.verbose = true,
            "--surface" => flags.surface = args.next(),
            "--link" => flags.link = args.next(),
            "--theme" => flags.theme = args.next().map(PathBuf::from),
            // runs before the logger is up
            other if other.starts_with("--") => eprintln!("unrecognized flag: {other}"),
            _ => flags.config = Some(PathBuf::from(arg)),
        }
    }
    flags
}

#[derive(Debug, Clone, Default)]
pub struct AppFlags {
    config: Option<PathBuf>,
    /// Tag of the hosting page, adopted as the parent theme.
    theme: Option<PathBuf>,
    /// Configuration surface to run under, matched against the surface names.
    surface: Option<String>,
    /// Shareable-link payload applied on top of the configuration.
    link: Option<String>,
    lazy_load: bool,
    verbose: bool,
}

fn load_config_file(path: &Path) -> Option<TableConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| warn!("cannot read config {}: {err}", path.display()))
        .ok()?;
    serde_json::from_str(&content)
        .map_err(|err| warn!("cannot parse config {}: {err}", path.display()))
        .ok()
}

fn load_tag_file(path: &Path) -> Option<Tag> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| warn!("cannot read theme {}: {err}", path.display()))
        .ok()?;
    serde_json::from_str(&content)
        .map_err(|err| warn!("cannot parse theme {}: {err}", path.display()))
        .ok()
}

struct TableBlock {
    data: TableConfig,
    tag: Tag,
    surface: Configurator,
    adapter: Arc<dyn DataAdapter>,
    snapshot_dir: PathBuf,
    table_data: Vec<data_source::Row>,
    column_names: Vec<String>,
    view: ViewState,
    loading: bool,
    auto_columns: bool,
    window_size: (u32, u32),
    resize_generation: u64,
    table_height: f32,
    history: Vec<AppliedCommand>,
    dialog: Option<Dialog>,
}

/// Commands applied through the configurator, kept so the footer's Undo can
/// play the host's sequencing role.
enum AppliedCommand {
    Edit(EditCommand),
    Data(DataCommand),
}

#[derive(Debug, Clone)]
enum Dialog {
    Data(DataSetup),
    Edit(EditSetup),
}

/// Working state of the data-source dialog (the Data action's custom
/// surface).
#[derive(Debug, Clone)]
struct DataSetup {
    mode: Mode,
    provider: Option<DataProvider>,
    query_id: String,
    api_endpoint: String,
    cid: String,
    store_dir: Option<PathBuf>,
    derive_columns: bool,
    /// Working copies of the per-column display options, seeded from the
    /// configured options or from the fetched column names.
    columns: Vec<ColumnSpec>,
}

impl DataSetup {
    fn from_config(config: &TableConfig, column_names: &[String]) -> Self {
        let columns = match &config.options {
            Some(options) => options.columns.clone(),
            None => column_names.iter().map(ColumnSpec::named).collect(),
        };
        DataSetup {
            mode: config.mode,
            provider: config.data_source,
            query_id: config.query_id.clone(),
            api_endpoint: config.api_endpoint.clone(),
            cid: config.cid().unwrap_or_default().to_string(),
            store_dir: None,
            derive_columns: config.options.is_none(),
            columns,
        }
    }

    /// The command input this dialog submits. Deriving columns clears the
    /// configured options so the next fetch rebuilds them; otherwise the
    /// edited column specs are applied as a whole.
    fn input(&self) -> DataInput {
        let options = if self.derive_columns {
            Some(None)
        } else if self.columns.is_empty() {
            None
        } else {
            Some(Some(TableOptions {
                columns: self.columns.clone(),
            }))
        };
        DataInput {
            mode: Some(self.mode),
            file: (!self.cid.is_empty()).then(|| FileRef {
                cid: self.cid.clone(),
            }),
            data_source: self.provider,
            query_id: Some(self.query_id.clone()),
            api_endpoint: Some(self.api_endpoint.clone()),
            options,
        }
    }
}

/// Working state of the Edit action's form: general settings plus the theme
/// fields the demo exposes.
#[derive(Debug, Clone)]
struct EditSetup {
    title: String,
    description: String,
    dark_shadow: bool,
    custom_font_color: bool,
    font_color: String,
    header_background_color: String,
}

impl EditSetup {
    fn from_state(config: &TableConfig, tag: &Tag) -> Self {
        EditSetup {
            title: config.title.clone(),
            description: config.description.clone(),
            dark_shadow: tag.dark_shadow.unwrap_or(false),
            custom_font_color: tag.custom_font_color.unwrap_or(false),
            font_color: tag.font_color.clone().unwrap_or_default(),
            header_background_color: tag.header_background_color.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Message {
    Loaded(LoadResult),
    SearchChanged(String),
    PageSelected(usize),
    OpenDataDialog,
    OpenEditDialog,
    CloseDialog,
    ModeSelected(Mode),
    ProviderSelected(DataProvider),
    QueryIdChanged(String),
    EndpointChanged(String),
    CidChanged(String),
    BrowseSnapshot,
    SnapshotPicked(Option<PathBuf>),
    DeriveColumnsToggled(bool),
    ColumnTitleChanged(usize, String),
    ColumnFormatChanged(usize, String),
    ColumnProgressToggled(usize, bool),
    ColumnHiddenToggled(usize, bool),
    ColumnNegativeToggled(usize, bool),
    ColumnPositiveToggled(usize, bool),
    ConfirmData,
    EditTitleChanged(String),
    EditDescriptionChanged(String),
    DarkShadowToggled(bool),
    CustomFontColorToggled(bool),
    FontColorChanged(String),
    HeaderBackgroundChanged(String),
    ConfirmEdit,
    Undo,
    WindowResized(u32, u32),
    ResizeSettled(u64),
}

impl Application for TableBlock {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = AppFlags;

    fn new(flags: AppFlags) -> (Self, Command<Message>) {
        let surface = flags
            .surface
            .as_deref()
            .and_then(|name| {
                let name = name.to_lowercase();
                configurator::configurators()
                    .into_iter()
                    .find(|s| s.name.to_lowercase().contains(&name))
            })
            .unwrap_or_else(|| Configurator::for_target(ConfigTarget::Builders));

        let loaded = flags.config.as_deref().and_then(load_config_file);
        let mut data = match (loaded, surface.target) {
            (Some(config), ConfigTarget::Builders) => configurator::with_builder_defaults(&config),
            (Some(config), ConfigTarget::Embedders) => config,
            (None, ConfigTarget::Builders) => TableConfig::default_builder(),
            (None, ConfigTarget::Embedders) => TableConfig::default_data(),
        };
        if let Some(payload) = &flags.link {
            let params = LinkParams {
                data: payload.clone(),
            };
            match configurator::apply_link_params(&data, &params) {
                Ok(merged) => data = merged,
                Err(err) => warn!("ignoring malformed link parameters: {err}"),
            }
        }

        let mut tag = ui::default_tag();
        if let Some(parent) = flags.theme.as_deref().and_then(load_tag_file) {
            tag.set_from_parent(&parent);
        }

        let mut app = TableBlock {
            data: data.clone(),
            tag,
            surface,
            adapter: Arc::new(StoreAdapter::new(DEFAULT_SNAPSHOT_DIR)),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            table_data: Vec::new(),
            column_names: Vec::new(),
            view: ViewState::default(),
            loading: false,
            auto_columns: false,
            window_size: (1024, 768),
            resize_generation: 0,
            table_height: 0.0,
            history: Vec::new(),
            dialog: None,
        };
        app.recompute_table_height();

        let command = if flags.lazy_load {
            Command::none()
        } else {
            app.set_data(data)
        };
        (app, command)
    }

    fn title(&self) -> String {
        if self.data.title.is_empty() {
            "Table Block".to_string()
        } else {
            format!("Table Block - {}", self.data.title)
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::Loaded(result) => {
                self.table_data = result.rows;
                self.column_names = result.column_names;
                self.loading = false;
                self.view.reset();
                // derived columns are a fetch artifact, not an edit command,
                // so they stay out of the undo history
                if self.auto_columns && self.data.options.is_none() && !self.column_names.is_empty()
                {
                    self.data.options =
                        Some(TableOptions::from_column_names(&self.column_names));
                }
                self.recompute_table_height();
                Command::none()
            }

            Message::SearchChanged(value) => {
                self.view.set_search(value);
                Command::none()
            }

            Message::PageSelected(page) => {
                self.view.set_page(page);
                Command::none()
            }

            Message::OpenDataDialog => {
                self.dialog = Some(Dialog::Data(DataSetup::from_config(
                    &self.data,
                    &self.column_names,
                )));
                Command::none()
            }

            Message::OpenEditDialog => {
                self.dialog = Some(Dialog::Edit(EditSetup::from_state(&self.data, &self.tag)));
                Command::none()
            }

            Message::CloseDialog => {
                self.dialog = None;
                Command::none()
            }

            Message::ModeSelected(mode) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.mode = mode;
                }
                Command::none()
            }

            Message::ProviderSelected(provider) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.provider = Some(provider);
                }
                Command::none()
            }

            Message::QueryIdChanged(value) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.query_id = value;
                }
                Command::none()
            }

            Message::EndpointChanged(value) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.api_endpoint = value;
                }
                Command::none()
            }

            Message::CidChanged(value) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.cid = value;
                }
                Command::none()
            }

            Message::BrowseSnapshot => Command::perform(
                async {
                    rfd::FileDialog::new()
                        .add_filter("Snapshot files", &["json", "csv"])
                        .pick_file()
                },
                Message::SnapshotPicked,
            ),

            Message::SnapshotPicked(path) => {
                if let (Some(path), Some(Dialog::Data(setup))) = (path, &mut self.dialog) {
                    if let Some((dir, cid)) = snapshot_ref_from_path(&path) {
                        setup.store_dir = Some(dir);
                        setup.cid = cid;
                    }
                }
                Command::none()
            }

            Message::DeriveColumnsToggled(value) => {
                if let Some(Dialog::Data(setup)) = &mut self.dialog {
                    setup.derive_columns = value;
                }
                Command::none()
            }

            Message::ColumnTitleChanged(index, value) => {
                self.update_column(index, |spec| {
                    spec.title = (!value.is_empty()).then_some(value);
                });
                Command::none()
            }

            Message::ColumnFormatChanged(index, value) => {
                self.update_column(index, |spec| {
                    spec.number_format = (!value.is_empty()).then_some(value);
                });
                Command::none()
            }

            Message::ColumnProgressToggled(index, value) => {
                self.update_column(index, |spec| {
                    spec.kind = value.then(|| "progressbar".to_string());
                });
                Command::none()
            }

            Message::ColumnHiddenToggled(index, value) => {
                self.update_column(index, |spec| spec.is_hidden = value);
                Command::none()
            }

            Message::ColumnNegativeToggled(index, value) => {
                self.update_column(index, |spec| spec.colored_negative_values = value);
                Command::none()
            }

            Message::ColumnPositiveToggled(index, value) => {
                self.update_column(index, |spec| spec.colored_positive_values = value);
                Command::none()
            }

            Message::ConfirmData => {
                let Some(Dialog::Data(setup)) = self.dialog.clone() else {
                    return Command::none();
                };
                let cid = (!setup.cid.is_empty()).then_some(setup.cid.as_str());
                if !configurator::can_confirm(setup.mode, setup.provider, cid) {
                    // silent refusal, the dialog stays open
                    return Command::none();
                }
                if let Some(dir) = &setup.store_dir {
                    if *dir != self.snapshot_dir {
                        self.snapshot_dir = dir.clone();
                        self.adapter = Arc::new(StoreAdapter::new(dir.clone()));
                    }
                }
                self.auto_columns = setup.derive_columns;

                let command = DataCommand::new(&self.data, setup.input());
                let next = command.execute();
                self.history.push(AppliedCommand::Data(command));
                self.dialog = None;
                self.set_data(next)
            }

            Message::EditTitleChanged(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.title = value;
                }
                Command::none()
            }

            Message::EditDescriptionChanged(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.description = value;
                }
                Command::none()
            }

            Message::DarkShadowToggled(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.dark_shadow = value;
                }
                Command::none()
            }

            Message::CustomFontColorToggled(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.custom_font_color = value;
                }
                Command::none()
            }

            Message::FontColorChanged(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.font_color = value;
                }
                Command::none()
            }

            Message::HeaderBackgroundChanged(value) => {
                if let Some(Dialog::Edit(setup)) = &mut self.dialog {
                    setup.header_background_color = value;
                }
                Command::none()
            }

            Message::ConfirmEdit => {
                let Some(Dialog::Edit(setup)) = self.dialog.clone() else {
                    return Command::none();
                };
                let input = EditInput {
                    title: setup.title.clone(),
                    description: setup.description.clone(),
                    theme: Tag {
                        dark_shadow: Some(setup.dark_shadow),
                        custom_font_color: Some(setup.custom_font_color),
                        font_color: (!setup.font_color.is_empty())
                            .then(|| setup.font_color.clone()),
                        header_background_color: (!setup.header_background_color.is_empty())
                            .then(|| setup.header_background_color.clone()),
                        ..Tag::default()
                    },
                };
                let has_advanced = self
                    .surface
                    .actions(&self.column_names)
                    .iter()
                    .find(|action| action.name == "Edit")
                    .is_some_and(|action| action.advanced_schema.is_some());
                let command = EditCommand::new(&self.data, &self.tag, input, has_advanced);
                let (next_config, next_tag) = command.execute();
                self.history.push(AppliedCommand::Edit(command));
                self.tag = next_tag;
                self.dialog = None;
                let load = self.set_data(next_config);
                self.recompute_table_height();
                load
            }

            Message::Undo => match self.history.pop() {
                Some(AppliedCommand::Edit(command)) => {
                    let (config, tag) = command.undo(&self.data);
                    self.tag = tag;
                    let load = self.set_data(config);
                    self.recompute_table_height();
                    load
                }
                Some(AppliedCommand::Data(command)) => self.set_data(command.undo()),
                None => Command::none(),
            },

            Message::WindowResized(width, height) => {
                self.window_size = (width, height);
                self.resize_generation += 1;
                let generation = self.resize_generation;
                Command::perform(
                    async move {
                        tokio::time::sleep(RESIZE_DEBOUNCE).await;
                        generation
                    },
                    Message::ResizeSettled,
                )
            }

            Message::ResizeSettled(generation) => {
                // only the latest scheduled timer applies
                if generation == self.resize_generation {
                    self.recompute_table_height();
                }
                Command::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::subscription::events_with(|event, _status| match event {
            Event::Window(window::Event::Resized { width, height }) => {
                Some(Message::WindowResized(width, height))
            }
            _ => None,
        })
    }

    fn view(&self) -> Element<Message> {
        let styles = ui::resolve_styles(&self.tag);
        match &self.dialog {
            Some(Dialog::Data(setup)) => self.data_dialog_view(setup, &styles),
            Some(Dialog::Edit(setup)) => self.edit_dialog_view(setup, &styles),
            None => self.table_view(&styles),
        }
    }
}

impl TableBlock {
    /// Replace the configuration and kick off a load. Clears the search text
    /// and shows the loading indicator until the result message arrives; the
    /// loader cannot fail, so the indicator always clears.
    fn set_data(&mut self, config: TableConfig) -> Command<Message> {
        self.data = config;
        match configurator::link_params(&self.data) {
            Ok(params) => debug!("shareable link payload: {}", params.data),
            Err(err) => warn!("cannot encode link payload: {err}"),
        }
        self.view.reset();
        self.loading = true;
        let adapter = self.adapter.clone();
        let config = self.data.clone();
        Command::perform(
            async move { loader::load(adapter.as_ref(), &config).await },
            Message::Loaded,
        )
    }

    fn update_column(&mut self, index: usize, apply: impl FnOnce(&mut ColumnSpec)) {
        if let Some(Dialog::Data(setup)) = &mut self.dialog {
            if let Some(spec) = setup.columns.get_mut(index) {
                apply(spec);
            }
        }
    }

    fn recompute_table_height(&mut self) {
        let panel = self
            .tag
            .height
            .unwrap_or(500.0)
            .min(self.window_size.1 as f32);
        let info_height = if self.data.description.is_empty() {
            30.0
        } else {
            55.0
        };
        self.table_height = render::table_height(panel, info_height, FOOTER_HEIGHT);
    }

    fn table_view(&self, styles: &Styles) -> Element<Message> {
        let mut info = Column::new().spacing(5);
        if !self.data.title.is_empty() {
            info = info.push(
                text(&self.data.title)
                    .size(16)
                    .style(theme::Text::Color(styles.text)),
            );
        }
        if !self.data.description.is_empty() {
            info = info.push(
                text(&self.data.description)
                    .size(13)
                    .style(theme::Text::Color(styles.text)),
            );
        }

        let filtered = view_state::filter_rows(
            &self.table_data,
            self.data.options.as_ref(),
            &self.view.search_text,
        );
        let total_pages = view_state::total_pages(filtered.len());

        let body: Element<Message> = if self.loading {
            container(
                text("Loading...")
                    .size(16)
                    .style(theme::Text::Color(styles.text)),
            )
            .width(Length::Fill)
            .height(Length::Fixed(self.table_height))
            .center_x()
            .center_y()
            .into()
        } else {
            let columns = render::display_columns(self.data.options.as_ref(), &self.table_data);
            if columns.is_empty() {
                container(
                    text("No columns configured. Use Data to choose a source.")
                        .size(14)
                        .style(theme::Text::Color(styles.text)),
                )
                .width(Length::Fill)
                .height(Length::Fixed(self.table_height))
                .center_x()
                .center_y()
                .into()
            } else {
                let page = view_state::page_slice(&filtered, &self.view);

                let header = Row::with_children(
                    columns
                        .iter()
                        .map(|column| {
                            container(
                                text(&column.title)
                                    .size(13)
                                    .style(theme::Text::Color(styles.header_fg)),
                            )
                            .width(Length::FillPortion(1))
                            .padding(5)
                            .style(theme::Container::Custom(Box::new(ContainerStyle {
                                bg: styles.header_bg,
                            })))
                            .into()
                        })
                        .collect(),
                )
                .spacing(1);

                let rows = Column::with_children(
                    page.into_iter()
                        .map(|row_data| {
                            Row::with_children(
                                columns
                                    .iter()
                                    .map(|column| self.cell_element(column, row_data, styles))
                                    .collect(),
                            )
                            .spacing(1)
                            .into()
                        })
                        .collect(),
                )
                .spacing(1);

                scrollable(column![header, rows].spacing(1))
                    .height(Length::Fixed(self.table_height))
                    .into()
            }
        };

        let footer = self.footer_view(total_pages, styles);

        container(column![info, body, footer].spacing(10).padding(10))
            .width(ui::panel_width(&self.tag))
            .height(Length::Fill)
            .style(theme::Container::Custom(Box::new(ContainerStyle {
                bg: styles.background,
            })))
            .into()
    }

    fn cell_element<'a>(
        &self,
        column: &DisplayColumn,
        row_data: &data_source::Row,
        styles: &Styles,
    ) -> Element<'a, Message> {
        let display = render::cell_display(column, row_data.get(&column.spec.name));
        let color = match display.tone {
            CellTone::Plain => styles.text,
            CellTone::Positive => styles.positive,
            CellTone::Negative => styles.negative,
        };
        let alignment = match column.align() {
            ColumnAlign::Left => Horizontal::Left,
            ColumnAlign::Center => Horizontal::Center,
            ColumnAlign::Right => Horizontal::Right,
        };

        let content: Element<Message> = if let Some(percent) = display.progress_percent {
            row![
                progress_bar(0.0..=100.0, percent)
                    .width(Length::Fixed(60.0))
                    .height(Length::Fixed(8.0))
                    .style(theme::ProgressBar::Custom(Box::new(ProgressStyle {
                        bar: styles.progress_bar,
                    }))),
                text(display.text)
                    .size(12)
                    .style(theme::Text::Color(color)),
            ]
            .spacing(5)
            .align_items(Alignment::Center)
            .into()
        } else {
            text(display.text)
                .size(12)
                .width(Length::Fill)
                .horizontal_alignment(alignment)
                .style(theme::Text::Color(color))
                .into()
        };

        container(content)
            .width(Length::FillPortion(1))
            .padding(5)
            .style(theme::Container::Custom(Box::new(ContainerStyle {
                bg: styles.background,
            })))
            .into()
    }

    fn footer_view(&self, total_pages: usize, styles: &Styles) -> Element<Message> {
        let mut footer = Row::new().spacing(10).align_items(Alignment::Center);

        if let Some(label) = render::row_count_label(self.table_data.len()) {
            footer = footer.push(
                container(
                    text(label)
                        .size(12)
                        .style(theme::Text::Color(styles.footer_fg)),
                )
                .padding([4, 8])
                .style(theme::Container::Custom(Box::new(ContainerStyle {
                    bg: styles.footer_bg,
                }))),
            );
        }

        if !self.table_data.is_empty() {
            footer = footer.push(
                text_input("Search", &self.view.search_text)
                    .on_input(Message::SearchChanged)
                    .size(12)
                    .padding(4)
                    .width(Length::Fixed(168.0)),
            );
        }

        if view_state::pagination_visible(total_pages) {
            let page = self.view.page_number;
            let mut prev = button(text("<").size(12)).padding([2, 8]).style(
                theme::Button::Custom(Box::new(ButtonStyle::footer(styles))),
            );
            if page > 1 {
                prev = prev.on_press(Message::PageSelected(page - 1));
            }
            let mut next = button(text(">").size(12)).padding([2, 8]).style(
                theme::Button::Custom(Box::new(ButtonStyle::footer(styles))),
            );
            if page < total_pages {
                next = next.on_press(Message::PageSelected(page + 1));
            }
            let indicator = container(
                text(format!("{page} / {total_pages}"))
                    .size(12)
                    .style(theme::Text::Color(styles.pagination_active_fg)),
            )
            .padding([4, 8])
            .style(theme::Container::Custom(Box::new(ContainerStyle {
                bg: styles.pagination_active_bg,
            })));
            footer = footer
                .push(prev)
                .push(indicator)
                .push(next);
        }

        footer = footer.push(Space::with_width(Length::Fill));

        if !self.history.is_empty() {
            footer = footer.push(
                button(text("Undo").size(12))
                    .on_press(Message::Undo)
                    .padding([4, 8])
                    .style(theme::Button::Custom(Box::new(ButtonStyle::footer(styles)))),
            );
        }
        footer = footer.push(
            button(text("Edit").size(12))
                .on_press(Message::OpenEditDialog)
                .padding([4, 8])
                .style(theme::Button::Custom(Box::new(ButtonStyle::footer(styles)))),
        );
        footer = footer.push(
            button(text("Data").size(12))
                .on_press(Message::OpenDataDialog)
                .padding([4, 8])
                .style(theme::Button::Custom(Box::new(ButtonStyle::footer(styles)))),
        );

        footer.into()
    }

    fn data_dialog_view(&self, setup: &DataSetup, styles: &Styles) -> Element<Message> {
        let mut fields = column![
            text("Data Source")
                .size(20)
                .style(theme::Text::Color(styles.text)),
            row![
                text("Mode").size(14).style(theme::Text::Color(styles.text)),
                pick_list(&Mode::ALL[..], Some(setup.mode), Message::ModeSelected),
            ]
            .spacing(10)
            .align_items(Alignment::Center),
        ]
        .spacing(10);

        match setup.mode {
            Mode::Live => {
                fields = fields.push(
                    row![
                        text("Provider")
                            .size(14)
                            .style(theme::Text::Color(styles.text)),
                        pick_list(
                            &DataProvider::ALL[..],
                            setup.provider,
                            Message::ProviderSelected
                        )
                        .placeholder("Select provider"),
                    ]
                    .spacing(10)
                    .align_items(Alignment::Center),
                );
                fields = fields.push(
                    text_input("Query id", &setup.query_id)
                        .on_input(Message::QueryIdChanged)
                        .padding(8),
                );
                if setup.provider == Some(DataProvider::Custom) {
                    fields = fields.push(
                        text_input("API endpoint", &setup.api_endpoint)
                            .on_input(Message::EndpointChanged)
                            .padding(8),
                    );
                }
            }
            Mode::Snapshot => {
                fields = fields.push(
                    row![
                        text_input("Content identifier", &setup.cid)
                            .on_input(Message::CidChanged)
                            .padding(8),
                        button(text("Browse...").size(12))
                            .on_press(Message::BrowseSnapshot)
                            .padding([6, 10]),
                    ]
                    .spacing(10)
                    .align_items(Alignment::Center),
                );
            }
        }

        if !setup.columns.is_empty() {
            fields = fields.push(
                text("Columns")
                    .size(14)
                    .style(theme::Text::Color(styles.text)),
            );
            let mut list = Column::new().spacing(6);
            for (index, spec) in setup.columns.iter().enumerate() {
                list = list.push(
                    row![
                        text(&spec.name)
                            .size(12)
                            .width(Length::Fixed(90.0))
                            .style(theme::Text::Color(styles.text)),
                        text_input("Title", spec.title.as_deref().unwrap_or(""))
                            .on_input(move |value| Message::ColumnTitleChanged(index, value))
                            .size(12)
                            .padding(4),
                        text_input("Format", spec.number_format.as_deref().unwrap_or(""))
                            .on_input(move |value| Message::ColumnFormatChanged(index, value))
                            .size(12)
                            .padding(4)
                            .width(Length::Fixed(70.0)),
                        checkbox("Bar", spec.is_progress_bar(), move |value| {
                            Message::ColumnProgressToggled(index, value)
                        }),
                        checkbox("Hide", spec.is_hidden, move |value| {
                            Message::ColumnHiddenToggled(index, value)
                        }),
                        checkbox("Neg", spec.colored_negative_values, move |value| {
                            Message::ColumnNegativeToggled(index, value)
                        }),
                        checkbox("Pos", spec.colored_positive_values, move |value| {
                            Message::ColumnPositiveToggled(index, value)
                        }),
                    ]
                    .spacing(6)
                    .align_items(Alignment::Center),
                );
            }
            fields = fields.push(scrollable(list).height(Length::Fixed(180.0)));
        }

        fields = fields.push(checkbox(
            "Derive columns from fetched data",
            setup.derive_columns,
            Message::DeriveColumnsToggled,
        ));

        fields = fields.push(
            row![
                button(text("Confirm").size(14))
                    .on_press(Message::ConfirmData)
                    .padding([8, 16]),
                button(text("Cancel").size(14))
                    .on_press(Message::CloseDialog)
                    .padding([8, 16]),
            ]
            .spacing(10),
        );

        self.dialog_frame(fields.into(), styles)
    }

    fn edit_dialog_view(&self, setup: &EditSetup, styles: &Styles) -> Element<Message> {
        let fields = column![
            text("Edit")
                .size(20)
                .style(theme::Text::Color(styles.text)),
            text_input("Title", &setup.title)
                .on_input(Message::EditTitleChanged)
                .padding(8),
            text_input("Description", &setup.description)
                .on_input(Message::EditDescriptionChanged)
                .padding(8),
            checkbox(
                "Dark shadow",
                setup.dark_shadow,
                Message::DarkShadowToggled
            ),
            checkbox(
                "Custom font color",
                setup.custom_font_color,
                Message::CustomFontColorToggled
            ),
            text_input("Font color (#rrggbb)", &setup.font_color)
                .on_input(Message::FontColorChanged)
                .padding(8),
            text_input("Header background (#rrggbb)", &setup.header_background_color)
                .on_input(Message::HeaderBackgroundChanged)
                .padding(8),
            row![
                button(text("Confirm").size(14))
                    .on_press(Message::ConfirmEdit)
                    .padding([8, 16]),
                button(text("Cancel").size(14))
                    .on_press(Message::CloseDialog)
                    .padding([8, 16]),
            ]
            .spacing(10),
        ]
        .spacing(10);

        self.dialog_frame(fields.into(), styles)
    }

    fn dialog_frame<'a>(
        &self,
        content: Element<'a, Message>,
        styles: &Styles,
    ) -> Element<'a, Message> {
        let dialog = container(content)
            .width(Length::Fixed(640.0))
            .padding(20)
            .style(theme::Container::Custom(Box::new(ContainerStyle {
                bg: styles.background,
            })));

        container(dialog)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .style(theme::Container::Custom(Box::new(OverlayStyle)))
            .into()
    }
}

// Custom styles for containers, buttons and progress bars

struct ContainerStyle {
    bg: Color,
}

impl iced::widget::container::StyleSheet for ContainerStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            background: Some(Background::Color(self.bg)),
            ..iced::widget::container::Appearance::default()
        }
    }
}

struct OverlayStyle;

impl iced::widget::container::StyleSheet for OverlayStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::container::Appearance {
        iced::widget::container::Appearance {
            background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.7))),
            ..iced::widget::container::Appearance::default()
        }
    }
}

struct ButtonStyle {
    bg: Color,
    fg: Color,
}

impl ButtonStyle {
    fn footer(styles: &Styles) -> Self {
        ButtonStyle {
            bg: styles.footer_bg,
            fg: styles.footer_fg,
        }
    }
}

impl iced::widget::button::StyleSheet for ButtonStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> iced::widget::button::Appearance {
        iced::widget::button::Appearance {
            background: Some(Background::Color(self.bg)),
            border_radius: 4.0.into(),
            text_color: self.fg,
            ..iced::widget::button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> iced::widget::button::Appearance {
        iced::widget::button::Appearance {
            background: Some(Background::Color(Color {
                a: 0.8,
                ..self.bg
            })),
            ..self.active(style)
        }
    }
}

struct ProgressStyle {
    bar: Color,
}

impl iced::widget::progress_bar::StyleSheet for ProgressStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> iced::widget::progress_bar::Appearance {
        iced::widget::progress_bar::Appearance {
            background: Background::Color(Color {
                a: 0.2,
                ..self.bar
            }),
            bar: Background::Color(self.bar),
            border_radius: 4.0.into(),
        }
    }
}
