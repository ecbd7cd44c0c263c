use iced::futures::channel::mpsc;
use iced::keyboard::{self, key::Named};
use iced::widget::image::Handle;
use iced::widget::{
    button, center, column, container, mouse_area, opaque, row, scrollable, stack, text,
};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use iced_aw::Wrap;
use log::{error, info, warn};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod config;
mod error;
mod export;
mod state;

use export::ExportOutcome;
use state::{pagination, Catalog, SessionState};

/// Decoded thumbnail pixels, produced on a background task.
#[derive(Debug, Clone)]
struct Thumbnail {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Main application state
struct ImageLabeler {
    /// Catalog of the currently open images folder, if any
    catalog: Option<Catalog>,
    /// In-memory session: categorization, known categories, current page
    session: SessionState,
    /// Decoded thumbnails keyed by filename
    thumbnails: HashMap<String, Handle>,
    /// Filename shown in the zoom overlay, if any
    zoomed: Option<String>,
    /// Status / progress line shown in the header
    status: String,
    /// Whether an export is currently running
    exporting: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Open Folder" button
    OpenFolder,
    /// User clicked a category button under an image
    ToggleCategory { file: String, category: String },
    /// User clicked the Zoom button under an image
    Zoom(String),
    /// User dismissed the zoom overlay
    CloseZoom,
    /// Navigate one page back (no save)
    PrevPage,
    /// Navigate one page forward (auto-saving first)
    NextPage,
    /// User clicked the Save button
    Save,
    /// Background save completed
    SaveFinished(Result<(), String>),
    /// Background thumbnail decode completed
    ThumbnailLoaded {
        file: String,
        thumbnail: Option<Thumbnail>,
    },
    /// User clicked the Export button
    Export,
    /// Export copied another file
    ExportProgress { copied: usize, total: usize },
    /// Export finished or failed
    ExportFinished(Result<ExportOutcome, String>),
}

impl ImageLabeler {
    /// Create a new instance of the application.
    ///
    /// Opens the conventional `images` directory in the working directory
    /// when it exists; otherwise waits for the user to pick a folder.
    fn new() -> (Self, Task<Message>) {
        let mut app = ImageLabeler {
            catalog: None,
            session: SessionState::default(),
            thumbnails: HashMap::new(),
            zoomed: None,
            status: String::from("Open an images folder to start labeling."),
            exporting: false,
        };

        let task = if Path::new(config::DEFAULT_IMAGES_DIR).is_dir() {
            app.open_folder(PathBuf::from(config::DEFAULT_IMAGES_DIR))
        } else {
            Task::none()
        };

        (app, task)
    }

    /// Scan a folder, load its saved session, and kick off thumbnail decodes.
    fn open_folder(&mut self, dir: PathBuf) -> Task<Message> {
        let catalog = match Catalog::scan(&dir) {
            Ok(catalog) => catalog,
            Err(err) => {
                error!("failed to scan {}: {err}", dir.display());
                self.status = format!("Failed to scan {}: {err}", dir.display());
                return Task::none();
            }
        };

        // A malformed settings file is surfaced as-is; it is never silently
        // replaced with a default document.
        let mut session = match SessionState::load(&config::settings_path(&dir)) {
            Ok(session) => session,
            Err(err) => {
                error!("failed to load settings in {}: {err}", dir.display());
                self.status = format!("Failed to load {}: {err}", config::SETTINGS_FILE);
                return Task::none();
            }
        };
        session.page = pagination::clamp_page(session.page, catalog.len(), config::PAGE_SIZE);

        info!("opened {} with {} images", dir.display(), catalog.len());
        self.status = if catalog.is_empty() {
            format!("No images found in {}.", dir.display())
        } else {
            format!("{} images in {}.", catalog.len(), dir.display())
        };
        self.session = session;
        self.thumbnails.clear();
        self.catalog = Some(catalog);
        self.load_visible_thumbnails()
    }

    /// Launch decode tasks for visible images missing from the cache.
    fn load_visible_thumbnails(&self) -> Task<Message> {
        let Some(catalog) = &self.catalog else {
            return Task::none();
        };

        let tasks: Vec<Task<Message>> = catalog
            .visible_slice(self.session.page)
            .iter()
            .filter(|file| !self.thumbnails.contains_key(*file))
            .map(|file| {
                let file = file.clone();
                let path = catalog.path_of(&file);
                Task::perform(load_thumbnail(path), move |thumbnail| {
                    Message::ThumbnailLoaded {
                        file: file.clone(),
                        thumbnail,
                    }
                })
            })
            .collect();

        Task::batch(tasks)
    }

    /// Flush the in-memory session to the settings sidecar.
    fn save_session(&mut self) -> Task<Message> {
        let Some(catalog) = &self.catalog else {
            return Task::none();
        };

        self.status = String::from("Saving...");
        let path = config::settings_path(catalog.dir());
        let session = self.session.clone();

        Task::perform(
            async move {
                let json = session.to_json().map_err(|err| err.to_string())?;
                tokio::fs::write(&path, json)
                    .await
                    .map_err(|err| err.to_string())
            },
            Message::SaveFinished,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Images Folder")
                    .pick_folder();

                if let Some(dir) = folder {
                    return self.open_folder(dir);
                }

                Task::none()
            }
            Message::ToggleCategory { file, category } => {
                self.session.toggle(&file, &category);
                Task::none()
            }
            Message::Zoom(file) => {
                self.zoomed = Some(file);
                Task::none()
            }
            Message::CloseZoom => {
                self.zoomed = None;
                Task::none()
            }
            Message::PrevPage => {
                let prev = pagination::prev_page(self.session.page);
                if prev != self.session.page {
                    self.session.page = prev;
                    return self.load_visible_thumbnails();
                }
                Task::none()
            }
            Message::NextPage => {
                let Some(catalog) = &self.catalog else {
                    return Task::none();
                };

                let next =
                    pagination::next_page(self.session.page, catalog.len(), config::PAGE_SIZE);
                if next != self.session.page {
                    // Advancing a page is a save point for the session.
                    self.session.page = next;
                    return Task::batch([self.save_session(), self.load_visible_thumbnails()]);
                }
                Task::none()
            }
            Message::Save => self.save_session(),
            Message::SaveFinished(result) => {
                match result {
                    Ok(()) => self.status = String::from("Saved."),
                    Err(err) => {
                        error!("save failed: {err}");
                        self.status = format!("Save failed: {err}");
                    }
                }
                Task::none()
            }
            Message::ThumbnailLoaded { file, thumbnail } => {
                if let Some(thumbnail) = thumbnail {
                    self.thumbnails.insert(
                        file,
                        Handle::from_rgba(thumbnail.width, thumbnail.height, thumbnail.rgba),
                    );
                }
                Task::none()
            }
            Message::Export => {
                let Some(catalog) = &self.catalog else {
                    return Task::none();
                };
                if self.exporting {
                    return Task::none();
                }

                self.exporting = true;
                self.status = String::from("Exporting...");

                let images_dir = catalog.dir().to_path_buf();
                let export_dir = config::export_dir(&images_dir);
                let files = catalog.files().to_vec();

                // Progress flows out of the copy loop through a channel; the
                // loop itself copies strictly one file at a time.
                let (tx, rx) = mpsc::unbounded();
                let run = async move {
                    export::run_export(&images_dir, &export_dir, &files, move |copied, total| {
                        let _ = tx.unbounded_send((copied, total));
                    })
                    .await
                    .map_err(|err| err.to_string())
                };

                Task::batch([
                    Task::run(rx, |(copied, total)| Message::ExportProgress { copied, total }),
                    Task::perform(run, Message::ExportFinished),
                ])
            }
            Message::ExportProgress { copied, total } => {
                self.status = format!("{copied}/{total} copied");
                Task::none()
            }
            Message::ExportFinished(result) => {
                self.exporting = false;
                match result {
                    Ok(ExportOutcome::Completed { copied }) => {
                        info!("export complete: {copied} files");
                        // The progress readout is cleared once the run ends.
                        self.status = String::new();
                    }
                    Ok(ExportOutcome::SkippedNoSettings) => {
                        self.status = String::from("Nothing saved yet; export skipped.");
                    }
                    Err(err) => {
                        error!("export failed: {err}");
                        self.status = format!("Export failed: {err}");
                    }
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let body: Element<Message> = match &self.catalog {
            Some(catalog) => {
                let cells: Vec<Element<Message>> = catalog
                    .visible_slice(self.session.page)
                    .iter()
                    .map(|file| self.image_cell(file))
                    .collect();

                scrollable(Wrap::with_elements(cells).spacing(10.0).line_spacing(10.0))
                    .height(Length::Fill)
                    .into()
            }
            None => center(text("No folder open.")).into(),
        };

        let base: Element<Message> = column![self.header(), body]
            .spacing(10)
            .padding(10)
            .into();

        // Zoom overlay: the full-resolution image on top of the page,
        // dismissed by a click anywhere.
        match (&self.zoomed, &self.catalog) {
            (Some(file), Some(catalog)) => {
                let full = iced::widget::image(Handle::from_path(catalog.path_of(file)));
                let overlay = mouse_area(center(full)).on_press(Message::CloseZoom);
                stack![base, opaque(overlay)].into()
            }
            _ => base,
        }
    }

    /// Header row: folder, navigation, save, export, and the status line.
    fn header(&self) -> Element<Message> {
        let pages = self.catalog.as_ref().map(Catalog::page_count).unwrap_or(0);
        let page_label = format!("page {}/{}", self.session.page + 1, pages.max(1));

        row![
            button("Open Folder").on_press(Message::OpenFolder),
            button("<").on_press(Message::PrevPage),
            text(page_label),
            button(">").on_press(Message::NextPage),
            button("Save").on_press(Message::Save),
            button("Export").on_press(Message::Export),
            text(&self.status).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
    }

    /// One grid cell: thumbnail, filename, category toggles, zoom button.
    fn image_cell(&self, file: &str) -> Element<Message> {
        let thumb: Element<Message> = match self.thumbnails.get(file) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fixed(config::THUMBNAIL_EDGE as f32))
                .into(),
            None => container(text("loading..."))
                .width(Length::Fixed(config::THUMBNAIL_EDGE as f32))
                .height(Length::Fixed(config::THUMBNAIL_EDGE as f32))
                .padding(10)
                .into(),
        };

        let mut controls: Vec<Element<Message>> = self
            .session
            .categories
            .iter()
            .map(|category| {
                // Membership is marked by the button style.
                let style = if self.session.is_member(file, category) {
                    button::primary
                } else {
                    button::secondary
                };
                button(text(category.clone()).size(12))
                    .style(style)
                    .on_press(Message::ToggleCategory {
                        file: file.to_string(),
                        category: category.clone(),
                    })
                    .into()
            })
            .collect();
        controls.push(
            button(text("Zoom").size(12))
                .style(button::secondary)
                .on_press(Message::Zoom(file.to_string()))
                .into(),
        );

        column![
            thumb,
            text(file.to_string()).size(12),
            Wrap::with_elements(controls).spacing(4.0).line_spacing(4.0),
        ]
        .spacing(4)
        .width(Length::Fixed(config::THUMBNAIL_EDGE as f32))
        .into()
    }

    /// Keyboard shortcuts: right / `s` advances a page, left / `a` retreats.
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            keyboard::Key::Named(Named::ArrowRight) => Some(Message::NextPage),
            keyboard::Key::Named(Named::ArrowLeft) => Some(Message::PrevPage),
            keyboard::Key::Character("s") => Some(Message::NextPage),
            keyboard::Key::Character("a") => Some(Message::PrevPage),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    iced::application("Image Labeler", ImageLabeler::update, ImageLabeler::view)
        .subscription(ImageLabeler::subscription)
        .theme(ImageLabeler::theme)
        .centered()
        .run_with(ImageLabeler::new)
}

/// Decode and downscale one image on a blocking task.
/// Undecodable files keep their placeholder instead of failing the page.
async fn load_thumbnail(path: PathBuf) -> Option<Thumbnail> {
    let decoded = tokio::task::spawn_blocking(move || {
        let img = image::open(&path)
            .map_err(|err| warn!("failed to decode {}: {err}", path.display()))
            .ok()?;
        let thumb = img
            .thumbnail(config::THUMBNAIL_EDGE, config::THUMBNAIL_EDGE)
            .to_rgba8();
        Some(Thumbnail {
            width: thumb.width(),
            height: thumb.height(),
            rgba: thumb.into_raw(),
        })
    })
    .await;

    decoded.ok().flatten()
}
