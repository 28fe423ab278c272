use iced::widget::{button, canvas, column, container, row, text, Column};
use iced::{event, Alignment, Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

mod error;
mod imaging;
mod interaction;
mod render;
mod shop;
mod state;
mod ui;

use error::StudioError;
use imaging::{loader, store};
use interaction::{ControlInput, PointerEvent, PointerTarget};
use state::data::{BasePhoto, GarmentCategory, GarmentId, GarmentRecord, ImageSource, PhotoId, PhotoRole, PixelData, PlacementId};
use state::library::Library;
use state::profile::Profile;
use state::session::{FilterOutcome, FittingSession};
use state::settings::Settings;
use ui::canvas::HandleCache;
use ui::pointer::{PointerTracker, RawPointer};
use ui::wardrobe::{GarmentEdit, WardrobeForm};

/// Name given to items added from a pasted link
const WEB_ITEM_NAME: &str = "Web Item";

/// Errors crossing a task boundary; messages must be cloneable
type Shared<T> = Result<T, Arc<StudioError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Profile,
    Wardrobe,
    Studio,
}

/// Main application state
struct StyleStudio {
    /// The record store for wardrobe and profile photos
    library: Library,
    settings: Settings,
    profile: Profile,
    /// Wardrobe as last read from the library
    wardrobe: Vec<GarmentRecord>,
    form: WardrobeForm,
    tab: Tab,
    /// Present only while the studio tab is open
    session: Option<FittingSession>,
    handles: HandleCache,
    canvas_cache: canvas::Cache,
    /// What the canvas cache was last drawn from
    drawn: Option<(u64, Option<PhotoId>)>,
    pointer: PointerTracker,
    /// Dismissable message shown above every tab
    notice: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    TabSelected(Tab),
    DismissNotice,

    // Profile
    UploadPhoto(PhotoRole),
    PhotoImported(PhotoRole, Shared<PathBuf>),
    PhotoLoaded(Shared<BasePhoto>),
    PhotosLoaded(Vec<BasePhoto>),
    RemovePhoto(PhotoRole),
    SelectPhoto(PhotoId),

    // Wardrobe
    UploadGarment,
    GarmentImported(String, Shared<PathBuf>),
    ImageLinkChanged(String),
    ProductLinkChanged(String),
    AddLink,
    EditGarment(GarmentId),
    EditNameChanged(String),
    EditProductUrlChanged(String),
    SaveEdit,
    CancelEdit,
    DeleteGarment(GarmentId),

    // Studio
    PlaceGarment(GarmentId),
    GarmentLoaded(GarmentId, Shared<PixelData>),
    /// Pointer-down on the canvas, already hit-tested
    PointerPressed {
        event: PointerEvent,
        target: PointerTarget,
        canvas: Size,
    },
    /// Window-level move/up/cancel during a drag
    PointerInput(RawPointer),
    Control(ControlInput),
    RemoveBackground,
    BackgroundRemoved(PlacementId, Shared<PixelData>),
    Buy,
    /// A background file operation finished; nothing to update
    Settled,
}

impl StyleStudio {
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        if settings.is_default() {
            log::debug!("Using default settings");
        }
        // Write defaults once so there is a file to edit
        if Settings::default_path().is_some_and(|path| !path.exists()) {
            if let Err(e) = settings.save() {
                log::warn!("Could not write default settings: {}", e);
            }
        }
        let mut notice = None;

        let library = match Library::open_default() {
            Ok(library) => library,
            Err(e) => {
                // Keep the app usable; nothing will survive a restart
                log::error!("Could not open the library: {}", e);
                notice = Some(format!("Could not open your saved wardrobe ({}). Changes will not be saved.", e));
                match Library::open_in_memory() {
                    Ok(library) => library,
                    Err(e) => {
                        log::error!("In-memory library failed too: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        };

        let wardrobe = library.garments().unwrap_or_else(|e| {
            log::error!("Failed to read wardrobe: {}", e);
            Vec::new()
        });
        let photos = library.photos().unwrap_or_else(|e| {
            log::error!("Failed to read profile photos: {}", e);
            Vec::new()
        });
        log::info!(
            "Style Studio initialized from {} with {} garments and {} photos",
            library.path().display(),
            library.garment_count().unwrap_or(wardrobe.len() as i64),
            photos.len()
        );

        let app = StyleStudio {
            library,
            settings,
            profile: Profile::default(),
            wardrobe,
            form: WardrobeForm::default(),
            tab: Tab::Profile,
            session: None,
            handles: HandleCache::default(),
            canvas_cache: canvas::Cache::new(),
            drawn: None,
            pointer: PointerTracker::default(),
            notice,
        };

        (app, Task::perform(loader::load_photos(photos), Message::PhotosLoaded))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        self.sync_canvas();
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                if tab == self.tab {
                    return Task::none();
                }
                if tab == Tab::Studio {
                    // No photo, no session: the tab shows a placeholder instead
                    if self.profile.active().is_some() {
                        self.session = Some(FittingSession::new(self.wardrobe.clone(), &self.settings));
                    }
                } else if self.tab == Tab::Studio {
                    self.session = None;
                    self.prune_handles();
                }
                self.tab = tab;
                Task::none()
            }
            Message::DismissNotice => {
                self.notice = None;
                Task::none()
            }

            Message::UploadPhoto(role) => {
                let Some(path) = pick_image(&format!("Select {} Photo", role.label())) else {
                    return Task::none();
                };
                Task::perform(store::import_image(path, store::images_dir()), move |result| {
                    Message::PhotoImported(role, result.map_err(Arc::new))
                })
            }
            Message::PhotoImported(role, Ok(path)) => match self.library.set_photo(role, &path) {
                Ok((record, replaced)) => {
                    let load = Task::perform(loader::load_photo(record), |result| {
                        Message::PhotoLoaded(result.map_err(Arc::new))
                    });
                    match replaced {
                        Some(old) => Task::batch([load, discard(old.path)]),
                        None => load,
                    }
                }
                Err(e) => {
                    self.report(&e.into());
                    discard(path)
                }
            },
            Message::PhotoLoaded(Ok(photo)) => {
                self.handles.ensure(&photo.pixels);
                self.profile.set(photo);
                self.prune_handles();
                Task::none()
            }
            Message::PhotosLoaded(photos) => {
                for photo in &photos {
                    self.handles.ensure(&photo.pixels);
                }
                self.profile = Profile::new(photos);
                Task::none()
            }
            Message::RemovePhoto(role) => match self.library.remove_photo(role) {
                Ok(record) => {
                    self.profile.remove(role);
                    self.prune_handles();
                    record.map(|r| discard(r.path)).unwrap_or_else(Task::none)
                }
                Err(e) => {
                    self.report(&e.into());
                    Task::none()
                }
            },
            Message::SelectPhoto(id) => {
                self.profile.select(id);
                Task::none()
            }

            Message::UploadGarment => {
                let Some(path) = pick_image("Select Garment Image") else {
                    return Task::none();
                };
                let name = store::file_name(&path);
                Task::perform(store::import_image(path, store::images_dir()), move |result| {
                    Message::GarmentImported(name.clone(), result.map_err(Arc::new))
                })
            }
            Message::GarmentImported(name, Ok(path)) => {
                match self
                    .library
                    .add_garment(ImageSource::File(path.clone()), &name, GarmentCategory::Top, None)
                {
                    Ok(record) => {
                        // Straight into the edit form so a name and link can be set
                        self.form.editing = Some(GarmentEdit::from_record(&record));
                        self.refresh_wardrobe();
                        Task::none()
                    }
                    Err(e) => {
                        self.report(&e.into());
                        discard(path)
                    }
                }
            }
            Message::ImageLinkChanged(value) => {
                self.form.image_link = value;
                Task::none()
            }
            Message::ProductLinkChanged(value) => {
                self.form.product_link = value;
                Task::none()
            }
            Message::AddLink => {
                let link = self.form.image_link.trim();
                if link.is_empty() {
                    return Task::none();
                }
                let source = ImageSource::from_link(link);
                let product = self.form.product_link.trim();
                let product = (!product.is_empty()).then_some(product);

                match self.library.add_garment(source, WEB_ITEM_NAME, GarmentCategory::Top, product) {
                    Ok(_) => {
                        self.form.image_link.clear();
                        self.form.product_link.clear();
                        self.refresh_wardrobe();
                    }
                    Err(e) => self.report(&e.into()),
                }
                Task::none()
            }
            Message::EditGarment(id) => {
                self.form.editing = self
                    .wardrobe
                    .iter()
                    .find(|g| g.id == id)
                    .map(GarmentEdit::from_record);
                Task::none()
            }
            Message::EditNameChanged(value) => {
                if let Some(edit) = self.form.editing.as_mut() {
                    edit.name = value;
                }
                Task::none()
            }
            Message::EditProductUrlChanged(value) => {
                if let Some(edit) = self.form.editing.as_mut() {
                    edit.product_url = value;
                }
                Task::none()
            }
            Message::SaveEdit => {
                if let Some(edit) = self.form.editing.take() {
                    let name = match edit.name.trim() {
                        "" => WEB_ITEM_NAME,
                        name => name,
                    };
                    match self.library.update_garment(edit.id, name, edit.product_link()) {
                        Ok(true) => self.refresh_wardrobe(),
                        Ok(false) => log::debug!("Garment {} was deleted while being edited", edit.id),
                        Err(e) => self.report(&e.into()),
                    }
                }
                Task::none()
            }
            Message::CancelEdit => {
                self.form.editing = None;
                Task::none()
            }
            Message::DeleteGarment(id) => {
                let source = match self.library.garment(id) {
                    Ok(record) => record.map(|g| g.source),
                    Err(e) => {
                        self.report(&e.into());
                        return Task::none();
                    }
                };
                if self.form.editing.as_ref().is_some_and(|edit| edit.id == id) {
                    self.form.editing = None;
                }
                match self.library.delete_garment(id) {
                    Ok(_) => {
                        self.refresh_wardrobe();
                        match source {
                            Some(ImageSource::File(path)) => discard(path),
                            _ => Task::none(),
                        }
                    }
                    Err(e) => {
                        self.report(&e.into());
                        Task::none()
                    }
                }
            }

            Message::PlaceGarment(id) => {
                let Some(garment) = self.session.as_ref().and_then(|s| s.garment(id)) else {
                    return Task::none();
                };
                Task::perform(loader::load_garment(id, garment.source.clone()), |(id, result)| {
                    Message::GarmentLoaded(id, result.map_err(Arc::new))
                })
            }
            Message::GarmentLoaded(id, Ok(pixels)) => {
                if let Some(session) = self.session.as_mut() {
                    self.handles.ensure(&pixels);
                    if let Err(e) = session.place(id, pixels) {
                        self.report(&e);
                    }
                }
                Task::none()
            }
            Message::PointerPressed { event, target, canvas } => {
                if let Some(session) = self.session.as_mut() {
                    self.pointer
                        .resolve(RawPointer::at(iced::Point::new(event.x, event.y), event.phase));
                    session.set_canvas_size(canvas.width, canvas.height);
                    session.handle_pointer(event, Some(target));
                }
                Task::none()
            }
            Message::PointerInput(raw) => {
                if let Some(session) = self.session.as_mut() {
                    let event = self.pointer.resolve(raw);
                    session.handle_pointer(event, None);
                }
                Task::none()
            }
            Message::Control(input) => {
                if let Some(session) = self.session.as_mut() {
                    match session.apply_to_selected(input) {
                        Ok(()) => {}
                        Err(e) if e.is_benign() => log::debug!("Ignored control on stale item: {}", e),
                        Err(e) => self.report(&e),
                    }
                }
                if input == ControlInput::Delete {
                    self.prune_handles();
                }
                Task::none()
            }
            Message::RemoveBackground => {
                let Some(session) = self.session.as_mut() else {
                    return Task::none();
                };
                let Some(id) = session.placements().selected() else {
                    return Task::none();
                };
                if session.is_processing(id) {
                    return Task::none();
                }
                match session.begin_background_removal(id) {
                    Ok(job) => Task::perform(job.run(), |(id, result)| {
                        Message::BackgroundRemoved(id, result.map_err(Arc::new))
                    }),
                    Err(e) => {
                        log::debug!("Background removal not started: {}", e);
                        Task::none()
                    }
                }
            }
            Message::BackgroundRemoved(id, result) => {
                // The session may have ended while the job ran
                let Some(session) = self.session.as_mut() else {
                    return Task::none();
                };
                match result {
                    Ok(pixels) => {
                        self.handles.ensure(&pixels);
                        match session.finish_background_removal(id, pixels) {
                            Ok(FilterOutcome::Applied) | Ok(FilterOutcome::Discarded) => {}
                            Err(e) => self.report(&e),
                        }
                        self.prune_handles();
                    }
                    Err(e) => {
                        session.abandon_background_removal(id);
                        self.report(&e);
                    }
                }
                Task::none()
            }
            Message::Buy => {
                let Some(session) = self.session.as_ref() else {
                    return Task::none();
                };
                let Some(id) = session.placements().selected() else {
                    return Task::none();
                };
                let opened = session.buy(id).and_then(|url| shop::open_product_page(&url));
                if let Err(e) = opened {
                    self.report(&e);
                }
                Task::none()
            }
            Message::Settled => Task::none(),

            Message::PhotoImported(_, Err(e))
            | Message::PhotoLoaded(Err(e))
            | Message::GarmentImported(_, Err(e))
            | Message::GarmentLoaded(_, Err(e)) => {
                self.report(&e);
                Task::none()
            }
        }
    }

    /// Window-level pointer input, only while an item is being dragged
    fn subscription(&self) -> Subscription<Message> {
        match &self.session {
            Some(session) if session.is_dragging() => {
                event::listen_with(|event, _status, _window| ui::pointer::normalize(&event).map(Message::PointerInput))
            }
            _ => Subscription::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let tabs = row![
            tab_button("Profile", Tab::Profile, self.tab),
            tab_button("Wardrobe", Tab::Wardrobe, self.tab),
            tab_button("Studio", Tab::Studio, self.tab),
        ]
        .spacing(8);

        let header = row![text("Style Studio").size(24), container(tabs).align_right(Length::Fill)]
            .padding([12, 24])
            .align_y(Alignment::Center);

        let body: Element<Message> = match (self.tab, &self.session) {
            (Tab::Profile, _) => ui::profile::view(&self.profile, &self.handles),
            (Tab::Wardrobe, _) => ui::wardrobe::view(&self.wardrobe, &self.form),
            (Tab::Studio, Some(session)) => {
                ui::studio::view(session, &self.profile, &self.handles, &self.canvas_cache)
            }
            (Tab::Studio, None) => container(
                column![
                    text("Pick a photo first").size(22),
                    text("The studio needs a photo of you to place garments on.").size(14),
                    button("Go to Profile").on_press(Message::TabSelected(Tab::Profile)),
                ]
                .spacing(12)
                .align_x(Alignment::Center),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
        };

        let mut content: Column<Message> = column![header];
        if let Some(notice) = &self.notice {
            content = content.push(
                container(
                    row![
                        text(notice).size(14).width(Length::Fill),
                        button("Dismiss").on_press(Message::DismissNotice).style(button::text),
                    ]
                    .align_y(Alignment::Center),
                )
                .padding([8, 24])
                .style(container::rounded_box),
            );
        }

        container(content.push(body))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }

    fn report(&mut self, error: &StudioError) {
        log::warn!("{}", error);
        self.notice = Some(error.notice());
    }

    fn refresh_wardrobe(&mut self) {
        match self.library.garments() {
            Ok(garments) => self.wardrobe = garments,
            Err(e) => {
                self.report(&e.into());
                return;
            }
        }
        if let Some(session) = self.session.as_mut() {
            session.set_catalog(self.wardrobe.clone());
        }
    }

    /// Forget image handles nothing displays any more
    fn prune_handles(&mut self) {
        let mut live: HashSet<uuid::Uuid> = self.profile.photos().iter().map(|p| p.pixels.id()).collect();
        if let Some(session) = &self.session {
            live.extend(session.placements().items().iter().map(|item| item.rendered.id()));
        }
        self.handles.retain(&live);
        log::debug!("{} image handles live", self.handles.len());
    }

    /// Redraw the canvas only when placements or the base photo changed
    fn sync_canvas(&mut self) {
        let current = self
            .session
            .as_ref()
            .map(|s| (s.placements().revision(), self.profile.active().map(|p| p.id)));
        if current != self.drawn {
            self.canvas_cache.clear();
            self.drawn = current;
        }
    }
}

fn tab_button(label: &str, tab: Tab, current: Tab) -> Element<'_, Message> {
    let style = if tab == current { button::primary } else { button::secondary };
    button(text(label)).on_press(Message::TabSelected(tab)).style(style).into()
}

/// Show the native file picker for images
fn pick_image(title: &str) -> Option<PathBuf> {
    FileDialog::new()
        .set_title(title)
        .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp"])
        .pick_file()
}

fn discard(path: PathBuf) -> Task<Message> {
    Task::perform(store::discard(path, store::images_dir()), |_| Message::Settled)
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    iced::application("Style Studio", StyleStudio::update, StyleStudio::view)
        .subscription(StyleStudio::subscription)
        .theme(StyleStudio::theme)
        .window_size(Size::new(1280.0, 820.0))
        .centered()
        .run_with(StyleStudio::new)
}
