use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;

use slidenav::deck::{Deck, ImageRef, Slide};
use slidenav::fullscreen::{Fullscreen, FullscreenError};
use slidenav::input::{ElementKind, Key, KeyEvent, Point};
use slidenav::preload::PreloadedImages;
use slidenav::{HistoryLocation, Location, PresentationController, SlideMarks};

use crate::theme::Theme;

type Controller = PresentationController<SlideMarks, HistoryLocation, ViewportFullscreen>;

pub struct LaunchOptions {
    pub windowed: bool,
    pub initial_fragment: Option<String>,
    /// Theme from the command line; beats the deck and the config.
    pub theme: Option<String>,
    pub config_theme: Option<String>,
}

/// Fullscreen through viewport commands. Requests are queued and sent once
/// the input pass is over.
///
/// Support is assumed until a frame has been seen; after that it follows
/// whether the viewport reports a fullscreen state at all.
struct ViewportFullscreen {
    active: bool,
    supported: bool,
    pending: Option<bool>,
}

impl ViewportFullscreen {
    fn new(active: bool) -> Self {
        Self {
            active,
            supported: true,
            pending: None,
        }
    }

    fn sync(&mut self, ctx: &egui::Context) {
        let reported = ctx.input(|i| i.viewport().fullscreen);
        self.supported = reported.is_some();
        if self.pending.is_none() {
            if let Some(fullscreen) = reported {
                self.active = fullscreen;
            }
        }
    }

    fn take_command(&mut self) -> Option<egui::ViewportCommand> {
        self.pending.take().map(|on| {
            self.active = on;
            egui::ViewportCommand::Fullscreen(on)
        })
    }
}

impl Fullscreen for ViewportFullscreen {
    fn is_available(&self) -> bool {
        self.supported
    }

    fn is_active(&self) -> bool {
        self.pending.unwrap_or(self.active)
    }

    fn request(&mut self) -> Result<(), FullscreenError> {
        if !self.supported {
            return Err(FullscreenError::Rejected(
                "viewport does not report a fullscreen state".to_string(),
            ));
        }
        self.pending = Some(true);
        Ok(())
    }

    fn exit(&mut self) {
        self.pending = Some(false);
    }
}

struct PresenterApp {
    deck: Deck,
    title: String,
    controller: Controller,
    theme: Theme,
    images: PreloadedImages,
    textures: HashMap<String, egui::TextureHandle>,
    /// Fragment entry box, open while `Some`
    address_bar: Option<AddressBar>,
    /// Interactive controls drawn last frame, for click targeting
    controls: Vec<(egui::Rect, ElementKind)>,
    /// Cached content rect from last frame
    last_rect: egui::Rect,
    shown_fragment: String,
}

struct AddressBar {
    text: String,
    focus_requested: bool,
}

impl PresenterApp {
    fn new(
        deck: Deck,
        images: PreloadedImages,
        title: String,
        theme: Theme,
        initial_fragment: &str,
        fullscreen: bool,
    ) -> Self {
        let controller = PresentationController::new(
            SlideMarks::new(deck.len()),
            HistoryLocation::new(initial_fragment),
            ViewportFullscreen::new(fullscreen),
            slidenav::timer::SystemClock,
        );
        Self {
            deck,
            title,
            controller,
            theme,
            images,
            textures: HashMap::new(),
            address_bar: None,
            controls: Vec::new(),
            last_rect: egui::Rect::ZERO,
            shown_fragment: String::new(),
        }
    }

    fn compute_scale(rect: egui::Rect) -> f32 {
        let ref_w = 1920.0;
        let ref_h = 1080.0;
        (rect.width() / ref_w).min(rect.height() / ref_h)
    }

    fn history_back(&mut self) {
        if self.controller.location_mut().back() {
            self.controller.fragment_changed();
        }
    }

    fn history_forward(&mut self) {
        if self.controller.location_mut().forward() {
            self.controller.fragment_changed();
        }
    }

    fn open_address_bar(&mut self) {
        self.address_bar = Some(AddressBar {
            text: format!("#{}", self.controller.location().fragment()),
            focus_requested: false,
        });
    }

    fn submit_address(&mut self, text: &str) {
        let fragment = normalize_address(text);
        tracing::debug!(fragment, "address entered");
        if self.controller.location_mut().navigate(&fragment) {
            self.controller.fragment_changed();
        }
    }

    fn handle_input(
        &mut self,
        ctx: &egui::Context,
        viewport_cmds: &mut Vec<egui::ViewportCommand>,
    ) {
        let from_text_input = ctx.wants_keyboard_input();
        let (events, click_pos) = ctx.input(|i| {
            let click = if i.pointer.primary_clicked() {
                i.pointer.interact_pos()
            } else {
                None
            };
            (i.events.clone(), click)
        });

        for event in events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if self.address_bar.is_some() {
                        if key == egui::Key::Escape {
                            self.address_bar = None;
                        }
                        continue;
                    }
                    if !from_text_input {
                        match key {
                            egui::Key::Q => {
                                viewport_cmds.push(egui::ViewportCommand::Close);
                                continue;
                            }
                            egui::Key::G => {
                                self.open_address_bar();
                                continue;
                            }
                            egui::Key::ArrowLeft if modifiers.alt => {
                                self.history_back();
                                continue;
                            }
                            egui::Key::ArrowRight if modifiers.alt => {
                                self.history_forward();
                                continue;
                            }
                            _ => {}
                        }
                    }
                    let key = map_key(key, modifiers);
                    let event = if from_text_input {
                        KeyEvent::in_text_input(key)
                    } else {
                        KeyEvent::new(key)
                    };
                    self.controller.handle_key(event);
                }
                egui::Event::Touch { phase, pos, .. } => match phase {
                    egui::TouchPhase::Start => {
                        self.controller.touch_start(Point::new(pos.x, pos.y));
                    }
                    egui::TouchPhase::End => {
                        self.controller.touch_end(Point::new(pos.x, pos.y));
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if let Some(pos) = click_pos {
            let path = target_path(pos, &self.controls);
            self.controller.click(
                pos.x - self.last_rect.left(),
                self.last_rect.width(),
                &path,
            );
        }
    }

    fn upload_textures(&mut self, ctx: &egui::Context, index: usize) {
        let Some(slide) = self.deck.slides.get(index) else {
            return;
        };
        for image in &slide.images {
            if self.textures.contains_key(&image.path) {
                continue;
            }
            if let Some(rgba) = self.images.get(&image.path) {
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let texture =
                    ctx.load_texture(&image.path, color_image, egui::TextureOptions::LINEAR);
                self.textures.insert(image.path.clone(), texture);
            }
        }
    }

    fn draw_slides(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32) {
        let view = self.controller.view();
        let eased = self.controller.transition_progress().map(ease_in_out);

        for index in view.exiting() {
            let opacity = 1.0 - eased.unwrap_or(1.0);
            if opacity > 0.0 {
                self.draw_slide(ui, index, rect, opacity, scale);
            }
        }
        for index in view.active() {
            self.draw_slide(ui, index, rect, eased.unwrap_or(1.0), scale);
        }
    }

    fn draw_slide(&self, ui: &egui::Ui, index: usize, rect: egui::Rect, opacity: f32, scale: f32) {
        if let Some(slide) = self.deck.slides.get(index) {
            draw_slide(ui, slide, &self.theme, &self.textures, rect, opacity, scale);
        }
    }

    fn draw_chrome(&mut self, ui: &mut egui::Ui, rect: egui::Rect, scale: f32) {
        let chrome_color = Theme::with_opacity(self.theme.foreground, 0.45);
        let chrome_font = egui::FontId::proportional(self.theme.chrome_size * scale.max(0.75));

        if let Some(ref footer) = self.deck.meta.footer {
            let galley =
                ui.painter()
                    .layout_no_wrap(footer.clone(), chrome_font.clone(), chrome_color);
            let pos = egui::pos2(
                rect.left() + 24.0 * scale,
                rect.bottom() - galley.rect.height() - 20.0 * scale,
            );
            ui.painter().galley(pos, galley, chrome_color);
        }

        let counter = format!(
            "{} / {}",
            self.controller.active_index() + 1,
            self.controller.slide_count()
        );
        let galley = ui
            .painter()
            .layout_no_wrap(counter, chrome_font, chrome_color);
        let pos = egui::pos2(
            rect.right() - galley.rect.width() - 24.0 * scale,
            rect.bottom() - galley.rect.height() - 20.0 * scale,
        );
        ui.painter().galley(pos, galley, chrome_color);

        // Progress indicator
        if let Some(progress) = self.controller.view().progress() {
            let height = (6.0 * scale).max(3.0);
            let track = egui::Rect::from_min_max(
                egui::pos2(rect.left(), rect.bottom() - height),
                rect.right_bottom(),
            );
            ui.painter().rect_filled(
                track,
                0.0,
                Theme::with_opacity(self.theme.foreground, 0.1),
            );
            let mut bar = track;
            bar.set_width(track.width() * progress);
            ui.painter().rect_filled(bar, 0.0, self.theme.accent);
        }

        self.controls.clear();

        if self.controller.view().has_fullscreen_control()
            && self.controller.fullscreen().is_available()
        {
            let size = egui::vec2(40.0, 40.0) * scale.max(0.75);
            let button_rect = egui::Rect::from_min_size(
                egui::pos2(rect.right() - size.x - 16.0, rect.top() + 16.0),
                size,
            );
            let button = egui::Button::new(
                egui::RichText::new("\u{26F6}")
                    .size(size.y * 0.55)
                    .color(self.theme.foreground),
            )
            .fill(Theme::with_opacity(self.theme.control_background, 0.8));
            let response = ui.put(button_rect, button).on_hover_text("Toggle fullscreen");
            if response.clicked() {
                self.controller.toggle_fullscreen();
            }
            self.controls.push((button_rect, ElementKind::Button));
        }
    }

    fn draw_address_bar(&mut self, ctx: &egui::Context) {
        let Some(bar) = self.address_bar.as_mut() else {
            return;
        };
        let mut submitted: Option<String> = None;
        let mut close = false;

        let area = egui::Area::new(egui::Id::new("address_bar"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 24.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Go to");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut bar.text)
                                .desired_width(180.0)
                                .hint_text("#slide-1"),
                        );
                        if !bar.focus_requested {
                            response.request_focus();
                            bar.focus_requested = true;
                        }
                        if response.lost_focus() {
                            if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                                submitted = Some(bar.text.clone());
                            }
                            close = true;
                        }
                    });
                });
            });
        self.controls
            .push((area.response.rect, ElementKind::Input));

        if let Some(text) = submitted {
            self.submit_address(&text);
        }
        if close {
            self.address_bar = None;
        }
    }
}

impl eframe::App for PresenterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.fullscreen_mut().sync(ctx);
        self.controller.tick();

        // Collect viewport commands to send after input handling
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        self.handle_input(ctx, &mut viewport_cmds);

        let active = self.controller.active_index();
        self.upload_textures(ctx, active);

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.last_rect = rect;
                ui.painter().rect_filled(rect, 0.0, bg);

                let scale = Self::compute_scale(rect);
                self.draw_slides(ui, rect, scale);
                self.draw_chrome(ui, rect, scale);
            });

        self.draw_address_bar(ctx);

        if let Some(cmd) = self.controller.fullscreen_mut().take_command() {
            viewport_cmds.push(cmd);
        }

        let fragment = self.controller.location().fragment();
        if fragment != self.shown_fragment {
            self.shown_fragment = fragment.to_string();
            viewport_cmds.push(egui::ViewportCommand::Title(format!(
                "{} #{}",
                self.title, self.shown_fragment
            )));
        }

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        if self.controller.is_transitioning() {
            ctx.request_repaint();
        }
    }
}

fn draw_slide(
    ui: &egui::Ui,
    slide: &Slide,
    theme: &Theme,
    textures: &HashMap<String, egui::TextureHandle>,
    rect: egui::Rect,
    opacity: f32,
    scale: f32,
) {
    let padding = 80.0 * scale;
    let content_rect = rect.shrink(padding);
    let heading_color = Theme::with_opacity(theme.heading_color, opacity);
    let body_color = Theme::with_opacity(theme.foreground, opacity);

    let mut y = content_rect.top();
    if let Some(ref heading) = slide.heading {
        let galley = ui.painter().layout(
            heading.clone(),
            egui::FontId::proportional(theme.heading_size * scale),
            heading_color,
            content_rect.width(),
        );
        let height = galley.rect.height();
        ui.painter()
            .galley(egui::pos2(content_rect.left(), y), galley, heading_color);
        y += height + 40.0 * scale;
    }

    if !slide.body.is_empty() {
        let galley = ui.painter().layout(
            slide.body.clone(),
            egui::FontId::proportional(theme.body_size * scale),
            body_color,
            content_rect.width(),
        );
        let height = galley.rect.height();
        ui.painter()
            .galley(egui::pos2(content_rect.left(), y), galley, body_color);
        y += height + 30.0 * scale;
    }

    // First image fills what is left, aspect preserved
    let Some(image) = slide.images.first() else {
        return;
    };
    let available = egui::Rect::from_min_max(egui::pos2(content_rect.left(), y), content_rect.max);
    if available.height() <= 0.0 || available.width() <= 0.0 {
        return;
    }
    let Some(texture) = textures.get(&image.path) else {
        if let Some(text) = missing_image_text(image) {
            let galley = ui.painter().layout(
                text,
                egui::FontId::proportional(theme.body_size * scale),
                Theme::with_opacity(theme.foreground, opacity * 0.6),
                available.width(),
            );
            let pos = available.center() - galley.rect.size() / 2.0;
            ui.painter().galley(pos, galley, body_color);
        }
        return;
    };
    let tex_size = texture.size_vec2();
    let fit = (available.width() / tex_size.x).min(available.height() / tex_size.y);
    let image_rect = egui::Rect::from_center_size(available.center(), tex_size * fit);
    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    ui.painter().image(
        texture.id(),
        image_rect,
        uv,
        Theme::with_opacity(egui::Color32::WHITE, opacity),
    );
}

/// Placeholder shown where an image could not be loaded.
fn missing_image_text(image: &ImageRef) -> Option<String> {
    let alt = image.alt.trim();
    (!alt.is_empty()).then(|| format!("[{alt}]"))
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn map_key(key: egui::Key, modifiers: egui::Modifiers) -> Key {
    match key {
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::Space => Key::Space,
        egui::Key::PageDown => Key::PageDown,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::Escape => Key::Escape,
        egui::Key::F => Key::Char(if modifiers.shift { 'F' } else { 'f' }),
        egui::Key::Num1 => Key::Char('1'),
        egui::Key::Num2 => Key::Char('2'),
        egui::Key::Num3 => Key::Char('3'),
        egui::Key::Num4 => Key::Char('4'),
        egui::Key::Num5 => Key::Char('5'),
        egui::Key::Num6 => Key::Char('6'),
        egui::Key::Num7 => Key::Char('7'),
        egui::Key::Num8 => Key::Char('8'),
        egui::Key::Num9 => Key::Char('9'),
        _ => Key::Other,
    }
}

/// Accept `#slide-3`, `slide-3` or a bare `3`.
fn normalize_address(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix('#').unwrap_or(text);
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        format!("slide-{text}")
    } else {
        text.to_string()
    }
}

/// Element kinds under `pos`, innermost first. Plain slide surface when
/// nothing interactive is there.
fn target_path(pos: egui::Pos2, controls: &[(egui::Rect, ElementKind)]) -> Vec<ElementKind> {
    let mut path: Vec<ElementKind> = controls
        .iter()
        .rev()
        .filter(|(rect, _)| rect.contains(pos))
        .map(|(_, kind)| *kind)
        .collect();
    path.push(ElementKind::Other);
    path
}

pub fn run(file: PathBuf, options: LaunchOptions) -> anyhow::Result<()> {
    let deck = Deck::load(&file)?;
    let base_path = file.parent().unwrap_or(std::path::Path::new("."));
    let images = PreloadedImages::load(&deck, base_path);

    let title = deck.meta.title.clone().unwrap_or_else(|| {
        format!(
            "slidenav {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });

    let theme_name = options
        .theme
        .or_else(|| deck.meta.theme.clone())
        .or(options.config_theme)
        .unwrap_or_else(|| "light".to_string());
    let theme = Theme::from_name(&theme_name);

    let fullscreen = !options.windowed;
    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let initial_fragment = options.initial_fragment.unwrap_or_default();
    tracing::info!(
        slides = deck.len(),
        images = images.len(),
        fragment = initial_fragment.as_str(),
        theme = theme.name.as_str(),
        "starting presentation"
    );

    let window_title = title.clone();
    eframe::run_native(
        &window_title,
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(PresenterApp::new(
                deck,
                images,
                title,
                theme,
                &initial_fragment,
                fullscreen,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
