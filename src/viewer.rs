//! Standalone viewer window backed by winit.
//!
//! ```no_run
//! # use g3dview::Viewer;
//! Viewer::builder()
//!     .with_folder("samples/models")
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::engine::ViewerEngine;
use crate::error::ViewError;
use crate::gpu::GpuContext;
use crate::input::{FrameSampler, KeyAction};
use crate::options::Options;
use crate::state::ViewerEvent;
use crate::util::frame_timing::FrameTiming;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    folder: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            folder: None,
            options: None,
            title: "g3dview".into(),
        }
    }

    /// Set the starting model folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            folder: self.folder,
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }

    /// Shorthand for `build().run()`.
    pub fn run(self) -> Result<(), ViewError> {
        self.build().run()
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// The standalone viewer window.
pub struct Viewer {
    folder: Option<PathBuf>,
    options: Options,
    title: String,
}

impl Viewer {
    /// Start configuring a viewer.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop until it closes.
    pub fn run(self) -> Result<(), ViewError> {
        let event_loop = EventLoop::new()
            .map_err(|e| ViewError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            title: self.title,
            options: self.options,
            start_folder: self.folder,
            window: None,
            engine: None,
            sampler: FrameSampler::new(),
            timing: FrameTiming::new(),
            startup_error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| ViewError::Viewer(e.to_string()))?;

        match app.startup_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// ── winit application ────────────────────────────────────────────────────

struct ViewerApp {
    title: String,
    options: Options,
    start_folder: Option<PathBuf>,
    window: Option<Arc<Window>>,
    engine: Option<ViewerEngine>,
    sampler: FrameSampler,
    timing: FrameTiming,
    startup_error: Option<ViewError>,
}

impl ViewerApp {
    fn pick_folder(engine: &ViewerEngine) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new();
        if let Some(folder) = engine.state().folder() {
            dialog = dialog.set_directory(folder);
        } else if let Ok(cwd) = std::env::current_dir() {
            dialog = dialog.set_directory(cwd);
        }
        dialog.pick_folder()
    }

    fn handle_key_action(&mut self, action: KeyAction) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let result = if action == KeyAction::OpenFolder {
            match Self::pick_folder(engine) {
                Some(folder) => {
                    engine.handle_event(ViewerEvent::FolderChanged(folder))
                }
                None => Ok(()),
            }
        } else {
            engine.apply_action(action)
        };
        if let Err(error) = result {
            log::warn!("{error}");
        }
    }

    fn redraw(&mut self) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        let dt = self.timing.tick();
        self.sampler.apply(engine.controller_mut());
        engine.update(dt);

        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    engine.resize(size.width, size.height);
                }
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        if let Some(window) = &self.window {
            window.set_title(&format!(
                "{} | {}",
                self.title,
                engine.status_line(self.timing.fps())
            ));
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.options.window.width,
                self.options.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.startup_error =
                    Some(ViewError::Viewer(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let context = match pollster::block_on(GpuContext::new(
            window.clone(),
            (size.width.max(1), size.height.max(1)),
            !self.options.timing.no_fixed_step,
        )) {
            Ok(context) => context,
            Err(e) => {
                self.startup_error = Some(ViewError::Gpu(e));
                event_loop.exit();
                return;
            }
        };

        let mut engine = ViewerEngine::new(context, &self.options);
        if let Some(folder) = self.start_folder.take() {
            if let Err(error) = engine.set_folder(folder) {
                log::warn!("starting folder unusable: {error}");
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::KeyboardInput {
                event: ref key_event,
                ..
            } => {
                // Movement keys feed the per-frame sampler; everything
                // else goes through the discrete bindings.
                if self.sampler.handle_window_event(&event) {
                    return;
                }
                if key_event.state.is_pressed() && !key_event.repeat {
                    if let PhysicalKey::Code(code) = key_event.physical_key {
                        let key = format!("{code:?}");
                        if let Some(action) =
                            self.options.keybindings.lookup(&key)
                        {
                            self.handle_key_action(action);
                        }
                    }
                }
            }

            WindowEvent::MouseInput { .. }
            | WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseWheel { .. } => {
                let _ = self.sampler.handle_window_event(&event);
            }

            _ => (),
        }
    }
}
