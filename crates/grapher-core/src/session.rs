//! A running grapher bound to one canvas.
//!
//! [`Session`] owns the viewport, the formulas and the renderer. It is shared
//! with the host's callbacks as `Rc<RefCell<Session>>`; the callbacks hold
//! only a `Weak`, so dropping the [`SessionHandle`] ends the session even if
//! the host forgets to remove them.

use crate::config::GrapherConfig;
use crate::error::{ConfigError, GraphError, RenderError, StartupError};
use crate::event::InputEvent;
use crate::functions::FunctionSet;
use crate::host::{
    CallbackId, EventHandler, EventSource, HandlerResponse, Host, HostEvent, Surface,
};
use crate::interaction::{Controller, RedrawScheduler};
use crate::render::{Layer, Overlay, Renderer};
use crate::sampler::{SampleResolution, Sampler};
use crate::share;
use crate::theme::Theme;
use crate::viewport::Viewport;
use log::{debug, info, warn};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames committed to the surface
    pub frames: u64,
    /// Sampling passes over all visible formulas
    pub sample_passes: u64,
    /// Paint opportunities that ended in a render error
    pub failed_frames: u64,
}

/// Engine state for one canvas.
#[derive(Debug)]
pub struct Session<S> {
    canvas_id: String,
    config: GrapherConfig,
    viewport: Viewport,
    functions: FunctionSet,
    renderer: Renderer<S>,
    sampler: Sampler,
    controller: Controller,
    scheduler: RedrawScheduler,
    stats: SessionStats,
}

impl<S: Surface> Session<S> {
    /// Build a session around an acquired surface.
    ///
    /// The viewport is fitted to the surface's current size. Nothing is drawn
    /// until [`Session::redraw`] or a paint opportunity.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::InitialRender`] if the surface is unusable or
    /// has zero size.
    pub fn new<T: AsRef<str>>(
        canvas_id: &str,
        config: GrapherConfig,
        surface: S,
        formulas: &[T],
    ) -> Result<Self, StartupError> {
        let (width, height) = surface.size()?;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptySurface.into());
        }
        let viewport = Viewport::from_config(&config.view, width, height).map_err(|e| {
            StartupError::Config(ConfigError::InvalidValue {
                field: "view",
                message: e.to_string(),
            })
        })?;
        let functions = FunctionSet::from_texts(formulas, config.max_functions);

        Ok(Self {
            canvas_id: canvas_id.to_string(),
            viewport,
            functions,
            renderer: Renderer::new(surface, config.theme.clone()),
            sampler: Sampler::new(config.sampler.clone()),
            controller: Controller::new(config.interaction.clone(), config.view.resize),
            scheduler: RedrawScheduler::new(),
            stats: SessionStats::default(),
            config,
        })
    }

    /// Id of the canvas this session draws on.
    #[must_use]
    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// Configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &GrapherConfig {
        &self.config
    }

    /// Current view.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current formulas.
    #[must_use]
    pub const fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    /// The renderer and its surface.
    #[must_use]
    pub const fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    /// Counters.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Whether a redraw is waiting for a paint opportunity.
    #[must_use]
    pub const fn redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Forget a pending redraw the host could not schedule, so the next
    /// change asks again.
    pub fn cancel_redraw(&mut self) {
        self.scheduler.cancel();
    }

    /// Route one host event.
    pub fn handle_event(&mut self, event: &HostEvent) -> HandlerResponse {
        match event {
            HostEvent::Input(input) => self.handle_input(input),
            HostEvent::AnimationFrame { .. } => {
                self.paint();
                HandlerResponse::Handled
            }
        }
    }

    /// Apply one input event to the view.
    ///
    /// Returns [`HandlerResponse::RequestFrame`] only for the first change
    /// since the last paint; later changes ride on the same frame.
    pub fn handle_input(&mut self, event: &InputEvent) -> HandlerResponse {
        let consumed = self.controller.consumes(event);
        let changed = self.controller.handle(event, &mut self.viewport);
        if changed && self.scheduler.request() {
            HandlerResponse::RequestFrame
        } else if changed || consumed {
            HandlerResponse::Handled
        } else {
            HandlerResponse::Ignored
        }
    }

    /// Paint opportunity: redraw if something changed since the last frame.
    ///
    /// Render errors are logged and counted; the session keeps running.
    pub fn paint(&mut self) -> bool {
        if !self.scheduler.take() {
            return false;
        }
        match self.redraw() {
            Ok(()) => true,
            Err(e) => {
                self.stats.failed_frames += 1;
                warn!("Dropped frame on '{}': {e}", self.canvas_id);
                false
            }
        }
    }

    /// Sample every visible formula and commit a full frame now.
    ///
    /// # Errors
    ///
    /// Returns the surface's [`RenderError`]; the previous frame stays
    /// visible in that case.
    pub fn redraw(&mut self) -> Result<(), RenderError> {
        let layers: Vec<Layer> = self
            .functions
            .entries()
            .iter()
            .filter_map(|entry| {
                entry.plottable().map(|expr| Layer {
                    label: expr.to_string(),
                    color: entry.color(),
                    polylines: self.sampler.sample(expr, &self.viewport).collect(),
                })
            })
            .collect();
        self.stats.sample_passes += 1;

        let overlay = Overlay {
            error: self.functions.error_message(),
        };
        self.renderer.render(&self.viewport, &layers, &overlay)?;
        self.stats.frames += 1;
        debug!(
            "Drew frame {} on '{}': {} layer(s), {} polyline(s)",
            self.stats.frames,
            self.canvas_id,
            layers.len(),
            layers.iter().map(|l| l.polylines.len()).sum::<usize>()
        );
        Ok(())
    }

    /// Edit formula `index`.
    ///
    /// A formula that does not parse keeps its previous curve and shows the
    /// error on the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionIndex`] or [`GraphError::Parse`].
    pub fn set_function(&mut self, index: usize, text: &str) -> Result<(), GraphError> {
        let result = self.functions.set_text(index, text);
        if !matches!(result, Err(GraphError::FunctionIndex { .. })) {
            self.scheduler.request();
        }
        result
    }

    /// Append a formula slot; returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionLimit`] when all slots are in use, or
    /// [`GraphError::Parse`] if `text` does not parse (the slot is still
    /// added).
    pub fn add_function(&mut self, text: &str) -> Result<usize, GraphError> {
        let index = self.functions.push(text)?;
        self.scheduler.request();
        match self.functions.get(index).and_then(|entry| entry.error()) {
            Some(e) => Err(e.clone().into()),
            None => Ok(index),
        }
    }

    /// Remove the last formula unless it is the only one.
    pub fn remove_function(&mut self) -> bool {
        let removed = self.functions.remove_last();
        if removed {
            self.scheduler.request();
        }
        removed
    }

    /// Show or hide formula `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::FunctionIndex`] for a bad index.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> Result<(), GraphError> {
        self.functions.set_visible(index, visible)?;
        self.scheduler.request();
        Ok(())
    }

    /// Change how densely formulas are sampled.
    pub fn set_resolution(&mut self, resolution: SampleResolution) {
        self.sampler.set_resolution(resolution);
        self.scheduler.request();
    }

    /// Switch colors and sizes.
    pub fn set_theme(&mut self, theme: Theme) {
        self.renderer.set_theme(theme);
        self.scheduler.request();
    }

    /// Return to the initial view.
    pub fn reset_view(&mut self) -> bool {
        let changed = self.viewport.reset();
        if changed {
            self.scheduler.request();
        }
        changed
    }

    /// URL fragment encoding the current formulas.
    #[must_use]
    pub fn share_fragment(&self) -> String {
        share::encode_fragment(&self.functions.texts())
    }
}

/// Host callback forwarding events to a session.
struct SessionDispatcher<S> {
    session: Weak<RefCell<Session<S>>>,
}

impl<S: Surface> EventHandler for SessionDispatcher<S> {
    fn handle(&mut self, event: &HostEvent) -> HandlerResponse {
        let Some(session) = self.session.upgrade() else {
            return HandlerResponse::Ignored;
        };
        // A re-entrant event while the session is busy is dropped.
        let Ok(mut session) = session.try_borrow_mut() else {
            return HandlerResponse::Ignored;
        };
        session.handle_event(event)
    }

    fn frame_refused(&mut self) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if let Ok(mut session) = session.try_borrow_mut() {
            warn!("No paint opportunity for '{}'", session.canvas_id);
            session.cancel_redraw();
        };
    }
}

/// Owner of a started session and its host callbacks.
#[derive(Debug)]
pub struct SessionHandle<S> {
    session: Rc<RefCell<Session<S>>>,
    callbacks: Vec<CallbackId>,
}

impl<S: Surface + 'static> SessionHandle<S> {
    /// Start a grapher on `canvas_id`.
    ///
    /// Formulas come from `fragment` (a share link) when it holds any,
    /// otherwise from `config.initial_functions`. On failure no callback is
    /// left registered.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] if the configuration is invalid, the canvas
    /// cannot be used, a callback cannot be registered, or the first frame
    /// cannot be drawn.
    pub fn start<H>(
        host: &mut H,
        canvas_id: &str,
        config: GrapherConfig,
        fragment: Option<&str>,
    ) -> Result<Self, StartupError>
    where
        H: Host<Surface = S>,
    {
        config.validate()?;
        let surface = host.resolve_surface(canvas_id)?;

        let formulas = match fragment.and_then(share::decode_fragment) {
            Some(formulas) => {
                info!("Restoring {} formula(s) from share link", formulas.len());
                formulas
            }
            None => config.initial_functions.clone(),
        };
        let session = Rc::new(RefCell::new(Session::new(
            canvas_id, config, surface, &formulas,
        )?));

        let mut callbacks = Vec::with_capacity(EventSource::ALL.len());
        for source in EventSource::ALL {
            let dispatcher = SessionDispatcher {
                session: Rc::downgrade(&session),
            };
            match host.register(canvas_id, source, Box::new(dispatcher)) {
                Ok(id) => callbacks.push(id),
                Err(e) => {
                    warn!(
                        "Startup on '{canvas_id}' failed, removing {} callback(s)",
                        callbacks.len()
                    );
                    for id in callbacks {
                        host.deregister(id);
                    }
                    return Err(e);
                }
            }
        }

        let initial = session.borrow_mut().redraw();
        if let Err(e) = initial {
            for id in callbacks {
                host.deregister(id);
            }
            return Err(e.into());
        }

        info!(
            "Grapher started on '{canvas_id}' with {} callback(s)",
            callbacks.len()
        );
        Ok(Self { session, callbacks })
    }

    /// Borrow the session.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of the session's own callbacks.
    #[must_use]
    pub fn session(&self) -> Ref<'_, Session<S>> {
        self.session.borrow()
    }

    /// Mutate the session, then ask the host for a paint opportunity if the
    /// change needs one.
    pub fn update<H, R>(&self, host: &mut H, f: impl FnOnce(&mut Session<S>) -> R) -> R
    where
        H: Host<Surface = S>,
    {
        let (result, canvas_id) = {
            let mut session = self.session.borrow_mut();
            let was_pending = session.redraw_pending();
            let result = f(&mut session);
            let needs_frame = !was_pending && session.redraw_pending();
            (result, needs_frame.then(|| session.canvas_id.clone()))
        };
        if let Some(canvas_id) = canvas_id {
            if !host.request_frame(&canvas_id) {
                warn!("No paint opportunity for '{canvas_id}'");
                self.session.borrow_mut().cancel_redraw();
            }
        }
        result
    }

    /// Number of host callbacks held by this session.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Remove every callback and end the session.
    pub fn shutdown<H>(self, host: &mut H)
    where
        H: Host<Surface = S>,
    {
        for id in &self.callbacks {
            host.deregister(*id);
        }
        info!(
            "Grapher stopped on '{}' after {} frame(s)",
            self.session.borrow().canvas_id,
            self.session.borrow().stats.frames
        );
    }
}
