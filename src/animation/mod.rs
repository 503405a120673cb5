//! Render loop lifecycle.
//!
//! [`RenderLoop`] is the controller that owns a running animation: the
//! surface and its context, the viewport, the clock, the pending frame handle
//! and the resize subscription. `start` acquires all of them and `stop`
//! releases all of them.

use crate::field::{AnimationClock, ConfigError, FieldConfig, ViewportState};
use crate::host::{FrameHandle, Host, HostError, ListenerId};
use crate::render::{Context2d, LineRenderer, Surface};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Errors reported by [`RenderLoop`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Drawing surface cannot provide a 2D context")]
    ContextUnavailable,
    #[error("Invalid field config: {0}")]
    Config(#[from] ConfigError),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Lifecycle state of a [`RenderLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Everything a frame touches. Exists only while the loop runs.
struct FrameState<S: Surface> {
    surface: S,
    context: S::Context,
    viewport: ViewportState,
    clock: AnimationClock,
    renderer: LineRenderer,
    pending: Option<FrameHandle>,
    frames: u64,
}

impl<S: Surface> FrameState<S> {
    /// Read the client size and apply it. Returns `true` on change.
    fn resize(&mut self) -> bool {
        let (width, height) = self.surface.client_size();
        let changed = self.viewport.resize(width, height);
        if changed {
            log::debug!(
                "Viewport resized to {}x{}",
                self.viewport.width(),
                self.viewport.height()
            );
            self.surface.set_size(self.viewport.width(), self.viewport.height());
        }
        changed
    }

    fn render_frame(&mut self) {
        self.pending = None;
        self.context.clear_rect(
            0.0,
            0.0,
            self.viewport.width() as f64,
            self.viewport.height() as f64,
        );
        let time = self.clock.advance();
        self.renderer.draw(&mut self.context, &self.viewport, time);
        self.frames += 1;
    }
}

/// Resources held between `start` and `stop`.
struct Session<S: Surface> {
    frame: Rc<RefCell<FrameState<S>>>,
    resize_listener: ListenerId,
}

/// Controller for the animated waveform background.
///
/// Single-threaded: the host delivers frames and resizes on one thread, and
/// nothing here blocks.
pub struct RenderLoop<H: Host, S: Surface + 'static> {
    host: H,
    config: FieldConfig,
    session: Option<Session<S>>,
}

impl<H: Host, S: Surface + 'static> RenderLoop<H, S> {
    /// Create a stopped loop. The config is validated and then frozen.
    pub fn new(host: H, config: FieldConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            host,
            config,
            session: None,
        })
    }

    /// Begin animating on `surface`.
    ///
    /// On `ContextUnavailable` the loop stays stopped and nothing is
    /// scheduled. Starting a running loop first stops the previous session.
    pub fn start(&mut self, surface: S) -> Result<(), RenderError> {
        if self.session.is_some() {
            log::debug!("Restarting render loop on a new surface");
            self.stop();
        }

        let Some(context) = surface.context_2d() else {
            log::warn!("Drawing surface has no 2D context, background will not animate");
            return Err(RenderError::ContextUnavailable);
        };

        let (width, height) = surface.client_size();
        let mut state = FrameState {
            surface,
            context,
            viewport: ViewportState::from_client(width, height),
            clock: AnimationClock::new(self.config.speed),
            renderer: LineRenderer::new(&self.config),
            pending: None,
            frames: 0,
        };
        state.surface.set_size(state.viewport.width(), state.viewport.height());
        let frame = Rc::new(RefCell::new(state));

        let resize_listener = self.host.subscribe_resize(make_resize_listener(&frame))?;
        if let Err(err) = schedule_frame(&self.host, &frame) {
            self.host.unsubscribe_resize(resize_listener);
            return Err(err.into());
        }

        {
            let state = frame.borrow();
            log::info!(
                "Render loop started: {} lines on {}x{}",
                self.config.line_count,
                state.viewport.width(),
                state.viewport.height()
            );
        }
        self.session = Some(Session {
            frame,
            resize_listener,
        });
        Ok(())
    }

    /// Cancel the pending frame and the resize subscription. No-op when stopped.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let pending = session.frame.borrow_mut().pending.take();
        if let Some(handle) = pending {
            self.host.cancel_frame(handle);
        }
        self.host.unsubscribe_resize(session.resize_listener);
        log::info!(
            "Render loop stopped after {} frames",
            session.frame.borrow().frames
        );
        // Dropping the last strong reference releases surface and context;
        // any callback the host still holds only has a dead weak reference.
    }

    pub fn state(&self) -> LoopState {
        if self.session.is_some() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Current clock time, `None` when stopped.
    pub fn time(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.frame.borrow().clock.time())
    }

    /// Current viewport, `None` when stopped.
    pub fn viewport(&self) -> Option<ViewportState> {
        self.session.as_ref().map(|s| s.frame.borrow().viewport)
    }

    /// Frames rendered by the current session.
    pub fn frames_rendered(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, |s| s.frame.borrow().frames)
    }
}

impl<H: Host, S: Surface + 'static> Drop for RenderLoop<H, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn make_resize_listener<S: Surface + 'static>(frame: &Rc<RefCell<FrameState<S>>>) -> Rc<dyn Fn()> {
    let weak: Weak<RefCell<FrameState<S>>> = Rc::downgrade(frame);
    Rc::new(move || {
        let Some(frame) = weak.upgrade() else {
            return;
        };
        match frame.try_borrow_mut() {
            Ok(mut state) => {
                state.resize();
            }
            Err(_) => log::warn!("Resize delivered during a frame, ignoring"),
        };
    })
}

fn schedule_frame<H: Host, S: Surface + 'static>(
    host: &H,
    frame: &Rc<RefCell<FrameState<S>>>,
) -> Result<(), HostError> {
    let weak = Rc::downgrade(frame);
    let next_host = host.clone();
    let handle = host.request_frame(Box::new(move || {
        let Some(frame) = weak.upgrade() else {
            return;
        };
        frame.borrow_mut().render_frame();
        if let Err(err) = schedule_frame(&next_host, &frame) {
            log::error!("Animation halted: {}", err);
        }
    }))?;
    frame.borrow_mut().pending = Some(handle);
    Ok(())
}
