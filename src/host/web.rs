//! Browser host: `requestAnimationFrame`, window `resize` and `<canvas>` 2D.

use super::{FrameCallback, FrameHandle, Host, HostError, ListenerId, ResizeListener};
use crate::animation::{RenderError, RenderLoop};
use crate::field::FieldConfig;
use crate::render::{Context2d, Rgba, Surface};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

struct WebHostInner {
    window: Window,
    /// Frame closures waiting for the browser to fire them.
    frames: RefCell<HashMap<i32, Closure<dyn FnMut()>>>,
    /// The closure currently (or most recently) running. A closure cannot be
    /// dropped while it executes, so it is parked here until the next frame.
    spent: RefCell<Vec<Closure<dyn FnMut()>>>,
    listeners: RefCell<HashMap<u64, Closure<dyn FnMut()>>>,
    next_listener: Cell<u64>,
}

impl WebHostInner {
    fn retire_frame(&self, id: i32) {
        let mut spent = self.spent.borrow_mut();
        spent.clear();
        if let Some(closure) = self.frames.borrow_mut().remove(&id) {
            spent.push(closure);
        }
    }
}

/// Host backed by the page's `window`.
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<WebHostInner>,
}

impl WebHost {
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        Ok(Self {
            inner: Rc::new(WebHostInner {
                window,
                frames: RefCell::new(HashMap::new()),
                spent: RefCell::new(Vec::new()),
                listeners: RefCell::new(HashMap::new()),
                next_listener: Cell::new(0),
            }),
        })
    }

    /// Frame callbacks handed to the browser and not yet fired or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl Host for WebHost {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, HostError> {
        let id_slot = Rc::new(Cell::new(0i32));
        let fired_id = Rc::clone(&id_slot);
        let inner = Rc::downgrade(&self.inner);
        let closure: Closure<dyn FnMut()> = Closure::once(move || {
            if let Some(inner) = inner.upgrade() {
                inner.retire_frame(fired_id.get());
            }
            callback();
        });

        let id = self
            .inner
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| HostError::FrameRequest(format!("{:?}", err)))?;
        id_slot.set(id);
        self.inner.frames.borrow_mut().insert(id, closure);
        Ok(FrameHandle(id as u64))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let id = handle.0 as i32;
        if let Err(err) = self.inner.window.cancel_animation_frame(id) {
            log::warn!("cancelAnimationFrame({}) failed: {:?}", id, err);
        }
        self.inner.frames.borrow_mut().remove(&id);
        self.inner.spent.borrow_mut().clear();
    }

    fn subscribe_resize(&self, listener: ResizeListener) -> Result<ListenerId, HostError> {
        let closure = Closure::wrap(Box::new(move || listener()) as Box<dyn FnMut()>);
        self.inner
            .window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(|err| HostError::ListenerRegistration(format!("{:?}", err)))?;

        let id = self.inner.next_listener.get() + 1;
        self.inner.next_listener.set(id);
        self.inner.listeners.borrow_mut().insert(id, closure);
        Ok(ListenerId(id))
    }

    fn unsubscribe_resize(&self, id: ListenerId) {
        let Some(closure) = self.inner.listeners.borrow_mut().remove(&id.0) else {
            return;
        };
        if let Err(err) = self
            .inner
            .window
            .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        {
            log::warn!("removeEventListener(resize) failed: {:?}", err);
        }
        self.inner.spent.borrow_mut().clear();
    }
}

/// `<canvas>` element used as a drawing surface.
#[derive(Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasContext;

    fn client_size(&self) -> (i32, i32) {
        (self.canvas.client_width(), self.canvas.client_height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn context_2d(&self) -> Option<CanvasContext> {
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasContext { ctx })
    }
}

/// Browser `CanvasRenderingContext2D`.
#[derive(Clone)]
pub struct CanvasContext {
    ctx: CanvasRenderingContext2d,
}

impl Context2d for CanvasContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.to_string());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }
}

static CONSOLE_LOGGING: Once = Once::new();

/// Route `log` records and panics to the browser console, once per page.
pub fn install_console_logging() {
    CONSOLE_LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        // Another logger may already be installed by the embedding app.
        console_log::init_with_level(log::Level::Info).ok();
    });
}

/// JavaScript mount point for the animated background.
///
/// ```js
/// const bg = new AmbientBackground();
/// bg.start(document.querySelector("canvas"));
/// // on unmount
/// bg.stop();
/// ```
#[wasm_bindgen]
pub struct AmbientBackground {
    inner: RenderLoop<WebHost, CanvasSurface>,
}

#[wasm_bindgen]
impl AmbientBackground {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<AmbientBackground, JsValue> {
        Self::with_config(FieldConfig::default()).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Build from a JSON field config; missing keys use the defaults.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<AmbientBackground, JsValue> {
        FieldConfig::from_json_str(json)
            .map_err(RenderError::from)
            .and_then(Self::with_config)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    fn with_config(config: FieldConfig) -> Result<AmbientBackground, RenderError> {
        install_console_logging();
        let host = WebHost::new()?;
        Ok(Self {
            inner: RenderLoop::new(host, config)?,
        })
    }

    /// Begin animating. Failures are logged; the page never sees an exception.
    pub fn start(&mut self, canvas: HtmlCanvasElement) {
        match self.inner.start(CanvasSurface::new(canvas)) {
            Ok(()) | Err(RenderError::ContextUnavailable) => {}
            Err(err) => log::error!("Background renderer failed to start: {}", err),
        }
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}
