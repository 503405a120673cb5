//! Surface that records draw calls instead of producing pixels.

use super::{Context2d, Rgba, Surface};
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect(f64, f64, f64, f64),
    LineWidth(f64),
    StrokeColor(Rgba),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
}

#[derive(Debug)]
struct RecordingState {
    client_size: (i32, i32),
    backing_size: (u32, u32),
    resizes: usize,
    context_available: bool,
    commands: Vec<DrawCommand>,
}

/// Surface handle that logs every context call.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingState {
                client_size: (width, height),
                backing_size: (0, 0),
                resizes: 0,
                context_available: true,
                commands: Vec::new(),
            })),
        }
    }

    /// A surface whose `context_2d` always fails.
    pub fn without_context(width: i32, height: i32) -> Self {
        let surface = Self::new(width, height);
        surface.state.borrow_mut().context_available = false;
        surface
    }

    /// Change the size the host reports, as a layout change would.
    pub fn set_client_size(&self, width: i32, height: i32) {
        self.state.borrow_mut().client_size = (width, height);
    }

    /// Current backing store size.
    pub fn backing_size(&self) -> (u32, u32) {
        self.state.borrow().backing_size
    }

    /// How many times the backing store was resized.
    pub fn resize_count(&self) -> usize {
        self.state.borrow().resizes
    }

    /// Snapshot of every recorded command.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn count<F: Fn(&DrawCommand) -> bool>(&self, predicate: F) -> usize {
        self.state.borrow().commands.iter().filter(|c| predicate(c)).count()
    }

    /// `true` when no draw call ever reached the surface.
    pub fn is_untouched(&self) -> bool {
        self.state.borrow().commands.is_empty()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().commands.clear();
    }
}

impl Surface for RecordingSurface {
    type Context = RecordingContext;

    fn client_size(&self) -> (i32, i32) {
        self.state.borrow().client_size
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.backing_size = (width, height);
        state.resizes += 1;
    }

    fn context_2d(&self) -> Option<RecordingContext> {
        if !self.state.borrow().context_available {
            return None;
        }
        Some(RecordingContext {
            state: Rc::clone(&self.state),
        })
    }
}

/// Context handle that appends to its surface's command log.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingContext {
    fn push(&mut self, command: DrawCommand) {
        self.state.borrow_mut().commands.push(command);
    }
}

impl Context2d for RecordingContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::ClearRect(x, y, width, height));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::LineWidth(width));
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.push(DrawCommand::StrokeColor(color));
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }
}
