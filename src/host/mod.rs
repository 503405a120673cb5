//! Host integration: frame scheduling and resize notifications.
//!
//! The render loop never owns a timer. It asks the host for one callback per
//! display refresh and listens for viewport resizes, both on a single thread.

pub mod manual;
#[cfg(feature = "web")]
pub mod web;

pub use manual::ManualHost;
#[cfg(feature = "web")]
pub use web::{AmbientBackground, CanvasContext, CanvasSurface, WebHost};

use std::rc::Rc;

/// Callback fired once on the next display refresh.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Callback fired on every viewport resize until unsubscribed.
pub type ResizeListener = Rc<dyn Fn()>;

/// Identifies a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies a resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Errors reported by a host while registering callbacks.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("No browser window available")]
    NoWindow,
    #[error("Host refused to schedule a frame: {0}")]
    FrameRequest(String),
    #[error("Host refused to register a resize listener: {0}")]
    ListenerRegistration(String),
}

/// Single-threaded host event source.
///
/// Implementations are cheap handles; the render loop clones one into each
/// frame callback to schedule the next frame.
pub trait Host: Clone + 'static {
    /// Schedule `callback` for the next refresh.
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, HostError>;

    /// Revoke a scheduled callback. Unknown or already fired handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);

    fn subscribe_resize(&self, listener: ResizeListener) -> Result<ListenerId, HostError>;

    /// Revoke a resize subscription. Unknown ids are ignored.
    fn unsubscribe_resize(&self, id: ListenerId);
}
