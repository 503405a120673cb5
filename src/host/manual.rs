//! Deterministic host driven by explicit ticks.
//!
//! Used for offline frame export and tests: nothing happens until the owner
//! calls [`ManualHost::tick`] or [`ManualHost::notify_resize`].

use super::{FrameCallback, FrameHandle, Host, HostError, ListenerId, ResizeListener};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct ManualHostState {
    next_id: u64,
    frames: Vec<(FrameHandle, FrameCallback)>,
    listeners: Vec<(ListenerId, ResizeListener)>,
    ticks: u64,
    fired: u64,
}

impl ManualHostState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Host whose refreshes and resizes are triggered by hand.
#[derive(Clone, Default)]
pub struct ManualHost {
    state: Rc<RefCell<ManualHostState>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate one display refresh.
    ///
    /// Fires every callback that was scheduled before the tick began; callbacks
    /// scheduled while firing wait for the next tick. Returns how many fired.
    pub fn tick(&self) -> usize {
        let due = {
            let mut state = self.state.borrow_mut();
            state.ticks += 1;
            std::mem::take(&mut state.frames)
        };
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        self.state.borrow_mut().fired += count as u64;
        count
    }

    /// Run `n` refreshes and return the total number of callbacks fired.
    pub fn run_frames(&self, n: usize) -> usize {
        (0..n).map(|_| self.tick()).sum()
    }

    /// Deliver a resize notification to every live listener.
    pub fn notify_resize(&self) -> usize {
        let listeners: Vec<ResizeListener> = self
            .state
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    /// Total frame callbacks fired so far.
    pub fn fired(&self) -> u64 {
        self.state.borrow().fired
    }
}

impl Host for ManualHost {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, HostError> {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle(state.next_id());
        state.frames.push((handle, callback));
        Ok(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.state.borrow_mut().frames.retain(|(h, _)| *h != handle);
    }

    fn subscribe_resize(&self, listener: ResizeListener) -> Result<ListenerId, HostError> {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id());
        state.listeners.push((id, listener));
        Ok(id)
    }

    fn unsubscribe_resize(&self, id: ListenerId) {
        self.state.borrow_mut().listeners.retain(|(l, _)| *l != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_tick_fires_scheduled_callback_once() {
        let host = ManualHost::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        host.request_frame(Box::new(move || counter.set(counter.get() + 1))).unwrap();

        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.tick(), 1);
        assert_eq!(host.tick(), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(host.fired(), 1);
        assert_eq!(host.ticks(), 2);
    }

    #[test]
    fn test_cancelled_frame_never_fires() {
        let host = ManualHost::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let handle = host.request_frame(Box::new(move || counter.set(1))).unwrap();
        host.cancel_frame(handle);

        assert_eq!(host.run_frames(3), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_callback_scheduled_during_tick_waits() {
        let host = ManualHost::new();
        let inner_host = host.clone();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        host.request_frame(Box::new(move || {
            let counter = Rc::clone(&counter);
            inner_host
                .request_frame(Box::new(move || counter.set(counter.get() + 1)))
                .unwrap();
        }))
        .unwrap();

        assert_eq!(host.tick(), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.tick(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_resize_listeners_subscribe_and_unsubscribe() {
        let host = ManualHost::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = host
            .subscribe_resize(Rc::new(move || counter.set(counter.get() + 1)))
            .unwrap();

        assert_eq!(host.notify_resize(), 1);
        host.unsubscribe_resize(id);
        assert_eq!(host.notify_resize(), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }
}
