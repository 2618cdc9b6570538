use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A frame listener. Membership is by reference (`Rc::ptr_eq`).
pub type FrameCallback = Rc<dyn Fn(f64)>;

/// Opaque id of a scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The host's animation-frame primitive.
pub trait FrameScheduler {
    /// Ask for one more frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// A request fired. Schedulers that track outstanding requests forget it here.
    fn frame_fired(&mut self, _request: FrameRequest) {}
}

#[derive(Debug, Default)]
struct HostFrameState {
    next_id: u64,
    outstanding: Vec<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

/// Scheduler for hosts that run their own frame loop and call
/// [`Timer::frame`] on every animation frame (the wasm bridge, tests).
///
/// Clones share state, so the host keeps one clone to inspect while the
/// timer owns another.
#[derive(Debug, Clone, Default)]
pub struct HostFrames {
    state: Rc<RefCell<HostFrameState>>,
}

impl HostFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests made and neither fired nor cancelled. At most one while a
    /// single callback chain runs.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// Whether the timer wants the next frame.
    pub fn wants_frame(&self) -> bool {
        self.outstanding() > 0
    }

    /// Total requests made so far.
    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }

    /// Total requests cancelled so far.
    pub fn cancelled(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for HostFrames {
    fn request_frame(&mut self) -> FrameRequest {
        let mut s = self.state.borrow_mut();
        s.next_id += 1;
        s.requested += 1;
        let request = FrameRequest(s.next_id);
        s.outstanding.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut s = self.state.borrow_mut();
        let before = s.outstanding.len();
        s.outstanding.retain(|r| *r != request);
        if s.outstanding.len() != before {
            s.cancelled += 1;
        }
    }

    fn frame_fired(&mut self, request: FrameRequest) {
        self.state.borrow_mut().outstanding.retain(|r| *r != request);
    }
}

struct TimerState {
    scheduler: Box<dyn FrameScheduler>,
    pending: Option<FrameRequest>,
    subscribers: Vec<FrameCallback>,
}

/// The single per-frame clock.
///
/// Cloning yields another handle to the same timer. While running, exactly
/// one frame request is outstanding; every fired frame notifies all
/// subscribers with the host timestamp and schedules the next one.
#[derive(Clone)]
pub struct Timer {
    inner: Rc<RefCell<TimerState>>,
}

impl Timer {
    pub fn new(scheduler: impl FrameScheduler + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimerState {
                scheduler: Box::new(scheduler),
                pending: None,
                subscribers: Vec::new(),
            })),
        }
    }

    /// A timer driven by the host, plus the handle the host polls.
    pub fn host_driven() -> (Self, HostFrames) {
        let frames = HostFrames::new();
        (Self::new(frames.clone()), frames)
    }

    /// Begin scheduling frames. No-op while already running. Starting only
    /// schedules; nobody is notified until the first frame fires.
    pub fn start(&self) {
        let mut s = self.inner.borrow_mut();
        if s.pending.is_none() {
            let request = s.scheduler.request_frame();
            s.pending = Some(request);
            log::trace!("timer: started ({:?})", request);
        }
    }

    /// Cancel the scheduled frame. No-op while stopped.
    pub fn stop(&self) {
        let mut s = self.inner.borrow_mut();
        if let Some(request) = s.pending.take() {
            s.scheduler.cancel_frame(request);
            log::trace!("timer: stopped ({:?})", request);
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    /// Add a listener. Subscribing the same `Rc` twice is ignored.
    pub fn subscribe(&self, callback: FrameCallback) {
        let mut s = self.inner.borrow_mut();
        if !s.subscribers.iter().any(|cb| Rc::ptr_eq(cb, &callback)) {
            s.subscribers.push(callback);
        }
    }

    pub fn unsubscribe(&self, callback: &FrameCallback) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|cb| !Rc::ptr_eq(cb, callback));
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Host entry point for an animation frame.
    ///
    /// Reschedules first, then notifies, so a subscriber that stops the
    /// timer really stops it. Returns `false` for a stale frame that arrived
    /// while stopped; nothing is notified then.
    pub fn frame(&self, timestamp: f64) -> bool {
        let subscribers = {
            let mut s = self.inner.borrow_mut();
            let Some(fired) = s.pending.take() else {
                return false;
            };
            s.scheduler.frame_fired(fired);
            let next = s.scheduler.request_frame();
            s.pending = Some(next);
            s.subscribers.clone()
        };

        for callback in &subscribers {
            callback(timestamp);
        }
        true
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(HostFrames::new())
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.borrow();
        f.debug_struct("Timer")
            .field("pending", &s.pending)
            .field("subscribers", &s.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (FrameCallback, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let cb: FrameCallback = Rc::new(move |_| h.set(h.get() + 1));
        (cb, hits)
    }

    #[test]
    fn start_is_idempotent() {
        let (timer, frames) = Timer::host_driven();
        timer.start();
        timer.start();
        assert!(timer.is_running());
        assert_eq!(frames.outstanding(), 1);
        assert_eq!(frames.requested(), 1);
    }

    #[test]
    fn start_does_not_notify() {
        let (timer, _frames) = Timer::host_driven();
        let (cb, hits) = counter();
        timer.subscribe(cb);
        timer.start();
        assert_eq!(hits.get(), 0);
        assert!(timer.frame(16.0));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn frames_keep_one_request_outstanding() {
        let (timer, frames) = Timer::host_driven();
        timer.start();
        for i in 1..=5 {
            timer.frame(i as f64 * 16.0);
            assert_eq!(frames.outstanding(), 1);
        }
        assert_eq!(frames.requested(), 6);
    }

    #[test]
    fn stop_is_idempotent_and_silences_frames() {
        let (timer, frames) = Timer::host_driven();
        let (cb, hits) = counter();
        timer.subscribe(cb);
        timer.start();
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(frames.outstanding(), 0);
        assert_eq!(frames.cancelled(), 1);
        assert!(!timer.frame(16.0));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn duplicate_subscription_ignored() {
        let timer = Timer::default();
        let (cb, hits) = counter();
        timer.subscribe(cb.clone());
        timer.subscribe(cb.clone());
        assert_eq!(timer.subscriber_count(), 1);

        timer.start();
        timer.frame(1.0);
        assert_eq!(hits.get(), 1);

        timer.unsubscribe(&cb);
        assert_eq!(timer.subscriber_count(), 0);
        timer.frame(2.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscriber_can_stop_the_timer() {
        let (timer, frames) = Timer::host_driven();
        let handle = timer.clone();
        timer.subscribe(Rc::new(move |_| handle.stop()));
        timer.start();
        timer.frame(16.0);
        assert!(!timer.is_running());
        assert_eq!(frames.outstanding(), 0);
    }

    #[test]
    fn subscribers_receive_timestamp() {
        let timer = Timer::default();
        let seen = Rc::new(Cell::new(0.0));
        let s = seen.clone();
        timer.subscribe(Rc::new(move |t| s.set(t)));
        timer.start();
        timer.frame(1234.5);
        assert_eq!(seen.get(), 1234.5);
    }
}
