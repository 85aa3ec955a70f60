//! Completion notifications for the interrupt/poll layer: a level-style "frames available" event
//! for RX, a pulse-style "send done" event for TX, and the interrupt line they share.

/// One flag per event source. Used for the status, pending and enable registers alike.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Events {
    /// At least one received frame is waiting to be consumed.
    pub available: bool,
    /// A frame finished sending.
    pub done: bool,
}

impl Events {
    pub const NONE: Events = Events {
        available: false,
        done: false,
    };
    pub const ALL: Events = Events {
        available: true,
        done: true,
    };

    fn any(&self) -> bool {
        self.available || self.done
    }

    fn and(&self, other: &Events) -> Events {
        Events {
            available: self.available && other.available,
            done: self.done && other.done,
        }
    }
}

/// An event source that follows a level. It is pending for as long as the level is high, so it can
/// only be cleared by removing its cause.
#[derive(Debug, Default)]
pub struct LevelEvent {
    level: bool,
}

impl LevelEvent {
    pub const fn new() -> LevelEvent {
        LevelEvent { level: false }
    }

    /// Samples the level at the end of a step.
    pub fn step(&mut self, level: bool) {
        self.level = level;
    }

    pub fn status(&self) -> bool {
        self.level
    }

    pub fn pending(&self) -> bool {
        self.level
    }
}

/// An event source triggered by one-step pulses. Its status is only high during the step in which
/// it was triggered, but each pulse latches the pending flag until it is cleared explicitly.
#[derive(Debug, Default)]
pub struct PulseEvent {
    triggered: bool,
    pending: bool,
}

impl PulseEvent {
    pub const fn new() -> PulseEvent {
        PulseEvent {
            triggered: false,
            pending: false,
        }
    }

    /// Records whether the event fired during the current step.
    pub fn step(&mut self, triggered: bool) {
        self.triggered = triggered;
        self.pending |= triggered;
    }

    pub fn status(&self) -> bool {
        self.triggered
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = false;
    }
}

/// Combines the RX and TX event sources into a single interrupt line. All events start out
/// disabled.
#[derive(Debug, Default)]
pub struct SharedIrq {
    pub available: LevelEvent,
    pub done: PulseEvent,
    enabled: Events,
}

impl SharedIrq {
    pub const fn new() -> SharedIrq {
        SharedIrq {
            available: LevelEvent::new(),
            done: PulseEvent::new(),
            enabled: Events::NONE,
        }
    }

    pub fn status(&self) -> Events {
        Events {
            available: self.available.status(),
            done: self.done.status(),
        }
    }

    pub fn pending(&self) -> Events {
        Events {
            available: self.available.pending(),
            done: self.done.pending(),
        }
    }

    pub fn enabled(&self) -> Events {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: Events) {
        self.enabled = enabled;
    }

    /// Clears the latched pulse events in `events`. Level events can't be cleared this way.
    pub fn clear_pending(&mut self, events: Events) {
        if events.done {
            self.done.clear();
        }
    }

    /// Whether the interrupt line is asserted, i.e. whether any enabled event is pending.
    pub fn irq(&self) -> bool {
        self.pending().and(&self.enabled).any()
    }
}
