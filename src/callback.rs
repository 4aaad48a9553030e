//! Event kinds and the per-unit listener lists a [`crate::unit::Base`] fires
//! into at each state transition.
//!
//! Modeled as a list of `{mask, fn}` pairs the way the source system's
//! `TweenCallback` does: subscription is append-only, dispatch walks the
//! list once per event and invokes every entry whose mask matches.

/// A single event kind. `Any` is a subscription-time convenience that
/// matches every kind; it is never itself the kind passed to a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Begin,
    Start,
    End,
    Complete,
    BackBegin,
    BackStart,
    BackEnd,
    BackComplete,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::Begin,
        EventKind::Start,
        EventKind::End,
        EventKind::Complete,
        EventKind::BackBegin,
        EventKind::BackStart,
        EventKind::BackEnd,
        EventKind::BackComplete,
    ];

    pub fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// Bitmask of [`EventKind`]s, used when subscribing a callback to more than
/// one kind at once (e.g. `EventMask::ANY`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventMask(pub u32);

impl EventMask {
    pub const ANY: EventMask = EventMask(0xFF);

    pub fn of(kinds: &[EventKind]) -> Self {
        EventMask(kinds.iter().fold(0, |acc, k| acc | k.mask()))
    }

    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.mask() != 0
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        EventMask(kind.mask())
    }
}

type ListenerFn = Box<dyn FnMut(EventKind, u64) + 'static>;

struct Listener {
    mask: EventMask,
    f: ListenerFn,
}

/// Append-only collection of `{mask, fn}` listeners, cleared wholesale when
/// a unit is reset and returned to its pool.
#[derive(Default)]
pub struct CallbackTable {
    listeners: Vec<Listener>,
}

impl CallbackTable {
    pub fn subscribe(
        &mut self,
        mask: impl Into<EventMask>,
        f: impl FnMut(EventKind, u64) + 'static,
    ) {
        self.listeners.push(Listener {
            mask: mask.into(),
            f: Box::new(f),
        });
    }

    /// Invokes every listener whose mask matches `kind`, in registration order.
    pub fn fire(&mut self, kind: EventKind, user_data: u64) {
        for listener in &mut self.listeners {
            if listener.mask.contains(kind) {
                (listener.f)(kind, user_data);
            }
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// The unit-level (not event-specific) begin/end-of-`update()`-call hooks,
/// distinct from the `TweenCallbacks`-style [`EventKind`] dispatch above.
/// These fire exactly once per `update()` call, even if the call terminates
/// early inside the state-machine loop.
#[derive(Default)]
pub struct UpdateHooks {
    on_begin: Vec<Box<dyn FnMut(u64) + 'static>>,
    on_end: Vec<Box<dyn FnMut(u64) + 'static>>,
}

impl UpdateHooks {
    pub fn on_begin(&mut self, f: impl FnMut(u64) + 'static) {
        self.on_begin.push(Box::new(f));
    }

    pub fn on_end(&mut self, f: impl FnMut(u64) + 'static) {
        self.on_end.push(Box::new(f));
    }

    pub fn fire_begin(&mut self, user_data: u64) {
        for f in &mut self.on_begin {
            f(user_data);
        }
    }

    pub fn fire_end(&mut self, user_data: u64) {
        for f in &mut self.on_end {
            f(user_data);
        }
    }

    pub fn clear(&mut self) {
        self.on_begin.clear();
        self.on_end.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_in_registration_order_for_matching_mask_only() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut table = CallbackTable::default();

        let o1 = order.clone();
        table.subscribe(EventKind::Begin, move |k, _| o1.borrow_mut().push((1, k)));
        let o2 = order.clone();
        table.subscribe(EventMask::ANY, move |k, _| o2.borrow_mut().push((2, k)));
        let o3 = order.clone();
        table.subscribe(EventKind::End, move |k, _| o3.borrow_mut().push((3, k)));

        table.fire(EventKind::Begin, 0);
        assert_eq!(*order.borrow(), vec![(1, EventKind::Begin), (2, EventKind::Begin)]);

        order.borrow_mut().clear();
        table.fire(EventKind::End, 0);
        assert_eq!(*order.borrow(), vec![(2, EventKind::End), (3, EventKind::End)]);
    }
}
