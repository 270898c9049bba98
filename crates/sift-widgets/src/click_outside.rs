#![forbid(unsafe_code)]

//! Scoped "pointer pressed outside" subscriptions.
//!
//! An [`OutsideClickHub`] is the host's single point of mouse-down delivery.
//! A component that wants to hear about presses outside its own area calls
//! [`OutsideClickHub::subscribe`] with a shared [`Bounds`] and a message
//! factory, and keeps the returned [`OutsideClickGuard`] for as long as it is
//! mounted. Dropping the guard removes the listener, so a listener can never
//! outlive its component.
//!
//! ```
//! use sift_core::event::{MouseButton, MouseEvent, MouseEventKind};
//! use sift_core::geometry::Rect;
//! use sift_widgets::click_outside::{Bounds, OutsideClickHub};
//!
//! let hub = OutsideClickHub::new();
//! let bounds = Bounds::new(Rect::new(0, 0, 10, 3));
//! let guard = hub.subscribe(bounds.clone(), || "dismiss");
//!
//! let press = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 40, 20);
//! assert_eq!(hub.dispatch(&press), vec!["dismiss"]);
//!
//! drop(guard);
//! assert!(hub.dispatch(&press).is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use sift_core::event::MouseEvent;
use sift_core::geometry::Rect;

/// A component's on-screen area, shared between the component and the hub.
///
/// The component updates it every render; the hub reads it on every press.
#[derive(Debug, Clone, Default)]
pub struct Bounds(Rc<Cell<Rect>>);

impl Bounds {
    pub fn new(rect: Rect) -> Self {
        Self(Rc::new(Cell::new(rect)))
    }

    pub fn set(&self, rect: Rect) {
        self.0.set(rect);
    }

    pub fn get(&self) -> Rect {
        self.0.get()
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.0.get().contains(x, y)
    }
}

struct Listener<M> {
    id: u64,
    bounds: Bounds,
    make_msg: Box<dyn Fn() -> M>,
}

struct Registry<M> {
    next_id: u64,
    listeners: Vec<Listener<M>>,
}

/// Fans mouse-down events out to listeners whose bounds do not contain the
/// press. Clones share the same listeners.
pub struct OutsideClickHub<M> {
    inner: Rc<RefCell<Registry<M>>>,
}

impl<M> Clone for OutsideClickHub<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M> Default for OutsideClickHub<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for OutsideClickHub<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsideClickHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<M> OutsideClickHub<M> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays registered until the guard is dropped.
    #[must_use = "dropping the guard unsubscribes immediately"]
    pub fn subscribe(
        &self,
        bounds: Bounds,
        make_msg: impl Fn() -> M + 'static,
    ) -> OutsideClickGuard
    where
        M: 'static,
    {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            bounds,
            make_msg: Box::new(make_msg),
        });
        #[cfg(feature = "tracing")]
        tracing::trace!(id, listeners = registry.listeners.len(), "outside-click subscribe");

        let weak: Weak<RefCell<Registry<M>>> = Rc::downgrade(&self.inner);
        OutsideClickGuard {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|l| l.id != id);
                }
            })),
        }
    }

    /// Messages from every listener the event lands outside of.
    ///
    /// Only pointer-down events count. Other mouse events return nothing.
    pub fn dispatch(&self, event: &MouseEvent) -> Vec<M> {
        if !event.is_pointer_down() {
            return Vec::new();
        }
        let registry = self.inner.borrow();
        registry
            .listeners
            .iter()
            .filter(|l| !l.bounds.contains(event.x, event.y))
            .map(|l| (l.make_msg)())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Keeps an outside-click listener registered. Dropping it unsubscribes.
pub struct OutsideClickGuard {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for OutsideClickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutsideClickGuard")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for OutsideClickGuard {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::event::{MouseButton, MouseEventKind};

    fn down(x: u16, y: u16) -> MouseEvent {
        MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y)
    }

    #[test]
    fn press_inside_is_ignored() {
        let hub = OutsideClickHub::new();
        let _guard = hub.subscribe(Bounds::new(Rect::new(5, 5, 10, 4)), || 1);
        assert!(hub.dispatch(&down(5, 5)).is_empty());
        assert!(hub.dispatch(&down(14, 8)).is_empty());
        assert_eq!(hub.dispatch(&down(15, 8)), vec![1]);
        assert_eq!(hub.dispatch(&down(4, 5)), vec![1]);
    }

    #[test]
    fn any_button_counts() {
        let hub = OutsideClickHub::new();
        let _guard = hub.subscribe(Bounds::new(Rect::new(0, 0, 2, 2)), || ());
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            let event = MouseEvent::new(MouseEventKind::Down(button), 9, 9);
            assert_eq!(hub.dispatch(&event).len(), 1);
        }
    }

    #[test]
    fn non_press_events_are_ignored() {
        let hub = OutsideClickHub::new();
        let _guard = hub.subscribe(Bounds::new(Rect::new(0, 0, 2, 2)), || ());
        for kind in [
            MouseEventKind::Up(MouseButton::Left),
            MouseEventKind::Moved,
            MouseEventKind::ScrollDown,
            MouseEventKind::Drag(MouseButton::Left),
        ] {
            assert!(hub.dispatch(&MouseEvent::new(kind, 9, 9)).is_empty());
        }
    }

    #[test]
    fn bounds_updates_are_seen() {
        let hub = OutsideClickHub::new();
        let bounds = Bounds::default();
        let _guard = hub.subscribe(bounds.clone(), || ());
        assert_eq!(hub.dispatch(&down(3, 3)).len(), 1);
        bounds.set(Rect::new(0, 0, 10, 10));
        assert!(hub.dispatch(&down(3, 3)).is_empty());
    }

    #[test]
    fn dropping_guard_unsubscribes_only_that_listener() {
        let hub = OutsideClickHub::new();
        let a = hub.subscribe(Bounds::default(), || 'a');
        let _b = hub.subscribe(Bounds::default(), || 'b');
        assert_eq!(hub.listener_count(), 2);
        drop(a);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.dispatch(&down(0, 0)), vec!['b']);
    }

    #[test]
    fn clones_share_listeners() {
        let hub = OutsideClickHub::new();
        let other = hub.clone();
        let guard = other.subscribe(Bounds::default(), || 0u8);
        assert_eq!(hub.listener_count(), 1);
        drop(guard);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn guard_outliving_hub_is_harmless() {
        let hub = OutsideClickHub::new();
        let guard = hub.subscribe(Bounds::default(), || ());
        drop(hub);
        drop(guard);
    }
}
