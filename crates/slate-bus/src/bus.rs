//! Synchronous per-pid message fan-out

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slate_proc::Pid;

use crate::message::BusMessage;

/// Observer callback receiving serialized message JSON.
pub type Listener = Rc<dyn Fn(&str)>;

/// Process-wide publish point.
///
/// Listeners are keyed by pid and identified by object identity: removal
/// requires the same `Rc` that was registered, not a structurally equal
/// closure. There is no queueing and no history; a message reaches exactly
/// the listeners registered at dispatch time.
#[derive(Default)]
pub struct MessageBus {
    listeners: RefCell<HashMap<Pid, Vec<Listener>>>,
}

impl MessageBus {
    /// Create a new bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for messages from `pid`.
    pub fn add_listener(&self, pid: Pid, listener: Listener) {
        self.listeners
            .borrow_mut()
            .entry(pid)
            .or_default()
            .push(listener);
    }

    /// Remove a previously registered listener by identity.
    pub fn remove_listener(&self, pid: Pid, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(registered) = listeners.get_mut(&pid) {
            registered.retain(|l| !Rc::ptr_eq(l, listener));
            if registered.is_empty() {
                listeners.remove(&pid);
            }
        }
    }

    /// Serialize `message` once and deliver it to every listener currently
    /// registered for `pid`, in registration order.
    pub fn publish(&self, pid: Pid, message: &BusMessage) {
        let Ok(payload) = serde_json::to_string(message) else {
            return;
        };
        // Snapshot first: a listener may register or remove listeners
        // while handling the delivery.
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(&pid)
            .cloned()
            .unwrap_or_default();
        for listener in snapshot {
            listener(&payload);
        }
    }

    /// Number of listeners registered for `pid`.
    pub fn listener_count(&self, pid: Pid) -> usize {
        self.listeners
            .borrow()
            .get(&pid)
            .map(|l| l.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> (Listener, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let listener: Listener = Rc::new(move |payload: &str| {
            sink.borrow_mut().push(payload.to_string());
        });
        (listener, seen)
    }

    #[test]
    fn test_publish_in_order() {
        let bus = MessageBus::new();
        let (listener, seen) = collector();
        bus.add_listener(Pid(1), listener);

        bus.publish(Pid(1), &BusMessage::Log("first".to_string()));
        bus.publish(Pid(1), &BusMessage::Log("second".to_string()));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("first"));
        assert!(seen[1].contains("second"));
    }

    #[test]
    fn test_pids_are_isolated() {
        let bus = MessageBus::new();
        let (listener, seen) = collector();
        bus.add_listener(Pid(1), listener);

        bus.publish(Pid(2), &BusMessage::Log("other".to_string()));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_late_subscriber_sees_no_history() {
        let bus = MessageBus::new();
        bus.publish(Pid(1), &BusMessage::Log("gone".to_string()));

        let (listener, seen) = collector();
        bus.add_listener(Pid(1), listener);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_removal_is_by_identity() {
        let bus = MessageBus::new();
        let (first, seen_first) = collector();
        let (second, seen_second) = collector();
        bus.add_listener(Pid(1), first.clone());
        bus.add_listener(Pid(1), second);

        // Removing `first` must not disturb the structurally similar peer.
        bus.remove_listener(Pid(1), &first);
        assert_eq!(bus.listener_count(Pid(1)), 1);

        bus.publish(Pid(1), &BusMessage::Log("x".to_string()));
        assert!(seen_first.borrow().is_empty());
        assert_eq!(seen_second.borrow().len(), 1);
    }

    #[test]
    fn test_listener_added_during_publish_misses_current() {
        let bus = Rc::new(MessageBus::new());
        let (late, seen_late) = collector();

        let bus_inner = bus.clone();
        let late_inner = late.clone();
        let registering: Listener = Rc::new(move |_payload: &str| {
            bus_inner.add_listener(Pid(1), late_inner.clone());
        });
        bus.add_listener(Pid(1), registering);

        bus.publish(Pid(1), &BusMessage::Log("now".to_string()));
        assert!(seen_late.borrow().is_empty());

        bus.publish(Pid(1), &BusMessage::Log("next".to_string()));
        assert!(!seen_late.borrow().is_empty());
    }
}
