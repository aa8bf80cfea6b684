//! Global hotkey registration state machine
//!
//! The broker owns at most one system-wide binding. Key presses arrive from
//! the host listener as [`KeyPress`] values and are matched here, on the
//! event-loop side, so the callback always runs on the loop's task.

use tracing::{debug, info, warn};

use crate::config::{HotkeyBinding, KeyPress};
use crate::input::backend::{GrabError, GrabHost};

/// Callback run when the registered combination is pressed
pub type PressedCallback = Box<dyn FnMut(&HotkeyBinding) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Unregistered,
    Registered(HotkeyBinding),
}

pub struct HotkeyBroker<H: GrabHost> {
    host: H,
    state: BrokerState,
    on_pressed: Option<PressedCallback>,
}

impl<H: GrabHost> HotkeyBroker<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: BrokerState::Unregistered,
            on_pressed: None,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> BrokerState {
        self.state
    }

    #[allow(dead_code)]
    pub fn binding(&self) -> Option<HotkeyBinding> {
        match self.state {
            BrokerState::Registered(binding) => Some(binding),
            BrokerState::Unregistered => None,
        }
    }

    /// Claim the combination described by `text` system-wide.
    ///
    /// When a binding is already held this behaves like [`Self::rebind`].
    pub fn register_global(&mut self, text: &str) -> bool {
        if matches!(self.state, BrokerState::Registered(_)) {
            return self.rebind(text);
        }

        let binding = HotkeyBinding::parse_lenient(text);
        self.try_grab(binding)
    }

    /// Replace the held combination.
    ///
    /// Rebinding to the same combination succeeds without touching the host.
    /// If the old grab cannot be released the old binding stays in place. If
    /// the new grab fails the broker ends up unregistered; the old binding is
    /// not restored.
    pub fn rebind(&mut self, text: &str) -> bool {
        let binding = HotkeyBinding::parse_lenient(text);

        if let BrokerState::Registered(current) = self.state {
            if current == binding {
                debug!(binding = %binding.display_name(), "Hotkey unchanged, skipping rebind");
                return true;
            }

            if let Err(e) = self.host.ungrab(&current) {
                warn!(
                    binding = %current.display_name(),
                    error = %e,
                    "Failed to release current hotkey, keeping it"
                );
                return false;
            }
            self.state = BrokerState::Unregistered;
        }

        self.try_grab(binding)
    }

    /// Release the held combination, if any
    pub fn unregister(&mut self) {
        if let BrokerState::Registered(current) = self.state {
            if let Err(e) = self.host.ungrab(&current) {
                warn!(binding = %current.display_name(), error = %e, "Failed to release hotkey");
            }
            self.state = BrokerState::Unregistered;
        }
    }

    /// Install the press callback, replacing any previous one
    pub fn on_pressed(&mut self, callback: PressedCallback) {
        self.on_pressed = Some(callback);
    }

    /// Route an observed key press. Returns true when it matched the held
    /// binding and the callback ran.
    pub fn dispatch(&mut self, press: &KeyPress) -> bool {
        let BrokerState::Registered(binding) = self.state else {
            return false;
        };
        if !binding.matches(press) {
            return false;
        }

        match self.on_pressed.as_mut() {
            Some(callback) => {
                callback(&binding);
                true
            }
            None => false,
        }
    }

    fn try_grab(&mut self, binding: HotkeyBinding) -> bool {
        match self.host.grab(&binding) {
            Ok(()) => {
                info!(
                    binding = %binding.display_name(),
                    host = self.host.name(),
                    "Global hotkey registered"
                );
                self.state = BrokerState::Registered(binding);
                true
            }
            Err(GrabError::AlreadyClaimed(name)) => {
                warn!(binding = %name, "Hotkey is already in use by another application");
                false
            }
            Err(e) => {
                warn!(binding = %binding.display_name(), error = %e, "Failed to register hotkey");
                false
            }
        }
    }
}

impl<H: GrabHost> Drop for HotkeyBroker<H> {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Host that tracks grabs and can be told to refuse some
    #[derive(Default, Clone)]
    struct FakeHost {
        grabbed: Arc<Mutex<HashSet<HotkeyBinding>>>,
        claimed_elsewhere: Arc<Mutex<HashSet<HotkeyBinding>>>,
        fail_ungrab: Arc<Mutex<bool>>,
        grab_calls: Arc<Mutex<usize>>,
    }

    impl FakeHost {
        fn claim_elsewhere(&self, text: &str) {
            self.claimed_elsewhere
                .lock()
                .unwrap()
                .insert(HotkeyBinding::parse_lenient(text));
        }

        fn is_grabbed(&self, text: &str) -> bool {
            self.grabbed
                .lock()
                .unwrap()
                .contains(&HotkeyBinding::parse_lenient(text))
        }

        fn grab_count(&self) -> usize {
            self.grabbed.lock().unwrap().len()
        }
    }

    impl GrabHost for FakeHost {
        fn grab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError> {
            *self.grab_calls.lock().unwrap() += 1;
            if self.claimed_elsewhere.lock().unwrap().contains(binding) {
                return Err(GrabError::AlreadyClaimed(binding.display_name()));
            }
            self.grabbed.lock().unwrap().insert(*binding);
            Ok(())
        }

        fn ungrab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError> {
            if *self.fail_ungrab.lock().unwrap() {
                return Err(GrabError::Host(anyhow::anyhow!("ungrab refused")));
            }
            self.grabbed.lock().unwrap().remove(binding);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn press(text: &str) -> KeyPress {
        HotkeyBinding::parse_lenient(text)
    }

    #[test]
    fn test_register_and_dispatch() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());

        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        broker.on_pressed(Box::new(move |_| *counter.lock().unwrap() += 1));

        assert!(broker.register_global("Ctrl+Alt+P"));
        assert!(host.is_grabbed("Ctrl+Alt+P"));

        assert!(broker.dispatch(&press("Ctrl+Alt+P")));
        assert!(!broker.dispatch(&press("Ctrl+P")));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_register_claimed_elsewhere_fails() {
        let host = FakeHost::default();
        host.claim_elsewhere("Ctrl+Alt+P");
        let mut broker = HotkeyBroker::new(host.clone());

        assert!(!broker.register_global("Ctrl+Alt+P"));
        assert_eq!(broker.state(), BrokerState::Unregistered);
        assert!(!broker.dispatch(&press("Ctrl+Alt+P")));
    }

    #[test]
    fn test_register_while_registered_rebinds() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());

        assert!(broker.register_global("Ctrl+Alt+P"));
        assert!(broker.register_global("Ctrl+Alt+K"));
        assert!(!host.is_grabbed("Ctrl+Alt+P"));
        assert!(host.is_grabbed("Ctrl+Alt+K"));
        assert_eq!(host.grab_count(), 1);
    }

    #[test]
    fn test_rebind_same_combination_is_noop() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());

        assert!(broker.register_global("Ctrl+Alt+P"));
        // Different spelling, same combination
        assert!(broker.rebind("alt + control + p"));
        assert_eq!(*host.grab_calls.lock().unwrap(), 1);
        assert!(host.is_grabbed("Ctrl+Alt+P"));
    }

    #[test]
    fn test_rebind_moves_dispatch_to_new_combination() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());
        let hits = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&hits);
        broker.on_pressed(Box::new(move |b| seen.lock().unwrap().push(b.display_name())));

        assert!(broker.register_global("Ctrl+Alt+P"));
        assert!(broker.rebind("Ctrl+Shift+F5"));

        assert!(!broker.dispatch(&press("Ctrl+Alt+P")));
        assert!(broker.dispatch(&press("Ctrl+Shift+F5")));
        assert_eq!(*hits.lock().unwrap(), vec!["Ctrl+Shift+F5".to_string()]);
    }

    #[test]
    fn test_failed_rebind_leaves_unregistered() {
        let host = FakeHost::default();
        host.claim_elsewhere("Ctrl+Alt+K");
        let mut broker = HotkeyBroker::new(host.clone());

        assert!(broker.register_global("Ctrl+Alt+P"));
        assert!(!broker.rebind("Ctrl+Alt+K"));

        // Old binding was released and is not restored
        assert_eq!(broker.state(), BrokerState::Unregistered);
        assert_eq!(host.grab_count(), 0);
        assert!(!broker.dispatch(&press("Ctrl+Alt+P")));
    }

    #[test]
    fn test_failed_release_keeps_old_binding() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());

        assert!(broker.register_global("Ctrl+Alt+P"));
        *host.fail_ungrab.lock().unwrap() = true;

        assert!(!broker.rebind("Ctrl+Alt+K"));
        assert_eq!(
            broker.binding(),
            Some(HotkeyBinding::parse_lenient("Ctrl+Alt+P"))
        );
    }

    #[test]
    fn test_callback_replaced() {
        let mut broker = HotkeyBroker::new(FakeHost::default());
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let c = Arc::clone(&first);
        broker.on_pressed(Box::new(move |_| *c.lock().unwrap() += 1));
        let c = Arc::clone(&second);
        broker.on_pressed(Box::new(move |_| *c.lock().unwrap() += 1));

        assert!(broker.register_global("Ctrl+Alt+P"));
        broker.dispatch(&press("Ctrl+Alt+P"));

        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn test_dispatch_without_callback() {
        let mut broker = HotkeyBroker::new(FakeHost::default());
        assert!(broker.register_global("Ctrl+Alt+P"));
        assert!(!broker.dispatch(&press("Ctrl+Alt+P")));
    }

    #[test]
    fn test_drop_releases_grab() {
        let host = FakeHost::default();
        {
            let mut broker = HotkeyBroker::new(host.clone());
            assert!(broker.register_global("Ctrl+Alt+P"));
            assert_eq!(host.grab_count(), 1);
        }
        assert_eq!(host.grab_count(), 0);
    }

    #[test]
    fn test_unregister() {
        let host = FakeHost::default();
        let mut broker = HotkeyBroker::new(host.clone());
        assert!(broker.register_global("Ctrl+Alt+P"));

        broker.unregister();
        assert_eq!(broker.state(), BrokerState::Unregistered);
        assert_eq!(host.grab_count(), 0);

        // Idempotent
        broker.unregister();
        assert!(broker.register_global("Ctrl+Alt+P"));
    }
}
