use std::sync::Mutex;

use crate::window::RuntimeCtx;

use super::state::InputState;
use super::types::Key;

/// Identity of one binding, for later removal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BindingId(u64);

type BindingAction = Box<dyn FnMut(&mut RuntimeCtx) + Send>;

struct Binding {
    id: BindingId,
    keys: Vec<Key>,
    action: BindingAction,
}

impl Binding {
    fn is_triggered(&self, input: &InputState) -> bool {
        self.keys.iter().all(|key| input.key_down(*key))
    }
}

#[derive(Default)]
struct BindingList {
    next_id: u64,
    bindings: Vec<Binding>,
}

/// Key-combination bindings scoped to one window.
///
/// `process` runs once per frame and synchronously invokes every binding
/// whose keys are all currently held. The binding list sits behind a mutex
/// so mutation is serialized against evaluation; in practice one thread
/// drives both.
#[derive(Default)]
pub struct Controls {
    bindings: Mutex<BindingList>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action to run while all of `keys` are held.
    pub fn add_binding(
        &self,
        keys: impl IntoIterator<Item = Key>,
        action: impl FnMut(&mut RuntimeCtx) + Send + 'static,
    ) -> BindingId {
        let mut list = self.lock();
        let id = BindingId(list.next_id);
        list.next_id += 1;
        list.bindings.push(Binding {
            id,
            keys: keys.into_iter().collect(),
            action: Box::new(action),
        });
        id
    }

    /// Removes a binding; returns whether it existed.
    pub fn remove_binding(&self, id: BindingId) -> bool {
        let mut list = self.lock();
        let before = list.bindings.len();
        list.bindings.retain(|b| b.id != id);
        list.bindings.len() != before
    }

    /// Evaluates every binding against the current key state.
    pub fn process(&self, input: &InputState, runtime: &mut RuntimeCtx) {
        let mut list = self.lock();
        for binding in &mut list.bindings {
            if binding.is_triggered(input) {
                (binding.action)(runtime);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BindingList> {
        // A poisoned lock only means another thread panicked mid-update;
        // the list itself is still usable.
        self.bindings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::input::{InputEvent, InputFrame, KeyState, Modifiers};

    fn hold(state: &mut InputState, key: Key) {
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                modifiers: Modifiers::default(),
                repeat: false,
            },
        );
    }

    fn counting_binding(controls: &Controls, keys: Vec<Key>) -> (BindingId, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let id = controls.add_binding(keys, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (id, fired)
    }

    #[test]
    fn binding_fires_while_its_key_is_held() {
        let controls = Controls::new();
        let (_, fired) = counting_binding(&controls, vec![Key::Escape]);

        let mut input = InputState::default();
        let mut runtime = RuntimeCtx::default();

        controls.process(&input, &mut runtime);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        hold(&mut input, Key::Escape);
        controls.process(&input, &mut runtime);
        controls.process(&input, &mut runtime);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn multi_key_binding_needs_every_key() {
        let controls = Controls::new();
        let (_, fired) = counting_binding(&controls, vec![Key::Shift, Key::Q]);

        let mut input = InputState::default();
        let mut runtime = RuntimeCtx::default();

        hold(&mut input, Key::Q);
        controls.process(&input, &mut runtime);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        hold(&mut input, Key::Shift);
        controls.process(&input, &mut runtime);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_bindings_no_longer_fire() {
        let controls = Controls::new();
        let (id, fired) = counting_binding(&controls, vec![Key::Space]);

        let mut input = InputState::default();
        let mut runtime = RuntimeCtx::default();
        hold(&mut input, Key::Space);

        assert!(controls.remove_binding(id));
        assert!(!controls.remove_binding(id));
        controls.process(&input, &mut runtime);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bindings_run_in_registration_order() {
        let controls = Controls::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            controls.add_binding([Key::Enter], move |_| {
                order.lock().unwrap().push(tag);
            });
        }

        let mut input = InputState::default();
        let mut runtime = RuntimeCtx::default();
        hold(&mut input, Key::Enter);
        controls.process(&input, &mut runtime);

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
