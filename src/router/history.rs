use std::sync::Mutex;
use tracing::debug;

/// Location control shared by the router and the auth service.
///
/// `hard_navigate` is the equivalent of assigning the browser location: it
/// moves to the path and asks the shell to reboot from scratch.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn hard_navigate(&self, path: &str);
    /// Target of a hard navigation that has not been carried out yet
    fn pending_navigation(&self) -> Option<String>;
}

#[derive(Debug)]
struct HistoryState {
    entries: Vec<String>,
    index: usize,
    reload_pending: bool,
}

/// Session history: a stack of visited paths with a cursor
#[derive(Debug)]
pub struct History {
    state: Mutex<HistoryState>,
}

impl History {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(HistoryState {
                entries: vec![initial_path.into()],
                index: 0,
                reload_pending: false,
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut HistoryState) -> R) -> R {
        // A poisoned lock still holds a consistent stack
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Push a new entry, discarding anything ahead of the cursor
    pub fn push(&self, path: impl Into<String>) {
        let path = path.into();
        self.with_state(|state| {
            state.entries.truncate(state.index + 1);
            state.entries.push(path);
            state.index = state.entries.len() - 1;
        });
    }

    /// Step back, returning the new current path
    pub fn back(&self) -> Option<String> {
        self.with_state(|state| {
            if state.index == 0 {
                return None;
            }
            state.index -= 1;
            Some(state.entries[state.index].clone())
        })
    }

    /// Step forward, returning the new current path
    pub fn forward(&self) -> Option<String> {
        self.with_state(|state| {
            if state.index + 1 >= state.entries.len() {
                return None;
            }
            state.index += 1;
            Some(state.entries[state.index].clone())
        })
    }

    /// Request a reboot without changing location
    pub fn request_reload(&self) {
        self.with_state(|state| state.reload_pending = true);
    }

    /// Consume a pending reboot request
    pub fn take_reload(&self) -> bool {
        self.with_state(|state| std::mem::take(&mut state.reload_pending))
    }

    pub fn len(&self) -> usize {
        self.with_state(|state| state.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        self.with_state(|state| state.entries[state.index].clone())
    }

    fn hard_navigate(&self, path: &str) {
        self.with_state(|state| {
            if state.reload_pending && state.entries[state.index] == path {
                debug!(path, "Hard navigation already pending");
                return;
            }
            debug!(path, "Hard navigation requested");
            state.entries.truncate(state.index + 1);
            state.entries.push(path.to_string());
            state.index = state.entries.len() - 1;
            state.reload_pending = true;
        });
    }

    fn pending_navigation(&self) -> Option<String> {
        self.with_state(|state| {
            state
                .reload_pending
                .then(|| state.entries[state.index].clone())
        })
    }
}
