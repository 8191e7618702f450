//! View-state machine for fetched data.
//!
//! Every page follows the same lifecycle: `idle → loading → loaded | failed`,
//! re-entering `loading` on refresh or after a mutation. A refresh keeps the
//! previous data visible; a failure keeps it too, so the page can show the
//! stale view plus a dismissible error instead of going blank.

/// Lifecycle of one remote fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteData<T> {
    Idle,
    Loading { prior: Option<T> },
    Loaded(T),
    Failed { error: String, prior: Option<T> },
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        RemoteData::Idle
    }
}

impl<T> RemoteData<T> {
    /// Enter `loading`, carrying any current data along as stale.
    pub fn begin(&mut self) {
        let prior = match std::mem::replace(self, RemoteData::Idle) {
            RemoteData::Idle => None,
            RemoteData::Loading { prior } => prior,
            RemoteData::Loaded(data) => Some(data),
            RemoteData::Failed { prior, .. } => prior,
        };
        *self = RemoteData::Loading { prior };
    }

    pub fn succeed(&mut self, data: T) {
        *self = RemoteData::Loaded(data);
    }

    /// Fail, keeping whatever data was visible before.
    pub fn fail(&mut self, error: impl Into<String>) {
        let prior = match std::mem::replace(self, RemoteData::Idle) {
            RemoteData::Idle => None,
            RemoteData::Loading { prior } => prior,
            RemoteData::Loaded(data) => Some(data),
            RemoteData::Failed { prior, .. } => prior,
        };
        *self = RemoteData::Failed {
            error: error.into(),
            prior,
        };
    }

    /// Resolve the outcome of one fetch in a single call.
    pub fn resolve(&mut self, result: Result<T, String>) {
        match result {
            Ok(data) => self.succeed(data),
            Err(error) => self.fail(error),
        }
    }

    /// The data to render: current, or stale while loading/failed.
    pub fn data(&self) -> Option<&T> {
        match self {
            RemoteData::Idle => None,
            RemoteData::Loading { prior } => prior.as_ref(),
            RemoteData::Loaded(data) => Some(data),
            RemoteData::Failed { prior, .. } => prior.as_ref(),
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            RemoteData::Idle => None,
            RemoteData::Loading { prior } => prior.as_mut(),
            RemoteData::Loaded(data) => Some(data),
            RemoteData::Failed { prior, .. } => prior.as_mut(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RemoteData::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RemoteData::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Dismiss an error banner, restoring the stale data if any.
    pub fn dismiss_error(&mut self) {
        if let RemoteData::Failed { .. } = self {
            match std::mem::replace(self, RemoteData::Idle) {
                RemoteData::Failed {
                    prior: Some(data), ..
                } => *self = RemoteData::Loaded(data),
                _ => *self = RemoteData::Idle,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_load_has_no_stale_data() {
        let mut state: RemoteData<u32> = RemoteData::Idle;
        state.begin();
        assert!(state.is_loading());
        assert_eq!(state.data(), None);

        state.succeed(7);
        assert_eq!(state.data(), Some(&7));
        assert!(!state.is_loading());
    }

    #[test]
    fn refresh_keeps_previous_data_visible() {
        let mut state = RemoteData::Loaded(7);
        state.begin();
        assert!(state.is_loading());
        assert_eq!(state.data(), Some(&7));

        state.succeed(9);
        assert_eq!(state.data(), Some(&9));
    }

    #[test]
    fn failure_keeps_previous_data_and_error() {
        let mut state = RemoteData::Loaded(7);
        state.begin();
        state.fail("backend unreachable");

        assert_eq!(state.data(), Some(&7));
        assert_eq!(state.error(), Some("backend unreachable"));
    }

    #[test]
    fn failure_without_prior_data_has_nothing_to_render() {
        let mut state: RemoteData<u32> = RemoteData::Idle;
        state.begin();
        state.fail("boom");

        assert_eq!(state.data(), None);
        assert_eq!(state.error(), Some("boom"));
    }

    #[test]
    fn dismissing_error_restores_stale_data() {
        let mut state = RemoteData::Loaded(7);
        state.begin();
        state.fail("boom");
        state.dismiss_error();
        assert_eq!(state, RemoteData::Loaded(7));

        let mut empty: RemoteData<u32> = RemoteData::Idle;
        empty.begin();
        empty.fail("boom");
        empty.dismiss_error();
        assert_eq!(empty, RemoteData::Idle);
    }

    #[test]
    fn resolve_maps_results() {
        let mut state: RemoteData<u32> = RemoteData::Idle;
        state.begin();
        state.resolve(Ok(1));
        assert_eq!(state.data(), Some(&1));

        state.begin();
        state.resolve(Err("nope".to_string()));
        assert_eq!(state.error(), Some("nope"));
        assert_eq!(state.data(), Some(&1));
    }
}
