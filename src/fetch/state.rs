use super::errors::FetchError;

/// How a result-state container reacts to the phases of an attempt.
///
/// The lifecycle only ever calls these for the live attempt, so an
/// implementation never has to reason about staleness.
pub trait StateSurface<T>: Default + Clone + Send + Sync + 'static {
    fn begin(&mut self);

    fn resolve(&mut self, data: T);

    fn reject(&mut self, error: &FetchError);

    fn is_loading(&self) -> bool;
}

/// State exposed by a keyed fetch: the error keeps its message
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T: Default> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            is_loading: false,
            error: None,
        }
    }
}

impl<T> StateSurface<T> for FetchState<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn begin(&mut self) {
        self.is_loading = true;
    }

    fn resolve(&mut self, data: T) {
        self.data = data;
        self.is_loading = false;
        self.error = None;
    }

    fn reject(&mut self, error: &FetchError) {
        self.is_loading = false;
        self.error = Some(error.user_message());
    }

    fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// State exposed by a polling fetch: the error is only a presence flag
#[derive(Debug, Clone, PartialEq)]
pub struct PollState<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: bool,
}

impl<T: Default> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            is_loading: false,
            error: false,
        }
    }
}

impl<T> StateSurface<T> for PollState<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn begin(&mut self) {
        self.is_loading = true;
    }

    fn resolve(&mut self, data: T) {
        self.data = data;
        self.is_loading = false;
        self.error = false;
    }

    fn reject(&mut self, _error: &FetchError) {
        self.is_loading = false;
        self.error = true;
    }

    fn is_loading(&self) -> bool {
        self.is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_is_concrete() {
        let state = FetchState::<Vec<u32>>::default();
        assert!(state.data.is_empty());
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reject_keeps_previous_data() {
        let mut state = FetchState::<Vec<u32>>::default();
        state.begin();
        state.resolve(vec![1, 2]);
        state.begin();
        state.reject(&FetchError::Status(500));
        assert_eq!(state.data, vec![1, 2]);
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("request failed with status 500"));
    }

    #[test]
    fn test_error_survives_until_next_success() {
        let mut state = FetchState::<Vec<u32>>::default();
        state.reject(&FetchError::Status(502));
        state.begin();
        assert!(state.is_loading);
        assert!(state.error.is_some());
        state.resolve(vec![3]);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_poll_state_only_flags_errors() {
        let mut state = PollState::<Vec<u32>>::default();
        state.begin();
        state.reject(&FetchError::Transport("connection reset".to_string()));
        assert!(state.error);
        assert!(!state.is_loading);
        state.begin();
        state.resolve(vec![9]);
        assert!(!state.error);
        assert_eq!(state.data, vec![9]);
    }
}
