use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent<T> {
    Refresh,
    Loaded(T),
    FetchFailed(String),
}

impl<T> ViewState<T> {
    pub fn reduce(self, event: ViewEvent<T>) -> Self {
        match event {
            ViewEvent::Refresh => Self::Loading,
            ViewEvent::Loaded(data) => Self::Ready(data),
            ViewEvent::FetchFailed(message) => Self::Failed(message),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Fetches are never aborted; after teardown their results are dropped.
pub struct View<T> {
    name: &'static str,
    state: Arc<Mutex<ViewState<T>>>,
    scope: CancellationToken,
}

impl<T: Send + 'static> View<T> {
    pub fn mount(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(ViewState::Idle)),
            scope: CancellationToken::new(),
        }
    }

    pub async fn dispatch(&self, event: ViewEvent<T>) {
        if self.scope.is_cancelled() {
            return;
        }
        let mut state = self.state.lock().await;
        let current = std::mem::replace(&mut *state, ViewState::Idle);
        *state = current.reduce(event);
    }

    pub async fn refresh<F, E>(&self, fetch: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.dispatch(ViewEvent::Refresh).await;

        let name = self.name;
        let state = Arc::clone(&self.state);
        let scope = self.scope.clone();
        tokio::spawn(async move {
            let event = match fetch.await {
                Ok(data) => ViewEvent::Loaded(data),
                Err(err) => {
                    error!(view = name, "fetch failed: {err}");
                    ViewEvent::FetchFailed(err.to_string())
                }
            };
            if scope.is_cancelled() {
                debug!(view = name, "view torn down, dropping late response");
                return;
            }
            let mut state = state.lock().await;
            let current = std::mem::replace(&mut *state, ViewState::Idle);
            *state = current.reduce(event);
        })
    }

    pub fn teardown(&self) {
        self.scope.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.scope.is_cancelled()
    }
}

impl<T: Clone + Send + 'static> View<T> {
    pub async fn snapshot(&self) -> ViewState<T> {
        self.state.lock().await.clone()
    }

    pub async fn load<F, E>(&self, fetch: F) -> ViewState<T>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let handle = self.refresh(fetch).await;
        if let Err(err) = handle.await {
            error!(view = self.name, "fetch task failed: {err}");
            self.dispatch(ViewEvent::FetchFailed(err.to_string())).await;
        }
        self.snapshot().await
    }
}

impl<T> Drop for View<T> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn reducer_transitions() {
        let state: ViewState<Vec<u8>> = ViewState::Idle;
        let state = state.reduce(ViewEvent::Refresh);
        assert_eq!(state, ViewState::Loading);
        let state = state.reduce(ViewEvent::Loaded(vec![1]));
        assert_eq!(state.data(), Some(&vec![1]));
        let state = state.reduce(ViewEvent::Refresh);
        assert_eq!(state, ViewState::Loading);
        let state = state.reduce(ViewEvent::FetchFailed("HTTP 500".into()));
        assert_eq!(state.error(), Some("HTTP 500"));
        let state = state.reduce(ViewEvent::Refresh);
        assert_eq!(state, ViewState::Loading);
    }

    #[tokio::test]
    async fn load_settles_to_ready_or_failed() {
        let view = View::mount("customers");
        assert_eq!(view.snapshot().await, ViewState::Idle);

        let ready = view.load(async { Ok::<_, String>(vec!["Aino"]) }).await;
        assert_eq!(ready, ViewState::Ready(vec!["Aino"]));

        let failed = view.load(async { Err::<Vec<&str>, _>("HTTP 503: down") }).await;
        assert_eq!(failed, ViewState::Failed("HTTP 503: down".into()));
    }

    #[tokio::test]
    async fn late_response_after_teardown_is_ignored() {
        let view = View::mount("trainings");
        let (tx, rx) = oneshot::channel::<u32>();
        let handle = view
            .refresh(async move { rx.await.map_err(|err| err.to_string()) })
            .await;
        assert_eq!(view.snapshot().await, ViewState::Loading);

        view.teardown();
        assert!(!view.is_mounted());
        tx.send(7).unwrap();
        handle.await.unwrap();

        assert_eq!(view.snapshot().await, ViewState::Loading);
    }

    #[tokio::test]
    async fn last_completion_wins() {
        let view = View::mount("calendar");
        let (first_tx, first_rx) = oneshot::channel::<&'static str>();
        let (second_tx, second_rx) = oneshot::channel::<&'static str>();

        let first = view
            .refresh(async move { first_rx.await.map_err(|err| err.to_string()) })
            .await;
        let second = view
            .refresh(async move { second_rx.await.map_err(|err| err.to_string()) })
            .await;

        second_tx.send("second").unwrap();
        second.await.unwrap();
        first_tx.send("first").unwrap();
        first.await.unwrap();

        assert_eq!(view.snapshot().await, ViewState::Ready("first"));
    }
}
