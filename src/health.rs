//! Liveness surface. Reports the process as up; it does not probe the database.

use std::{convert::Infallible, time::Duration};

use axum::{
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::{stream, Stream};
use tracing::debug;

use crate::{state::AppState, users::dto::Empty};

const WATCH_INTERVAL: Duration = Duration::from_secs(5);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health.Health/Check", post(check))
        .route("/v1/health", get(check))
        .route("/v1/health/watch", get(watch))
}

pub async fn check() -> Json<Empty> {
    Json(Empty {})
}

/// Streams an empty message immediately and then once per interval until the
/// client goes away.
pub async fn watch() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("health watch opened");
    Sse::new(ticks(WATCH_INTERVAL)).keep_alive(KeepAlive::default())
}

fn ticks(period: Duration) -> impl Stream<Item = Result<Event, Infallible>> {
    let ticker = tokio::time::interval(period);
    stream::unfold(ticker, |mut ticker| async move {
        ticker.tick().await;
        Some((Ok::<_, Infallible>(Event::default().data("{}")), ticker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Instant;

    #[tokio::test]
    async fn ticks_emit_first_event_immediately_then_periodically() {
        let start = Instant::now();
        let events: Vec<_> = ticks(Duration::from_millis(20)).take(3).collect().await;
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.is_ok()));
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn check_returns_empty() {
        let Json(body) = check().await;
        assert_eq!(body, Empty {});
    }
}
