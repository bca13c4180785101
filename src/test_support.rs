use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

use crate::models::RawCountry;
use crate::repository::{CountrySource, DataLoadFailure};

pub struct StaticSource(Vec<RawCountry>);

impl StaticSource {
    pub fn from_json(value: Value) -> Self {
        Self(serde_json::from_value(value).unwrap())
    }
}

impl CountrySource for StaticSource {
    async fn fetch(&self) -> Result<Vec<RawCountry>, DataLoadFailure> {
        Ok(self.0.clone())
    }
}

/// Simulates the service being unreachable.
pub struct FailingSource;

impl CountrySource for FailingSource {
    async fn fetch(&self) -> Result<Vec<RawCountry>, DataLoadFailure> {
        Err(DataLoadFailure::Status(503))
    }
}

#[derive(Clone, Default)]
pub struct Diagnostics(Arc<AtomicUsize>);

impl Diagnostics {
    pub fn load_failures(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

struct KindVisitor(Option<String>);

impl Visit for KindVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "kind" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: Subscriber> Layer<S> for Diagnostics {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != "diagnostics" {
            return;
        }
        let mut visitor = KindVisitor(None);
        event.record(&mut visitor);
        if visitor.0.as_deref() == Some("DataLoadFailure") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Counts `DataLoadFailure` events on the current thread while the guard lives.
pub fn capture_diagnostics() -> (Diagnostics, DefaultGuard) {
    let diagnostics = Diagnostics::default();
    let subscriber = tracing_subscriber::registry().with(diagnostics.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (diagnostics, guard)
}

/// Serves `router` on an ephemeral local port and returns the `/all` URL.
pub async fn serve_local(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/all", addr)
}
