//! Shared fixtures for tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vitis_client::TradeTableExtractor;
use vitis_core::{Db, Error, ExportPages, Fetcher, IngestEngine, PipelineSettings};

pub struct StubFetcher {
    payload: Option<String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn serving(payload: String) -> Arc<Self> {
        Arc::new(Self { payload: Some(payload), calls: AtomicUsize::new(0) })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { payload: None, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch_raw(&self) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payload
            .clone()
            .ok_or_else(|| Error::HttpError("network error: connection reset".into()))
    }

    fn describe(&self) -> String {
        "stub".into()
    }
}

/// Export page with `n` distinct rows.
pub fn export_html(n: usize) -> String {
    let rows: String = (0..n)
        .map(|i| format!("<tr><td>País {i}</td><td>{}</td><td>{}</td></tr>", i * 1_000, i * 2_000))
        .collect();
    format!(
        r#"<html><body><table class="tb_base tb_dados">
            <thead><tr><th>Países</th><th>Quantidade (Kg)</th><th>Valor (US$)</th></tr></thead>
            <tbody>{rows}</tbody>
        </table></body></html>"#
    )
}

pub async fn pages_with(fetcher: Arc<StubFetcher>) -> (ExportPages, Db, Arc<StubFetcher>) {
    let db = Db::open_in_memory().await.unwrap();
    let pages = ExportPages::new(
        fetcher.clone(),
        Arc::new(TradeTableExtractor::new().unwrap()),
        IngestEngine::new(Arc::new(db.clone()), Duration::from_secs(5)),
        Arc::new(db.clone()),
        PipelineSettings::default(),
    );
    (pages, db, fetcher)
}
