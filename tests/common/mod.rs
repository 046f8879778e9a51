#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde_json::{json, Value};

use johnny_reports::fonts::{remote_font_url, FontResolver, FontSource, ResolveFont, ResolvedFont};
use johnny_reports::layout::ReportLayout;
use johnny_reports::pipeline::ReportPipeline;
use johnny_reports::render::{PdfRenderer, RenderDocument, RenderError};
use johnny_reports::store::{RowQuery, RowStore, StoreError};

/// In-memory row store that records the queries it receives.
pub struct FakeStore {
    rows: Vec<Value>,
    failure: Option<String>,
    queries: std::sync::Mutex<Vec<RowQuery>>,
}

impl FakeStore {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            failure: None,
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(message.to_owned()),
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<RowQuery> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl RowStore for FakeStore {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Value>, StoreError> {
        self.queries.lock().expect("queries lock").push(query.clone());
        match &self.failure {
            Some(message) => Err(StoreError::Rejected {
                status: 401,
                message: message.clone(),
            }),
            None => Ok(self.rows.clone()),
        }
    }
}

/// Font resolver wrapper counting how often it is asked for a font.
pub struct CountingFonts {
    inner: FontResolver,
    pub calls: AtomicUsize,
}

impl CountingFonts {
    pub fn new(inner: FontResolver) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResolveFont for CountingFonts {
    async fn resolve(&self) -> ResolvedFont {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve().await
    }
}

/// Renderer wrapper counting invocations, optionally failing.
pub struct CountingRenderer {
    fail: bool,
    pub calls: AtomicUsize,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RenderDocument for CountingRenderer {
    fn render(&self, layout: &ReportLayout, font: &ResolvedFont) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RenderError::Writer("simulated writer failure".to_owned()));
        }
        PdfRenderer.render(layout, font)
    }
}

/// A resolver whose local and remote sources both fail.
pub fn unavailable_fonts() -> FontResolver {
    FontResolver::new(vec![
        FontSource::LocalFile(PathBuf::from("/__johnny_reports_missing_fonts__/font.ttf")),
        FontSource::Remote(remote_font_url("http://127.0.0.1:9")),
    ])
}

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub fonts: Arc<CountingFonts>,
    pub renderer: Arc<CountingRenderer>,
    pub pipeline: ReportPipeline,
}

impl Harness {
    pub fn new(store: FakeStore) -> Self {
        Self::with_parts(store, unavailable_fonts(), CountingRenderer::new())
    }

    pub fn with_parts(store: FakeStore, fonts: FontResolver, renderer: CountingRenderer) -> Self {
        let store = Arc::new(store);
        let fonts = Arc::new(CountingFonts::new(fonts));
        let renderer = Arc::new(renderer);
        let pipeline = ReportPipeline::new(store.clone(), fonts.clone(), renderer.clone());
        Self {
            store,
            fonts,
            renderer,
            pipeline,
        }
    }
}

pub fn fixed_time() -> DateTime<Local> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 15, 0)
        .unwrap()
        .with_timezone(&Local)
}

pub fn wellness_rows() -> Vec<Value> {
    vec![
        json!({
            "created_at": "2025-05-01T08:00:00+00:00",
            "mood_level": 4,
            "sleep_hours": 7.5,
            "exercise_minutes": 30,
            "journal_entry": "Walked to the park."
        }),
        json!({
            "created_at": "2025-05-02T08:00:00+00:00",
            "mood_level": 8,
            "sleep_hours": null,
            "exercise_minutes": null,
            "journal_entry": null
        }),
    ]
}

pub fn trust_rows() -> Vec<Value> {
    vec![
        json!({
            "created_at": "2025-05-01T10:00:00+00:00",
            "amount": 1500,
            "type": "distribution",
            "note": "Monthly stipend"
        }),
        json!({
            "created_at": "2025-05-03T10:00:00+00:00",
            "amount": 245.75,
            "type": "expense",
            "note": null
        }),
    ]
}

/// First TrueType file found among common system font locations.
pub fn system_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|path| path.is_file())
}
