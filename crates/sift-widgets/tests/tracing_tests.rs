#![forbid(unsafe_code)]

//! Tracing instrumentation tests.
//!
//! Render spans and lifecycle events:
//!   cargo test -p sift-widgets --features tracing --test tracing_tests
//!
//! Without the feature nothing is emitted:
//!   cargo test -p sift-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sift_core::geometry::Rect;
use sift_render::frame::Frame;
use sift_widgets::{SearchableSelect, Widget};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

#[derive(Default, Clone)]
struct Captured {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl Captured {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    #[cfg(feature = "tracing")]
    fn widget_spans(&self) -> Vec<CapturedSpan> {
        self.spans()
            .into_iter()
            .filter(|s| s.name == "widget_render")
            .collect()
    }

    #[allow(dead_code)]
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

struct CaptureLayer(Captured);

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());
        self.0.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        if let Some((_, message)) = visitor.0.into_iter().find(|(name, _)| name == "message") {
            self.0.events.lock().unwrap().push(message);
        }
    }
}

fn with_captured<F: FnOnce()>(f: F) -> Captured {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(captured.clone()));
    tracing::subscriber::with_default(subscriber, f);
    captured
}

fn numbered(n: usize) -> SearchableSelect {
    SearchableSelect::from_texts((1..=n).map(|i| format!("Option {i}")))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn open_select_renders_nested_widget_spans() {
    let captured = with_captured(|| {
        let mut select = numbered(1_000);
        select.open();
        let mut frame = Frame::new(30, 12);
        select.render(Rect::new(0, 0, 30, 12), &mut frame);
    });

    let spans = captured.widget_spans();
    let widgets: Vec<&str> = spans
        .iter()
        .filter_map(|s| s.fields.get("widget").map(String::as_str))
        .collect();
    for expected in ["SearchableSelect", "TextInput", "VirtualizedList", "Scrollbar"] {
        assert!(
            widgets.iter().any(|w| w.contains(expected)),
            "missing {expected} span, got {widgets:?}"
        );
    }

    let list = spans
        .iter()
        .find(|s| s.fields.get("widget").is_some_and(|w| w.contains("VirtualizedList")))
        .unwrap();
    assert_eq!(list.parent_name.as_deref(), Some("widget_render"));
    assert_eq!(list.fields.get("items").map(String::as_str), Some("1000"));
}

#[test]
#[cfg(feature = "tracing")]
fn lifecycle_events_are_logged() {
    use sift_core::event::{Event, KeyCode, KeyEvent};
    use std::time::{Duration, Instant};

    let captured = with_captured(|| {
        let t0 = Instant::now();
        let mut select = numbered(20);
        select.open();
        select.handle_event_at(&Event::Key(KeyEvent::new(KeyCode::Char('7'))), t0);
        select.tick_at(t0 + Duration::from_millis(500));
        select.handle_event_at(&Event::Key(KeyEvent::new(KeyCode::Down)), t0);
        select.handle_event_at(&Event::Key(KeyEvent::new(KeyCode::Enter)), t0);
    });

    let events = captured.events();
    for expected in ["select opened", "search query settled", "option selected", "select closed"] {
        assert!(
            events.iter().any(|e| e == expected),
            "missing {expected:?}, got {events:?}"
        );
    }
}

#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_without_feature() {
    let captured = with_captured(|| {
        let mut select = numbered(100);
        select.open();
        let mut frame = Frame::new(30, 12);
        select.render(Rect::new(0, 0, 30, 12), &mut frame);
    });
    assert!(captured.spans().is_empty());
}
