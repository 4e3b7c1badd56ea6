//! `diff` and `reload` subcommands. Both return a JSON report.

use anyhow::{Context, Result};
use core_config::Config;
use core_model::{EolProvider, ModelRegistry, ResourceId};
use core_text::{EditOperation, Eol, LineBuffer, compute_edits};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub old_eol: Eol,
    pub new_eol: Eol,
    pub edits: Vec<EditOperation>,
}

#[derive(Debug, Serialize)]
pub struct ReloadReport {
    pub resource: String,
    pub eol: Eol,
    pub edits: Vec<EditOperation>,
    pub version_id: u64,
    pub alternative_version_id: u64,
    pub undo_restores_original: bool,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Block edit turning the contents of `old` into the contents of `new`.
pub fn run_diff(config: &Config, old: &Path, new: &Path, language_id: Option<&str>) -> Result<DiffReport> {
    let old_eol = config.eol(Some(&ResourceId::from_path(old)), language_id);
    let new_eol = config.eol(Some(&ResourceId::from_path(new)), language_id);
    let old_buffer = LineBuffer::new(&read(old)?, old_eol);
    let new_buffer = LineBuffer::new(&read(new)?, new_eol);
    let edits = compute_edits(&old_buffer, &new_buffer);
    info!(target: "runtime", old = %old.display(), new = %new.display(), edits = edits.len(), "diff_complete");
    Ok(DiffReport {
        old_eol: old_buffer.eol(),
        new_eol: new_buffer.eol(),
        edits,
    })
}

/// Load `file` as a model, reconcile it with `new`, and check that one undo gets back to `file`.
pub fn run_reload(config: Config, file: &Path, new: &Path, language_id: Option<&str>) -> Result<ReloadReport> {
    let original = read(file)?;
    let replacement = read(new)?;
    let mut registry = ModelRegistry::from_config(config);
    let resource = registry.create_model(&original, language_id, Some(ResourceId::from_path(file)))?;
    let before = registry.model(&resource)?.value();
    let edits = registry.update_model(&resource, &replacement)?;

    let model = registry.model(&resource)?;
    let (eol, version_id, alternative_version_id) =
        (model.eol(), model.version_id(), model.alternative_version_id());

    let undo_restores_original = if edits.is_empty() {
        true
    } else {
        registry.undo(&resource)?.is_applied() && registry.model(&resource)?.value() == before
    };
    info!(
        target: "runtime",
        %resource,
        edits = edits.len(),
        version_id,
        alternative_version_id,
        undo_restores_original,
        "reload_complete"
    );
    Ok(ReloadReport {
        resource: resource.to_string(),
        eol,
        edits,
        version_id,
        alternative_version_id,
        undo_restores_original,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Range;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::subscriber::with_default;
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            self.events.lock().unwrap().push(CapturedEvent {
                target: event.metadata().target().to_string(),
                fields: collector.fields,
            });
        }
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn diff_reports_single_block_edit() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(&dir, "old.txt", "This is line one\nand this is line number two\n");
        let new = write(&dir, "new.txt", "This is line One\nand this is line number two\n");
        let report = run_diff(&Config::default(), &old, &new, None).unwrap();
        assert_eq!(report.edits.len(), 1);
        assert_eq!(report.edits[0].range, Range::new(1, 1, 2, 1));
        assert_eq!(report.edits[0].text, "This is line One\n");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["edits"][0]["is_replace_move"], serde_json::Value::Bool(true));
    }

    #[test]
    fn diff_of_eol_only_change_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let old = write(&dir, "old.txt", "a\nb\nc");
        let new = write(&dir, "new.txt", "a\r\nb\r\nc");
        let report = run_diff(&Config::default(), &old, &new, None).unwrap();
        assert!(report.edits.is_empty());
        assert_eq!(report.old_eol, Eol::Lf);
        assert_eq!(report.new_eol, Eol::Crlf);
    }

    #[test]
    fn reload_is_undoable_and_logs_under_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "file.txt", "one\ntwo\nthree");
        let new = write(&dir, "new.txt", "one\nTWO\nthree");

        let capture = Capture::default();
        let subscriber = Registry::default().with(capture.clone());
        let report = with_default(subscriber, || {
            run_reload(Config::default(), &file, &new, None).unwrap()
        });

        assert_eq!(report.edits.len(), 1);
        assert_eq!(report.version_id, 2);
        assert_eq!(report.alternative_version_id, 2);
        assert!(report.undo_restores_original);
        assert!(report.resource.starts_with("file://"));

        let events = capture.events.lock().unwrap();
        let reload = events
            .iter()
            .find(|e| e.target == "runtime")
            .expect("runtime event");
        assert!(
            reload
                .fields
                .iter()
                .any(|(k, v)| k == "message" && v == "reload_complete")
        );
        assert!(events.iter().any(|e| e.target == "model.registry"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "file.txt", "x");
        let err = run_reload(Config::default(), &file, &dir.path().join("nope.txt"), None).unwrap_err();
        assert!(format!("{err:#}").contains("nope.txt"));
    }
}
