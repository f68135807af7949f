//! Notice channel: informational progress and integrity warnings.
//!
//! `Notice` is what a declaration reports when it turns into a no-op, and what
//! bulk import reports as it goes. A taxonomy owns one injected
//! [`NoticeSink`]; delivery is synchronous and best-effort, with no
//! acknowledgment or queuing. Sinks render to `tracing` (the default), text
//! lines, JSON lines, or collect in memory (testing).

use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

// ── Notice types ────────────────────────────────────────────────────────

/// A structured notice emitted by a taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum Notice {
    /// Progress or summary information.
    Info { text: String },
    /// A declaration was skipped because it contradicts the taxonomy.
    Warning {
        text: String,
        /// Display name of the subject entity.
        subject: String,
        /// Display name of the object entity, or the rendered literal.
        object: String,
        /// Vocabulary term of the attempted relation.
        attempted: String,
        /// Vocabulary terms of the relations already holding.
        conflicting: Vec<String>,
    },
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Info { text: text.into() }
    }

    /// A warning for a rejected `attempted(subject, object)` declaration.
    pub fn conflict(
        subject: impl Into<String>,
        object: impl Into<String>,
        attempted: impl Into<String>,
        conflicting: Vec<String>,
    ) -> Self {
        let (subject, object, attempted) = (subject.into(), object.into(), attempted.into());
        let text = format!(
            "cannot declare {attempted}({subject}, {object}): conflicts with {}",
            conflicting.join(", ")
        );
        Self::Warning {
            text,
            subject,
            object,
            attempted,
            conflicting,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info { text } | Notice::Warning { text, .. } => text,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Notice::Warning { .. })
    }
}

// ── NoticeSink trait ────────────────────────────────────────────────────

/// A destination for notices.
pub trait NoticeSink: Send + Sync {
    /// Emit a single notice.
    fn emit(&self, notice: &Notice);

    /// Emit a batch of notices.
    fn emit_batch(&self, notices: &[Notice]) {
        for n in notices {
            self.emit(n);
        }
    }
}

// ── TracingSink ─────────────────────────────────────────────────────────

/// Forwards notices to `tracing` at the matching level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn emit(&self, notice: &Notice) {
        match notice {
            Notice::Info { text } => tracing::info!(target: "taxonomia::notice", "{text}"),
            Notice::Warning {
                text,
                subject,
                object,
                attempted,
                ..
            } => tracing::warn!(
                target: "taxonomia::notice",
                subject = %subject,
                object = %object,
                attempted = %attempted,
                "{text}"
            ),
        }
    }
}

// ── TextSink ────────────────────────────────────────────────────────────

/// Renders notices as terminal lines on `W`. The CLI writes to stderr so
/// notices never interleave with command output.
#[derive(Debug)]
pub struct TextSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> NoticeSink for TextSink<W> {
    fn emit(&self, notice: &Notice) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = match notice {
            Notice::Info { text } => writeln!(out, "[info] {text}"),
            Notice::Warning { text, .. } => writeln!(out, "[warn] {text}"),
        };
    }
}

// ── JsonSink ────────────────────────────────────────────────────────────

/// Emits notices as newline-delimited JSON on `W`.
#[derive(Debug)]
pub struct JsonSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> NoticeSink for JsonSink<W> {
    fn emit(&self, notice: &Notice) {
        let Ok(json) = serde_json::to_string(notice) else {
            return;
        };
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{json}");
        }
    }
}

// ── VecSink ─────────────────────────────────────────────────────────────

/// Collects notices in memory for testing.
#[derive(Debug, Default)]
pub struct VecSink {
    notices: Mutex<Vec<Notice>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected notices.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Only the warnings.
    pub fn warnings(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(Notice::is_warning)
            .collect()
    }

    /// Number of collected notices.
    pub fn len(&self) -> usize {
        self.notices.lock().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything collected so far.
    pub fn clear(&self) {
        if let Ok(mut n) = self.notices.lock() {
            n.clear();
        }
    }
}

impl NoticeSink for VecSink {
    fn emit(&self, notice: &Notice) {
        if let Ok(mut n) = self.notices.lock() {
            n.push(notice.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_notices() {
        let sink = VecSink::new();
        sink.emit(&Notice::info("imported 10 edges"));
        sink.emit(&Notice::conflict(
            "ex:X",
            "ex:Y",
            "related",
            vec!["broader".into()],
        ));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.warnings().len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn conflict_text_names_both_entities_and_kinds() {
        let n = Notice::conflict("ex:A", "ex:B", "subClassOf", vec!["disjointWith".into()]);
        assert!(n.is_warning());
        assert!(n.text().contains("ex:A"));
        assert!(n.text().contains("ex:B"));
        assert!(n.text().contains("subClassOf"));
        assert!(n.text().contains("disjointWith"));
    }

    #[test]
    fn json_sink_writes_one_parseable_line_per_notice() {
        let sink = JsonSink::new(Vec::new());
        sink.emit_batch(&[
            Notice::info("import finished"),
            Notice::conflict("ex:X", "ex:Y", "related", vec!["broader".into()]),
        ]);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Notice> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].is_warning());
    }

    #[test]
    fn text_sink_prefixes_severity() {
        let sink = TextSink::new(Vec::new());
        sink.emit(&Notice::info("import: 2/4 edges processed"));
        sink.emit(&Notice::conflict("ex:A", "ex:B", "subClassOf", vec!["disjointWith".into()]));
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[info] import: 2/4 edges processed");
        assert!(lines[1].starts_with("[warn] cannot declare subClassOf(ex:A, ex:B)"));
    }

    #[test]
    fn notice_serializes_with_severity_tag() {
        let json = serde_json::to_string(&Notice::info("hello")).unwrap();
        assert_eq!(json, r#"{"severity":"info","text":"hello"}"#);
        let back: Notice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Notice::info("hello"));
    }

    #[test]
    fn batch_emit() {
        let sink = VecSink::new();
        sink.emit_batch(&[Notice::info("one"), Notice::info("two")]);
        assert_eq!(sink.len(), 2);
    }
}
