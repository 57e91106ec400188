// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex, MutexGuard};

use quill_config::{Config, EditorConfig, SelectionPolicy};
use quill_format::{FormatOptions, LayoutMode, WordCount};
use quill_remote::{
    Backend, ComposedUnit, ExpandRequest, PolishRequest, ReformatRequest, SummarizeRequest,
    UnitUpdate,
};
use tracing::{debug, info, warn};

use crate::{
    apply_reformat, extract,
    placeholders::{self, Token, Values},
    templates::{TemplateCategory, TemplateResolver},
    BusyFlags, EditingSession, Extracted, InFlight, Mutation, OpError, OpKind, Placement,
    RangeMutator, ReformatOutcome, Selection,
};

/// Style tag sent with every generation request.
const REQUEST_STYLE: &str = "default";

/// A generation result that landed in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub kind: OpKind,
    pub mutation: Mutation,
    pub result: String,
}

/// Result of [`Editor::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(Applied),
    Reformatted(ReformatOutcome),
    Saved(ComposedUnit),
}

/// A prepared generation: the busy guard, the captured text and the fully
/// substituted instruction.
struct Prepared {
    _guard: InFlight,
    capture: Extracted,
    prompt: String,
}

/// The writing-assistant controller for one open unit.
///
/// Every operation captures its input from the session, releases the
/// session while the request is in flight, and re-locks it only to apply
/// the answer.  Operations of different kinds may therefore overlap; the
/// one whose answer arrives last is applied last.
pub struct Editor {
    backend: Arc<dyn Backend>,
    config: EditorConfig,
    format: FormatOptions,
    novel_id: Option<String>,
    busy: BusyFlags,
    mutator: RangeMutator,
    session: Mutex<EditingSession>,
}

impl Editor {
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        Self {
            backend,
            mutator: RangeMutator::new(config.editor.selection_policy),
            config: config.editor.clone(),
            format: config.format.clone(),
            novel_id: config.remote.novel_id.clone().filter(|id| !id.is_empty()),
            busy: BusyFlags::new(),
            session: Mutex::new(EditingSession::default()),
        }
    }

    /// Replace the session.
    pub fn with_session(self, session: EditingSession) -> Self {
        *self.lock() = session;
        self
    }

    /// Open `unit` for editing, discarding the current buffer.
    pub fn open(&self, unit: &ComposedUnit) {
        info!(id = %unit.id, title = %unit.title, "opened unit");
        *self.lock() = EditingSession::open(unit);
    }

    fn lock(&self) -> MutexGuard<'_, EditingSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn session(&self) -> EditingSession {
        self.lock().clone()
    }

    pub fn text(&self) -> String {
        self.lock().text().to_string()
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection()
    }

    pub fn set_selection(&self, anchor: usize, head: usize) {
        self.lock().set_selection(anchor, head);
    }

    pub fn set_caret(&self, pos: usize) {
        self.lock().set_caret(pos);
    }

    /// Apply a local edit, as typing would.
    pub fn edit(&self, range: std::ops::Range<usize>, text: &str) {
        self.lock().edit(range, text);
    }

    pub fn undo(&self) -> bool {
        self.lock().undo()
    }

    pub fn word_count(&self) -> WordCount {
        WordCount::of(self.lock().text())
    }

    pub fn busy(&self) -> &BusyFlags {
        &self.busy
    }

    pub fn can_dispatch(&self, kind: OpKind) -> bool {
        self.busy.can_dispatch(kind)
    }

    fn begin(&self, kind: OpKind) -> Result<InFlight, OpError> {
        self.busy.try_begin(kind).ok_or(OpError::Busy(kind))
    }

    fn capture(&self, kind: OpKind) -> Result<Extracted, OpError> {
        extract(&self.lock(), kind, self.config.expand_tail_chars)
    }

    async fn prepare(&self, kind: OpKind, category: TemplateCategory) -> Result<Prepared, OpError> {
        let guard = self.begin(kind)?;
        let capture = self.capture(kind)?;
        let template = TemplateResolver::new(self.backend.as_ref())
            .resolve(category, category.key(capture.had_selection), self.novel_id.as_deref())
            .await;
        let values = Values::new(self.config.sentinel.as_str())
            .with(Token::OriginalText, capture.text.as_str())
            .with(Token::Style, self.config.default_style.as_str());
        let prompt = placeholders::apply(&template.text, &values);
        if placeholders::has_unresolved(&prompt) {
            warn!(%kind, "prompt still contains placeholders after substitution");
        }
        debug!(%kind, had_selection = capture.had_selection, chars = capture.text.chars().count(), "dispatching");
        Ok(Prepared {
            _guard: guard,
            capture,
            prompt,
        })
    }

    fn land(
        &self,
        kind: OpKind,
        capture: &Extracted,
        placement: Placement,
        result: Option<String>,
    ) -> Result<Applied, OpError> {
        let result = result
            .filter(|t| !t.trim().is_empty())
            .ok_or(OpError::EmptyResult(kind))?;
        let mutation = self
            .mutator
            .apply(&mut self.lock(), kind, capture, &placement, &result)?;
        Ok(Applied {
            kind,
            mutation,
            result,
        })
    }

    /// Expand the selection in place, or continue the document tail at the
    /// caret.
    pub async fn expand(&self) -> Result<Applied, OpError> {
        let kind = OpKind::Expand;
        let p = self.prepare(kind, TemplateCategory::Expand).await?;
        let req = ExpandRequest {
            novel_id: self.novel_id.clone(),
            prompt_template: p.prompt,
            input_summary: p.capture.text.clone(),
            style: REQUEST_STYLE.to_string(),
            max_tokens: self.config.expand_max_tokens,
        };
        let res = self
            .backend
            .expand(req)
            .await
            .map_err(|source| OpError::Remote { kind, source })?;
        let placement = if p.capture.had_selection {
            Placement::Replace
        } else {
            Placement::Insert {
                prefix: self.config.insert_separator.clone(),
                suffix: String::new(),
            }
        };
        self.land(kind, &p.capture, placement, res.result_text)
    }

    /// Rewrite the selection.  Requires a non-blank selection.
    pub async fn polish(&self) -> Result<Applied, OpError> {
        let kind = OpKind::Polish;
        let p = self.prepare(kind, TemplateCategory::Polish).await?;
        let req = PolishRequest {
            text: format!("{}\n\n{}", p.prompt, p.capture.text),
            preserve_content: true,
            style: REQUEST_STYLE.to_string(),
        };
        let res = self
            .backend
            .polish(req)
            .await
            .map_err(|source| OpError::Remote { kind, source })?;
        self.land(kind, &p.capture, Placement::Replace, res.result_text)
    }

    /// Summarize the selection (or the whole buffer) and insert the summary
    /// at the caret.
    pub async fn summarize(&self) -> Result<Applied, OpError> {
        let kind = OpKind::Summarize;
        let p = self.prepare(kind, TemplateCategory::Summarize).await?;
        let req = SummarizeRequest {
            text: format!("{}\n\n{}", p.prompt, p.capture.text),
            max_sentences: self.config.summarize_max_sentences,
        };
        let res = self
            .backend
            .summarize(req)
            .await
            .map_err(|source| OpError::Remote { kind, source })?;
        let placement = Placement::Insert {
            prefix: format!("{}【概要】", self.config.insert_separator),
            suffix: "\n".to_string(),
        };
        self.land(kind, &p.capture, placement, res.result_summary)
    }

    /// Reformat the whole buffer with the configured options, optionally
    /// overriding the layout mode.
    pub async fn reformat(&self, mode: Option<LayoutMode>) -> Result<ReformatOutcome, OpError> {
        let kind = OpKind::Reformat;
        let _guard = self.begin(kind)?;
        let capture = self.capture(kind)?;
        let settings = match mode {
            Some(m) => self.format.clone().with_mode(m),
            None => self.format.clone(),
        };
        let req = ReformatRequest {
            text: capture.text.clone(),
            settings,
        };
        let res = self
            .backend
            .reformat(req)
            .await
            .map_err(|source| OpError::Remote { kind, source })?;

        let mut session = self.lock();
        if self.mutator.policy == SelectionPolicy::Strict && session.text() != capture.text {
            return Err(OpError::StaleSelection(kind));
        }
        apply_reformat(&mut session, &capture.text, res)
    }

    /// Persist the buffer as the open unit's content.
    pub async fn save(&self) -> Result<ComposedUnit, OpError> {
        let kind = OpKind::Save;
        let _guard = self.begin(kind)?;
        let (id, capture, revision) = {
            let session = self.lock();
            let id = session
                .unit_id()
                .map(str::to_string)
                .ok_or_else(|| OpError::precondition(kind, "no unit is open"))?;
            let capture = extract(&session, kind, 0)?;
            (id, capture, session.revision())
        };

        let saved = self
            .backend
            .update_unit(&id, UnitUpdate::content(capture.text))
            .await
            .map_err(|source| OpError::Remote { kind, source })?;

        let mut session = self.lock();
        if saved.id != id {
            info!(old = %id, new = %saved.id, "unit identity changed on save");
            session.retarget(saved.id.clone());
        }
        session.mark_saved(revision);
        info!(id = %saved.id, "saved");
        Ok(saved)
    }

    /// Run `kind` with its default arguments.
    pub async fn dispatch(&self, kind: OpKind) -> Result<Outcome, OpError> {
        let outcome = match kind {
            OpKind::Expand => Outcome::Applied(self.expand().await?),
            OpKind::Polish => Outcome::Applied(self.polish().await?),
            OpKind::Summarize => Outcome::Applied(self.summarize().await?),
            OpKind::Reformat => Outcome::Reformatted(self.reformat(None).await?),
            OpKind::Save => Outcome::Saved(self.save().await?),
        };
        Ok(outcome)
    }
}
