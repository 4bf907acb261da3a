//! Turn orchestration: the state machine driving one model turn.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, AbortHandle};
use futures_util::StreamExt;
use taleweaver_core::{Action, LlmModel, LogEntry, LogEntryMode, LogEntryRole};
use taleweaver_error::{
    PromptError, PromptErrorKind, TaleweaverError, TaleweaverResult, TransportError,
    TransportErrorKind,
};
use taleweaver_prompt::{
    build_message, LogSource, PromptParamsBuilder, PromptWarning, TurnInput,
};
use taleweaver_stream::{decode_stream, DecodeEvent};
use tracing::{debug, instrument, warn};

use crate::session::TaleSession;
use crate::settings::Settings;
use crate::traits::{ChatBackend, ChatReply, TaleRepository};

/// Narrative shown in place of a turn that failed in transport.
pub const FALLBACK_NARRATIVE: &str =
    "A strange force seems to have scrambled my thoughts. Please repeat that.";

/// Where the orchestrator is within the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum TurnPhase {
    /// No turn in progress
    #[default]
    Idle,
    /// Assembling the prompt (may page in older history)
    BuildingPrompt,
    /// Fragments are arriving and being decoded
    Streaming,
    /// Decoded actions are being applied to world state
    ApplyingActions,
    /// Saving the tale aggregate
    Persisting,
    /// The last turn failed; the log carries the fallback narrative
    Errored,
}

/// Host callbacks for one turn's lifecycle. All have no-op defaults.
pub trait TurnObserver: Send {
    /// A newly-decoded piece of narrative, in order.
    fn on_story_fragment(&mut self, _fragment: &str) {}
    /// The structured actions block, after it has been applied.
    fn on_actions_ready(&mut self, _actions: &[Action]) {}
    /// The narrative survived but the actions block was unrecoverable.
    fn on_action_parse_error(&mut self) {}
    /// The turn failed; the log now carries the fallback narrative.
    fn on_error(&mut self, _error: &TaleweaverError) {}
    /// A non-fatal prompt budget diagnostic.
    fn on_prompt_warning(&mut self, _warning: &PromptWarning) {}
}

/// A no-op observer for hosts that poll the session instead.
pub struct SilentObserver;

impl TurnObserver for SilentObserver {}

/// Cloneable handle that aborts the in-flight request, if any.
///
/// Obtained via [`Orchestrator::cancel_handle`] before a turn starts, so
/// the host can cancel from outside the `send` future. Aborting makes
/// the fragment source terminate promptly; no actions from the aborted
/// response are ever applied.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<Mutex<Option<AbortHandle>>>,
}

impl CancelHandle {
    /// Abort the in-flight request, if any.
    pub fn cancel(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            if let Some(handle) = slot.take() {
                debug!("Aborting in-flight request");
                handle.abort();
            }
        }
    }

    fn arm(&self, handle: AbortHandle) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(handle);
        }
    }

    fn disarm(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.take();
        }
    }
}

/// Drives turns against a backend and repository for one loaded tale.
///
/// Only one request is in flight per orchestrator; starting a new turn
/// first aborts any previous one.
pub struct Orchestrator<B, R> {
    backend: B,
    repository: R,
    settings: Settings,
    session: TaleSession,
    model: Option<LlmModel>,
    phase: TurnPhase,
    cancel: CancelHandle,
    /// Index of the oldest in-memory log entry within the persisted log;
    /// nonzero when the session was loaded with a partial window.
    oldest_loaded_index: usize,
    /// Total persisted log length, which may exceed the in-memory window.
    total_log_count: usize,
}

impl<B, R> Orchestrator<B, R>
where
    B: ChatBackend,
    R: TaleRepository,
{
    /// Create an orchestrator over a fully-loaded session.
    pub fn new(backend: B, repository: R, settings: Settings, session: TaleSession) -> Self {
        let total_log_count = session.tale().log.len();
        Self {
            backend,
            repository,
            settings,
            session,
            model: None,
            phase: TurnPhase::default(),
            cancel: CancelHandle::default(),
            oldest_loaded_index: 0,
            total_log_count,
        }
    }

    /// Declare that the session holds a partial log window starting at
    /// `oldest_loaded_index` of a `total_log_count`-entry persisted log.
    pub fn with_log_window(mut self, oldest_loaded_index: usize, total_log_count: usize) -> Self {
        self.oldest_loaded_index = oldest_loaded_index;
        self.total_log_count = total_log_count;
        self
    }

    /// Select the model for subsequent turns.
    pub fn set_model(&mut self, model: LlmModel) {
        self.model = Some(model);
    }

    /// Current turn phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The live session, for reading and for host-driven edits
    /// (undo/redo, entry edits) between turns.
    pub fn session(&self) -> &TaleSession {
        &self.session
    }

    /// Mutable session access between turns.
    pub fn session_mut(&mut self) -> &mut TaleSession {
        &mut self.session
    }

    /// Handle for cancelling from outside an in-flight `send` future.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Persist the tale through the repository.
    pub async fn save(&self) -> TaleweaverResult<()> {
        self.repository.save(self.session.tale()).await
    }

    /// Submit player input and run the resulting turn to completion.
    ///
    /// A `Story` input becomes narration inserted verbatim ahead of a
    /// continue; a `Continue` input re-prompts from the last GM text. Any
    /// other mode logs a player entry and asks for a fresh narration.
    ///
    /// # Errors
    ///
    /// Returns an error when no model is selected or persistence fails.
    /// Transport failures do not error: they surface via
    /// [`TurnObserver::on_error`] and the fallback narrative.
    #[instrument(skip(self, observer), fields(mode = ?mode))]
    pub async fn submit(
        &mut self,
        text: &str,
        mode: LogEntryMode,
        observer: &mut dyn TurnObserver,
    ) -> TaleweaverResult<()> {
        match mode {
            LogEntryMode::Continue => self.continue_turn(observer).await,
            LogEntryMode::Story => {
                // Player-authored narration: a faux GM entry joined to the
                // current chain, then a continue from it.
                let chain_id = self
                    .session
                    .tale()
                    .log
                    .last()
                    .map(|e| e.chain_key().to_string());
                let mut faux = LogEntry::gm(chain_id);
                faux.text = format!("\n\n{text}");
                self.session.push_entry(faux);
                self.continue_turn(observer).await
            }
            _ => {
                self.session.push_entry(LogEntry::player(text, mode));
                self.run_turn(TurnInput::new(text, mode), false, observer)
                    .await
            }
        }
    }

    /// Ask the model to continue the newest GM narration in-chain.
    pub async fn continue_turn(&mut self, observer: &mut dyn TurnObserver) -> TaleweaverResult<()> {
        let Some(last) = self.session.tale().log.last() else {
            warn!("Nothing to continue");
            return Ok(());
        };
        if last.role != LogEntryRole::Gm {
            warn!("Cannot continue: newest entry is not a GM narration");
            return Ok(());
        }
        // Separate the coming narration from the existing text.
        let last_id = last.id.clone();
        self.session.append_entry_text(&last_id, " ")?;
        self.run_turn(TurnInput::new("", LogEntryMode::Continue), true, observer)
            .await
    }

    /// Discard the newest (typically failed) GM entry and replay the turn
    /// that produced it: the previous player input, or a synthetic
    /// continue when the previous entry is same-chain GM narration.
    #[instrument(skip(self, observer))]
    pub async fn retry(&mut self, observer: &mut dyn TurnObserver) -> TaleweaverResult<()> {
        let log = &self.session.tale().log;
        let Some(last) = log.last() else {
            warn!("Nothing to retry");
            return Ok(());
        };
        if last.role != LogEntryRole::Gm {
            warn!("Cannot retry: newest entry is not a GM narration");
            return Ok(());
        }
        let previous = log.len().checked_sub(2).and_then(|i| log.get(i));
        match previous {
            Some(prev)
                if prev.role == LogEntryRole::Gm && prev.chain_key() == last.chain_key() =>
            {
                self.session.remove_last_entry();
                self.run_turn(TurnInput::new("", LogEntryMode::Continue), true, observer)
                    .await
            }
            Some(prev) if prev.role == LogEntryRole::Player => {
                let replay = TurnInput::new(prev.text.clone(), prev.mode);
                self.session.remove_last_entry();
                self.run_turn(replay, false, observer).await
            }
            _ => {
                warn!("Cannot retry: no preceding player turn or chain");
                Ok(())
            }
        }
    }

    // One full turn: prompt, dispatch, decode, apply, persist.
    async fn run_turn(
        &mut self,
        turn: TurnInput,
        append: bool,
        observer: &mut dyn TurnObserver,
    ) -> TaleweaverResult<()> {
        let Some(model) = self.model.clone() else {
            return Err(PromptError::new(PromptErrorKind::MissingModel).into());
        };
        // Only one in-flight request per conversation.
        self.cancel.cancel();
        self.phase = TurnPhase::BuildingPrompt;

        // Resolve a continue's payload from the newest GM text before the
        // placeholder below becomes the newest GM entry.
        let mut turn = turn;
        if turn.mode == LogEntryMode::Continue && turn.text.is_empty() {
            let Some(gm_text) = self
                .session
                .tale()
                .log
                .iter()
                .rev()
                .find(|e| e.role == LogEntryRole::Gm)
                .map(|e| e.text.clone())
            else {
                warn!("No GM narration to continue from");
                self.phase = TurnPhase::Idle;
                return Ok(());
            };
            turn.text = gm_text;
        }

        // The placeholder the narration streams into.
        let gm_entry = if append {
            let chain_id = self
                .session
                .tale()
                .log
                .last()
                .map(|e| e.chain_key().to_string());
            LogEntry::gm(chain_id)
        } else {
            LogEntry::gm(None)
        };
        let gm_id = gm_entry.id.clone();
        self.session.push_entry(gm_entry);

        let outcome = self.drive_model(&turn, &gm_id, model, observer).await;
        match outcome {
            Ok(()) => {}
            Err(error) => {
                // Transport and prompt failures degrade to an in-narrative
                // message; they never surface as a raw error to the player.
                warn!(%error, "Turn failed; recording fallback narrative");
                self.session.update_entry_text(&gm_id, FALLBACK_NARRATIVE)?;
                self.session.set_entry_error(&gm_id, error.to_string())?;
                observer.on_error(&error);
                self.phase = TurnPhase::Errored;
            }
        }

        let errored = self.phase == TurnPhase::Errored;
        if !errored {
            self.phase = TurnPhase::Persisting;
        }
        self.repository.save(self.session.tale()).await?;
        if !errored {
            self.phase = TurnPhase::Idle;
        }
        Ok(())
    }

    // Prompt assembly through action application. Any Err here means the
    // turn failed and the caller records the fallback narrative.
    async fn drive_model(
        &mut self,
        turn: &TurnInput,
        gm_id: &str,
        model: LlmModel,
        observer: &mut dyn TurnObserver,
    ) -> TaleweaverResult<()> {
        let tale = self.session.tale();
        let game_mode = tale.game_mode;
        let params = PromptParamsBuilder::default()
            .log(tale.log.clone())
            .oldest_loaded_index(self.oldest_loaded_index)
            .total_log_count(self.total_log_count.max(tale.log.len()))
            .stats(tale.stats.clone())
            .inventory(tale.inventory.clone())
            .turn(turn.clone())
            .description(tale.description.clone())
            .author_note(tale.author_note.clone())
            .story_cards(tale.story_cards.clone())
            .model(model)
            .options(self.settings.options)
            .game_mode(game_mode)
            .response_mode(self.settings.response_mode)
            .settings(self.settings.prompt_settings())
            .build()
            .map_err(|e| PromptError::new(PromptErrorKind::HistoryLoad(e.to_string())))?;

        let output = {
            let source = RepositoryLogSource {
                repository: &self.repository,
                tale_id: tale.id.clone(),
                window: tale.log.clone(),
                oldest_loaded_index: self.oldest_loaded_index,
            };
            build_message(params, Some(&source)).await?
        };
        for warning in &output.warnings {
            warn!(%warning, "Prompt budget warning");
            observer.on_prompt_warning(warning);
        }

        self.phase = TurnPhase::Streaming;
        let reply = self.backend.chat(&output.request).await?;
        let fragments = match reply {
            ChatReply::Stream(fragments) => fragments,
            ChatReply::Content(content) => stream::iter([Ok(content)]).boxed(),
        };
        let (fragments, abort_handle) = stream::abortable(fragments);
        self.cancel.arm(abort_handle.clone());

        let mut pending_actions: Option<Vec<Action>> = None;
        let mut parse_error = false;
        let mut stream_error: Option<TaleweaverError> = None;
        {
            let mut events = decode_stream(game_mode, fragments);
            while let Some(event) = events.next().await {
                match event {
                    Ok(DecodeEvent::Story(fragment)) => {
                        self.session.append_entry_text(gm_id, &fragment)?;
                        observer.on_story_fragment(&fragment);
                    }
                    Ok(DecodeEvent::Actions(actions)) => pending_actions = Some(actions),
                    Ok(DecodeEvent::ActionParseError) => parse_error = true,
                    Err(error) => {
                        stream_error = Some(error);
                        break;
                    }
                }
            }
        }
        self.cancel.disarm();

        if let Some(error) = stream_error {
            return Err(error);
        }
        if abort_handle.is_aborted() {
            return Err(TransportError::new(TransportErrorKind::Aborted).into());
        }

        self.phase = TurnPhase::ApplyingActions;
        if parse_error {
            self.session.flag_action_error(gm_id)?;
            observer.on_action_parse_error();
        }
        if let Some(actions) = pending_actions {
            debug!(count = actions.len(), "Applying actions");
            self.session.set_entry_actions(gm_id, actions.clone())?;
            for action in &actions {
                self.session.apply_action(action);
            }
            observer.on_actions_ready(&actions);
        }
        Ok(())
    }
}

// Pages older history straight out of the repository, prepending it to
// the in-memory window.
struct RepositoryLogSource<'a, R> {
    repository: &'a R,
    tale_id: String,
    window: Vec<LogEntry>,
    oldest_loaded_index: usize,
}

#[async_trait]
impl<R: TaleRepository> LogSource for RepositoryLogSource<'_, R> {
    async fn ensure_loaded(&self, min_len: usize) -> TaleweaverResult<Vec<LogEntry>> {
        let missing = min_len
            .saturating_sub(self.window.len())
            .min(self.oldest_loaded_index);
        if missing == 0 {
            return Ok(self.window.clone());
        }
        let start = self.oldest_loaded_index - missing;
        let mut entries = self
            .repository
            .log_entries(&self.tale_id, start, missing)
            .await
            .map_err(|e| PromptError::new(PromptErrorKind::HistoryLoad(e.to_string())))?;
        debug!(loaded = entries.len(), start, "Paged in older history");
        entries.extend(self.window.iter().cloned());
        Ok(entries)
    }
}
