//! The exchange state machine.
//!
//! Sequencing within one exchange is strict: the opening model round
//! completes before tool dispatch, the whole tool batch completes before
//! the follow-up round, and the follow-up round completes before any
//! reply chunk is posted. History is committed only when the exchange
//! succeeds; an aborted exchange leaves it exactly as it was.

use crate::error::ExchangeError;
use std::sync::Arc;
use threadrelay_ai::{LanguageModel, LlmError};
use threadrelay_conversation::{HistoryGuard, HistoryStore, Message};
use threadrelay_core::{ConversationKey, ExchangeId};
use threadrelay_delivery::{ChatTransport, chunk, strip_mention};
use threadrelay_tools::{ToolDispatcher, ToolUse};

const FAILURE_NOTICE: &str = "Problems executing the task, you can retry it.";
const DEFAULT_FALLBACK_NOTICE: &str =
    "I could not produce an answer for this request. Please rephrase and try again.";

/// Tunables for exchange handling.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Extra tool round-trips allowed after the opening round.
    ///
    /// The default of one matches the single tool round the assistant is
    /// designed around; raising it lets the model chain tool calls.
    pub max_tool_rounds: usize,
    /// Prior transcript messages fetched when a conversation is first
    /// seen in-process.
    pub history_fetch_limit: usize,
    /// Maximum logical lines per posted reply chunk.
    pub max_lines_per_group: usize,
    /// Text posted immediately on receipt, before any model call.
    /// Disabled when `None`.
    pub placeholder: Option<String>,
    /// Reply substituted when the final model response carries no text.
    pub fallback_notice: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 1,
            history_fetch_limit: 10,
            max_lines_per_group: 10,
            placeholder: None,
            fallback_notice: DEFAULT_FALLBACK_NOTICE.to_string(),
        }
    }
}

impl ExchangeConfig {
    /// Sets the extra tool round ceiling.
    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Sets the transcript fetch limit.
    #[must_use]
    pub fn with_history_fetch_limit(mut self, limit: usize) -> Self {
        self.history_fetch_limit = limit;
        self
    }

    /// Sets the reply grouping size.
    #[must_use]
    pub fn with_max_lines_per_group(mut self, lines: usize) -> Self {
        self.max_lines_per_group = lines;
        self
    }

    /// Enables the placeholder message.
    #[must_use]
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

/// Drives one exchange per inbound chat event.
pub struct Orchestrator {
    history: Arc<HistoryStore>,
    model: Arc<dyn LanguageModel>,
    dispatcher: ToolDispatcher,
    transport: Arc<dyn ChatTransport>,
    config: ExchangeConfig,
}

impl Orchestrator {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        history: Arc<HistoryStore>,
        model: Arc<dyn LanguageModel>,
        dispatcher: ToolDispatcher,
        transport: Arc<dyn ChatTransport>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            history,
            model,
            dispatcher,
            transport,
            config,
        }
    }

    /// Handles one inbound mention event.
    ///
    /// Holds the conversation's history guard for the full exchange, so
    /// concurrent events on the same thread serialize while other
    /// conversations proceed in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error when a model round fails; a failure notice has
    /// already been posted into the thread and history was not mutated.
    pub async fn handle_event(
        &self,
        channel: &str,
        thread_root_ts: &str,
        raw_text: &str,
    ) -> Result<(), ExchangeError> {
        let exchange_id = ExchangeId::new();
        let key = ConversationKey::from_parts(channel, thread_root_ts);
        let user_text = strip_mention(raw_text);
        tracing::info!(%exchange_id, key = %key, "handling chat event");

        let mut guard = self.history.lock(&key).await;
        if guard.is_empty() {
            self.seed_from_transcript(&key, &mut guard).await;
        }

        if let Some(placeholder) = &self.config.placeholder
            && let Err(error) = self.transport.post(&key, placeholder).await
        {
            tracing::warn!(%exchange_id, %error, "failed to post placeholder");
        }

        match self.run_rounds(guard.messages(), &user_text).await {
            Ok((working, reply)) => {
                guard.commit(working);
                self.deliver(&key, &reply).await;
                tracing::info!(%exchange_id, key = %key, "exchange completed");
                Ok(())
            }
            Err(error) => {
                tracing::error!(%exchange_id, key = %key, %error, "exchange aborted");
                let notice = format!(
                    "{FAILURE_NOTICE}\nDetailed cause: {error}\nReference: {key} {exchange_id}"
                );
                if let Err(post_error) = self.transport.post(&key, &notice).await {
                    tracing::warn!(%exchange_id, %post_error, "failed to post failure notice");
                }
                Err(ExchangeError::Model(error))
            }
        }
    }

    /// Runs the model rounds for one exchange.
    ///
    /// Returns the full working history to commit and the reply text.
    /// Never touches the store; the caller commits on success only.
    async fn run_rounds(
        &self,
        snapshot: &[Message],
        user_text: &str,
    ) -> Result<(Vec<Message>, String), LlmError> {
        let definitions = self.dispatcher.definitions();
        let tools = (!definitions.is_empty()).then_some(definitions.as_slice());
        let mut round = self.model.send(snapshot, user_text, tools).await?;

        let mut working = snapshot.to_vec();
        working.push(Message::user_text(user_text));

        let mut extra_rounds = 0;
        while round.wants_tools() && extra_rounds < self.config.max_tool_rounds {
            let uses = ToolUse::collect(&round.content);
            if uses.is_empty() {
                break;
            }
            working.push(Message::assistant_blocks(round.content.clone()));
            let results = self.dispatcher.dispatch(&uses).await;
            // The follow-up call appends the tool-result carrier message
            // itself; the working history mirrors it afterwards.
            let next = self
                .model
                .send_with_tool_results(&working, results.clone())
                .await?;
            working.push(Message::tool_results(results));
            round = next;
            extra_rounds += 1;
        }

        let reply = round
            .final_text()
            .unwrap_or_else(|| self.config.fallback_notice.clone());
        working.push(round.into_assistant_message());
        Ok((working, reply))
    }

    async fn seed_from_transcript(&self, key: &ConversationKey, guard: &mut HistoryGuard) {
        match self
            .transport
            .fetch_history(key, self.config.history_fetch_limit)
            .await
        {
            Ok(entries) => {
                if entries.is_empty() {
                    return;
                }
                let seeded = entries.len();
                let messages = entries
                    .into_iter()
                    .map(|entry| {
                        if entry.author_is_bot {
                            Message::assistant_text(entry.text)
                        } else {
                            Message::user_text(entry.text)
                        }
                    })
                    .collect();
                guard.seed(messages);
                tracing::info!(key = %key, seeded, "seeded history from channel transcript");
            }
            Err(error) => {
                tracing::warn!(key = %key, %error, "transcript fetch failed; starting empty");
            }
        }
    }

    /// Posts the reply in chunks, in order. A failed post is logged and
    /// the remaining chunks are still attempted.
    async fn deliver(&self, key: &ConversationKey, reply: &str) {
        for group in chunk(reply, self.config.max_lines_per_group) {
            if let Err(error) = self.transport.post(key, &group).await {
                tracing::warn!(key = %key, %error, "failed to post reply chunk");
            }
        }
    }
}
