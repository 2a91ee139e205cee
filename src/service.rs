use chrono::{Duration, Local, NaiveDateTime};

use crate::error::{ApiError, ApiResult};
use crate::fanout::Fanout;
use crate::identity::IdentityVerifier;
use crate::messages::assemble::assemble;
use crate::model::{ChatType, Message, MessageDraft};
use crate::store::Store;

/// Query parameters parse as a local date-time without a zone.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The message routing, authorization, and retrieval core. Explicitly
/// constructed from its collaborators; handlers stay thin.
#[derive(Clone)]
pub struct ChatService {
    store: Store,
    verifier: IdentityVerifier,
    fanout: Fanout,
}

impl ChatService {
    pub fn new(store: Store, verifier: IdentityVerifier, fanout: Fanout) -> Self {
        Self {
            store,
            verifier,
            fanout,
        }
    }

    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }

    /// Write path: assemble, persist, then push. The push is fire-and-forget
    /// and runs strictly after the insert commits; once saved, the send is a
    /// success no matter what the fanout does.
    pub async fn send(
        &self,
        principal: Option<&str>,
        draft: &MessageDraft,
        kind: ChatType,
    ) -> ApiResult<Message> {
        let message = assemble(&self.store, &self.verifier, principal, draft, kind).await?;
        self.store.save_message(&message).await?;
        self.fanout.publish(&message);
        Ok(message)
    }

    /// Incremental conversation: PRIVATE traffic between the requester and
    /// `other_user_id` newer than `since`. An absent or unparsable `since`
    /// falls back to 24 hours before now.
    pub async fn conversation(
        &self,
        principal: Option<&str>,
        other_user_id: &str,
        since: Option<&str>,
    ) -> ApiResult<Vec<Message>> {
        let user = self.resolve_requester(principal).await?;
        self.require_other_user(other_user_id).await?;

        let since = since
            .filter(|s| !s.is_empty())
            .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
            .unwrap_or_else(|| Local::now().naive_local() - Duration::hours(24));

        let messages = self
            .store
            .conversation(&user.id, other_user_id, Some(since))
            .await?;
        tracing::info!(
            "retrieved {} private messages for conversation with {}",
            messages.len(),
            other_user_id
        );
        Ok(messages)
    }

    /// Full history: same scoping as `conversation`, no time bound.
    pub async fn history(
        &self,
        principal: Option<&str>,
        other_user_id: &str,
    ) -> ApiResult<Vec<Message>> {
        let user = self.resolve_requester(principal).await?;
        self.require_other_user(other_user_id).await?;

        let messages = self.store.conversation(&user.id, other_user_id, None).await?;
        tracing::info!(
            "retrieved {} messages for chat history with {}",
            messages.len(),
            other_user_id
        );
        Ok(messages)
    }

    /// Group feed. No requester scoping and no membership check: anyone who
    /// knows a group id can read its history.
    pub async fn group_feed(&self, group_id: &str) -> ApiResult<Vec<Message>> {
        let messages = self
            .store
            .group_feed(group_id)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        tracing::info!("retrieved {} messages for group {}", messages.len(), group_id);
        Ok(messages)
    }

    /// Keyword/time search over everything the requester may see: messages
    /// they sent, messages addressed to them, and messages in groups they
    /// belong to.
    pub async fn search(
        &self,
        principal: Option<&str>,
        keyword: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> ApiResult<Vec<Message>> {
        let user = self.resolve_requester(principal).await?;

        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let start = parse_bound(start, "start")?;
        let end = parse_bound(end, "end")?;

        let messages = self.store.search(&user.id, keyword, start, end).await?;
        tracing::info!("retrieved {} messages for search", messages.len());
        Ok(messages)
    }

    async fn resolve_requester(&self, principal: Option<&str>) -> ApiResult<crate::model::User> {
        let Some(username) = principal else {
            return Err(ApiError::Authorization("No authenticated user found".into()));
        };
        tracing::info!("authenticated user: {username}");
        self.verifier.resolve(username).await
    }

    /// Existence-only check on the conversation partner; its record is not
    /// otherwise used.
    async fn require_other_user(&self, other_user_id: &str) -> ApiResult<()> {
        self.store
            .user_by_id(other_user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Other user not found: {other_user_id}")))?;
        Ok(())
    }
}

/// Inclusive search bounds: absent/blank means unconstrained, anything else
/// must parse or the request is rejected.
fn parse_bound(value: Option<&str>, field: &str) -> ApiResult<Option<NaiveDateTime>> {
    match value.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|_| {
                ApiError::Validation(format!("Invalid '{field}' timestamp format: {s}"))
            }),
    }
}
