use chrono::Local;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::identity::IdentityVerifier;
use crate::model::{ChatType, Message, MessageDraft};
use crate::store::Store;

/// Builds a canonical, server-trusted message from a client draft.
///
/// Pure construction: nothing is persisted or published here. The caller
/// saves the result and only then hands it to the fanout publisher.
///
/// Checks run in a fixed order: required fields, then the authenticated
/// principal, then the sender binding (the draft's senderId must be the
/// resolved user's id, which is what stops sender spoofing), then target
/// resolution. The id and timestamp are always server-assigned.
pub async fn assemble(
    store: &Store,
    verifier: &IdentityVerifier,
    principal: Option<&str>,
    draft: &MessageDraft,
    kind: ChatType,
) -> ApiResult<Message> {
    let content = required_text(&draft.content, "content")?;
    let sender_id = required_text(&draft.sender_id, "senderId")?;
    let target_id = match kind {
        ChatType::Private => required_text(&draft.recipient_id, "recipientId")?,
        ChatType::Group => required_text(&draft.group_id, "groupId")?,
    };

    let Some(username) = principal else {
        return Err(ApiError::Authorization("No authenticated user found".into()));
    };
    let sender = verifier.resolve(username).await?;
    tracing::info!(
        "sender id: {}, draft sender id: {}",
        sender.id,
        sender_id
    );
    if sender_id != sender.id {
        return Err(ApiError::Authorization(
            "Sender ID does not match authenticated user".into(),
        ));
    }

    let (recipient_id, group_id) = match kind {
        ChatType::Private => {
            store
                .user_by_id(&target_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Recipient not found: {target_id}")))?;
            (Some(target_id), None)
        }
        ChatType::Group => {
            store
                .group_by_id(&target_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Group not found: {target_id}")))?;
            (None, Some(target_id))
        }
    };

    Ok(Message {
        id: Uuid::new_v4().to_string(),
        content,
        sender_id: sender.id,
        recipient_id,
        group_id,
        chat_type: kind,
        timestamp: Local::now().naive_local(),
    })
}

fn required_text(value: &Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ApiError::Validation(format!(
            "Invalid message JSON: missing or empty field: {field}"
        ))),
    }
}
