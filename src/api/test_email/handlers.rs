use super::types::{TestEmailDetails, TestEmailError, TestEmailRequest, TestEmailResponse};
use crate::email::placeholder_articles;
use crate::models::article::Article;
use crate::models::email_batch::{BatchStatus, EmailBatch, NewEmailBatch};
use crate::models::user::{User, UserQuery};
use crate::security::validation::validate_email;
use crate::{AppState, RqState};
use actix_web::{post, web, HttpResponse};

const TEST_ARTICLE_LIMIT: u32 = 5;

/// Sends a `[TEST]` digest to any address, built from a real user's
/// scheduled articles when `testUserId` is given, else from placeholders.
#[post("")]
pub async fn send_test_email(
    state: RqState,
    body: web::Bytes,
) -> Result<HttpResponse, TestEmailError> {
    let request = TestEmailRequest::from_body(&body);

    let recipient = request.recipient().ok_or(TestEmailError::MissingEmail)?;
    validate_email(recipient).map_err(|_| TestEmailError::InvalidEmail)?;

    // Lookups are best-effort: a test send still goes out with placeholders
    let (user, mut articles) = match request.user_id() {
        Some(user_id) => (
            load_test_user(&state, user_id).await,
            load_test_articles(&state, user_id).await,
        ),
        None => (None, Vec::new()),
    };

    if articles.is_empty() {
        articles = placeholder_articles();
    }

    // Send the digest
    let message_id = state
        .mailer
        .send_test_digest_email(recipient, &articles, user.as_ref())
        .await
        .map_err(TestEmailError::SendFailed)?;

    // Record the batch for real users only
    let mut batch_id = None;
    if let Some(user_id) = request.user_id() {
        let batch = NewEmailBatch {
            user_id: user_id.to_string(),
            article_count: articles.len() as u32,
            batch_status: BatchStatus::Sent,
            provider_message_id: Some(message_id.clone()),
            is_test: true,
        };
        match EmailBatch::create(&state.store, &batch).await {
            Ok(batch) => batch_id = Some(batch.id),
            Err(e) => log::warn!("Could not create email batch record: {}", e.source),
        }
    }

    crate::log_user_action!(
        request.user_id().unwrap_or("anonymous"),
        "send_test_email",
        { "recipient": recipient, "article_count": articles.len() }
    );

    Ok(HttpResponse::Ok().json(TestEmailResponse {
        success: true,
        message: "Test email sent successfully",
        details: TestEmailDetails {
            recipient: recipient.to_string(),
            article_count: articles.len(),
            message_id,
            batch_id,
            provider: state.mailer.provider(),
            domain: state.mailer.domain().to_string(),
        },
    }))
}

async fn load_test_user(state: &AppState, user_id: &str) -> Option<User> {
    match User::get(&state.store, UserQuery::Id(user_id)).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            log::info!("Test user {} not found, using a placeholder profile", user_id);
            None
        }
        Err(e) => {
            log::warn!("Could not load test user {}: {}", user_id, e.source);
            None
        }
    }
}

async fn load_test_articles(state: &AppState, user_id: &str) -> Vec<Article> {
    Article::scheduled_for_user(&state.store, user_id, TEST_ARTICLE_LIMIT)
        .await
        .unwrap_or_else(|e| {
            log::warn!("Could not load articles for test user {}: {}", user_id, e.source);
            Vec::new()
        })
}
