use super::types::{DigestResponse, RqUserId, UserLookup, UserStats};
use crate::errors::{AppError, AppResult};
use crate::models::article::{Article, Page};
use crate::models::email_batch::{BatchStatus, EmailBatch, NewEmailBatch};
use crate::models::shared_list::SharedList;
use crate::models::user::{NewUser, PartialUser, User, UserQuery};
use crate::security::validation::{validate_email, validate_identifier};
use crate::utils::now_iso;
use crate::RqState;
use actix_web::{get, patch, post, web, HttpResponse};
use chrono::Utc;

const DIGEST_ARTICLE_LIMIT: u32 = 20;
const STATS_PAGE: Page = Page { limit: 1000, skip: 0 };

fn check_user_id(id: &str) -> AppResult<()> {
    validate_identifier(id).map_err(|e| AppError::invalid_input("user_id", &e))
}

async fn require_user(state: &RqState, user_id: &str) -> AppResult<User> {
    check_user_id(user_id)?;
    User::get(&state.store, UserQuery::Id(user_id))
        .await?
        .ok_or_else(|| AppError::resource_not_found("User"))
}

#[get("")]
pub async fn find_user(state: RqState, query: web::Query<UserLookup>) -> AppResult<HttpResponse> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::invalid_input("email", "is required"))?;
    validate_email(email).map_err(|e| AppError::invalid_input("email", &e))?;

    let user = User::get(&state.store, UserQuery::Email(email))
        .await?
        .ok_or_else(|| AppError::resource_not_found("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

#[post("")]
pub async fn create_user(state: RqState, new_user: web::Json<NewUser>) -> AppResult<HttpResponse> {
    validate_email(&new_user.email).map_err(|e| AppError::invalid_input("email", &e))?;

    // Email is the unique key
    if User::get(&state.store, UserQuery::Email(&new_user.email))
        .await?
        .is_some()
    {
        return Err(AppError::duplicate_resource("User with this email"));
    }

    let user = User::create(&state.store, &new_user).await?;
    log::info!("created new user: {:?}", new_user.email);
    Ok(HttpResponse::Created().json(user))
}

#[patch("/{user_id}")]
pub async fn update_user(
    state: RqState,
    path: RqUserId,
    updates: web::Json<PartialUser>,
) -> AppResult<HttpResponse> {
    check_user_id(&path.user_id)?;
    if updates.is_empty() {
        return Err(AppError::invalid_input("body", "no fields to update"));
    }

    let user = User::update(&state.store, &path.user_id, &updates).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/{user_id}/shared-lists")]
pub async fn get_shared_lists(state: RqState, path: RqUserId) -> AppResult<HttpResponse> {
    check_user_id(&path.user_id)?;
    let lists = SharedList::list_for_user(&state.store, &path.user_id).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[get("/{user_id}/stats")]
pub async fn get_stats(state: RqState, path: RqUserId) -> AppResult<HttpResponse> {
    let user = require_user(&state, &path.user_id).await?;
    let articles = Article::list(&state.store, Some(&user.id), STATS_PAGE).await?;
    Ok(HttpResponse::Ok().json(UserStats::compute(&user, &articles, Utc::now())))
}

/// Sends the user's real digest now. The batch record and the per-article
/// status changes are best-effort once the email has gone out.
#[post("/{user_id}/digest")]
pub async fn send_digest(state: RqState, path: RqUserId) -> AppResult<HttpResponse> {
    let user = require_user(&state, &path.user_id).await?;
    let articles =
        Article::scheduled_for_user(&state.store, &user.id, DIGEST_ARTICLE_LIMIT).await?;
    if articles.is_empty() {
        return Err(AppError::NothingToSend);
    }

    let sent = state.mailer.send_digest_email(&user, &articles).await;

    // Record the attempt either way
    let batch = NewEmailBatch {
        user_id: user.id.clone(),
        article_count: articles.len() as u32,
        batch_status: if sent.is_ok() {
            BatchStatus::Sent
        } else {
            BatchStatus::Failed
        },
        provider_message_id: sent.as_ref().ok().cloned(),
        is_test: false,
    };
    let batch_id = match EmailBatch::create(&state.store, &batch).await {
        Ok(batch) => Some(batch.id),
        Err(e) => {
            log::warn!("Could not create email batch record: {}", e.source);
            None
        }
    };

    let message_id = sent.map_err(|e| {
        crate::log_error_with_context!(
            e,
            { "user_id": user.id, "article_count": articles.len() }
        );
        AppError::from(e)
    })?;

    // Mark articles sent, tied to the batch
    if let Some(batch_id) = &batch_id {
        let sent_date = now_iso();
        for article in &articles {
            let marked = Article::mark_sent(&state.store, &article.id, batch_id, &sent_date).await;
            if let Err(e) = marked {
                log::warn!("Could not mark article {} as sent: {}", article.id, e.source);
            }
        }
    }

    crate::log_user_action!(user.id, "send_digest", { "article_count": articles.len() });

    Ok(HttpResponse::Ok().json(DigestResponse {
        success: true,
        message_id,
        article_count: articles.len(),
        batch_id,
    }))
}
