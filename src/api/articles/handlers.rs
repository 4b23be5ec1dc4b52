use super::types::{
    ArticleListQuery, ArticleListResponse, ArticleSearchQuery, BulkFailure, BulkRequest,
    BulkResponse, RqArticleId, RqSlug,
};
use crate::errors::{AppError, AppResult};
use crate::filters::{count_by_status, filter_articles, sort_articles};
use crate::models::article::{Article, NewArticle, PartialArticle};
use crate::security::validation::{validate_identifier, validate_url};
use crate::RqState;
use actix_web::{delete, get, patch, post, web, HttpResponse};

fn check_id(id: &str) -> AppResult<()> {
    validate_identifier(id).map_err(|e| AppError::invalid_input("id", &e))
}

/// One page from storage, narrowed and ordered in memory.
#[get("")]
pub async fn list_articles(
    state: RqState,
    query: web::Query<ArticleListQuery>,
) -> AppResult<HttpResponse> {
    let articles = Article::list(&state.store, query.user_id.as_deref(), query.page()).await?;

    // Apply filters and ordering
    let mut articles = filter_articles(&articles, &query.filter());
    sort_articles(&mut articles, query.sort, query.order);

    Ok(HttpResponse::Ok().json(ArticleListResponse {
        total: articles.len(),
        counts: count_by_status(&articles),
        articles,
    }))
}

#[get("/search")]
pub async fn search_articles(
    state: RqState,
    query: web::Query<ArticleSearchQuery>,
) -> AppResult<HttpResponse> {
    let user_id = query
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::invalid_input("user_id", "is required"))?;

    let articles = Article::search(&state.store, user_id, &query.q, &query.filters()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

#[get("/{slug}")]
pub async fn get_article(state: RqState, path: RqSlug) -> AppResult<HttpResponse> {
    let article = Article::get_by_slug(&state.store, &path.slug)
        .await?
        .ok_or_else(|| AppError::resource_not_found("Article"))?;
    Ok(HttpResponse::Ok().json(article))
}

#[post("")]
pub async fn create_article(
    state: RqState,
    new_article: web::Json<NewArticle>,
) -> AppResult<HttpResponse> {
    validate_url(new_article.url.trim()).map_err(|e| AppError::invalid_input("url", &e))?;
    if new_article.user_id.trim().is_empty() {
        return Err(AppError::invalid_input("user_id", "is required"));
    }

    let article = Article::create(&state.store, &new_article).await?;
    crate::log_user_action!(new_article.user_id, "save_article", { "article_id": article.id });
    Ok(HttpResponse::Created().json(article))
}

#[patch("/{id}")]
pub async fn update_article(
    state: RqState,
    path: RqArticleId,
    updates: web::Json<PartialArticle>,
) -> AppResult<HttpResponse> {
    check_id(&path.id)?;
    if updates.is_empty() {
        return Err(AppError::invalid_input("body", "no fields to update"));
    }

    let article = Article::update(&state.store, &path.id, &updates).await?;
    Ok(HttpResponse::Ok().json(article))
}

#[delete("/{id}")]
pub async fn delete_article(state: RqState, path: RqArticleId) -> AppResult<HttpResponse> {
    check_id(&path.id)?;
    Article::delete(&state.store, &path.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Applies one action to many articles in order. A failing id is reported
/// and does not stop the rest.
#[post("/bulk")]
pub async fn bulk_update(
    state: RqState,
    request: web::Json<BulkRequest>,
) -> AppResult<HttpResponse> {
    if request.ids.is_empty() {
        return Err(AppError::invalid_input("ids", "at least one id is required"));
    }

    // None means delete
    let updates = request.updates();
    let mut response = BulkResponse::default();

    for id in &request.ids {
        let result = match (check_id(id), &updates) {
            (Err(e), _) => Err(e),
            (Ok(()), Some(updates)) => Article::update(&state.store, id, updates)
                .await
                .map(|_| ())
                .map_err(AppError::from),
            (Ok(()), None) => Article::delete(&state.store, id).await.map_err(AppError::from),
        };

        match result {
            Ok(()) => response.processed += 1,
            Err(e) => {
                log::warn!("Bulk {:?} failed for {}: {:?}", request.action, id, e);
                response.failed.push(BulkFailure {
                    id: id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Bulk {:?}: {} processed, {} failed",
        request.action,
        response.processed,
        response.failed.len()
    );
    Ok(HttpResponse::Ok().json(response))
}
