//! Notification inbox API handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Notification, NotificationListResponse};

/// List a user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/users/{user_id}/notifications",
    tag = "Notifications",
    params(
        ("user_id" = Uuid, Path, description = "User UUID")
    ),
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_user_notifications(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    crate::db::users::require_user(pool.connection(), user_id, "user_id").await?;

    let notifications: Vec<Notification> = pool
        .list_notifications(user_id)
        .await?
        .into_iter()
        .filter_map(Notification::from_model)
        .collect();
    let unread = notifications.iter().filter(|n| !n.read).count();

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        notifications,
        unread,
    }))
}

/// Mark a notification as read.
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    params(
        ("id" = Uuid, Path, description = "Notification UUID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn mark_notification_read(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let stored = pool.mark_notification_read(id).await?;
    let notification = Notification::from_model(stored)
        .ok_or_else(|| AppError::Database(format!("Notification {} has an unknown kind", id)))?;

    Ok(HttpResponse::Ok().json(notification))
}

/// Configure notification routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users/{user_id}/notifications")
            .route(web::get().to(list_user_notifications)),
    )
    .service(web::resource("/notifications/{id}/read").route(web::post().to(mark_notification_read)));
}
