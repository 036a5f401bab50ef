use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::handlers::validate_id;
use crate::models::*;
use crate::services::{UserService, WheelService, WinnerService};

#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "注册成功", body = UserResponse),
        (status = 400, description = "手机号或姓名格式错误"),
        (status = 409, description = "手机号已注册")
    )
)]
/// 注册参与用户
pub async fn register(
    user_service: web::Data<UserService>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    match user_service.register(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/lookup",
    tag = "user",
    request_body = LookupUserRequest,
    responses(
        (status = 200, description = "查询成功", body = UserLookupResponse),
        (status = 400, description = "手机号格式错误")
    )
)]
/// 按手机号查询用户是否已注册
pub async fn lookup(
    user_service: web::Data<UserService>,
    request: web::Json<LookupUserRequest>,
) -> Result<HttpResponse> {
    match user_service.find_by_phone(&request.phone).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "user",
    params(("id" = i32, Path, description = "用户ID")),
    responses(
        (status = 200, description = "获取参与次数成功", body = UserStatsResponse),
        (status = 400, description = "ID 无效")
    )
)]
pub async fn get_stats(
    winner_service: web::Data<WinnerService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match winner_service.play_count(user_id).await {
        Ok(play_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(UserStatsResponse {
            play_count,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}/eligibility",
    tag = "user",
    params(("id" = i32, Path, description = "用户ID")),
    responses(
        (status = 200, description = "今日是否可以转盘", body = EligibilityResponse),
        (status = 400, description = "ID 无效")
    )
)]
/// 今日参与资格（存储异常时返回不可玩）
pub async fn get_eligibility(
    wheel_service: web::Data<WheelService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let user_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    let status = wheel_service.eligibility(user_id).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(register))
            .route("/lookup", web::post().to(lookup))
            .route("/{id}/stats", web::get().to(get_stats))
            .route("/{id}/eligibility", web::get().to(get_eligibility)),
    );
}
