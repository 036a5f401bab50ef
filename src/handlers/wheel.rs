use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::handlers::validate_id;
use crate::models::*;
use crate::services::{WheelService, WinnerService};

#[utoipa::path(
    get,
    path = "/wheel",
    tag = "wheel",
    responses(
        (status = 200, description = "当前转盘布局", body = WheelResponse)
    )
)]
pub async fn get_wheel(wheel_service: web::Data<WheelService>) -> Result<HttpResponse> {
    match wheel_service.wheel().await {
        Ok(wheel) => Ok(HttpResponse::Ok().json(ApiResponse::success(wheel))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wheel/spin",
    tag = "wheel",
    request_body = SpinRequest,
    responses(
        (status = 200, description = "转盘结果", body = SpinResponse),
        (status = 404, description = "用户不存在"),
        (status = 409, description = "今日已参与"),
        (status = 422, description = "没有可用奖品")
    )
)]
/// 服务端转盘:
/// 1. 检查今日资格
/// 2. 构建转盘并随机旋转
/// 3. 落在奖品上则记录中奖，落在“再转一次”不落库
pub async fn spin(
    wheel_service: web::Data<WheelService>,
    request: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let user_id = match validate_id(request.user_id) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match wheel_service
        .spin(user_id, request.previous_rotation.unwrap_or(0.0))
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wins",
    tag = "wheel",
    request_body = RecordWinRequest,
    responses(
        (status = 200, description = "中奖已记录（进入抽签池）", body = WinnerResponse),
        (status = 404, description = "用户不存在"),
        (status = 422, description = "奖品不可用")
    )
)]
/// 客户端转盘落在奖品后上报；仅在确认失败时重试，否则会重复进入抽签池
pub async fn record_win(
    winner_service: web::Data<WinnerService>,
    request: web::Json<RecordWinRequest>,
) -> Result<HttpResponse> {
    let (user_id, prize_id) = match (validate_id(request.user_id), validate_id(request.prize_id))
    {
        (Ok(u), Ok(p)) => (u, p),
        (Err(e), _) | (_, Err(e)) => return Ok(e.error_response()),
    };
    match winner_service.record_win(user_id, prize_id).await {
        Ok(winner) => Ok(HttpResponse::Ok().json(ApiResponse::success(WinnerResponse::from(winner)))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wheel")
            .route("", web::get().to(get_wheel))
            .route("/spin", web::post().to(spin)),
    )
    .route("/wins", web::post().to(record_win));
}
