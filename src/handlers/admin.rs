use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::handlers::validate_id;
use crate::models::*;
use crate::services::{DrawService, PrizeService, StatsService, WinnerService};

#[utoipa::path(
    get,
    path = "/admin/prizes/{id}/winners",
    tag = "admin",
    params(("id" = i32, Path, description = "奖品ID")),
    responses(
        (status = 200, description = "奖品抽签池", body = [WinnerDetailResponse]),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn list_winners(
    winner_service: web::Data<WinnerService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let prize_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match winner_service.list_by_prize(prize_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes/{id}/draw",
    tag = "admin",
    params(("id" = i32, Path, description = "奖品ID")),
    responses(
        (status = 200, description = "抽出一名最终中奖者", body = DrawResultResponse),
        (status = 404, description = "奖品不存在或没有待定中奖者"),
        (status = 409, description = "名额已满")
    )
)]
/// 在奖品的待定中奖者中随机抽取一名最终中奖者
pub async fn draw_random(
    draw_service: web::Data<DrawService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let prize_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match draw_service.draw_random_winner(prize_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/winners/{id}/finalize",
    tag = "admin",
    params(("id" = i32, Path, description = "中奖记录ID")),
    responses(
        (status = 200, description = "已设为最终中奖者", body = DrawResultResponse),
        (status = 404, description = "中奖记录不存在"),
        (status = 409, description = "已是最终中奖者或名额已满")
    )
)]
/// 指定一条中奖记录为最终中奖者
pub async fn finalize_winner(
    draw_service: web::Data<DrawService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let winner_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match draw_service.draw_final_winner(winner_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "统计信息", body = AdminStats)
    )
)]
pub async fn get_admin_stats(stats_service: web::Data<StatsService>) -> Result<HttpResponse> {
    match stats_service.admin_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/prizes/seed",
    tag = "admin",
    responses(
        (status = 200, description = "奖品表为空时写入默认奖品")
    )
)]
pub async fn seed_prizes(prize_service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match prize_service.seed_default_prizes().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            count,
            format!("{count} prizes seeded"),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/stats", web::get().to(get_admin_stats))
            .route("/prizes/seed", web::post().to(seed_prizes))
            .route("/prizes/{id}/winners", web::get().to(list_winners))
            .route("/prizes/{id}/draw", web::post().to(draw_random))
            .route("/winners/{id}/finalize", web::post().to(finalize_winner)),
    );
}
