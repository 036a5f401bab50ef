use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::handlers::validate_id;
use crate::models::*;
use crate::services::PrizeService;

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prize",
    responses(
        (status = 200, description = "全部奖品", body = [PrizeResponse])
    )
)]
pub async fn list_prizes(prize_service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match prize_service.list_all().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes",
    tag = "prize",
    request_body = CreatePrizeRequest,
    responses(
        (status = 200, description = "创建成功", body = PrizeResponse),
        (status = 400, description = "参数错误")
    )
)]
pub async fn create_prize(
    prize_service: web::Data<PrizeService>,
    request: web::Json<CreatePrizeRequest>,
) -> Result<HttpResponse> {
    match prize_service.create(request.into_inner()).await {
        Ok(prize) => Ok(HttpResponse::Ok().json(ApiResponse::success(prize))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/prizes/{id}",
    tag = "prize",
    params(("id" = i32, Path, description = "奖品ID")),
    request_body = UpdatePrizeRequest,
    responses(
        (status = 200, description = "更新成功", body = PrizeResponse),
        (status = 400, description = "参数错误"),
        (status = 404, description = "奖品不存在")
    )
)]
pub async fn update_prize(
    prize_service: web::Data<PrizeService>,
    path: web::Path<i32>,
    request: web::Json<UpdatePrizeRequest>,
) -> Result<HttpResponse> {
    let prize_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match prize_service.update(prize_id, request.into_inner()).await {
        Ok(prize) => Ok(HttpResponse::Ok().json(ApiResponse::success(prize))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/prizes/{id}",
    tag = "prize",
    params(("id" = i32, Path, description = "奖品ID")),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "奖品不存在"),
        (status = 409, description = "奖品已有中奖记录")
    )
)]
pub async fn delete_prize(
    prize_service: web::Data<PrizeService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let prize_id = match validate_id(path.into_inner()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    match prize_service.delete(prize_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            prize_id,
            "Prize deleted".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn prize_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prizes")
            .route("", web::get().to(list_prizes))
            .route("", web::post().to(create_prize))
            .route("/{id}", web::put().to(update_prize))
            .route("/{id}", web::delete().to(delete_prize)),
    );
}
