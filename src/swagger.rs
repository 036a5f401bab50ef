use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::register,
        handlers::user::lookup,
        handlers::user::get_stats,
        handlers::user::get_eligibility,
        handlers::wheel::get_wheel,
        handlers::wheel::spin,
        handlers::wheel::record_win,
        handlers::prize::list_prizes,
        handlers::prize::create_prize,
        handlers::prize::update_prize,
        handlers::prize::delete_prize,
        handlers::admin::list_winners,
        handlers::admin::draw_random,
        handlers::admin::finalize_winner,
        handlers::admin::get_admin_stats,
        handlers::admin::seed_prizes,
    ),
    components(
        schemas(
            RegisterUserRequest,
            LookupUserRequest,
            UserResponse,
            UserLookupResponse,
            UserStatsResponse,
            EligibilityResponse,
            PrizeResponse,
            CreatePrizeRequest,
            UpdatePrizeRequest,
            Segment,
            WheelResponse,
            SpinRequest,
            SpinResponse,
            RecordWinRequest,
            WinnerResponse,
            WinnerDetailResponse,
            DrawResultResponse,
            AdminStats,
            ApiError,
        )
    ),
    tags(
        (name = "user", description = "Participant registration and status API"),
        (name = "wheel", description = "Wheel layout, spin and win recording API"),
        (name = "prize", description = "Prize catalog API"),
        (name = "admin", description = "Final winner draw and statistics API"),
    ),
    info(
        title = "Lucky Wheel API",
        version = "1.0.0",
        description = "Daily spin-the-wheel contest REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
