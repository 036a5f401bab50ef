use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use lucky_wheel_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
    utils::system_clock,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let rules = EligibilityRules::from_config(&config.contest)
        .expect("Invalid contest configuration");
    let clock = system_clock();

    // 创建服务
    let prize_service = PrizeService::new(pool.clone(), clock.clone());
    let user_service = UserService::new(pool.clone(), clock.clone());
    let winner_service = WinnerService::new(pool.clone(), clock.clone());
    let eligibility_service = EligibilityService::new(pool.clone(), clock.clone(), rules);
    let wheel_service = WheelService::new(
        prize_service.clone(),
        user_service.clone(),
        eligibility_service,
        winner_service.clone(),
    );
    let draw_service = DrawService::new(pool.clone());
    let stats_service = StatsService::new(pool.clone());

    if config.contest.seed_default_prizes {
        if let Err(e) = prize_service.seed_default_prizes().await {
            log::error!("Failed to seed default prizes: {:?}", e);
        }
    }

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_origins = config.server.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&cors_origins))
            .app_data(web::Data::new(prize_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(winner_service.clone()))
            .app_data(web::Data::new(wheel_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(stats_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::user_config)
                    .configure(handlers::wheel_config)
                    .configure(handlers::prize_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
