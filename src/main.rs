use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use astra_backend::{
    config::Config,
    database::{SeaOrmOrderRepository, SeaOrmSettingsRepository, create_pool, run_migrations},
    external::{SmtpMailer, WhatsAppCloudApi},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
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
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 外部通知渠道
    let mailer = Arc::new(SmtpMailer::new());
    let whatsapp = Arc::new(WhatsAppCloudApi::new(&config.whatsapp));

    // 创建服务
    let settings_service = SettingsService::new(
        Arc::new(SeaOrmSettingsRepository::new(pool.clone())),
        config.mail.clone(),
        config.whatsapp.clone(),
    );
    let notifier = OrderNotifier::new(
        mailer.clone(),
        whatsapp,
        settings_service.clone(),
        config.site.clone(),
    );
    let order_service = OrderService::new(
        Arc::new(SeaOrmOrderRepository::new(pool.clone())),
        notifier,
    );
    let contact_service = ContactService::new(mailer, settings_service, config.site.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let site = config.site.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&site))
            .app_data(handlers::json_config())
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(contact_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
