use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AdminAuthService, CredentialHasher, TokenIssuer};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::database::QueryExecutor;
use crate::middleware::{JwtMiddleware, RequestLogger};
use crate::routes::{
    add_category, add_product, delete_category, delete_product, get_category, get_product,
    health_check, list_categories, login, register, search_products, update_category,
    update_product,
};

pub fn run(
    listener: TcpListener,
    executor: Arc<dyn QueryExecutor>,
    jwt_config: JwtSettings,
    password_config: PasswordSettings,
) -> Result<Server, std::io::Error> {
    let tokens = TokenIssuer::new(&jwt_config);
    let auth_service = AdminAuthService::new(
        executor.clone(),
        CredentialHasher::from_settings(&password_config),
        tokens.clone(),
    );

    let executor_data: web::Data<dyn QueryExecutor> = web::Data::from(executor);
    let auth_data = web::Data::new(auth_service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared, read-only state
            .app_data(executor_data.clone())
            .app_data(auth_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/admin")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login)),
            )
            // Reads are public, writes need an admin bearer token
            .service(
                web::scope("/products")
                    .wrap(JwtMiddleware::new(tokens.clone()))
                    .route("/", web::get().to(search_products))
                    .route("/", web::post().to(add_product))
                    .route("/{product_id}", web::get().to(get_product))
                    .route("/{product_id}", web::put().to(update_product))
                    .route("/{product_id}", web::delete().to(delete_product)),
            )
            .service(
                web::scope("/categories")
                    .wrap(JwtMiddleware::new(tokens.clone()))
                    .route("/", web::get().to(list_categories))
                    .route("/", web::post().to(add_category))
                    .route("/{category_id}", web::get().to(get_category))
                    .route("/{category_id}", web::put().to(update_category))
                    .route("/{category_id}", web::delete().to(delete_category)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
