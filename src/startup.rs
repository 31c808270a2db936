use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::{ApplicationSettings, JwtSettings};
use crate::request_logging::RequestLogging;
use crate::routes::{activate_account, health_check, login, refresh_token, register};
use crate::store::{RefreshTokenStore, UserStore};

pub fn run(
    listener: TcpListener,
    user_store: Arc<dyn UserStore>,
    token_store: Arc<dyn RefreshTokenStore>,
    app_settings: ApplicationSettings,
    jwt_settings: JwtSettings,
) -> Result<Server, std::io::Error> {
    let users = web::Data::from(user_store);
    let tokens = web::Data::from(token_store);
    let app_settings = web::Data::new(app_settings);
    let jwt_settings = web::Data::new(jwt_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogging)
            // Shared state
            .app_data(users.clone())
            .app_data(tokens.clone())
            .app_data(app_settings.clone())
            .app_data(jwt_settings.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/activate/{user_id}", web::get().to(activate_account))
                    .route("/login", web::post().to(login))
                    .route("/refresh_token", web::post().to(refresh_token)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
