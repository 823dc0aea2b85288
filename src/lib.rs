#[macro_use]
extern crate rocket;

pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod form;
pub mod repo;
pub mod routes;
pub mod views;

use rocket::fairing::AdHoc;

use crate::config::AppConfig;
use crate::repo::SharedRepository;

/// Builds the application around the given repository binding.
pub fn create_rocket(repo: SharedRepository, config: AppConfig) -> rocket::Rocket<rocket::Build> {
    let (cors, cors_error) = match config.cors() {
        Ok(cors) => (cors, None),
        Err(e) => (None, Some(e.to_string())),
    };

    let mut rocket = rocket::build()
        .manage(repo)
        .manage(config)
        .attach(AdHoc::on_liftoff("Config warnings", move |rocket| {
            let cors_error = cors_error.clone();
            Box::pin(async move {
                if let Some(e) = cors_error {
                    log::error!("ALLOWED_ORIGINS is invalid, CORS disabled: {}", e);
                }
                if let Some(config) = rocket.state::<AppConfig>() {
                    if config.ephemeral_key {
                        log::warn!("APP_KEY is not set; CSRF tokens will not survive a restart");
                    }
                    if !config.verify_csrf {
                        log::warn!("CSRF verification is disabled (APP_ENV={})", config.app_env);
                    }
                }
            })
        }))
        .mount("/", routes![
            routes::health,
            routes::home,
            routes::list_posts,
            routes::show_post,
            routes::store_post,
        ])
        .register("/", catchers![routes::not_found, routes::unprocessable, routes::internal_error]);

    if let Some(cors) = cors {
        rocket = rocket.attach(cors);
    }
    rocket
}
