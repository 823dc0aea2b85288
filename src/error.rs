use rocket::http::Status;
use rocket::request::Request;
use rocket::response::content::RawHtml;
use rocket::response::{self, Responder};
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Errors a page handler can surface to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("post `{0}` not found")]
    PostNotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::PostNotFound(_) => Status::NotFound,
            AppError::Repo(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let page = match &self {
            AppError::PostNotFound(slug) => {
                log::info!("no post with slug `{}`", slug);
                views::not_found()
            }
            AppError::Repo(e) => {
                log::error!("{} {} failed: {}", req.method(), req.uri(), e);
                views::server_error()
            }
        };
        (status, RawHtml(page)).respond_to(req)
    }
}
