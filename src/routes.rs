use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::content::RawHtml;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::State;

use crate::config::AppConfig;
use crate::csrf::{self, Back, CsrfToken, Session};
use crate::error::AppError;
use crate::form::{FailedSubmission, PostForm, Submission};
use crate::repo::SharedRepository;
use crate::views;

type PageResult = Result<RawHtml<String>, AppError>;

/// Outcome of a form submission.
#[derive(Responder)]
pub enum StoreResponse {
    Stored(Flash<Redirect>),
    Invalid(Flash<Redirect>),
    Expired((Status, RawHtml<String>)),
}

const PAGE_EXPIRED: Status = Status::new(419);

// ─── Routes ───

#[get("/health")]
pub fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

#[get("/")]
pub fn home(token: CsrfToken, flash: Option<FlashMessage<'_>>) -> RawHtml<String> {
    let (failed, notice) = match flash {
        Some(f) if f.kind() == "error" => (FailedSubmission::decode(f.message()), None),
        Some(f) => (None, Some(f.message().to_string())),
        None => (None, None),
    };
    RawHtml(views::home(&token.0, failed.as_ref(), notice.as_deref()))
}

#[get("/post")]
pub fn list_posts(repo: &State<SharedRepository>, flash: Option<FlashMessage<'_>>) -> PageResult {
    let posts = repo.list_all()?;
    let notice = flash.filter(|f| f.kind() == "success");
    Ok(RawHtml(views::index(&posts, notice.as_ref().map(|f| f.message()))))
}

#[get("/post/<slug>")]
pub fn show_post(slug: &str, repo: &State<SharedRepository>) -> PageResult {
    let post = repo
        .find_by_slug(slug)?
        .ok_or_else(|| AppError::PostNotFound(slug.to_string()))?;
    Ok(RawHtml(views::show(&post)))
}

#[post("/post", data = "<form>")]
pub fn store_post(
    form: Form<PostForm>,
    session: Session,
    back: Back,
    config: &State<AppConfig>,
    repo: &State<SharedRepository>,
) -> Result<StoreResponse, AppError> {
    if config.verify_csrf && !csrf::verify(&config.app_key, &session.0, form.token.as_deref()) {
        log::warn!("rejected post submission with a missing or invalid CSRF token");
        return Ok(StoreResponse::Expired((PAGE_EXPIRED, RawHtml(views::page_expired()))));
    }

    match form.validate() {
        Submission::Valid(post) => {
            let id = repo.store(&post.title, &post.description)?;
            log::info!("stored post {} ({:?})", id, post.title);
            Ok(StoreResponse::Stored(Flash::success(
                Redirect::found(uri!(list_posts)),
                "Post created.",
            )))
        }
        Submission::Invalid(failed) => Ok(StoreResponse::Invalid(Flash::error(
            Redirect::found(back.0),
            failed.encode(),
        ))),
    }
}

// ─── Catchers ───

#[catch(404)]
pub fn not_found() -> RawHtml<String> {
    RawHtml(views::not_found())
}

#[catch(422)]
pub fn unprocessable() -> RawHtml<String> {
    RawHtml(views::unprocessable())
}

#[catch(500)]
pub fn internal_error() -> RawHtml<String> {
    RawHtml(views::server_error())
}
