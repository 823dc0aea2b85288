//! Server-rendered HTML pages.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::form::FailedSubmission;
use crate::repo::Post;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markdown to HTML. Raw HTML in the source is shown as text.
pub fn render_markdown(md: &str) -> String {
    let parser = Parser::new_ext(md, Options::all()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn display_date(rfc3339: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map(|d| d.format("%d %B %Y").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<nav><a href="/">New post</a> · <a href="/post">All posts</a></nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        body = body,
    )
}

fn notice_html(notice: Option<&str>) -> String {
    notice
        .map(|n| format!("<p class=\"notice\">{}</p>\n", escape(n)))
        .unwrap_or_default()
}

fn field_error(failed: Option<&FailedSubmission>, field: &str) -> String {
    failed
        .and_then(|f| f.error_for(field))
        .map(|m| format!("<p class=\"error\">{}</p>", escape(m)))
        .unwrap_or_default()
}

pub fn home(csrf_token: &str, failed: Option<&FailedSubmission>, notice: Option<&str>) -> String {
    let old_title = failed.map(|f| f.old_title.as_str()).unwrap_or("");
    let old_description = failed.map(|f| f.old_description.as_str()).unwrap_or("");
    let body = format!(
        r#"<h1>Write a post</h1>
{notice}<form method="post" action="/post">
<input type="hidden" name="_token" value="{token}">
<label for="title">Title</label>
<input id="title" name="title" type="text" value="{title}">
{title_error}
<label for="description">Description</label>
<textarea id="description" name="description">{description}</textarea>
{description_error}
<button type="submit">Publish</button>
</form>"#,
        notice = notice_html(notice),
        token = escape(csrf_token),
        title = escape(old_title),
        title_error = field_error(failed, "title"),
        description = escape(old_description),
        description_error = field_error(failed, "description"),
    );
    layout("Write a post", &body)
}

pub fn index(posts: &[Post], notice: Option<&str>) -> String {
    let list = if posts.is_empty() {
        "<p>No posts yet.</p>".to_string()
    } else {
        let items: String = posts
            .iter()
            .map(|p| {
                format!(
                    "<li><a href=\"/post/{slug}\">{title}</a> <time datetime=\"{at}\">{date}</time></li>\n",
                    slug = escape(&p.slug),
                    title = escape(&p.title),
                    at = escape(&p.created_at),
                    date = display_date(&p.created_at),
                )
            })
            .collect();
        format!("<ul class=\"posts\">\n{}</ul>", items)
    };
    let body = format!("<h1>Blog Post</h1>\n{}{}", notice_html(notice), list);
    layout("Blog Post", &body)
}

pub fn show(post: &Post) -> String {
    let body = format!(
        r#"<article>
<h1>{title}</h1>
<p class="meta"><time datetime="{at}">{date}</time></p>
{content}
</article>
<p><a href="/post">Back to all posts</a></p>"#,
        title = escape(&post.title),
        at = escape(&post.created_at),
        date = display_date(&post.created_at),
        content = render_markdown(&post.description),
    );
    layout(&post.title, &body)
}

fn error_page(code: u16, message: &str) -> String {
    layout(
        message,
        &format!("<h1>{}</h1>\n<p>{}</p>", code, escape(message)),
    )
}

pub fn not_found() -> String {
    error_page(404, "Not Found")
}

pub fn page_expired() -> String {
    error_page(419, "Page Expired")
}

pub fn unprocessable() -> String {
    error_page(422, "Unprocessable Content")
}

pub fn server_error() -> String {
    error_page(500, "Server Error")
}
