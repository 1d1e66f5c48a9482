//! services/cms/src/web/pages.rs
//!
//! HTML pages and the shared layout. Rendering a page consumes the session's
//! flash messages and sends the updated session back with the response.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use pulldown_cmark_escape::{escape_html, FmtWriter};

use crate::web::session::Session;

const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// A `302 Found` to the document index, carrying the session.
pub fn redirect_home(session: Session) -> Response {
    (StatusCode::FOUND, session, [(header::LOCATION, "/")]).into_response()
}

/// Escapes text for use in HTML bodies and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(FmtWriter(&mut out), text);
    out
}

/// Path segment for a document or user name.
fn segment(name: &str) -> String {
    escape(&urlencoding::encode(name))
}

/// Wraps `content` in the site layout and builds the response.
fn page(status: StatusCode, mut session: Session, title: &str, content: &str) -> Response {
    let mut flashes = String::new();
    if let Some(message) = session.take_flash_success() {
        flashes.push_str(&format!(
            "    <div class=\"flash success\"><p>{}</p></div>\n",
            escape(&message)
        ));
    }
    if let Some(message) = session.take_flash_error() {
        flashes.push_str(&format!(
            "    <div class=\"flash error\"><p>{}</p></div>\n",
            escape(&message)
        ));
    }

    let account = match session.username() {
        Some(user) => format!(
            "<p class=\"user-status\">Signed in as {}. <a href=\"/{}/signout\">Sign Out</a></p>",
            escape(user),
            segment(user)
        ),
        None => "<p class=\"user-status\"><a href=\"/users/signin\">Sign In</a></p>".to_string(),
    };

    let html = format!(
        "<!doctype html>\n\
         <html lang=\"en-US\">\n\
         \x20 <head>\n\
         \x20   <meta charset=\"utf-8\">\n\
         \x20   <title>{title}</title>\n\
         \x20 </head>\n\
         \x20 <body>\n\
         {flashes}\
         \x20   <main>\n{content}\n    </main>\n\
         \x20   <footer>{account}</footer>\n\
         \x20 </body>\n\
         </html>\n",
        title = escape(title),
    );

    (status, session, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response()
}

//=========================================================================================
// Pages
//=========================================================================================

pub fn index(session: Session, files: &[String]) -> Response {
    let mut items = String::new();
    for file in files {
        let link = segment(file);
        let name = escape(file);
        items.push_str(&format!(
            "      <li>\n\
             \x20       <a href=\"/{link}\">{name}</a>\n\
             \x20       <a href=\"/{link}/edit\">Edit</a>\n\
             \x20       <form class=\"inline\" method=\"post\" action=\"/{link}/delete\">\n\
             \x20         <button type=\"submit\">Delete</button>\n\
             \x20       </form>\n\
             \x20     </li>\n"
        ));
    }

    let content = format!(
        "      <ul class=\"documents\">\n{items}      </ul>\n\
         \x20     <p><a href=\"/new/\">New Document</a></p>"
    );
    page(StatusCode::OK, session, "Documents", &content)
}

/// A markdown document rendered to HTML.
pub fn document(session: Session, name: &str, html: &str) -> Response {
    page(StatusCode::OK, session, name, html)
}

pub fn new_document(status: StatusCode, session: Session, docu_name: &str) -> Response {
    let content = format!(
        "      <form method=\"post\" action=\"/create\">\n\
         \x20       <label for=\"docu_name\">Add a new document:</label>\n\
         \x20       <input type=\"text\" name=\"docu_name\" id=\"docu_name\" value=\"{}\">\n\
         \x20       <button type=\"submit\">Create</button>\n\
         \x20     </form>",
        escape(docu_name)
    );
    page(status, session, "New Document", &content)
}

pub fn edit_document(session: Session, name: &str, content: &str) -> Response {
    let body = format!(
        "      <h2>Edit content of {name}:</h2>\n\
         \x20     <form method=\"post\" action=\"/{link}\">\n\
         \x20       <textarea name=\"new_content\" rows=\"20\" cols=\"80\">{content}</textarea>\n\
         \x20       <button type=\"submit\">Save Changes</button>\n\
         \x20     </form>",
        name = escape(name),
        link = segment(name),
        content = escape(content),
    );
    page(StatusCode::OK, session, name, &body)
}

pub fn sign_in(status: StatusCode, session: Session, username: &str) -> Response {
    let content = format!(
        "      <form method=\"post\" action=\"/users/signin\">\n\
         \x20       <label for=\"username\">Username</label>\n\
         \x20       <input type=\"text\" name=\"username\" id=\"username\" value=\"{}\">\n\
         \x20       <label for=\"password\">Password</label>\n\
         \x20       <input type=\"password\" name=\"password\" id=\"password\" value=\"\">\n\
         \x20       <button type=\"submit\">Sign In</button>\n\
         \x20     </form>",
        escape(username)
    );
    page(status, session, "Sign In", &content)
}
