//! Server-rendered HTML pages.
//!
//! Every page is the same shell (inline CSS, flash banner, content) built
//! with plain string pushes. Text interpolated into markup goes through
//! [`escape_text`]; document names in URLs are percent-encoded.

use axum::http::StatusCode;
use folio_core::document::DocumentName;
use folio_core::markdown::escape_text;

/// Escape text for a double-quoted attribute value.
fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn document_href(name: &str) -> String {
    let mut href = String::with_capacity(name.len() + 1);
    href.push('/');
    href.push_str(&urlencoding::encode(name));
    href
}

/// Wrap page content in the common shell.
fn shell(title: &str, flash: Option<&str>, content: &str) -> String {
    let mut html = String::with_capacity(2048 + content.len());
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"/>");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/><title>");
    html.push_str(&escape_text(title));
    html.push_str(" · Folio</title>");
    html.push_str(PAGE_CSS);
    html.push_str("</head>\n<body>\n");
    if let Some(message) = flash {
        html.push_str("<div class=\"flash\"><p>");
        html.push_str(&escape_text(message));
        html.push_str("</p></div>\n");
    }
    html.push_str("<main>\n");
    html.push_str(content);
    html.push_str("\n</main>\n</body>\n</html>\n");
    html
}

/// Document list with per-document actions and the sign-in status.
pub fn index_page(files: &[String], flash: Option<&str>, username: Option<&str>) -> String {
    let mut body = String::with_capacity(512 + files.len() * 256);
    body.push_str("<h1>Documents</h1>\n");

    if files.is_empty() {
        body.push_str("<p class=\"muted\">No documents yet.</p>\n");
    } else {
        body.push_str("<ul class=\"documents\">\n");
        for name in files {
            let href = document_href(name);
            body.push_str("<li><a href=\"");
            body.push_str(&href);
            body.push_str("\">");
            body.push_str(&escape_text(name));
            body.push_str("</a> <a class=\"action\" href=\"");
            body.push_str(&href);
            body.push_str("/edit\">Edit</a> <form class=\"inline\" method=\"post\" action=\"");
            body.push_str(&href);
            body.push_str("/delete\"><button type=\"submit\">Delete</button></form></li>\n");
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<p><a href=\"/new\">New Document</a></p>\n");

    match username {
        Some(user) => {
            body.push_str("<form class=\"session\" method=\"post\" action=\"/users/signout\"><p>Signed in as ");
            body.push_str(&escape_text(user));
            body.push_str(".</p><button type=\"submit\">Sign Out</button></form>\n");
        }
        None => {
            body.push_str("<p class=\"session\"><a href=\"/users/signin\">Sign In</a></p>\n");
        }
    }

    shell("Documents", flash, &body)
}

/// Form for creating a document, pre-filled with the last attempted name.
pub fn new_document_page(flash: Option<&str>, attempted: &str) -> String {
    let mut body = String::with_capacity(512);
    body.push_str("<form method=\"post\" action=\"/new\">\n");
    body.push_str("<label for=\"new_file\">Add a new document:</label>\n");
    body.push_str("<input type=\"text\" name=\"new_file\" id=\"new_file\" value=\"");
    body.push_str(&escape_attr(attempted));
    body.push_str("\"/>\n<button type=\"submit\">Create</button>\n</form>\n");
    body.push_str("<p><a href=\"/\">Back</a></p>\n");
    shell("New Document", flash, &body)
}

/// Edit form with the current content in a textarea.
pub fn edit_page(name: &DocumentName, content: &str, flash: Option<&str>) -> String {
    let mut body = String::with_capacity(512 + content.len());
    body.push_str("<form method=\"post\" action=\"");
    body.push_str(&document_href(name.as_str()));
    body.push_str("\">\n<label for=\"content\">Edit content of ");
    body.push_str(&escape_text(name.as_str()));
    body.push_str(":</label>\n<textarea name=\"content\" id=\"content\" rows=\"20\" cols=\"100\">\n");
    // Parsers drop one newline right after <textarea>, so the one above
    // keeps a leading newline in the content intact.
    body.push_str(&escape_text(content));
    body.push_str("</textarea>\n<button type=\"submit\">Save Changes</button>\n</form>\n");
    body.push_str("<p><a href=\"/\">Back</a></p>\n");
    shell(name.as_str(), flash, &body)
}

/// Sign-in form, optionally pre-filled with the last attempted username.
pub fn signin_page(flash: Option<&str>, username: &str) -> String {
    let mut body = String::with_capacity(768);
    body.push_str("<form method=\"post\" action=\"/users/signin\">\n");
    body.push_str("<div><label for=\"username\">Username:</label>\n");
    body.push_str("<input type=\"text\" name=\"username\" id=\"username\" value=\"");
    body.push_str(&escape_attr(username));
    body.push_str("\"/></div>\n");
    body.push_str("<div><label for=\"password\">Password:</label>\n");
    body.push_str("<input type=\"password\" name=\"password\" id=\"password\"/></div>\n");
    body.push_str("<button type=\"submit\">Sign In</button>\n</form>\n");
    shell("Sign In", flash, &body)
}

/// A rendered markdown document.
pub fn markdown_page(name: &DocumentName, rendered: &str) -> String {
    let mut body = String::with_capacity(128 + rendered.len());
    body.push_str("<article class=\"document\">\n");
    body.push_str(rendered);
    body.push_str("</article>\n<p><a href=\"/\">Back</a></p>\n");
    shell(name.as_str(), None, &body)
}

/// Generic error page; never includes internal details.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let mut body = String::with_capacity(256);
    body.push_str("<h1>");
    body.push_str(&status.as_u16().to_string());
    body.push(' ');
    body.push_str(&escape_text(status.canonical_reason().unwrap_or("Error")));
    body.push_str("</h1>\n<p>");
    body.push_str(&escape_text(message));
    body.push_str("</p>\n<p><a href=\"/\">Home</a></p>\n");
    shell("Error", None, &body)
}

const PAGE_CSS: &str = r#"<style>
*,*::before,*::after{box-sizing:border-box}
body{margin:0;font:16px/1.5 system-ui,-apple-system,"Segoe UI",sans-serif;color:#222;background:#fafaf7}
main{max-width:760px;margin:2rem auto;padding:0 1rem}
a{color:#1d5fa8}
.flash{background:#fff4c2;border-bottom:1px solid #e6d27a;padding:.5rem 1rem;text-align:center}
.flash p{margin:0}
.muted{color:#777}
ul.documents{list-style:none;padding:0}
ul.documents li{display:flex;gap:.75rem;align-items:baseline;padding:.35rem 0;border-bottom:1px solid #eee}
ul.documents li>a:first-child{flex:1}
form.inline{display:inline;margin:0}
form.session{display:flex;gap:.75rem;align-items:baseline}
label{display:block;margin:.5rem 0 .25rem}
input[type=text],input[type=password]{padding:.35rem;min-width:18rem}
textarea{width:100%;font:14px/1.4 ui-monospace,monospace}
button{margin-top:.5rem;padding:.35rem .9rem;cursor:pointer}
article.document pre{background:#f0f0ec;padding:.75rem;overflow:auto}
</style>"#;
