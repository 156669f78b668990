//! HTML rendering for the browser UI.
//!
//! Item names are stored already escaped, so they are written into markup
//! as-is. Anything else that came from a request is escaped here.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::services::validation::escape_html;
use crate::state::items::Item;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.items { list-style: none; padding: 0; }
.item { display: flex; gap: .5rem; overflow: hidden; max-height: 4rem; transition: max-height .3s, opacity .3s; }
.item.enter { max-height: 0; opacity: 0; }
.item.delete { max-height: 0; opacity: 0; }
.item-name:disabled { border-color: transparent; background: none; color: inherit; }
.slide-transition { overflow: hidden; max-height: 0; transition: max-height .2s; }
.error-border { border-color: #c0392b; }
.error-message, .input-error { color: #c0392b; }
.modal { display: none; position: fixed; inset: 0; background: rgba(0,0,0,.4); align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 1.5rem; border-radius: .5rem; min-width: 16rem; }
"#;

/// One list element. `entering` marks freshly created items so the browser
/// can slide them in.
pub fn item_fragment(item: &Item, entering: bool) -> String {
    let class = if entering { "item enter" } else { "item" };
    format!(
        r#"<li class="{class}" data-item-id="{id}">
  <input class="item-name" type="text" value="{name}" data-value="{name}" disabled>
  <div class="slide-transition"><button class="btn" data-item-btn="update">Save</button></div>
  <button class="btn" data-item-btn="edit">Edit</button>
  <button class="btn delete-btn" data-item-btn="delete">Delete</button>
</li>"#,
        id = item.id,
        name = item.name,
    )
}

/// The full page listing every item, newest first.
pub fn index_page(items: &[Item], api_path: &str, fragment_path: &str) -> String {
    let mut list = String::new();
    for item in items {
        let _ = writeln!(list, "{}", item_fragment(item, false));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Items</title>
<style>{STYLE}</style>
</head>
<body data-api-url="{api}" data-fragment-url="{fragment}">
<h1>Items</h1>
<form data-form="add-item">
  <input name="add-item" type="text" placeholder="Add an item" autocomplete="off">
  <button class="btn" type="submit">Add</button>
  <p class="input-error" data-input-error="add-item"></p>
</form>
<ul class="items">
{list}</ul>
<button class="btn delete-btn" data-btn="delete all">Delete all</button>
<div class="modal">
  <div class="modal-content">
    <button class="close-modal" aria-label="Close">&times;</button>
    <div class="modal-message"></div>
  </div>
</div>
<script src="/static/items.js"></script>
</body>
</html>
"#,
        api = escape_html(api_path),
        fragment = escape_html(fragment_path),
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Error page</title></head>
<body>
<h1>{code}</h1>
<p class="error-message">{message}</p>
<p><a href="/">Back to the list</a></p>
</body>
</html>
"#,
        code = status.as_u16(),
        message = escape_html(message),
    )
}
