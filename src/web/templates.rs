//! HTML templates for the web page.
//!
//! Templates are embedded at compile time using `include_str!`.

/// The page served at `/` when the static directory has no `index.html`.
///
/// It loads the list from `/ui/todos` on page load and swaps fragments into
/// `#todo-app`; the notification banner is replaced out of band.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");
