//! Rendering of the todo list.
//!
//! [`render`] is a pure function of the full collection and a [`ViewState`].
//! Both the htmx page and the terminal client render through it, so filtering
//! and counting behave the same everywhere.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::types::{Filter, Todo};

/// How long a notification stays visible.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

/// Question asked before replacing a todo's text.
pub const EDIT_PROMPT: &str = "Edit todo:";

/// Question asked before deleting a todo.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this todo?";

/// Immutable view settings passed into [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub filter: Filter,
}

impl ViewState {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    /// A copy of this state with a different filter.
    pub fn with_filter(self, filter: Filter) -> Self {
        Self { filter }
    }
}

/// Aggregate counts over the whole collection, independent of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Stats {
    pub fn of(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub view: ViewState,
    pub stats: Stats,
    /// Todos visible under the filter, in collection order.
    pub items: Vec<Todo>,
}

/// Compute the visible list and counts without modifying `todos`.
pub fn render(todos: &[Todo], view: &ViewState) -> RenderedView {
    let items = todos
        .iter()
        .filter(|t| view.filter.matches(t))
        .cloned()
        .collect();

    RenderedView {
        view: *view,
        stats: Stats::of(todos),
        items,
    }
}

impl RenderedView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// HTML fragment for the stats bar, filter buttons and list.
    ///
    /// The fragment targets `#todo-app`; every control posts back to the
    /// `/ui/todos` routes with the current filter so the response re-renders
    /// the same view.
    pub fn to_html(&self) -> String {
        let filter = self.view.filter.as_str();
        let mut html = String::new();

        let _ = write!(
            html,
            r#"<div class="stats">
                <div class="stat"><span class="stat-value" id="totalCount">{}</span><span class="stat-label">Total</span></div>
                <div class="stat"><span class="stat-value" id="completedCount">{}</span><span class="stat-label">Completed</span></div>
                <div class="stat"><span class="stat-value" id="pendingCount">{}</span><span class="stat-label">Pending</span></div>
            </div>"#,
            self.stats.total, self.stats.completed, self.stats.pending
        );

        html.push_str(r#"<div class="filters">"#);
        for option in Filter::ALL {
            let active = if option == self.view.filter {
                " active"
            } else {
                ""
            };
            let _ = write!(
                html,
                r##"<button class="filter-btn{active}" data-filter="{value}" hx-get="/ui/todos?filter={value}" hx-target="#todo-app">{label}</button>"##,
                active = active,
                value = option.as_str(),
                label = option.label(),
            );
        }
        html.push_str("</div>");

        // Picked up by the add form so a create re-renders the same view
        let _ = write!(
            html,
            r#"<input type="hidden" id="currentFilter" name="filter" value="{}" hx-swap-oob="true">"#,
            filter
        );

        if self.is_empty() {
            html.push_str(r#"<div class="empty-state" id="emptyState">Nothing to show here</div>"#);
            return html;
        }

        html.push_str(r#"<ul class="todo-list" id="todoList">"#);
        for todo in &self.items {
            let checked = if todo.completed { " checked" } else { "" };
            let done = if todo.completed { " completed" } else { "" };
            let text = html_escape(&todo.text);
            let _ = write!(
                html,
                r##"<li class="todo-item" id="todo-{id}">
                    <input type="checkbox" class="todo-checkbox"{checked}
                           hx-post="/ui/todos/{id}/toggle?filter={filter}" hx-target="#todo-app">
                    <span class="todo-text{done}">{text}</span>
                    <div class="todo-actions">
                        <button class="todo-btn edit-btn" title="Edit"
                                hx-post="/ui/todos/{id}/edit?filter={filter}" hx-target="#todo-app"
                                data-edit-prompt="{edit_prompt}" data-text="{text}">Edit</button>
                        <button class="todo-btn delete-btn" title="Delete"
                                hx-delete="/ui/todos/{id}?filter={filter}" hx-target="#todo-app"
                                hx-confirm="{delete_confirmation}">Delete</button>
                    </div>
                </li>"##,
                id = todo.id,
                checked = checked,
                done = done,
                text = text,
                filter = filter,
                edit_prompt = EDIT_PROMPT,
                delete_confirmation = DELETE_CONFIRMATION,
            );
        }
        html.push_str("</ul>");
        html
    }

    /// Plain-text listing for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            out.push_str("  (nothing to show)\n");
        }
        for todo in &self.items {
            let mark = if todo.completed { 'x' } else { ' ' };
            let _ = writeln!(out, "  [{}] {:>3}  {}", mark, todo.id, todo.text);
        }
        let _ = writeln!(
            out,
            "{} total, {} completed, {} pending (filter: {})",
            self.stats.total, self.stats.completed, self.stats.pending, self.view.filter
        );
        out
    }
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Kind of a notification, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// Transient feedback about the outcome of the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Out-of-band htmx banner replacing any banner already on the page.
    pub fn to_html(&self) -> String {
        format!(
            r#"<div id="notification" hx-swap-oob="true" class="notification {}">{}</div>"#,
            self.kind.as_str(),
            html_escape(&self.message)
        )
    }
}

/// Holds at most one notification and expires it after a fixed delay.
#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    current: Option<(Notification, Instant)>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Show `notification`, replacing the one currently visible.
    pub fn show(&mut self, notification: Notification, now: Instant) {
        self.current = Some((notification, now));
    }

    /// The visible notification at `now`, if it has not expired.
    pub fn current(&self, now: Instant) -> Option<&Notification> {
        match &self.current {
            Some((n, shown_at)) if now.saturating_duration_since(*shown_at) < self.ttl => Some(n),
            _ => None,
        }
    }

    /// The most recent notification regardless of expiry.
    pub fn last(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(n, _)| n)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed_todos;

    #[test]
    fn test_render_filters_without_touching_input() {
        let todos = seed_todos();
        let view = render(&todos, &ViewState::new(Filter::Active));

        assert_eq!(todos.len(), 4);
        assert_eq!(
            view.items.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn test_stats_ignore_filter() {
        let todos = seed_todos();
        let view = render(&todos, &ViewState::new(Filter::Completed));

        assert_eq!(
            view.stats,
            Stats {
                total: 4,
                completed: 2,
                pending: 2
            }
        );
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_to_html_escapes_text() {
        let todos = vec![Todo::new(1, "<script>alert('x')</script>", false)];
        let html = render(&todos, &ViewState::default()).to_html();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_to_html_empty_state() {
        let html = render(&[], &ViewState::default()).to_html();
        assert!(html.contains("emptyState"));
        assert!(!html.contains("todoList"));
    }

    #[test]
    fn test_to_html_marks_active_filter() {
        let html = render(&seed_todos(), &ViewState::new(Filter::Completed)).to_html();
        assert!(html.contains(r#"class="filter-btn active" data-filter="completed""#));
        assert!(html.contains("/ui/todos/1/toggle?filter=completed"));
    }

    #[test]
    fn test_edit_control_carries_current_text() {
        let todos = vec![
            Todo::new(3, "Deploy to the cloud", false),
            Todo::new(4, r#"Say "hi" & <wave>"#, false),
        ];
        let html = render(&todos, &ViewState::default()).to_html();

        assert!(html.contains(r#"data-text="Deploy to the cloud""#));
        assert!(html.contains(r#"data-text="Say &quot;hi&quot; &amp; &lt;wave&gt;""#));
        assert!(html.contains(r#"data-edit-prompt="Edit todo:""#));
    }

    #[test]
    fn test_to_html_carries_current_filter() {
        let html = render(&seed_todos(), &ViewState::new(Filter::Active)).to_html();
        assert!(html.contains(
            r#"<input type="hidden" id="currentFilter" name="filter" value="active" hx-swap-oob="true">"#
        ));
    }

    #[test]
    fn test_to_text_lists_items() {
        let text = render(&seed_todos(), &ViewState::default()).to_text();
        assert!(text.contains("[x]   1  Learn Rust"));
        assert!(text.contains("4 total, 2 completed, 2 pending"));
    }

    #[test]
    fn test_notifier_keeps_single_notification() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));

        notifier.show(Notification::new(NotificationKind::Info, "first"), start);
        notifier.show(Notification::new(NotificationKind::Error, "second"), start);

        let current = notifier.current(start).unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, NotificationKind::Error);
    }

    #[test]
    fn test_notifier_expires() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.show(Notification::new(NotificationKind::Success, "saved"), start);

        assert!(notifier.current(start + Duration::from_secs(2)).is_some());
        assert!(notifier.current(start + Duration::from_secs(3)).is_none());
        assert_eq!(notifier.last().unwrap().message, "saved");
    }

    #[test]
    fn test_notification_html_is_escaped() {
        let html = Notification::new(NotificationKind::Warning, "<b>").to_html();
        assert!(html.contains("notification warning"));
        assert!(html.contains("&lt;b&gt;"));
    }
}
