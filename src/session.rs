use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::post::PostId;
use crate::query::PostFilter;

pub const SESSION_COOKIE: &str = "roamlog_sid";

/// Which screen the session is looking at.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum View {
    #[default]
    Home,
    Post(PostId),
}

/// Everything one browser session carries between requests. Handlers get
/// this as an explicit value, never as ambient global state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_admin: bool,
    pub show_drafts: bool,
    pub view: View,
    pub filter: PostFilter,
    pub login_failed: bool,
}

impl SessionState {
    /// Drafts are fetched only for an admin that asked for them.
    pub fn include_drafts(&self) -> bool {
        self.is_admin && self.show_drafts
    }
}

/// One user interaction. Each request applies exactly one event.
#[derive(Debug, Clone)]
pub enum Event {
    Login(String),
    Logout,
    OpenPost(PostId),
    GoHome,
    ShowDrafts(bool),
    SetFilter(PostFilter),
}

/// The state transition for one event. Pure: the caller decides where the
/// new state is stored, which keeps every transition testable.
pub fn apply(state: &SessionState, event: Event, admin_password: &str) -> SessionState {
    let mut next = state.clone();

    match event {
        Event::Login(password) => {
            if verify_password(&password, admin_password) {
                next.is_admin = true;
                next.login_failed = false;
            } else {
                next.login_failed = true;
            }
        }
        Event::Logout => {
            next.is_admin = false;
            next.show_drafts = false;
            next.login_failed = false;
        }
        Event::OpenPost(id) => {
            next.view = View::Post(id);
        }
        Event::GoHome => {
            next.view = View::Home;
        }
        Event::ShowDrafts(show) => {
            next.show_drafts = show && state.is_admin;
        }
        Event::SetFilter(filter) => {
            next.filter = filter;
        }
    }

    next
}

/// Comparison time depends on the length only, not on where the strings
/// first differ.
fn verify_password(submitted: &str, expected: &str) -> bool {
    let a = submitted.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Cookie-keyed session states. The lock is only ever held to copy a state
/// in or out, never across an await point.
#[derive(Default)]
pub struct SessionMap {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn get(&self, sid: &str) -> SessionState {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(sid).cloned().unwrap_or_default()
    }

    pub fn put(&self, sid: &str, state: SessionState) {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(sid.to_string(), state);
    }
}

/// Pulls this crate's session id out of a `Cookie:` header value.
pub fn session_id_from_cookies(header: &str) -> Option<String> {
    for pair in header.split(';') {
        let pair = pair.trim();
        if let Some((name, value)) = pair.split_once('=') {
            if name == SESSION_COOKIE && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub fn session_cookie(sid: &str) -> String {
    format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, sid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "open-sesame";

    #[test]
    fn test_login_with_correct_password() {
        let state = SessionState::default();
        let state = apply(&state, Event::Login(SECRET.to_string()), SECRET);
        assert!(state.is_admin);
        assert!(!state.login_failed);

        // drafts toggle becomes available
        let state = apply(&state, Event::ShowDrafts(true), SECRET);
        assert!(state.show_drafts);
        assert!(state.include_drafts());
    }

    #[test]
    fn test_login_with_wrong_password() {
        let state = SessionState::default();
        let state = apply(&state, Event::Login("guess".to_string()), SECRET);
        assert!(!state.is_admin);
        assert!(state.login_failed);

        // a failed attempt changes nothing else
        assert_eq!(state.view, View::Home);
        assert!(!state.include_drafts());
    }

    #[test]
    fn test_logout_clears_admin_state() {
        let mut state = SessionState::default();
        state.is_admin = true;
        state.show_drafts = true;

        let state = apply(&state, Event::Logout, SECRET);
        assert!(!state.is_admin);
        assert!(!state.show_drafts);
    }

    #[test]
    fn test_drafts_toggle_needs_admin() {
        let state = SessionState::default();
        let state = apply(&state, Event::ShowDrafts(true), SECRET);
        assert!(!state.show_drafts);
        assert!(!state.include_drafts());
    }

    #[test]
    fn test_view_router() {
        let state = SessionState::default();
        assert_eq!(state.view, View::Home);

        let state = apply(&state, Event::OpenPost(PostId("p1".to_string())), SECRET);
        assert_eq!(state.view, View::Post(PostId("p1".to_string())));

        let state = apply(&state, Event::GoHome, SECRET);
        assert_eq!(state.view, View::Home);
    }

    #[test]
    fn test_set_filter() {
        let state = SessionState::default();
        let filter = PostFilter::new(Some("Rome Day 1"), "gelato");
        let state = apply(&state, Event::SetFilter(filter.clone()), SECRET);
        assert_eq!(state.filter, filter);
    }

    #[test]
    fn test_verify_password() {
        assert!(verify_password("open-sesame", "open-sesame"));
        assert!(!verify_password("open-sesame!", "open-sesame"));
        assert!(!verify_password("", "open-sesame"));
        assert!(!verify_password("open-sesamf", "open-sesame"));
    }

    #[test]
    fn test_session_map() {
        let map = SessionMap::new();
        let sid = SessionMap::fresh_id();
        assert_eq!(map.get(&sid), SessionState::default());

        let mut state = SessionState::default();
        state.is_admin = true;
        map.put(&sid, state.clone());
        assert_eq!(map.get(&sid), state);

        // unknown sessions start fresh
        assert_eq!(map.get("someone-else"), SessionState::default());
    }

    #[test]
    fn test_session_id_from_cookies() {
        let sid = session_id_from_cookies("theme=dark; roamlog_sid=abc-123; lang=en");
        assert_eq!(sid, Some("abc-123".to_string()));

        assert_eq!(session_id_from_cookies("theme=dark"), None);
        assert_eq!(session_id_from_cookies(""), None);
        assert_eq!(session_id_from_cookies("roamlog_sid="), None);
    }

    #[test]
    fn test_session_cookie_format() {
        assert_eq!(session_cookie("abc"), "roamlog_sid=abc; Path=/; HttpOnly");
    }
}
