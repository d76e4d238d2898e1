//! Login gate and per-session navigation state.
//!
//! The portal keeps one `Session` per issued token inside a `SessionManager`.
//! There is no process-wide logged-in flag: a request either presents a token
//! that maps to a live session, or it is treated as logged out. Sessions are
//! in-memory only and do not survive a restart.
//!
//! # Example
//!
//! ```
//! use courseport::auth::{Credentials, SessionManager, View};
//!
//! let manager = SessionManager::new(Credentials::new("Compiler Design", "cse331"));
//! let token = manager.login("Compiler Design", "cse331").unwrap();
//!
//! manager.select_view(&token, View::CourseContent);
//! assert_eq!(manager.session(&token).unwrap().view, View::CourseContent);
//!
//! manager.logout(&token);
//! assert!(manager.session(&token).is_none());
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use subtle::ConstantTimeEq;

/// Fixed credential pair the login form is checked against.
///
/// Injected from configuration at startup. Comparison is exact and
/// case-sensitive on both fields. This is not a real auth mechanism: no
/// hashing, no lockout, no rate limiting.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns true iff both fields match exactly.
    ///
    /// Byte comparison is constant-time so the check does not leak prefix
    /// length through timing.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        ct_str_eq(&self.username, username) & ct_str_eq(&self.password, password)
    }
}

/// Constant-time string equality. Length is compared first; unequal lengths
/// can never match anyway.
fn ct_str_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

/// The three views behind the login gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Landing page; where a fresh login starts.
    #[default]
    Home,
    /// File browser over the configured content source.
    CourseContent,
    /// Static contact page.
    Contact,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Home => write!(f, "Home"),
            View::CourseContent => write!(f, "Course Content"),
            View::Contact => write!(f, "Contact"),
        }
    }
}

/// Per-visit login and navigation state.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Username presented at login.
    pub username: String,
    /// Currently selected view.
    pub view: View,
    /// Always true for a stored session; logout removes the session entirely.
    pub logged_in: bool,
    /// Timestamp of session creation.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a freshly authenticated user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            view: View::default(),
            logged_in: true,
            created_at: Utc::now(),
        }
    }
}

/// Token-keyed session store.
///
/// Each session is independent; concurrent users never share state. Lock
/// poisoning is recovered rather than propagated, matching how the server
/// treats its shared state elsewhere.
pub struct SessionManager {
    credentials: Credentials,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    /// Create a manager that checks logins against the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attempt a login. On success, stores a new session landing on the
    /// default view and returns its token. On failure, returns None and
    /// leaves no trace.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if !self.credentials.verify(username, password) {
            return None;
        }

        let token = generate_token();
        let session = Session::new(username);
        tracing::info!(user = %username, "Session created");

        match self.sessions.write() {
            Ok(mut sessions) => {
                sessions.insert(token.clone(), session);
            }
            Err(poisoned) => {
                tracing::warn!("Session lock was poisoned, recovering");
                poisoned.into_inner().insert(token.clone(), session);
            }
        }
        Some(token)
    }

    /// End a session. Returns true if the token was live. Works from any
    /// view; afterwards the token maps to nothing, i.e. LoggedOut.
    pub fn logout(&self, token: &str) -> bool {
        let removed = match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(token),
            Err(poisoned) => {
                tracing::warn!("Session lock was poisoned, recovering");
                poisoned.into_inner().remove(token)
            }
        };

        if let Some(session) = &removed {
            tracing::info!(user = %session.username, view = %session.view, "Session ended");
        }
        removed.is_some()
    }

    /// Look up the session for a token. None means the caller is logged out.
    pub fn session(&self, token: &str) -> Option<Session> {
        match self.sessions.read() {
            Ok(sessions) => sessions.get(token).cloned(),
            Err(poisoned) => {
                tracing::warn!("Session lock was poisoned, recovering");
                poisoned.into_inner().get(token).cloned()
            }
        }
    }

    /// Select a view. Unguarded: any transition between the three views
    /// always succeeds. Returns the new view, or None if not logged in.
    pub fn select_view(&self, token: &str, view: View) -> Option<View> {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.get_mut(token).map(|s| {
                s.view = view;
                s.view
            }),
            Err(poisoned) => poisoned.into_inner().get_mut(token).map(|s| {
                s.view = view;
                s.view
            }),
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        match self.sessions.read() {
            Ok(sessions) => sessions.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// True if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generate a random session token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Credentials::new("Compiler Design", "cse331"))
    }

    #[test]
    fn test_authenticate_exact_match_only() {
        let creds = Credentials::new("Compiler Design", "cse331");
        assert!(creds.verify("Compiler Design", "cse331"));
        assert!(!creds.verify("x", "y"));
        assert!(!creds.verify("compiler design", "cse331"));
        assert!(!creds.verify("Compiler Design", "CSE331"));
        assert!(!creds.verify("Compiler Design", ""));
        assert!(!creds.verify("", ""));
    }

    #[test]
    fn test_login_success_creates_session() {
        let manager = manager();
        let token = manager.login("Compiler Design", "cse331").unwrap();

        let session = manager.session(&token).unwrap();
        assert!(session.logged_in);
        assert_eq!(session.username, "Compiler Design");
        assert_eq!(session.view, View::Home);
    }

    #[test]
    fn test_login_failure_leaves_no_session() {
        let manager = manager();
        assert!(manager.login("Compiler Design", "wrong").is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_view_transitions_are_unguarded() {
        let manager = manager();
        let token = manager.login("Compiler Design", "cse331").unwrap();

        for view in [View::CourseContent, View::Contact, View::Home, View::Contact] {
            assert_eq!(manager.select_view(&token, view), Some(view));
            assert_eq!(manager.session(&token).unwrap().view, view);
        }
    }

    #[test]
    fn test_logout_from_every_view() {
        for view in [View::Home, View::CourseContent, View::Contact] {
            let manager = manager();
            let token = manager.login("Compiler Design", "cse331").unwrap();
            manager.select_view(&token, view);

            assert!(manager.logout(&token));
            assert!(manager.session(&token).is_none());
            assert!(manager.is_empty());
        }
    }

    #[test]
    fn test_unknown_token_is_logged_out() {
        let manager = manager();
        assert!(manager.session("deadbeef").is_none());
        assert!(manager.select_view("deadbeef", View::Contact).is_none());
        assert!(!manager.logout("deadbeef"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let manager = manager();
        let a = manager.login("Compiler Design", "cse331").unwrap();
        let b = manager.login("Compiler Design", "cse331").unwrap();
        assert_ne!(a, b);

        manager.select_view(&a, View::Contact);
        assert_eq!(manager.session(&b).unwrap().view, View::Home);

        manager.logout(&a);
        assert!(manager.session(&b).is_some());
    }

    #[test]
    fn test_token_format() {
        let t = generate_token();
        assert_eq!(t.len(), 32);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_view_serde_names() {
        assert_eq!(
            serde_json::to_string(&View::CourseContent).unwrap(),
            "\"course_content\""
        );
        let v: View = serde_json::from_str("\"contact\"").unwrap();
        assert_eq!(v, View::Contact);
    }
}
