use uuid::Uuid;

/// Identity attached to every outbound backend call.
///
/// Created once per conversation and passed explicitly; there is no
/// process-wide session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    pub user_id: String,
}

impl SessionContext {
    /// New conversation with a freshly generated session identifier.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            user_id: user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_conversation_gets_its_own_session_id() {
        let a = SessionContext::new("demo_user");
        let b = SessionContext::new("demo_user");
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.user_id, "demo_user");
    }
}
