/// Logical endpoints exposed by the KnowledgeLink service. The mapping to
/// relative paths is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateReference,
    ListReferences,
    Search,
    AuthLogin,
    AuthSession,
    AuthLogout,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CreateReference | Endpoint::ListReferences => "/api/links",
            Endpoint::Search => "/api/search",
            Endpoint::AuthLogin => "/api/auth/login",
            Endpoint::AuthSession => "/api/auth/me",
            Endpoint::AuthLogout => "/api/auth/logout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_service_routes() {
        assert_eq!(Endpoint::CreateReference.path(), "/api/links");
        assert_eq!(Endpoint::ListReferences.path(), "/api/links");
        assert_eq!(Endpoint::Search.path(), "/api/search");
        assert_eq!(Endpoint::AuthLogin.path(), "/api/auth/login");
        assert_eq!(Endpoint::AuthSession.path(), "/api/auth/me");
        assert_eq!(Endpoint::AuthLogout.path(), "/api/auth/logout");
    }
}
