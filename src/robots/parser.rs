use robotstxt::DefaultMatcher;

/// Allow/deny predicate for one user-agent against one robots.txt
///
/// Wraps the `robotstxt` matcher, which implements the standard group
/// selection (exact agent match preferred over `*`) and longest-prefix
/// directive matching with ties resolving to Allow. An empty content means
/// everything is allowed.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    content: String,
    user_agent: String,
}

impl RobotsPolicy {
    /// Builds a policy from raw robots.txt content
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        Self {
            content: content.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// A permissive policy; used whenever robots.txt cannot be loaded
    pub fn allow_all(user_agent: &str) -> Self {
        Self::from_content("", user_agent)
    }

    /// Whether the given URL (or path) may be fetched
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        // The matcher is stateful, so build one per check
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, &self.user_agent, url)
    }
}
