use std::collections::HashSet;
use std::sync::Arc;

use crate::core::role_map::RoleSkillMap;

/// Number of roles returned by the heuristic
pub const FALLBACK_LIMIT: usize = 3;

/// Returned when no role shares a keyword with the input
pub const GENERIC_RECOMMENDATIONS: [&str; 3] = [
    "Software Developer",
    "Web Developer",
    "Application Developer",
];

/// Keyword-overlap scorer used when the external model gives nothing usable.
///
/// Pure and deterministic: the same skills always produce the same list.
#[derive(Debug, Clone)]
pub struct FallbackScorer {
    roles: Arc<RoleSkillMap>,
}

impl FallbackScorer {
    pub fn new(roles: Arc<RoleSkillMap>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &RoleSkillMap {
        &self.roles
    }

    /// Rank roles by how many of their keywords appear in `skills`
    ///
    /// Roles without overlap are dropped. Ties keep declaration order.
    pub fn recommend(&self, skills: &[String]) -> Vec<String> {
        let normalized: HashSet<String> = skills
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .filter(|skill| !skill.is_empty())
            .collect();

        let mut scored: Vec<(&str, usize)> = self
            .roles
            .entries()
            .iter()
            .filter_map(|entry| {
                let overlap = entry.keywords.intersection(&normalized).count();
                (overlap > 0).then_some((entry.role.as_str(), overlap))
            })
            .collect();

        if scored.is_empty() {
            return GENERIC_RECOMMENDATIONS.iter().map(|r| r.to_string()).collect();
        }

        // sort_by is stable
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        scored
            .into_iter()
            .take(FALLBACK_LIMIT)
            .map(|(role, _)| role.to_string())
            .collect()
    }
}

impl Default for FallbackScorer {
    fn default() -> Self {
        Self::new(Arc::new(RoleSkillMap::builtin()))
    }
}
