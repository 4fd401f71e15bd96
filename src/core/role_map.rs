use std::collections::HashSet;

/// A role and the skill keywords associated with it
#[derive(Debug, Clone)]
pub struct RoleEntry {
    pub role: String,
    pub keywords: HashSet<String>,
}

/// Immutable role -> skill keyword table used by the fallback scorer.
///
/// Keywords are stored lowercase. Declaration order is kept because it
/// breaks ties between roles with equal overlap.
#[derive(Debug, Clone)]
pub struct RoleSkillMap {
    entries: Vec<RoleEntry>,
}

const BUILTIN_ROLES: &[(&str, &[&str])] = &[
    (
        "Full Stack Developer",
        &["javascript", "react", "node.js", "python", "java", "html/css", "express", "django", "flask"],
    ),
    (
        "Frontend Developer",
        &["javascript", "react", "vue.js", "angular", "html/css", "typescript", "next.js"],
    ),
    (
        "Backend Developer",
        &["python", "java", "node.js", "php", "go", "django", "flask", "spring boot", "express"],
    ),
    (
        "Mobile Developer",
        &["react native", "flutter", "kotlin", "swift", "dart", "java"],
    ),
    (
        "Data Scientist",
        &["python", "pandas", "numpy", "tensorflow", "scikit-learn", "pytorch"],
    ),
    (
        "DevOps Engineer",
        &["docker", "kubernetes", "aws", "google cloud", "microsoft azure", "terraform"],
    ),
    (
        "Database Developer",
        &["sql", "mysql", "postgresql", "mongodb", "oracle", "redis"],
    ),
    (
        "Cloud Engineer",
        &["aws", "google cloud", "microsoft azure", "docker", "kubernetes"],
    ),
    (
        "Web Developer",
        &["javascript", "html/css", "php", "python", "react", "vue.js"],
    ),
];

impl RoleSkillMap {
    /// Build a map from `(role, keywords)` pairs, lowercasing keywords
    pub fn new<R, K, I>(roles: I) -> Self
    where
        R: Into<String>,
        K: AsRef<str>,
        I: IntoIterator<Item = (R, Vec<K>)>,
    {
        let entries = roles
            .into_iter()
            .map(|(role, keywords)| RoleEntry {
                role: role.into(),
                keywords: keywords
                    .iter()
                    .map(|k| k.as_ref().trim().to_lowercase())
                    .collect(),
            })
            .collect();

        Self { entries }
    }

    /// The built-in career table
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ROLES
                .iter()
                .map(|(role, keywords)| (*role, keywords.to_vec())),
        )
    }

    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, role: &str) -> Option<&RoleEntry> {
        self.entries.iter().find(|entry| entry.role == role)
    }
}

impl Default for RoleSkillMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keeps_declaration_order() {
        let map = RoleSkillMap::builtin();
        let roles: Vec<&str> = map.entries().iter().map(|e| e.role.as_str()).collect();
        assert_eq!(
            roles,
            vec![
                "Full Stack Developer",
                "Frontend Developer",
                "Backend Developer",
                "Mobile Developer",
                "Data Scientist",
                "DevOps Engineer",
                "Database Developer",
                "Cloud Engineer",
                "Web Developer",
            ]
        );
    }

    #[test]
    fn test_builtin_keeps_compound_keywords() {
        let map = RoleSkillMap::builtin();
        assert!(map.get("Frontend Developer").unwrap().keywords.contains("html/css"));
        assert!(map.get("Cloud Engineer").unwrap().keywords.contains("microsoft azure"));
        assert!(map.get("Backend Developer").unwrap().keywords.contains("node.js"));
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let map = RoleSkillMap::new(vec![("Tester", vec!["Selenium", " PyTest "])]);
        let entry = map.get("Tester").unwrap();
        assert!(entry.keywords.contains("selenium"));
        assert!(entry.keywords.contains("pytest"));
    }
}
