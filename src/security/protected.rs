use std::collections::HashSet;

/// Resources a force-push may never target, whatever the flags say.
pub const DEFAULT_PROTECTED_RESOURCES: &[&str] = &["main", "master", "production", "staging"];

/// Read-only set of protected branch / environment names
///
/// Matching is exact and case-sensitive: `Main` is not `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedResourceSet {
    names: HashSet<String>,
}

impl ProtectedResourceSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, resource: &str) -> bool {
        self.names.contains(resource)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order, for display
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProtectedResourceSet {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_RESOURCES.iter().copied())
    }
}
