//! Fields that must never be sent on update

use serde_json::Value;

/// Ordered set of dotted paths removed from a configuration before update
///
/// Paths are kept longest-first so that a leaf is always removed before any
/// of its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    paths: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        list.extend(paths);
        list
    }

    /// Add paths, keeping the list deduplicated and longest-first
    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            if !path.is_empty() && !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
        // Stable sort keeps caller order among equal lengths.
        self.paths.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Remove every listed field from `config`, returning how many were removed
    ///
    /// Paths whose parent map is missing (or not a map) are skipped.
    pub fn apply(&self, config: &mut Value) -> usize {
        self.paths
            .iter()
            .filter(|path| remove_path(config, path))
            .count()
    }
}

fn remove_path(config: &mut Value, dotted_path: &str) -> bool {
    let (parents, leaf) = match dotted_path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, dotted_path),
    };

    let mut current = config;
    if let Some(parents) = parents {
        for part in parents.split('.') {
            match current.get_mut(part) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    match current.as_object_mut() {
        Some(map) => map.remove(leaf).is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Value {
        json!({
            "name": "mi-1",
            "compute": {
                "product": "Linux/UNIX",
                "launch_specification": { "image_id": "ami-1", "key_pair": "kp" }
            }
        })
    }

    #[test]
    fn test_sorted_longest_first() {
        let list = ExclusionList::new(["compute", "compute.launch_specification.image_id", "compute.product"]);
        assert_eq!(
            list.paths(),
            &[
                "compute.launch_specification.image_id".to_string(),
                "compute.product".to_string(),
                "compute".to_string(),
            ]
        );
    }

    #[test]
    fn test_removes_leaf() {
        let mut cfg = config();
        let removed = ExclusionList::new(["compute.product"]).apply(&mut cfg);
        assert_eq!(removed, 1);
        assert!(cfg["compute"].get("product").is_none());
        assert_eq!(cfg["compute"]["launch_specification"]["image_id"], "ami-1");
    }

    #[test]
    fn test_child_then_ancestor_does_not_fail() {
        let mut cfg = config();
        let list = ExclusionList::new(["compute", "compute.launch_specification.image_id"]);
        let removed = list.apply(&mut cfg);
        assert_eq!(removed, 2);
        assert_eq!(cfg, json!({ "name": "mi-1" }));
    }

    #[test]
    fn test_missing_paths_are_skipped() {
        let mut cfg = config();
        let list = ExclusionList::new(["strategy.life_cycle", "name.deeper", "nothing"]);
        assert_eq!(list.apply(&mut cfg), 0);
        assert_eq!(cfg, config());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let list = ExclusionList::new(["compute.product", "compute.launch_specification"]);
        let mut once = config();
        list.apply(&mut once);
        let mut twice = once.clone();
        assert_eq!(list.apply(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_deduplicates_and_ignores_empty() {
        let mut list = ExclusionList::new(["compute.product", ""]);
        list.extend(["compute.product"]);
        assert_eq!(list.len(), 1);
    }
}
