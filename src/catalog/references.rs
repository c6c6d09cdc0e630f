use std::collections::HashMap;

/// Assigns stable 1-based numbers to a module's footnote or glossary entries
/// and records which of them the rendered body actually referenced, in order of
/// first reference.
///
/// The UI registers references while it renders rich text and then asks for the
/// referenced subset to lay out the end-of-panel lists.
pub(crate) struct ReferenceRegistry {
    numbers: HashMap<String, usize>,
    seen: Vec<String>,
}

impl ReferenceRegistry {
    pub(crate) fn new() -> Self {
        Self {
            numbers: HashMap::new(),
            seen: Vec::new(),
        }
    }

    /// Rebuild the numbering for another module: ids receive 1-based numbers in
    /// the order given and previously recorded references are forgotten.
    pub(crate) fn reset<'a>(&mut self, ids: impl Iterator<Item = &'a str>) {
        self.numbers.clear();
        self.seen.clear();
        for (idx, id) in ids.enumerate() {
            self.numbers.entry(id.to_owned()).or_insert(idx + 1);
        }
    }

    /// Record that the body referenced the given entry and return its stable
    /// number, or `0` if the id does not belong to the current module.
    pub(crate) fn register(&mut self, id: &str) -> usize {
        match self.numbers.get(id) {
            Some(number) => {
                if !self.seen.iter().any(|s| s == id) {
                    self.seen.push(id.to_owned());
                }
                *number
            }
            None => 0,
        }
    }

    /// Ids of the referenced entries, in order of first reference.
    pub(crate) fn referenced(&self) -> &[String] {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_catalog_order() {
        let mut registry = ReferenceRegistry::new();
        registry.reset(["f1", "f2", "f3"].into_iter());
        assert_eq!(registry.register("f2"), 2);
        assert_eq!(registry.register("f1"), 1);
        assert_eq!(registry.register("f3"), 3);
    }

    #[test]
    fn unknown_id_registers_as_zero() {
        let mut registry = ReferenceRegistry::new();
        registry.reset(["f1"].into_iter());
        assert_eq!(registry.register("nope"), 0);
        assert!(registry.referenced().is_empty());
    }

    #[test]
    fn referenced_keeps_first_reference_order_without_duplicates() {
        let mut registry = ReferenceRegistry::new();
        registry.reset(["f1", "f2", "f3"].into_iter());
        registry.register("f3");
        registry.register("f1");
        registry.register("f3");
        assert_eq!(registry.referenced(), ["f3".to_owned(), "f1".to_owned()]);
    }

    #[test]
    fn reset_clears_previous_module() {
        let mut registry = ReferenceRegistry::new();
        registry.reset(["f1"].into_iter());
        registry.register("f1");
        registry.reset(["g1"].into_iter());
        assert_eq!(registry.register("f1"), 0);
        assert!(registry.referenced().is_empty());
        assert_eq!(registry.register("g1"), 1);
    }
}
