use uuid::Uuid;

/// The set of entities a new name must not collide with: everything of the
/// same kind that shares an owner and a parent directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiblingScope {
    pub owner: Uuid,
    pub parent: Option<Uuid>,
}

impl SiblingScope {
    pub fn new(owner: Uuid, parent: Option<Uuid>) -> Self {
        Self { owner, parent }
    }
}

/// First of `desired`, `desired (1)`, `desired (2)`, ... for which `exists`
/// reports no collision inside `scope`.
///
/// No reservation is taken: two concurrent callers can resolve the same
/// candidate.
pub fn resolve_unique_name<F>(desired: &str, scope: &SiblingScope, mut exists: F) -> String
where
    F: FnMut(&str, &SiblingScope) -> bool,
{
    if !exists(desired, scope) {
        return desired.to_string();
    }

    let mut n: u64 = 1;
    loop {
        let candidate = format!("{} ({})", desired, n);
        if !exists(&candidate, scope) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_resolve_returns_desired_when_free() {
        let scope = SiblingScope::new(Uuid::new_v4(), None);
        let name = resolve_unique_name("Foo", &scope, |_, _| false);
        assert_eq!(name, "Foo");
    }

    #[test]
    fn test_resolve_sequence_is_gap_free() {
        let scope = SiblingScope::new(Uuid::new_v4(), None);
        let mut taken: HashSet<String> = HashSet::new();

        for expected in ["Foo", "Foo (1)", "Foo (2)", "Foo (3)"] {
            let name = resolve_unique_name("Foo", &scope, |n, _| taken.contains(n));
            assert_eq!(name, expected);
            taken.insert(name);
        }
    }

    #[test]
    fn test_resolve_fills_first_hole() {
        let scope = SiblingScope::new(Uuid::new_v4(), Some(Uuid::new_v4()));
        let taken: HashSet<&str> = ["Foo", "Foo (2)"].into_iter().collect();
        let name = resolve_unique_name("Foo", &scope, |n, _| taken.contains(n));
        assert_eq!(name, "Foo (1)");
    }

    #[test]
    fn test_resolve_passes_scope_through() {
        let owner = Uuid::new_v4();
        let parent = Some(Uuid::new_v4());
        let scope = SiblingScope::new(owner, parent);
        let name = resolve_unique_name("Notes", &scope, |n, s| {
            assert_eq!(s.owner, owner);
            assert_eq!(s.parent, parent);
            n == "Notes"
        });
        assert_eq!(name, "Notes (1)");
    }
}
