//! Containment resolution: which registered target owns an element.

use crate::host::{Element, FocusHost};
use crate::registry::{TargetId, TargetRegistry};

/// Resolve `element` to the innermost registered target containing it.
///
/// A target contains an element when its handle is the element or an
/// ancestor of it. With nested targets, the candidate that lies inside every
/// other candidate wins, independent of registration order. Cost is one
/// containment query per registered target plus one per candidate.
pub fn resolve<E, H>(registry: &TargetRegistry<E>, host: &H, element: &E) -> Option<TargetId>
where
    E: Element,
    H: FocusHost<E> + ?Sized,
{
    let mut best: Option<(TargetId, &E)> = None;
    for (id, target) in registry.iter() {
        if target.handle != *element && !host.contains(&target.handle, element) {
            continue;
        }
        best = match best {
            Some((_, current)) if !host.contains(current, &target.handle) => best,
            _ => Some((id, &target.handle)),
        };
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::FocusKey;
    use std::collections::HashMap;

    /// Parent links: child -> parent.
    struct Tree(HashMap<u32, u32>);

    impl FocusHost<u32> for Tree {
        fn contains(&self, ancestor: &u32, node: &u32) -> bool {
            let mut cursor = Some(*node);
            while let Some(current) = cursor {
                if current == *ancestor {
                    return true;
                }
                cursor = self.0.get(&current).copied();
            }
            false
        }

        fn focus(&self, _element: &u32) {}
    }

    // 1 ─┬─ 2 ── 3 ── 4
    //    └─ 5
    fn tree() -> Tree {
        Tree(HashMap::from([(2, 1), (3, 2), (4, 3), (5, 1)]))
    }

    #[test]
    fn test_exact_and_descendant_match() {
        let mut registry = TargetRegistry::new();
        let a = registry.register(2, FocusKey::from("a")).expect("fresh");
        let b = registry.register(5, FocusKey::from("b")).expect("fresh");
        let host = tree();

        assert_eq!(resolve(&registry, &host, &2), Some(a));
        assert_eq!(resolve(&registry, &host, &4), Some(a));
        assert_eq!(resolve(&registry, &host, &5), Some(b));
        assert_eq!(resolve(&registry, &host, &1), None);
    }

    #[test]
    fn test_innermost_wins_regardless_of_order() {
        let host = tree();

        let mut outer_first = TargetRegistry::new();
        outer_first.register(2, FocusKey::from("outer")).expect("fresh");
        let inner = outer_first.register(3, FocusKey::from("inner")).expect("fresh");
        assert_eq!(resolve(&outer_first, &host, &4), Some(inner));

        let mut inner_first = TargetRegistry::new();
        let inner = inner_first.register(3, FocusKey::from("inner")).expect("fresh");
        inner_first.register(2, FocusKey::from("outer")).expect("fresh");
        inner_first.register(1, FocusKey::from("root")).expect("fresh");
        assert_eq!(resolve(&inner_first, &host, &4), Some(inner));
    }

    #[test]
    fn test_empty_registry() {
        let registry = TargetRegistry::<u32>::new();
        assert_eq!(resolve(&registry, &tree(), &4), None);
    }
}
