//! Target resolution: picking the canonical target of a reference.
//!
//! A reference occurrence can point at several candidates at once: the
//! declarations and the definition of an overloaded function, a class and
//! its constructor, a macro and whatever its expansion names. The front-end
//! reports them all with a [`TargetWeight`]; [`best_target`] picks one.
//!
//! The choice is a pure function of the candidate set:
//!
//! 1. highest [`target_rank`] of the candidate's category,
//! 2. then a definition over a declaration,
//! 3. then the lowest [`Location`].
//!
//! The last key makes the result independent of the order candidates are
//! enumerated in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::symbols::{SymbolKind, TargetWeight};
use crate::base::Location;

/// Candidate targets of one reference occurrence.
pub type CandidateSet = BTreeMap<Location, TargetWeight>;

/// Fixed priority of a category when choosing among candidates.
///
/// | category | rank |
/// |---|---|
/// | macro definition | 4 |
/// | field, variable, function, method | 3 |
/// | anything else | 2 |
/// | constructor | 1 |
/// | class, struct, class template | 0 |
///
/// A constructor outranks the class it builds, but not a real member:
/// the synthesized constructor of a class template must lose against a
/// field or function named at the same spot. A macro definition wins
/// over whatever its expansion refers to.
pub fn target_rank(kind: SymbolKind) -> i32 {
    match kind.normalized() {
        SymbolKind::MacroDefinition => 4,
        SymbolKind::FieldDecl
        | SymbolKind::VarDecl
        | SymbolKind::FunctionDecl
        | SymbolKind::CxxMethod => 3,
        SymbolKind::Constructor => 1,
        SymbolKind::ClassDecl | SymbolKind::StructDecl | SymbolKind::ClassTemplate => 0,
        _ => 2,
    }
}

/// Order two candidates; `Greater` means `a` is the better target.
fn compare_candidates(a: (&Location, &TargetWeight), b: (&Location, &TargetWeight)) -> Ordering {
    let (a_loc, a_weight) = a;
    let (b_loc, b_weight) = b;
    a_weight
        .rank()
        .cmp(&b_weight.rank())
        .then(a_weight.definition.cmp(&b_weight.definition))
        .then_with(|| b_loc.cmp(a_loc))
}

/// Pick the canonical target among `candidates`.
///
/// Returns [`Location::NULL`] when there is no candidate. A candidate at
/// the null location competes like any other, so if it ranks best the
/// result is null. The store never holds such candidates.
pub fn best_target<'a, I>(candidates: I) -> Location
where
    I: IntoIterator<Item = (&'a Location, &'a TargetWeight)>,
{
    candidates
        .into_iter()
        .max_by(|&a, &b| compare_candidates(a, b))
        .map_or(Location::NULL, |(loc, _)| *loc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use rstest::rstest;
    use std::collections::HashMap;

    fn loc(file: u32, line: u32) -> Location {
        Location::new(FileId::new(file), line, 0)
    }

    fn decl(kind: SymbolKind) -> TargetWeight {
        TargetWeight::declaration(kind)
    }

    fn def(kind: SymbolKind) -> TargetWeight {
        TargetWeight::definition(kind)
    }

    #[rstest]
    #[case(SymbolKind::MacroDefinition, 4)]
    #[case(SymbolKind::FieldDecl, 3)]
    #[case(SymbolKind::VarDecl, 3)]
    #[case(SymbolKind::FunctionDecl, 3)]
    #[case(SymbolKind::CxxMethod, 3)]
    #[case(SymbolKind::Constructor, 1)]
    #[case(SymbolKind::ClassDecl, 0)]
    #[case(SymbolKind::StructDecl, 0)]
    #[case(SymbolKind::ClassTemplate, 0)]
    #[case(SymbolKind::FunctionTemplate, 2)]
    #[case(SymbolKind::Destructor, 2)]
    #[case(SymbolKind::Other(999), 2)]
    fn test_target_rank(#[case] kind: SymbolKind, #[case] rank: i32) {
        assert_eq!(target_rank(kind), rank);
    }

    #[test]
    fn test_empty_set_is_null() {
        assert_eq!(best_target(&CandidateSet::new()), Location::NULL);
    }

    #[test]
    fn test_constructor_beats_class() {
        let set = CandidateSet::from([
            (loc(1, 1), decl(SymbolKind::ClassDecl)),
            (loc(1, 2), decl(SymbolKind::Constructor)),
        ]);
        assert_eq!(best_target(&set), loc(1, 2));
    }

    #[test]
    fn test_macro_beats_function_definition() {
        let set = CandidateSet::from([
            (loc(1, 1), def(SymbolKind::MacroDefinition)),
            (loc(1, 2), def(SymbolKind::FunctionDecl)),
        ]);
        assert_eq!(best_target(&set), loc(1, 1));
    }

    #[test]
    fn test_definition_breaks_rank_tie() {
        let set = CandidateSet::from([
            (loc(1, 1), decl(SymbolKind::FunctionDecl)),
            (loc(1, 2), def(SymbolKind::FunctionDecl)),
        ]);
        assert_eq!(best_target(&set), loc(1, 2));
    }

    #[test]
    fn test_field_beats_template_constructor() {
        let set = CandidateSet::from([
            (loc(1, 1), def(SymbolKind::FunctionTemplate)),
            (loc(1, 5), decl(SymbolKind::FieldDecl)),
        ]);
        assert_eq!(best_target(&set), loc(1, 5));
    }

    #[test]
    fn test_full_tie_prefers_lowest_location() {
        let set = CandidateSet::from([
            (loc(2, 0), def(SymbolKind::CxxMethod)),
            (loc(1, 9), def(SymbolKind::CxxMethod)),
            (loc(1, 3), def(SymbolKind::FunctionDecl)),
        ]);
        assert_eq!(best_target(&set), loc(1, 3));
    }

    #[test]
    fn test_result_does_not_depend_on_container_order() {
        let entries = [
            (loc(3, 0), decl(SymbolKind::VarDecl)),
            (loc(1, 0), decl(SymbolKind::VarDecl)),
            (loc(2, 0), decl(SymbolKind::VarDecl)),
            (loc(4, 0), decl(SymbolKind::ClassDecl)),
        ];
        let ordered: CandidateSet = entries.iter().copied().collect();
        let hashed: HashMap<Location, TargetWeight> = entries.iter().copied().collect();
        let reversed: Vec<_> = entries.iter().rev().map(|(l, w)| (l, w)).collect();

        assert_eq!(best_target(&ordered), loc(1, 0));
        assert_eq!(best_target(&hashed), loc(1, 0));
        assert_eq!(best_target(reversed), loc(1, 0));
    }

    #[test]
    fn test_null_candidate_is_not_skipped() {
        let set: CandidateSet = [
            (Location::NULL, def(SymbolKind::MacroDefinition)),
            (loc(1, 0), decl(SymbolKind::ClassDecl)),
        ]
        .into_iter()
        .collect();

        assert_eq!(best_target(&set), Location::NULL);
    }
}
