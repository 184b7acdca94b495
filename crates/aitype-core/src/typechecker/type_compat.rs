use crate::types::Type;
use tracing::trace;

/// Structural compatibility between an expected and an actual type
pub struct TypeCompatibility;

impl TypeCompatibility {
    /// Every reason a value of type `actual` cannot be used where `expected`
    /// is required. An empty result means compatible.
    ///
    /// Mismatches are accumulated rather than short-circuited, so one call can
    /// report both a wrong arity and a wrong element type.
    pub fn compare(expected: &Type, actual: &Type) -> Vec<String> {
        let mut mismatches = Vec::new();
        Self::compare_into(expected, actual, &mut mismatches);
        mismatches
    }

    pub fn is_assignable(expected: &Type, actual: &Type) -> bool {
        Self::compare(expected, actual).is_empty()
    }

    fn compare_into(expected: &Type, actual: &Type, out: &mut Vec<String>) {
        // `any` on either side dominates every other rule
        if expected.is_any() || actual.is_any() {
            return;
        }

        match (expected, actual) {
            (Type::Function(expected_fn), Type::Function(actual_fn)) => {
                Self::compare_into(&expected_fn.return_type, &actual_fn.return_type, out);
                Self::compare_into(&expected_fn.args, &actual_fn.args, out);
            }

            (Type::Union(members), Type::Union(actual_members)) => {
                // Cardinality is checked before containment
                if members.len() < actual_members.len() {
                    Self::mismatch(
                        out,
                        format!("Union '{}' has more members than '{}'", actual, expected),
                    );
                    return;
                }
                for member in actual_members {
                    if !Self::union_contains(members, member) {
                        Self::mismatch(out, Self::not_contained(member, expected));
                    }
                }
            }

            (Type::Union(members), _) => {
                if !Self::union_contains(members, actual) {
                    Self::mismatch(out, Self::not_contained(actual, expected));
                }
            }

            (Type::Tuple(expected_items), Type::Tuple(actual_items)) => {
                if expected_items.len() != actual_items.len() {
                    Self::mismatch(
                        out,
                        format!(
                            "Expected {} elements but got {}",
                            expected_items.len(),
                            actual_items.len()
                        ),
                    );
                }
                for (e, a) in expected_items.iter().zip(actual_items) {
                    Self::compare_into(e, a, out);
                }
            }

            (Type::Primitive(e), Type::Primitive(a)) if e == a => {}

            _ => Self::mismatch(
                out,
                format!("Type '{}' is not assignable to type '{}'", actual, expected),
            ),
        }
    }

    fn union_contains(members: &[Type], actual: &Type) -> bool {
        members.iter().any(|m| Self::is_assignable(m, actual))
    }

    fn not_contained(actual: &Type, union: &Type) -> String {
        format!("Type '{}' is not contained in '{}'", actual, union)
    }

    fn mismatch(out: &mut Vec<String>, message: String) {
        trace!("type mismatch: {}", message);
        out.push(message);
    }
}
