//! Sequential string substitution.

use std::borrow::Cow;

use crate::model::ModificationMap;

/// Replace every occurrence of each map key in `text`, in map order.
///
/// Replacements cascade: a later key is searched for in the output of the
/// earlier ones, so `{"a": "b", "b": "c"}` turns `"a"` into `"c"`. Returns
/// the input unchanged (borrowed) when no key occurs.
pub fn apply_modifications<'t>(text: &'t str, map: &ModificationMap) -> Cow<'t, str> {
    let mut result = Cow::Borrowed(text);
    for (original, replacement) in map.iter() {
        if result.contains(original) {
            result = Cow::Owned(result.replace(original, replacement));
        }
    }
    result
}
