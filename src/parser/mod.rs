//! PDF page extraction module.

mod extractor;
mod font;
mod layout;
mod options;
mod state;

pub use extractor::SourceDocument;
pub use options::{ErrorMode, ExtractOptions};

use lopdf::{Document as LopdfDocument, Object};

/// Reference chains longer than this are treated as unresolvable.
const MAX_REFERENCE_DEPTH: usize = 16;

/// Follow indirect references until a direct object is reached.
///
/// Dangling references resolve to themselves.
pub(crate) fn resolve_object<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}
