//! Structural checks on a finished document.
//!
//! Kept apart from input validation: a failure here means the engine built
//! a broken document, not that the client sent a bad request.

use crate::error::UpdateError;
use crate::model::PackageDocument;

/// A document must list at least one maintainer.
///
/// # Errors
/// Returns [`UpdateError::Integrity`] carrying the document as JSON.
pub fn check_maintainers(doc: &PackageDocument) -> Result<(), UpdateError> {
    if doc.has_maintainers() {
        return Ok(());
    }
    Err(UpdateError::Integrity {
        document: doc.to_json(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::Person;

    #[test]
    fn missing_and_empty_maintainers_fail() {
        let mut doc = PackageDocument {
            id: Some("pkg".to_owned()),
            ..PackageDocument::default()
        };
        let err = check_maintainers(&doc).err();
        assert_eq!(err.as_ref().map(UpdateError::kind), Some(ErrorKind::Integrity));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("no maintainers?\n{\"_id\":\"pkg\"}")
        );

        doc.maintainers = Some(Vec::new());
        assert!(check_maintainers(&doc).is_err());

        doc.maintainers = Some(vec![Person::named("alice")]);
        assert!(check_maintainers(&doc).is_ok());
    }
}
