/// Fatal parse/build errors. Every variant names the object that caused it so
/// an operator can find the offending entry in the source document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("annotation type not recognized (expected `type: Annotation` or `@type: oa:Annotation`)")]
    UnknownAnnotationType,

    #[error("{object} has no id")]
    MissingId { object: &'static str },

    #[error("annotation {id} has no target")]
    MissingTarget { id: String },

    #[error("annotation {id} target has no id or {fallback}")]
    TargetWithoutId { id: String, fallback: &'static str },

    #[error("annotation {id} target is not a string or object")]
    InvalidTarget { id: String },

    #[error("{object} {id} is not of type {expected}")]
    WrongType {
        object: &'static str,
        id: String,
        expected: &'static str,
    },

    #[error("{object} {id} has no {field} list")]
    MissingItems {
        object: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("{object} {id} has no {field}")]
    MissingField {
        object: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("no applicable JSON-LD context found; document is not an IIIF V2 or V3 manifest")]
    UnsupportedSchema,

    #[error("failed to load external resource {locator}: {reason}")]
    Resource { locator: String, reason: String },

    #[error("external annotation container {id} points to yet another external container")]
    ExternalHopExceeded { id: String },
}
