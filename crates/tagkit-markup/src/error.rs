//! Error types for template markup parsing.

/// Error while parsing template markup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MarkupError {
    /// XML tokenizer error.
    #[error("markup parse error at byte {offset}: {source}")]
    Xml {
        /// Byte offset in the template where the error was detected.
        offset: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// Elements nested deeper than the parser allows.
    #[error("elements nested deeper than {limit} levels at byte {offset}")]
    TooDeep {
        /// Byte offset of the element that exceeded the limit.
        offset: usize,
        limit: usize,
    },

    /// Malformed attribute syntax.
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
