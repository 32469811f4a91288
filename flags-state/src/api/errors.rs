use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlagsError {
    #[error("duplicate entry name: {0}")]
    DuplicateEntryName(String),
    #[error("entry with empty internal name")]
    EmptyEntryName,
    // The one error escalated out of switch generation: a feature or trial
    // name the feature-list parser could not read back without ambiguity.
    #[error("feature name '{name}' on entry '{entry}' contains reserved characters")]
    FeatureNameEncoding { entry: String, name: String },
    #[error("unknown entry: {0}")]
    UnknownEntry(String),
    #[error("failed to parse flag metadata: {0}")]
    MetadataParsing(String),
}
