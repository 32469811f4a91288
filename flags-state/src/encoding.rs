use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::api::errors::FlagsError;
use crate::entries::entry_models::FeatureParam;

/// Characters with a delimiting role in the feature-list value format:
/// `,` separates features, `<` introduces a trial name, `:` introduces the
/// parameter list and `/` separates its keys and values. `*` and `%` are
/// reserved by the consuming parser.
pub const RESERVED: &[char] = &[',', '<', ':', '/', '*', '%'];

const PARAM_DATA: &AsciiSet = &CONTROLS
    .add(b',')
    .add(b'<')
    .add(b':')
    .add(b'/')
    .add(b'*')
    .add(b'%');

/// Feature and trial names travel verbatim, so a reserved character (or
/// surrounding whitespace, which the comma-join would preserve) makes the
/// name unreadable to the consuming parser. Rejected, never substituted.
pub fn validate_feature_name(entry: &str, name: &str) -> Result<(), FlagsError> {
    if name.is_empty() || name.trim() != name || name.contains(RESERVED) {
        return Err(FlagsError::FeatureNameEncoding {
            entry: entry.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Parameter keys and values are unescaped by the consuming parser, so
/// reserved characters in them are percent-encoded rather than rejected.
pub fn escape_param_data(text: &str) -> String {
    utf8_percent_encode(text, PARAM_DATA).to_string()
}

/// Encodes one enabled feature as `Feature[<Trial][:k1/v1/k2/v2]`.
pub fn encode_feature(
    entry: &str,
    feature: &str,
    trial: Option<&str>,
    params: &[FeatureParam],
) -> Result<String, FlagsError> {
    validate_feature_name(entry, feature)?;
    let mut encoded = feature.to_string();
    if let Some(trial) = trial {
        validate_feature_name(entry, trial)?;
        encoded.push('<');
        encoded.push_str(trial);
    }
    if !params.is_empty() {
        encoded.push(':');
        let parts: Vec<String> = params
            .iter()
            .flat_map(|param| [escape_param_data(&param.name), escape_param_data(&param.value)])
            .collect();
        encoded.push_str(&parts.join("/"));
    }
    Ok(encoded)
}

/// Comma-joins already-encoded feature values for `--enable-features` /
/// `--disable-features`.
pub fn join_features<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
