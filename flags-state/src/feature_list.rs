use crate::entries::entry_models::FeatureParam;

/// Sink for variation parameters, owned by the host's field-trial layer.
pub trait FeatureList {
    fn register_feature_with_parameters(
        &mut self,
        feature: &str,
        params: &[FeatureParam],
        trial: Option<&str>,
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRegistration {
    pub feature: String,
    pub params: Vec<FeatureParam>,
    pub trial: Option<String>,
}

/// Captures registrations in order; for tests and hosts that apply them
/// later in one batch.
#[derive(Debug, Default)]
pub struct RecordingFeatureList {
    pub registrations: Vec<FeatureRegistration>,
}

impl RecordingFeatureList {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeatureList for RecordingFeatureList {
    fn register_feature_with_parameters(
        &mut self,
        feature: &str,
        params: &[FeatureParam],
        trial: Option<&str>,
    ) {
        self.registrations.push(FeatureRegistration {
            feature: feature.to_string(),
            params: params.to_vec(),
            trial: trial.map(str::to_string),
        });
    }
}
