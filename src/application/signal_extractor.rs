// Selects datasources of one equipment by name + unit patterns
use crate::application::classifier::{pattern_set, MatchMode, RuleSet};
use crate::domain::signal::DatasourceDescriptor;

/// A descriptor matches when any name pattern and any unit pattern
/// cover its name and unit entirely.
#[derive(Debug, Clone)]
pub struct SignalPattern {
    names: RuleSet<()>,
    units: RuleSet<()>,
}

impl SignalPattern {
    pub fn compile(name_patterns: &[&str], unit_patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            names: pattern_set(MatchMode::Full, name_patterns)?,
            units: pattern_set(MatchMode::Full, unit_patterns)?,
        })
    }

    pub fn matches(&self, descriptor: &DatasourceDescriptor) -> bool {
        self.names.any_match(&descriptor.name) && self.units.any_match(&descriptor.unit)
    }
}

/// Every matching descriptor, in response order.
pub fn extract<'a>(
    descriptors: &'a [DatasourceDescriptor],
    pattern: &SignalPattern,
) -> Vec<&'a DatasourceDescriptor> {
    descriptors.iter().filter(|d| pattern.matches(d)).collect()
}

/// First match of `extract`, warning about the alternatives thrown away.
pub fn extract_first<'a>(
    descriptors: &'a [DatasourceDescriptor],
    pattern: &SignalPattern,
    context: &str,
) -> Option<&'a DatasourceDescriptor> {
    let matches = extract(descriptors, pattern);
    if matches.len() > 1 {
        let discarded: Vec<&str> = matches[1..].iter().map(|d| d.name.as_str()).collect();
        tracing::warn!(
            "More than one datasource matched for {}, using the first one: {} (discarded: {:?})",
            context,
            matches[0].name,
            discarded
        );
    }
    matches.first().copied()
}
