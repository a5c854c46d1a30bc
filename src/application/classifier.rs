// Ordered, case-insensitive pattern rules: first matching rule wins
use regex::{Regex, RegexBuilder};

/// How much of the name a rule has to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole name.
    Full,
    /// A prefix of the name.
    Prefix,
    /// Anywhere in the name.
    Anywhere,
}

#[derive(Debug, Clone)]
pub struct Rule<T> {
    regex: Regex,
    outcome: T,
}

impl<T: Clone> Rule<T> {
    pub fn new(pattern: &str, mode: MatchMode, outcome: T) -> Result<Self, regex::Error> {
        let anchored = match mode {
            MatchMode::Full => format!("^(?:{})$", pattern),
            MatchMode::Prefix => format!("^(?:{})", pattern),
            MatchMode::Anywhere => pattern.to_string(),
        };
        let regex = RegexBuilder::new(&anchored).case_insensitive(true).build()?;
        Ok(Self { regex, outcome })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    fn apply(&self, name: &str) -> Option<Classification<T>> {
        let captures = self.regex.captures(name)?;
        // Groups that did not participate or are not numeric are skipped.
        let indices = captures
            .iter()
            .skip(1)
            .flatten()
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .collect();
        Some(Classification {
            outcome: self.outcome.clone(),
            indices,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<T> {
    pub outcome: T,
    /// Numeric capture groups in pattern order (container, sub, leaf...).
    pub indices: Vec<u32>,
}

/// Immutable, priority-ordered rule list.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T: Clone> RuleSet<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    /// Build a rule set where every pattern shares one mode.
    pub fn compile(mode: MatchMode, patterns: &[(&str, T)]) -> Result<Self, regex::Error> {
        let rules = patterns
            .iter()
            .map(|(pattern, outcome)| Rule::new(pattern, mode, outcome.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn classify(&self, name: &str) -> Option<Classification<T>> {
        self.rules.iter().find_map(|rule| rule.apply(name))
    }

    pub fn any_match(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(name))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Rule set with no per-rule outcome, for plain yes/no matching.
pub fn pattern_set(mode: MatchMode, patterns: &[&str]) -> Result<RuleSet<()>, regex::Error> {
    let rules = patterns
        .iter()
        .map(|pattern| Rule::new(pattern, mode, ()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuleSet::new(rules))
}
