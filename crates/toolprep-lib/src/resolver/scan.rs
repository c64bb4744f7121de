//! Line-oriented scanning of vendor download pages.
//!
//! A page is folded line by line into a [`ResolverState`]. A section rule
//! decides whether the current line belongs to the download section of the
//! page, and only lines inside it are offered to the extraction patterns.

use crate::error::ToolPrepError;
use regex::Regex;

/// Transient state of one page-parse pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverState {
    pub in_download_section: bool,
    pub scraped_url: Option<String>,
    pub scraped_checksum_url: Option<String>,
    pub scraped_checksum_value: Option<String>,
}

/// Which candidate wins when a page carries several matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    #[default]
    First,
    /// For vendors listing their newest release last.
    Last,
}

impl MatchPolicy {
    fn pick(self, current: Option<String>, candidate: Option<String>) -> Option<String> {
        match (self, candidate) {
            (_, None) => current,
            (MatchPolicy::First, Some(candidate)) => current.or(Some(candidate)),
            (MatchPolicy::Last, Some(candidate)) => Some(candidate),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SectionRule {
    /// Every line is part of the download section.
    Always,
    /// A line is in the section when it contains all of `require` and none of `reject`.
    PerLine {
        require: Vec<String>,
        reject: Vec<String>,
    },
    /// The section opens on a line containing `start` and closes after a line containing `end`.
    Sticky { start: String, end: Option<String> },
}

impl SectionRule {
    pub fn per_line<S: Into<String>>(require: impl IntoIterator<Item = S>) -> Self {
        Self::PerLine {
            require: require.into_iter().map(Into::into).collect(),
            reject: Vec::new(),
        }
    }

    pub fn sticky(start: impl Into<String>, end: Option<&str>) -> Self {
        Self::Sticky {
            start: start.into(),
            end: end.map(str::to_string),
        }
    }

    pub fn rejecting<S: Into<String>>(self, markers: impl IntoIterator<Item = S>) -> Self {
        match self {
            Self::PerLine { require, mut reject } => {
                reject.extend(markers.into_iter().map(Into::into));
                Self::PerLine { require, reject }
            }
            other => other,
        }
    }

    fn enters(&self, in_section: bool, line: &str) -> bool {
        match self {
            Self::Always => true,
            Self::PerLine { require, reject } => {
                require.iter().all(|marker| line.contains(marker.as_str()))
                    && !reject.iter().any(|marker| line.contains(marker.as_str()))
            }
            Self::Sticky { start, .. } => in_section || line.contains(start.as_str()),
        }
    }

    fn leaves(&self, line: &str) -> bool {
        match self {
            Self::Sticky { end: Some(end), .. } => line.contains(end.as_str()),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LineScanner {
    section: SectionRule,
    url_pattern: Regex,
    checksum_url_pattern: Option<Regex>,
    checksum_pattern: Option<Regex>,
    policy: MatchPolicy,
}

/// Compiles a vendor pattern.
pub fn pattern(source: &str) -> Result<Regex, ToolPrepError> {
    Regex::new(source).map_err(|e| eyre::eyre!("Invalid scan pattern {source:?}: {e}").into())
}

fn capture(pattern: &Regex, line: &str) -> Option<String> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

impl LineScanner {
    pub fn new(section: SectionRule, url_pattern: Regex) -> Self {
        Self {
            section,
            url_pattern,
            checksum_url_pattern: None,
            checksum_pattern: None,
            policy: MatchPolicy::First,
        }
    }

    pub fn with_checksum_url_pattern(mut self, pattern: Regex) -> Self {
        self.checksum_url_pattern = Some(pattern);
        self
    }

    pub fn with_checksum_pattern(mut self, pattern: Regex) -> Self {
        self.checksum_pattern = Some(pattern);
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn step(&self, state: ResolverState, line: &str) -> ResolverState {
        let in_section = self.section.enters(state.in_download_section, line);
        if !in_section {
            return ResolverState {
                in_download_section: false,
                ..state
            };
        }

        let extract = |pattern: &Option<Regex>| pattern.as_ref().and_then(|p| capture(p, line));
        ResolverState {
            in_download_section: !self.section.leaves(line),
            scraped_url: self
                .policy
                .pick(state.scraped_url, capture(&self.url_pattern, line)),
            scraped_checksum_url: self
                .policy
                .pick(state.scraped_checksum_url, extract(&self.checksum_url_pattern)),
            scraped_checksum_value: self
                .policy
                .pick(state.scraped_checksum_value, extract(&self.checksum_pattern)),
        }
    }

    pub fn scan(&self, page: &str) -> ResolverState {
        page.lines()
            .fold(ResolverState::default(), |state, line| self.step(state, line))
    }

    /// Scans `page` and fails when no download link was found in it.
    pub fn scan_for_url(&self, page_url: &str, page: &str) -> Result<(String, ResolverState), ToolPrepError> {
        let mut state = self.scan(page);
        match state.scraped_url.take() {
            Some(url) if !url.is_empty() => Ok((url, state)),
            _ => Err(ToolPrepError::page_syntax(page_url, "no download link found")),
        }
    }
}
