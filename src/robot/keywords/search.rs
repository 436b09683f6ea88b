//! Keyword searcher
//!
//!     Resolves a keyword usage against known definitions:
//!
//!         1. Fast path: when exactly one definition matches the unified usage as a whole,
//!            it is the answer and no candidates are generated.
//!         2. Candidates: the usage, with Gherkin prefixes stripped and dotted qualifiers
//!            dropped, repeated until no new name appears. Candidates are tried longest first.
//!         3. Matching: a candidate matches a definition by its own name, or as
//!            `qualifier.name` where the qualifier is the definition's source. The first
//!            candidate with any match decides; matches by own name win over qualified ones.
//!
//!     The searcher only reads its index, so one instance can serve many threads.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

use super::embedded::EmbeddedKeywordName;
use super::{unify, KeywordEntity};

static GHERKIN_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(given|when|then|and|but)\s+(\S.*)$").unwrap());

/// Every name `usage` may refer to, longest first.
pub fn candidate_names(usage: &str) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    let mut pending = vec![usage.trim().to_string()];
    while let Some(name) = pending.pop() {
        if name.is_empty() || !found.insert(name.clone()) {
            continue;
        }
        if let Some(captures) = GHERKIN_PREFIX.captures(&name) {
            pending.push(captures[2].to_string());
        }
        for (dot, _) in name.match_indices('.') {
            pending.push(name[dot + 1..].to_string());
        }
    }
    let mut candidates: Vec<String> = found.into_iter().collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    candidates
}

/// Definitions matching one usage, grouped by source.
#[derive(Debug, Serialize)]
pub struct KeywordMatches<'a, K> {
    pub usage: String,
    /// Candidate name that produced the matches.
    pub candidate: Option<String>,
    pub fast_path: bool,
    pub by_source: BTreeMap<String, Vec<&'a K>>,
}

impl<'a, K> KeywordMatches<'a, K> {
    fn empty(usage: &str) -> Self {
        Self {
            usage: usage.to_string(),
            candidate: None,
            fast_path: false,
            by_source: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }

    pub fn all(&self) -> impl Iterator<Item = &'a K> + '_ {
        self.by_source.values().flatten().copied()
    }

    /// The single match, if the usage is unambiguous.
    pub fn unique(&self) -> Option<&'a K> {
        match self.len() {
            1 => self.all().next(),
            _ => None,
        }
    }
}

struct IndexedKeyword<'a, K> {
    entity: &'a K,
    source: String,
    embedded: Option<EmbeddedKeywordName>,
}

/// Read-only index over known keyword definitions.
pub struct KeywordSearcher<'a, K> {
    keywords: Vec<IndexedKeyword<'a, K>>,
    by_name: HashMap<String, Vec<usize>>,
    embedded: Vec<usize>,
}

impl<'a, K: KeywordEntity> KeywordSearcher<'a, K> {
    pub fn new(known: &'a [K]) -> Self {
        let mut searcher = Self {
            keywords: Vec::with_capacity(known.len()),
            by_name: HashMap::new(),
            embedded: Vec::new(),
        };
        for (index, entity) in known.iter().enumerate() {
            let embedded = EmbeddedKeywordName::parse(entity.name());
            if embedded.is_some() {
                searcher.embedded.push(index);
            } else {
                searcher.by_name.entry(unify(entity.name())).or_default().push(index);
            }
            searcher.keywords.push(IndexedKeyword {
                entity,
                source: unify(entity.source()),
                embedded,
            });
        }
        searcher
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn find(&self, usage: &str) -> KeywordMatches<'a, K> {
        let mut result = KeywordMatches::empty(usage);
        let direct = self.matching(usage);
        if direct.len() == 1 {
            trace!(usage, "keyword resolved on the fast path");
            result.fast_path = true;
            result.candidate = Some(usage.to_string());
            self.collect(&mut result, &direct);
            return result;
        }
        for candidate in candidate_names(usage) {
            let plain = self.matching(&candidate);
            let found = if plain.is_empty() {
                self.qualified_matching(&candidate)
            } else {
                plain
            };
            if !found.is_empty() {
                trace!(usage, candidate = candidate.as_str(), matches = found.len(), "keyword resolved");
                result.candidate = Some(candidate);
                self.collect(&mut result, &found);
                break;
            }
        }
        result
    }

    /// Definitions whose own name matches `name`.
    fn matching(&self, name: &str) -> Vec<usize> {
        let mut found = self.by_name.get(&unify(name)).cloned().unwrap_or_default();
        found.extend(self.embedded.iter().copied().filter(|i| {
            self.keywords[*i]
                .embedded
                .as_ref()
                .is_some_and(|embedded| embedded.matches(name))
        }));
        found
    }

    /// Definitions matching `name` read as `qualifier.keyword`, at every dot.
    fn qualified_matching(&self, name: &str) -> Vec<usize> {
        let mut found: Vec<usize> = Vec::new();
        for (dot, _) in name.match_indices('.') {
            let qualifier = unify(&name[..dot]);
            for index in self.matching(&name[dot + 1..]) {
                if self.keywords[index].source == qualifier && !found.contains(&index) {
                    found.push(index);
                }
            }
        }
        found
    }

    fn collect(&self, result: &mut KeywordMatches<'a, K>, indices: &[usize]) {
        for index in indices {
            let entity = self.keywords[*index].entity;
            result
                .by_source
                .entry(entity.source().to_string())
                .or_default()
                .push(entity);
        }
    }
}

/// One-shot search over `known`.
pub fn find_keywords<'a, K: KeywordEntity>(known: &'a [K], usage: &str) -> KeywordMatches<'a, K> {
    KeywordSearcher::new(known).find(usage)
}
