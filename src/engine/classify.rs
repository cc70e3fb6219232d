use std::borrow::Cow;

/// What a matching keyword says about an employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Permanently remote; no return-to-office timeline at all.
    RemoteFirst,
    /// Went straight from WFH to full RTO.
    SkipHybrid,
}

/// Which text fields a keyword is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    HybridOrNotes,
    HybridOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub keyword: Cow<'static, str>,
    pub effect: Effect,
    pub scope: Scope,
}

const fn rule(keyword: &'static str, effect: Effect, scope: Scope) -> KeywordRule {
    KeywordRule {
        keyword: Cow::Borrowed(keyword),
        effect,
        scope,
    }
}

/// Built-in keywords. Matching is a case-insensitive substring test.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    rule("remote-first", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("digital-first", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("digital by default", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("team anywhere", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("live and work anywhere", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("went remote-first", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("went digital-first", Effect::RemoteFirst, Scope::HybridOrNotes),
    rule("skipped", Effect::SkipHybrid, Scope::HybridOnly),
    rule("n/a", Effect::SkipHybrid, Scope::HybridOnly),
];

/// Keyword table lookup over an employer's hybrid and notes fields.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            rules: KEYWORD_RULES.to_vec(),
        }
    }
}

impl Classifier {
    /// Built-in table plus extra keywords (stored lower-cased).
    pub fn with_extra(remote_first: &[String], skip_hybrid: &[String]) -> Self {
        let mut classifier = Classifier::default();
        for kw in remote_first {
            classifier.push(kw, Effect::RemoteFirst, Scope::HybridOrNotes);
        }
        for kw in skip_hybrid {
            classifier.push(kw, Effect::SkipHybrid, Scope::HybridOnly);
        }
        classifier
    }

    fn push(&mut self, keyword: &str, effect: Effect, scope: Scope) {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return;
        }
        self.rules.push(KeywordRule {
            keyword: Cow::Owned(keyword),
            effect,
            scope,
        });
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn is_remote_first(&self, hybrid_text: Option<&str>, notes_text: Option<&str>) -> bool {
        self.matches(Effect::RemoteFirst, hybrid_text, notes_text)
    }

    pub fn is_skip_hybrid(&self, hybrid_text: Option<&str>) -> bool {
        self.matches(Effect::SkipHybrid, hybrid_text, None)
    }

    fn matches(&self, effect: Effect, hybrid_text: Option<&str>, notes_text: Option<&str>) -> bool {
        let hybrid = hybrid_text.unwrap_or_default().to_lowercase();
        let notes = notes_text.unwrap_or_default().to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.effect == effect)
            .any(|r| match r.scope {
                Scope::HybridOnly => hybrid.contains(&*r.keyword),
                Scope::HybridOrNotes => {
                    hybrid.contains(&*r.keyword) || notes.contains(&*r.keyword)
                }
            })
    }
}
