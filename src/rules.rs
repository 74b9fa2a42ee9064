//! Rule sentences: the text surface for building grammars.
//!
//! A sentence has the shape `Pre -> S1 S2 @Callback$key=value&key2=value2`
//! with `->`, `|` or `:` as the separator. The trailing `@Name` picks a
//! previously registered semantic callback; `$`-attributes are free-form
//! key/value pairs, with `priority` read by the conflict policy.

use crate::error::{ParserError, Result, SemanticError};
use crate::grammar::{Grammar, PRIORITY_ATTR, Production, SemanticCallback, none_callback};
use crate::symbol::Symbol;
use crate::unit::ParseUnit;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Collects rule sentences and named callbacks into a [`Grammar`].
pub struct RuleSet<V> {
    callbacks: HashMap<String, SemanticCallback<V>>,
    grammar: Grammar<V>,
}

impl<V> RuleSet<V> {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            grammar: Grammar::new(),
        }
    }

    /// Registers a semantic callback under `name`, for `@name` references
    /// in later sentences.
    pub fn register<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&[ParseUnit<V>]) -> std::result::Result<Option<V>, SemanticError>
            + Send
            + Sync
            + 'static,
    {
        self.callbacks.insert(name.to_string(), Arc::new(callback));
    }

    pub fn add_rule(&mut self, sentence: &str) -> Result<()> {
        self.add_rule_with_priority(sentence, 0)
    }

    pub fn add_rules(&mut self, sentences: &[&str]) -> Result<()> {
        for sentence in sentences {
            self.add_rule(sentence)?;
        }
        Ok(())
    }

    /// Parses one sentence. `priority` fills in the attribute when the
    /// sentence does not set `$priority` itself.
    pub fn add_rule_with_priority(&mut self, sentence: &str, priority: u32) -> Result<()> {
        let words: Vec<&str> = sentence.split(' ').filter(|word| !word.is_empty()).collect();
        if words.len() < 3 || !matches!(words[1], "->" | "|" | ":") {
            return Err(ParserError::Sentence(sentence.to_string()));
        }

        let mut last = words.len();
        let mut semantic = none_callback();
        let mut attrs: IndexMap<String, String> = IndexMap::new();
        if let Some(tail) = words[words.len() - 1].strip_prefix('@') {
            let (name, attr_text) = match tail.split_once('$') {
                Some((name, text)) => (name, Some(text)),
                None => (tail, None),
            };
            semantic = self
                .callbacks
                .get(name)
                .cloned()
                .ok_or_else(|| ParserError::UnknownCallback(name.to_string()))?;
            if let Some(text) = attr_text {
                for pair in text.split('&') {
                    match pair.split_once('=') {
                        Some((key, value)) => attrs.insert(key.to_string(), value.to_string()),
                        None => attrs.insert(pair.to_string(), String::new()),
                    };
                }
            }
            last -= 1;
        }

        let rhs: Vec<Symbol> = words[2..last].iter().map(|word| Symbol::new(word)).collect();
        if rhs.is_empty() {
            return Err(ParserError::Sentence(sentence.to_string()));
        }
        attrs
            .entry(PRIORITY_ATTR.to_string())
            .or_insert_with(|| priority.to_string());
        self.grammar
            .add(Production::new(Symbol::new(words[0]), rhs, semantic, attrs))
    }

    pub fn grammar(&self) -> &Grammar<V> {
        &self.grammar
    }

    pub fn into_grammar(self) -> Grammar<V> {
        self.grammar
    }
}

impl<V> Default for RuleSet<V> {
    fn default() -> Self {
        Self::new()
    }
}
