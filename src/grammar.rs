//! Grammar model: productions with semantic callbacks and attributes.

use crate::error::{ParserError, Result, SemanticError};
use crate::symbol::Symbol;
use crate::unit::ParseUnit;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Callback invoked with the popped children when a production is reduced.
/// Its return value becomes the new parse unit's `value`.
pub type SemanticCallback<V> = Arc<
    dyn Fn(&[ParseUnit<V>]) -> std::result::Result<Option<V>, SemanticError> + Send + Sync,
>;

/// The default callback: produces no value.
pub fn none_callback<V>() -> SemanticCallback<V> {
    Arc::new(|_| Ok(None))
}

/// Attribute key holding the conflict-resolution priority.
pub const PRIORITY_ATTR: &str = "priority";

/// A production rule `lhs → rhs`, with its semantic callback and free-form
/// attributes. The core reads only `priority`; other attributes are kept
/// for callers.
pub struct Production<V> {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub semantic: SemanticCallback<V>,
    pub attrs: IndexMap<String, String>,
}

impl<V> Production<V> {
    pub fn new(
        lhs: Symbol,
        rhs: Vec<Symbol>,
        semantic: SemanticCallback<V>,
        attrs: IndexMap<String, String>,
    ) -> Self {
        Self {
            lhs,
            rhs,
            semantic,
            attrs,
        }
    }

    /// A production with the default callback and no attributes.
    pub fn plain(lhs: &str, rhs: &[&str]) -> Self {
        Self::new(
            Symbol::new(lhs),
            rhs.iter().map(|name| Symbol::new(name)).collect(),
            none_callback(),
            IndexMap::new(),
        )
    }

    /// The `priority` attribute as an integer; absent or unparsable
    /// attributes count as 0.
    pub fn priority(&self) -> u32 {
        self.attrs
            .get(PRIORITY_ATTR)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }
}

impl<V> Clone for Production<V> {
    fn clone(&self) -> Self {
        Self {
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            semantic: Arc::clone(&self.semantic),
            attrs: self.attrs.clone(),
        }
    }
}

/// Productions compare by lhs and rhs identity only; callbacks and
/// attributes are excluded.
impl<V> PartialEq for Production<V> {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl<V> Eq for Production<V> {}

impl<V> Hash for Production<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lhs.hash(state);
        self.rhs.hash(state);
    }
}

impl<V> fmt::Display for Production<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

impl<V> fmt::Debug for Production<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Production")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("attrs", &self.attrs)
            .finish()
    }
}

/// A validated collection of productions. The first production's lhs is the
/// start symbol; augmentation happens inside the table builder.
pub struct Grammar<V> {
    productions: Vec<Production<V>>,
}

impl<V> Grammar<V> {
    pub fn new() -> Self {
        Self {
            productions: Vec::new(),
        }
    }

    pub fn from_productions(productions: Vec<Production<V>>) -> Result<Self> {
        let mut grammar = Self::new();
        for production in productions {
            grammar.add(production)?;
        }
        Ok(grammar)
    }

    /// Adds one production, rejecting malformed shapes: empty lhs, reserved
    /// names (user input must not be pre-augmented) and empty rhs
    /// (ε productions are outside the supported domain).
    pub fn add(&mut self, production: Production<V>) -> Result<()> {
        if production.lhs.as_str().is_empty() {
            return Err(ParserError::GrammarShape {
                production: production.to_string(),
                reason: "empty left-hand side".into(),
            });
        }
        if production.lhs.is_reserved() {
            return Err(ParserError::GrammarShape {
                production: production.to_string(),
                reason: "reserved left-hand side; grammars are augmented internally".into(),
            });
        }
        if production.rhs.is_empty() {
            return Err(ParserError::GrammarShape {
                production: production.to_string(),
                reason: "empty right-hand side (ε productions are unsupported)".into(),
            });
        }
        if let Some(symbol) = production.rhs.iter().find(|symbol| symbol.is_reserved()) {
            return Err(ParserError::GrammarShape {
                production: production.to_string(),
                reason: format!("reserved symbol {symbol} in right-hand side"),
            });
        }
        self.productions.push(production);
        Ok(())
    }

    pub fn productions(&self) -> &[Production<V>] {
        &self.productions
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }
}

impl<V> Default for Grammar<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Grammar<V> {
    fn clone(&self) -> Self {
        Self {
            productions: self.productions.clone(),
        }
    }
}

impl<V> fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.productions).finish()
    }
}

impl<V> fmt::Display for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}

/// Prepends the synthetic start production `@S → lhs(p0)` with the given
/// semantic callback and attributes. An empty input stays empty.
pub fn augment<V>(
    productions: &[Production<V>],
    semantic: SemanticCallback<V>,
    attrs: IndexMap<String, String>,
) -> Vec<Production<V>> {
    let Some(first) = productions.first() else {
        return Vec::new();
    };
    let augmented = Production::new(
        Symbol::augmented_start(),
        vec![first.lhs.clone()],
        semantic,
        attrs,
    );
    std::iter::once(augmented)
        .chain(productions.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_valid_production() {
        let mut grammar: Grammar<()> = Grammar::new();
        grammar.add(Production::plain("S", &["a", "b"])).unwrap();
        assert_eq!(grammar.len(), 1);
    }

    #[test]
    fn test_reject_reserved_lhs() {
        let mut grammar: Grammar<()> = Grammar::new();
        let result = grammar.add(Production::plain("@S", &["S"]));
        assert!(matches!(result, Err(ParserError::GrammarShape { .. })));
    }

    #[test]
    fn test_reject_empty_rhs() {
        let mut grammar: Grammar<()> = Grammar::new();
        let result = grammar.add(Production::plain("S", &[]));
        assert!(matches!(result, Err(ParserError::GrammarShape { .. })));
    }

    #[test]
    fn test_reject_reserved_rhs_symbol() {
        let mut grammar: Grammar<()> = Grammar::new();
        let result = grammar.add(Production::plain("S", &["a", "@EOF"]));
        assert!(matches!(result, Err(ParserError::GrammarShape { .. })));
    }

    #[test]
    fn test_augment_prepends_start() {
        let productions = vec![
            Production::<()>::plain("E", &["E", "plus", "T"]),
            Production::plain("T", &["n"]),
        ];
        let augmented = augment(&productions, none_callback(), IndexMap::new());
        assert_eq!(augmented.len(), 3);
        assert!(augmented[0].lhs.is_augmented_start());
        assert_eq!(augmented[0].rhs, vec![Symbol::new("E")]);
    }

    #[test]
    fn test_priority_attribute() {
        let mut production: Production<()> = Production::plain("E", &["E", "plus", "E"]);
        production
            .attrs
            .insert(PRIORITY_ATTR.to_string(), "10".to_string());
        assert_eq!(production.priority(), 10);
        assert_eq!(Production::<()>::plain("T", &["n"]).priority(), 0);
    }
}
