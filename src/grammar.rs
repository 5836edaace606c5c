use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use thiserror::Error;

/// A rewrite rule as written by the grammar author: a head character and the
/// characters of its right-hand side. An empty `to` is an epsilon rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub from: char,
    pub to: Vec<char>,
}

impl Rule {
    pub fn new(from: char, to: &str) -> Self {
        Self {
            from,
            to: to.chars().collect(),
        }
    }

    pub fn epsilon(from: char) -> Self {
        Self { from, to: vec![] }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, self.from, self.to.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(char),
    NonTerminal(char),
}

impl Symbol {
    pub fn ch(&self) -> char {
        match self {
            Symbol::Terminal(c) | Symbol::NonTerminal(c) => *c,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ch())
    }
}

/// A rule whose right-hand side has been resolved against the grammar's
/// alphabets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: char,
    pub rhs: Vec<Symbol>,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rule(f, self.lhs, self.rhs.iter().map(Symbol::ch))
    }
}

fn write_rule(
    f: &mut fmt::Formatter<'_>,
    from: char,
    to: impl Iterator<Item = char>,
) -> fmt::Result {
    let rhs: String = to.collect();
    if rhs.is_empty() {
        write!(f, "{} -> ε", from)
    } else {
        write!(f, "{} -> {}", from, rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Undefined symbol {symbol:?} in rule `{rule}`")]
    UndefinedSymbol { symbol: char, rule: String },
    #[error("Rule `{rule}` has terminal {symbol:?} as its head")]
    TerminalHead { symbol: char, rule: String },
    #[error("Start symbol {0:?} is not a declared nonterminal")]
    UndefinedStart(char),
    #[error("Symbol {0:?} is declared both as a terminal and a nonterminal")]
    OverlappingSymbol(char),
}

/// An immutable, validated context-free grammar.
///
/// Productions keep the order in which their rules were first given, so a
/// production's index is a stable rule id for the lifetime of the grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: BTreeSet<char>,
    terminals: BTreeSet<char>,
    productions: Vec<Production>,
    by_lhs: HashMap<char, Vec<usize>>,
    start: char,
}

impl Grammar {
    pub fn new(
        nonterminals: impl IntoIterator<Item = char>,
        terminals: impl IntoIterator<Item = char>,
        rules: impl IntoIterator<Item = Rule>,
        start: char,
    ) -> Result<Self, GrammarError> {
        let nonterminals: BTreeSet<char> = nonterminals.into_iter().collect();
        let terminals: BTreeSet<char> = terminals.into_iter().collect();

        if let Some(c) = nonterminals.intersection(&terminals).next() {
            return Err(GrammarError::OverlappingSymbol(*c));
        }
        if !nonterminals.contains(&start) {
            return Err(GrammarError::UndefinedStart(start));
        }

        let mut seen = HashSet::new();
        let mut productions = Vec::new();
        let mut by_lhs: HashMap<char, Vec<usize>> = HashMap::new();
        for rule in rules {
            if seen.contains(&rule) {
                continue;
            }
            let production = resolve(&rule, &nonterminals, &terminals)?;
            by_lhs
                .entry(production.lhs)
                .or_default()
                .push(productions.len());
            productions.push(production);
            seen.insert(rule);
        }

        Ok(Self {
            nonterminals,
            terminals,
            productions,
            by_lhs,
            start,
        })
    }

    /// Re-checks the alphabet invariants of an already built grammar.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if let Some(c) = self.nonterminals.intersection(&self.terminals).next() {
            return Err(GrammarError::OverlappingSymbol(*c));
        }
        if !self.nonterminals.contains(&self.start) {
            return Err(GrammarError::UndefinedStart(self.start));
        }
        for production in &self.productions {
            if !self.nonterminals.contains(&production.lhs) {
                return Err(GrammarError::UndefinedSymbol {
                    symbol: production.lhs,
                    rule: production.to_string(),
                });
            }
            for sym in &production.rhs {
                let declared = match sym {
                    Symbol::Terminal(c) => self.terminals.contains(c),
                    Symbol::NonTerminal(c) => self.nonterminals.contains(c),
                };
                if !declared {
                    return Err(GrammarError::UndefinedSymbol {
                        symbol: sym.ch(),
                        rule: production.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn start(&self) -> char {
        self.start
    }

    pub fn nonterminals(&self) -> &BTreeSet<char> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &BTreeSet<char> {
        &self.terminals
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: usize) -> &Production {
        &self.productions[id]
    }

    /// Ids of every production headed by `nonterminal`; empty when it has none.
    pub fn prods_for(&self, nonterminal: char) -> &[usize] {
        self.by_lhs
            .get(&nonterminal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_terminal(&self, c: char) -> bool {
        self.terminals.contains(&c)
    }

    pub fn is_nonterminal(&self, c: char) -> bool {
        self.nonterminals.contains(&c)
    }
}

fn resolve(
    rule: &Rule,
    nonterminals: &BTreeSet<char>,
    terminals: &BTreeSet<char>,
) -> Result<Production, GrammarError> {
    if terminals.contains(&rule.from) {
        return Err(GrammarError::TerminalHead {
            symbol: rule.from,
            rule: rule.to_string(),
        });
    }
    if !nonterminals.contains(&rule.from) {
        return Err(GrammarError::UndefinedSymbol {
            symbol: rule.from,
            rule: rule.to_string(),
        });
    }
    let rhs = rule
        .to
        .iter()
        .map(|&c| {
            if nonterminals.contains(&c) {
                Ok(Symbol::NonTerminal(c))
            } else if terminals.contains(&c) {
                Ok(Symbol::Terminal(c))
            } else {
                Err(GrammarError::UndefinedSymbol {
                    symbol: c,
                    rule: rule.to_string(),
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Production { lhs: rule.from, rhs })
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        for production in &self.productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}
