use std::collections::HashSet;

use crate::grammar::{Grammar, Symbol};

impl Grammar {
    /// Compute the set of nonterminals that derive the empty string.
    pub fn nullable_nonterminals(&self) -> HashSet<char> {
        let mut nullable = HashSet::new();

        let mut changed = true;
        while changed {
            changed = false;

            for prod in self.productions() {
                if nullable.contains(&prod.lhs) {
                    continue;
                }

                let derives_empty = prod.rhs.iter().all(|sym| match sym {
                    Symbol::Terminal(_) => false,
                    Symbol::NonTerminal(nt) => nullable.contains(nt),
                });

                if derives_empty {
                    nullable.insert(prod.lhs);
                    changed = true;
                }
            }
        }

        nullable
    }
}
