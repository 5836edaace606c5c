use std::collections::HashSet;
use std::fmt;

use colored::Colorize;

use crate::grammar::{Grammar, Symbol};

/// A dotted rule: `rhs[..dot]` of production `prod_id` has been recognized
/// starting at input position `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub prod_id: usize,
    pub dot: usize,
    pub origin: usize,
}

impl Item {
    pub fn new(prod_id: usize, dot: usize, origin: usize) -> Self {
        Item {
            prod_id,
            dot,
            origin,
        }
    }

    /// The same item with the dot moved past the next symbol.
    pub fn advance(&self) -> Self {
        Item {
            dot: self.dot + 1,
            ..*self
        }
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.prod_id).rhs.len()
    }

    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.production(self.prod_id).rhs.get(self.dot).copied()
    }

    /// Debug rendering: `( S -> (S.)S, 0 )`.
    pub fn display<'gr>(&self, grammar: &'gr Grammar) -> ItemDisplay<'gr> {
        ItemDisplay {
            item: *self,
            grammar,
        }
    }
}

pub struct ItemDisplay<'gr> {
    item: Item,
    grammar: &'gr Grammar,
}

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prod = self.grammar.production(self.item.prod_id);
        let (done, rest) = prod.rhs.split_at(self.item.dot.min(prod.rhs.len()));
        let done: String = done.iter().map(Symbol::ch).collect();
        let rest: String = rest.iter().map(Symbol::ch).collect();
        write!(
            f,
            "( {} -> {}.{}, {} )",
            prod.lhs, done, rest, self.item.origin
        )
    }
}

/// The items ending at one input position, kept in insertion order.
///
/// The order doubles as the closure worklist: every item past the cursor of
/// a closure pass is still waiting to be processed.
#[derive(Debug, Clone, Default)]
pub struct StateSet {
    items: Vec<Item>,
    seen: HashSet<Item>,
}

impl StateSet {
    /// Returns false when the item was already present.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.seen.insert(item) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.seen.contains(item)
    }

    pub fn get(&self, index: usize) -> Option<Item> {
        self.items.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct Chart<'gr> {
    pub sets: Vec<StateSet>,
    pub input: Vec<char>,
    pub grammar: &'gr Grammar,
    nullable: &'gr HashSet<char>,
}

impl<'gr> Chart<'gr> {
    pub fn new(grammar: &'gr Grammar, nullable: &'gr HashSet<char>, input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let sets = vec![StateSet::default(); input.len() + 1];
        Self {
            sets,
            input,
            grammar,
            nullable,
        }
    }

    pub fn add_item(&mut self, pos: usize, item: Item) -> bool {
        let added = self.sets[pos].insert(item);
        if added {
            log::trace!("S{}: add {}", pos, item.display(self.grammar));
        }
        added
    }

    /// Fill every state set, left to right.
    pub fn recognize(&mut self) {
        let start = self.grammar.start();
        for &pid in self.grammar.prods_for(start) {
            self.add_item(0, Item::new(pid, 0, 0));
        }

        let n = self.input.len();
        for pos in 0..=n {
            self.close(pos);
            if pos == n {
                break;
            }
            self.scan(pos);
            if self.sets[pos + 1].is_empty() {
                log::debug!(
                    "no item scans {:?} at position {}, rejecting early",
                    self.input[pos],
                    pos
                );
                break;
            }
        }
    }

    /// Run predict and complete over `S_pos` until no new item appears.
    fn close(&mut self, pos: usize) {
        let mut cursor = 0;
        while let Some(item) = self.sets[pos].get(cursor) {
            cursor += 1;
            match item.next_symbol(self.grammar) {
                Some(Symbol::NonTerminal(nt)) => self.predict(pos, item, nt),
                Some(Symbol::Terminal(_)) => {}
                None => self.complete(pos, item),
            }
        }
    }

    fn predict(&mut self, pos: usize, item: Item, nt: char) {
        for &pid in self.grammar.prods_for(nt) {
            self.add_item(pos, Item::new(pid, 0, pos));
        }
        // An empty completion of `nt` may already have been processed at this
        // position, so step over it directly.
        if self.nullable.contains(&nt) {
            self.add_item(pos, item.advance());
        }
    }

    fn complete(&mut self, pos: usize, item: Item) {
        let lhs = self.grammar.production(item.prod_id).lhs;
        let waiting: Vec<Item> = self.sets[item.origin]
            .iter()
            .filter(|w| w.next_symbol(self.grammar) == Some(Symbol::NonTerminal(lhs)))
            .map(Item::advance)
            .collect();
        for advanced in waiting {
            self.add_item(pos, advanced);
        }
    }

    /// Move every item of `S_pos` expecting `input[pos]` into `S_{pos+1}`.
    fn scan(&mut self, pos: usize) {
        let token = self.input[pos];
        let scanned: Vec<Item> = self.sets[pos]
            .iter()
            .filter(|it| it.next_symbol(self.grammar) == Some(Symbol::Terminal(token)))
            .map(Item::advance)
            .collect();
        for item in scanned {
            self.add_item(pos + 1, item);
        }
    }

    /// Whether a start production spans the whole input.
    pub fn accepted(&self) -> bool {
        let start = self.grammar.start();
        self.sets[self.input.len()].iter().any(|it| {
            it.origin == 0
                && it.is_complete(self.grammar)
                && self.grammar.production(it.prod_id).lhs == start
        })
    }

    pub fn print_chart(&self) {
        for (pos, set) in self.sets.iter().enumerate() {
            let scanned = match pos.checked_sub(1).and_then(|i| self.input.get(i)) {
                Some(c) => format!(" after {:?}", c),
                None => String::new(),
            };
            println!("{}", format!("=== S{}{} ===", pos, scanned).blue().bold());
            for item in set.iter() {
                let text = item.display(self.grammar).to_string();
                if item.is_complete(self.grammar) {
                    println!("  {}", text.green());
                } else {
                    println!("  {}", text);
                }
            }
        }
    }
}

impl fmt::Display for Chart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, set) in self.sets.iter().enumerate() {
            writeln!(f, "S{}:", pos)?;
            for item in set.iter() {
                writeln!(f, "  {}", item.display(self.grammar))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;

    fn brackets() -> Grammar {
        Grammar::new(
            "S".chars(),
            "()".chars(),
            [Rule::new('S', "(S)S"), Rule::epsilon('S')],
            'S',
        )
        .unwrap()
    }

    fn run<'gr>(grammar: &'gr Grammar, nullable: &'gr HashSet<char>, input: &str) -> Chart<'gr> {
        let mut chart = Chart::new(grammar, nullable, input);
        chart.recognize();
        chart
    }

    #[test]
    fn item_display() {
        let g = brackets();
        assert_eq!(Item::new(0, 0, 0).display(&g).to_string(), "( S -> .(S)S, 0 )");
        assert_eq!(Item::new(0, 2, 1).display(&g).to_string(), "( S -> (S.)S, 1 )");
        assert_eq!(Item::new(0, 4, 3).display(&g).to_string(), "( S -> (S)S., 3 )");
        assert_eq!(Item::new(1, 0, 2).display(&g).to_string(), "( S -> ., 2 )");
    }

    #[test]
    fn item_basics() {
        let g = brackets();
        let item = Item::new(0, 0, 0);
        assert_eq!(item.next_symbol(&g), Some(Symbol::Terminal('(')));
        assert_eq!(item.advance().next_symbol(&g), Some(Symbol::NonTerminal('S')));
        assert!(!item.is_complete(&g));
        assert!(Item::new(0, 4, 0).is_complete(&g));
        assert!(Item::new(1, 0, 0).is_complete(&g));
        assert_eq!(Item::new(0, 4, 0).next_symbol(&g), None);
        assert_ne!(Item::new(0, 1, 0), Item::new(0, 1, 1));
    }

    #[test]
    fn state_set_dedups() {
        let mut set = StateSet::default();
        assert!(set.insert(Item::new(0, 0, 0)));
        assert!(set.insert(Item::new(0, 1, 0)));
        assert!(!set.insert(Item::new(0, 0, 0)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1), Some(Item::new(0, 1, 0)));
        assert!(set.contains(&Item::new(0, 1, 0)));
    }

    #[test]
    fn seeds_and_closes_first_set() {
        let g = brackets();
        let nullable = g.nullable_nonterminals();
        let chart = run(&g, &nullable, "");
        let s0: Vec<_> = chart.sets[0].iter().copied().collect();
        assert_eq!(s0, vec![Item::new(0, 0, 0), Item::new(1, 0, 0)]);
        assert!(chart.accepted());
    }

    #[test]
    fn completes_nullable_at_same_position() {
        let g = brackets();
        let nullable = g.nullable_nonterminals();
        let chart = run(&g, &nullable, "()");
        // after '(' the inner S is predicted, completed empty, and stepped over
        assert!(chart.sets[1].contains(&Item::new(0, 1, 0)));
        assert!(chart.sets[1].contains(&Item::new(1, 0, 1)));
        assert!(chart.sets[1].contains(&Item::new(0, 2, 0)));
        assert!(chart.sets[2].contains(&Item::new(0, 4, 0)));
        assert!(chart.accepted());
    }

    #[test]
    fn unknown_symbol_empties_the_chart() {
        let g = brackets();
        let nullable = g.nullable_nonterminals();
        let chart = run(&g, &nullable, "( )");
        assert!(!chart.sets[1].is_empty());
        assert!(chart.sets[2].is_empty());
        assert!(chart.sets[3].is_empty());
        assert!(!chart.accepted());
    }

    #[test]
    fn left_recursion_terminates() {
        // S -> SaSb | ε
        let g = Grammar::new(
            "S".chars(),
            "ab".chars(),
            [Rule::new('S', "SaSb"), Rule::epsilon('S')],
            'S',
        )
        .unwrap();
        let nullable = g.nullable_nonterminals();
        let chart = run(&g, &nullable, "aabbab");
        assert!(chart.accepted());
        // per-position bound: rules * (max rule length + 1) * (position + 1)
        for (pos, set) in chart.sets.iter().enumerate() {
            assert!(set.len() <= 2 * 5 * (pos + 1));
        }
    }

    #[test]
    fn chart_display_lists_every_set() {
        let g = brackets();
        let nullable = g.nullable_nonterminals();
        let chart = run(&g, &nullable, "(");
        let text = chart.to_string();
        assert!(text.starts_with("S0:\n  ( S -> .(S)S, 0 )\n  ( S -> ., 0 )\n"));
        assert!(text.contains("S1:\n  ( S -> (.S)S, 0 )\n"));
        assert!(!chart.accepted());
    }
}
