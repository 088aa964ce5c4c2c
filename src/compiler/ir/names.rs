//! Fresh names for temporaries and labels

use std::collections::{HashMap, HashSet};

/// Per-prefix monotonic counters
///
/// Each prefix counts independently, so temporaries and labels never share
/// a sequence. Names listed as reserved (declared variables) are skipped.
#[derive(Debug, Default)]
pub struct NameGen {
    counters: HashMap<&'static str, u32>,
    reserved: HashSet<String>,
}

impl NameGen {
    /// Generator that never returns one of `reserved`
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            counters: HashMap::new(),
            reserved: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    /// Next number for `prefix`
    pub fn next(&mut self, prefix: &'static str) -> u32 {
        let counter = self.counters.entry(prefix).or_insert(0);
        let n = *counter;
        *counter += 1;
        n
    }

    /// Next unreserved `prefix{n}` name
    pub fn fresh(&mut self, prefix: &'static str) -> String {
        loop {
            let name = format!("{}{}", prefix, self.next(prefix));
            if !self.reserved.contains(&name) {
                return name;
            }
        }
    }
}
