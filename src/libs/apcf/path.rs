use super::edge::{Edge, End};
use std::collections::VecDeque;

/// Result of offering an edge to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    Extended,
    /// The edge would join the two extremities of the path
    Cycle,
    NoMatch,
}

/// A chain of edges, each one's `to` being the next one's `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    edges: VecDeque<Edge>,
}

// A joint through a chromosome end is never made
fn joins(a: End, b: End) -> bool {
    a == b && !a.is_terminal()
}

impl Path {
    pub fn new(edge: Edge) -> Self {
        Self {
            edges: VecDeque::from(vec![edge]),
        }
    }

    pub fn front(&self) -> End {
        self.edges[0].from
    }

    pub fn back(&self) -> End {
        self.edges[self.edges.len() - 1].to
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Both extremities are the same oriented block
    pub fn is_cycle(&self) -> bool {
        joins(self.front(), self.back())
    }

    /// Attach `edge` at whichever extremity it continues, reversing it when it
    /// was read on the other strand.
    pub fn insert(&mut self, edge: &Edge) -> Insert {
        let (front, back) = (self.front(), self.back());

        let (new, at_front) = if joins(front, edge.from.flip()) {
            (edge.reversed(), true)
        } else if joins(front, edge.to) {
            (*edge, true)
        } else if joins(back, edge.from) {
            (*edge, false)
        } else if joins(back, edge.to.flip()) {
            (edge.reversed(), false)
        } else {
            return Insert::NoMatch;
        };

        if at_front {
            if joins(new.from, back) {
                return Insert::Cycle;
            }
            self.edges.push_front(new);
        } else {
            if joins(new.to, front) {
                return Insert::Cycle;
            }
            self.edges.push_back(new);
        }
        Insert::Extended
    }

    /// Absorb `other` if one of its extremities continues one of ours.
    /// Returns false, leaving both paths untouched, when they do not meet
    /// or the result would be a cycle.
    pub fn merge(&mut self, other: &Path) -> bool {
        let (front, back) = (self.front(), self.back());
        let (o_front, o_back) = (other.front(), other.back());

        if joins(front, o_front.flip()) {
            if joins(o_back.flip(), back) {
                return false;
            }
            for e in other.edges.iter() {
                self.edges.push_front(e.reversed());
            }
        } else if joins(front, o_back) {
            if joins(o_front, back) {
                return false;
            }
            for e in other.edges.iter().rev() {
                self.edges.push_front(*e);
            }
        } else if joins(back, o_front) {
            if joins(o_back, front) {
                return false;
            }
            self.edges.extend(other.edges.iter().copied());
        } else if joins(back, o_back.flip()) {
            if joins(o_front.flip(), front) {
                return false;
            }
            for e in other.edges.iter().rev() {
                self.edges.push_back(e.reversed());
            }
        } else {
            return false;
        }
        true
    }

    /// Signed block IDs along the path, chromosome ends left out
    pub fn blocks(&self) -> Vec<i64> {
        self.edges
            .iter()
            .map(|e| e.from)
            .chain(std::iter::once(self.back()))
            .filter(|end| !end.is_terminal())
            .map(|end| end.signed())
            .collect()
    }
}
