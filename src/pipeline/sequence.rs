// Arena-backed singly linked list. Nodes are never freed, so a NodeId stays
// valid for the life of the sequence. No tail pointer.

use crate::error::{Error, Result};
use crate::shared::Sound;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
struct Node {
    sound: Sound,
    next: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Sequence {
    nodes: Vec<Node>,
}

impl Sequence {
    pub fn new(first: Sound) -> Self {
        Self { nodes: vec![Node { sound: first, next: None }] }
    }

    pub fn head(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    pub fn sound(&self, id: NodeId) -> &Sound {
        &self.nodes[id.0].sound
    }

    pub fn sound_mut(&mut self, id: NodeId) -> &mut Sound {
        &mut self.nodes[id.0].sound
    }

    // The `index`-th node counting from the head, if there is one.
    pub fn nth(&self, index: usize) -> Option<NodeId> {
        self.ids().nth(index)
    }

    // The node whose `next` is `id`; `None` for the head.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.ids().find(|&prev| self.next(prev) == Some(id))
    }

    pub fn tail(&self) -> NodeId {
        let mut id = self.head();
        while let Some(next) = self.next(id) {
            id = next;
        }
        id
    }

    pub fn push_back(&mut self, sound: Sound) -> Result<NodeId> {
        let tail = self.tail();
        self.insert_after(tail, sound)
    }

    // Splice a new node in directly after `prev`.
    pub fn insert_after(&mut self, prev: NodeId, sound: Sound) -> Result<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| Error::Allocation { what: "sequence node", bytes: size_of::<Node>() })?;
        let id = NodeId(self.nodes.len());
        let next = self.nodes[prev.0].next.replace(id);
        self.nodes.push(Node { sound, next });
        Ok(id)
    }

    pub fn ids(&self) -> Ids<'_> {
        Ids { seq: self, cursor: Some(self.head()) }
    }

    pub fn sounds(&self) -> impl Iterator<Item = &Sound> + '_ {
        self.ids().map(|id| self.sound(id))
    }
}

pub struct Ids<'a> {
    seq: &'a Sequence,
    cursor: Option<NodeId>,
}

impl Iterator for Ids<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.seq.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(step: u8) -> Sound {
        Sound::new(step, 0, 1)
    }

    fn steps(seq: &Sequence) -> Vec<u8> {
        seq.sounds().map(|s| s.freq_step).collect()
    }

    #[test]
    fn push_back_keeps_order() {
        let mut seq = Sequence::new(s(0));
        seq.push_back(s(1)).unwrap();
        seq.push_back(s(2)).unwrap();
        assert_eq!(steps(&seq), vec![0, 1, 2]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.sound(seq.tail()).freq_step, 2);
    }

    #[test]
    fn insert_after_splices_in_the_middle() {
        let mut seq = Sequence::new(s(0));
        let one = seq.push_back(s(1)).unwrap();
        seq.push_back(s(2)).unwrap();
        let head = seq.head();
        let mid = seq.insert_after(head, s(7)).unwrap();
        assert_eq!(steps(&seq), vec![0, 7, 1, 2]);
        // ids survive the splice
        assert_eq!(seq.sound(one).freq_step, 1);
        assert_eq!(seq.predecessor(one), Some(mid));
        assert_eq!(seq.predecessor(mid), Some(head));
        assert_eq!(seq.predecessor(head), None);
    }

    #[test]
    fn nth_walks_from_head() {
        let mut seq = Sequence::new(s(0));
        let tail = seq.push_back(s(5)).unwrap();
        seq.insert_after(seq.head(), s(3)).unwrap();
        assert_eq!(seq.nth(2), Some(tail));
        assert_eq!(seq.nth(3), None);
    }

    #[test]
    fn mutation_in_place_shows_on_replay() {
        let mut seq = Sequence::new(s(0));
        let id = seq.push_back(s(1)).unwrap();
        seq.sound_mut(id).length_div = 9;
        assert_eq!(seq.sounds().nth(1).unwrap().length_div, 9);
    }
}
