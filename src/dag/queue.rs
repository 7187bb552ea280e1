// src/dag/queue.rs

//! FIFO ready queue threaded through the node arena.
//!
//! Each queued node carries a [`QueueLink`] with its neighbours, so push and
//! removal from anywhere in the queue are O(1). The link is `None` exactly when
//! the node is not queued; any disagreement between a node's link and its
//! neighbours is an internal bug and panics.

use crate::dag::node::{Node, NodeId};

/// Neighbours of a queued node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QueueLink {
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

#[derive(Debug, Default)]
pub(crate) struct ReadyQueue {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl ReadyQueue {
    pub(crate) fn front(&self) -> Option<NodeId> {
        self.head
    }

    pub(crate) fn back(&self) -> Option<NodeId> {
        self.tail
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Append `id` at the tail.
    pub(crate) fn push_back(&mut self, nodes: &mut [Node], id: NodeId) {
        if let Some(link) = nodes[id.0].link {
            panic!("{id} is already queued (link {link:?})");
        }

        match self.tail {
            Some(tail) => {
                let tail_link = nodes[tail.0]
                    .link
                    .as_mut()
                    .unwrap_or_else(|| panic!("queue tail {tail} has no link"));
                if tail_link.next.is_some() {
                    panic!("queue tail {tail} has a successor");
                }
                tail_link.next = Some(id);
                nodes[id.0].link = Some(QueueLink {
                    prev: Some(tail),
                    next: None,
                });
            }
            None => {
                if self.head.is_some() {
                    panic!("ready queue has a head but no tail");
                }
                self.head = Some(id);
                nodes[id.0].link = Some(QueueLink::default());
            }
        }

        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlink `id` from wherever it sits in the queue.
    pub(crate) fn remove(&mut self, nodes: &mut [Node], id: NodeId) {
        let link = nodes[id.0]
            .link
            .take()
            .unwrap_or_else(|| panic!("{id} is not queued"));

        match link.prev {
            Some(prev) => {
                let prev_link = nodes[prev.0]
                    .link
                    .as_mut()
                    .unwrap_or_else(|| panic!("{prev} (before {id}) has no link"));
                if prev_link.next != Some(id) {
                    panic!("{prev} does not point forward to {id}");
                }
                prev_link.next = link.next;
            }
            None => {
                if self.head != Some(id) {
                    panic!("{id} has no predecessor but is not the queue head");
                }
                self.head = link.next;
            }
        }

        match link.next {
            Some(next) => {
                let next_link = nodes[next.0]
                    .link
                    .as_mut()
                    .unwrap_or_else(|| panic!("{next} (after {id}) has no link"));
                if next_link.prev != Some(id) {
                    panic!("{next} does not point back to {id}");
                }
                next_link.prev = link.prev;
            }
            None => {
                if self.tail != Some(id) {
                    panic!("{id} has no successor but is not the queue tail");
                }
                self.tail = link.prev;
            }
        }

        self.len -= 1;
    }

    /// Walk head → tail.
    pub(crate) fn iter<'a>(&self, nodes: &'a [Node]) -> impl Iterator<Item = NodeId> + 'a {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            cursor = nodes[id.0].link.and_then(|l| l.next);
            Some(id)
        })
    }

    /// Walk tail → head.
    pub(crate) fn iter_rev<'a>(&self, nodes: &'a [Node]) -> impl Iterator<Item = NodeId> + 'a {
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let id = cursor?;
            cursor = nodes[id.0].link.and_then(|l| l.prev);
            Some(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::work::Work;

    struct Noop;

    impl Work for Noop {
        fn invalidated(&mut self) {}

        fn run(&mut self) -> bool {
            true
        }
    }

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|_| Node::new(Box::new(Noop))).collect()
    }

    #[test]
    fn removal_from_the_middle_keeps_order() {
        let mut nodes = nodes(3);
        let mut queue = ReadyQueue::default();
        for i in 0..3 {
            queue.push_back(&mut nodes, NodeId(i));
        }

        queue.remove(&mut nodes, NodeId(1));

        assert_eq!(queue.iter(&nodes).collect::<Vec<_>>(), [NodeId(0), NodeId(2)]);
        assert_eq!(queue.iter_rev(&nodes).collect::<Vec<_>>(), [NodeId(2), NodeId(0)]);
        assert_eq!(queue.len(), 2);
        assert!(nodes[1].link.is_none());
    }

    #[test]
    #[should_panic(expected = "is already queued")]
    fn pushing_a_queued_node_panics() {
        let mut nodes = nodes(2);
        let mut queue = ReadyQueue::default();
        queue.push_back(&mut nodes, NodeId(0));
        queue.push_back(&mut nodes, NodeId(1));
        queue.push_back(&mut nodes, NodeId(0));
    }

    #[test]
    #[should_panic(expected = "is not queued")]
    fn removing_an_unqueued_node_panics() {
        let mut nodes = nodes(2);
        let mut queue = ReadyQueue::default();
        queue.push_back(&mut nodes, NodeId(0));
        queue.remove(&mut nodes, NodeId(1));
    }

    #[test]
    #[should_panic(expected = "does not point back to")]
    fn removing_with_a_broken_back_link_panics() {
        let mut nodes = nodes(3);
        let mut queue = ReadyQueue::default();
        for i in 0..3 {
            queue.push_back(&mut nodes, NodeId(i));
        }
        if let Some(link) = nodes[2].link.as_mut() {
            link.prev = Some(NodeId(0));
        }

        queue.remove(&mut nodes, NodeId(1));
    }

    #[test]
    #[should_panic(expected = "does not point forward to")]
    fn removing_with_a_broken_forward_link_panics() {
        let mut nodes = nodes(3);
        let mut queue = ReadyQueue::default();
        for i in 0..3 {
            queue.push_back(&mut nodes, NodeId(i));
        }
        if let Some(link) = nodes[0].link.as_mut() {
            link.next = Some(NodeId(2));
        }

        queue.remove(&mut nodes, NodeId(1));
    }
}
