//! Reply forests for one paragraph bucket.
//!
//! Everything here walks with explicit worklists: thread depth is whatever the
//! store hands back, and a deep chain of replies must not exhaust the stack.
use comments::Comment;
use serde::Serialize;

use crate::resolver::first_positions;

/// A comment with its direct replies, each level in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.comment.id
    }

    /// This node plus every descendant.
    pub fn flatten_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }

    /// Levels in this thread; a node without replies has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.replies.iter().map(|reply| (reply, level + 1)));
        }
        deepest
    }

    /// Pre-order walk: this node, then each reply subtree in order.
    pub fn iter(&self) -> impl Iterator<Item = &CommentNode> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.replies.iter().rev());
            Some(node)
        })
    }

    /// Materialize the thread as a [`Comment`] with `replies` filled in.
    ///
    /// Replies a comment already carried stay first, followed by its tree
    /// children in order.
    pub fn into_comment(mut self) -> Comment {
        // Pre-order flattening: every child lands after its parent. The third
        // field collects finished children, in reverse.
        let mut slots: Vec<(Option<Comment>, Option<usize>, Vec<Comment>)> = Vec::new();
        let mut stack: Vec<(Comment, Vec<CommentNode>, Option<usize>)> = vec![(
            self.take_comment(),
            std::mem::take(&mut self.replies),
            None,
        )];
        while let Some((comment, replies, parent)) = stack.pop() {
            let slot = slots.len();
            slots.push((Some(comment), parent, Vec::new()));
            for mut reply in replies.into_iter().rev() {
                let nested = std::mem::take(&mut reply.replies);
                stack.push((reply.take_comment(), nested, Some(slot)));
            }
        }

        // Children sit at higher slots than their parent, so walking backwards
        // finishes every reply list before its owner is moved.
        for slot in (1..slots.len()).rev() {
            let finished = std::mem::take(&mut slots[slot].2);
            let (comment, parent) = (slots[slot].0.take(), slots[slot].1);
            if let (Some(mut comment), Some(parent)) = (comment, parent) {
                comment.replies.extend(finished.into_iter().rev());
                slots[parent].2.push(comment);
            }
        }

        let (root, _, finished) = slots.swap_remove(0);
        let mut root =
            root.unwrap_or_else(|| Comment::new(String::new(), 0, None, String::new()));
        root.replies.extend(finished.into_iter().rev());
        root
    }

    fn take_comment(&mut self) -> Comment {
        std::mem::replace(
            &mut self.comment,
            Comment::new(String::new(), 0, None, String::new()),
        )
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        // Unlink children before they drop so deep threads drop iteratively.
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Parent/child structure of one bucket, by position.
pub(crate) struct Forest {
    pub(crate) roots: Vec<usize>,
    pub(crate) children: Vec<Vec<usize>>,
}

impl Forest {
    /// Replies whose parent is missing from the bucket become roots. A
    /// parent cycle is opened at the member that comes first in input
    /// order, which becomes a root.
    pub(crate) fn layout(bucket: &[Comment]) -> Self {
        let positions = first_positions(bucket);
        let mut parent: Vec<Option<usize>> = bucket
            .iter()
            .enumerate()
            .map(|(pos, comment)| {
                let parent_id = comment.parent_id.as_deref()?;
                positions.get(parent_id).copied().filter(|&p| p != pos)
            })
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); bucket.len()];
        for (pos, parent) in parent.iter().enumerate() {
            if let Some(parent) = parent {
                children[*parent].push(pos);
            }
        }

        fn mark(from: usize, reached: &mut [bool], children: &[Vec<usize>]) {
            let mut stack = vec![from];
            while let Some(pos) = stack.pop() {
                if !reached[pos] {
                    reached[pos] = true;
                    stack.extend(children[pos].iter().copied());
                }
            }
        }

        let mut reached = vec![false; bucket.len()];

        let mut roots: Vec<usize> = Vec::new();
        for pos in 0..bucket.len() {
            if parent[pos].is_none() {
                roots.push(pos);
                mark(pos, &mut reached, &children);
            }
        }

        // Anything still unreached hangs off a cycle.
        for pos in 0..bucket.len() {
            if reached[pos] {
                continue;
            }
            let mut seen = vec![false; bucket.len()];
            let mut cur = pos;
            while !seen[cur] {
                seen[cur] = true;
                match parent[cur] {
                    Some(next) => cur = next,
                    None => break,
                }
            }
            // `cur` is on the cycle; pick its earliest member.
            let mut cut = cur;
            let mut walk = parent[cur];
            while let Some(member) = walk {
                if member == cur {
                    break;
                }
                cut = cut.min(member);
                walk = parent[member];
            }

            if let Some(old_parent) = parent[cut].take() {
                children[old_parent].retain(|&child| child != cut);
            }
            roots.push(cut);
            mark(cut, &mut reached, &children);
        }

        roots.sort_unstable();
        Self { roots, children }
    }
}

/// Reply forest for one bucket.
///
/// Roots are comments without a parent in the bucket; replies hang under
/// their parent. Every input comment appears exactly once.
pub fn build_tree(bucket: &[Comment]) -> Vec<CommentNode> {
    let Forest { roots, children } = Forest::layout(bucket);

    // Post-order so each node is assembled after all of its replies.
    let mut built: Vec<Option<CommentNode>> = vec![None; bucket.len()];
    for &root in &roots {
        let mut stack = vec![(root, false)];
        while let Some((pos, expanded)) = stack.pop() {
            if expanded {
                let mut node = CommentNode::new(bucket[pos].clone());
                node.replies = children[pos]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[pos] = Some(node);
            } else {
                stack.push((pos, true));
                stack.extend(children[pos].iter().rev().map(|&child| (child, false)));
            }
        }
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}
