//! Thread assembly for paper comments
//!
//! Comments are loaded flat and arranged here into depth-first pre-order.
//! Roots sit at depth 0; siblings keep the order they were loaded in
//! (creation time, then id). Anything below [`MAX_THREAD_DEPTH`] is dropped
//! along with its replies, as are replies whose parent is not in the set.

use std::collections::HashMap;

use super::views::{CommentView, ThreadedComment};

/// Deepest reply level that is returned
pub const MAX_THREAD_DEPTH: usize = 10;

/// Arrange `comments` (already ordered by creation) into thread order
pub fn assemble_thread(comments: Vec<CommentView>) -> Vec<ThreadedComment> {
    let mut children: HashMap<i32, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (index, comment) in comments.iter().enumerate() {
        match comment.parent_comment_id {
            Some(parent) => children.entry(parent).or_default().push(index),
            None => roots.push(index),
        }
    }

    let mut slots: Vec<Option<CommentView>> = comments.into_iter().map(Some).collect();
    let mut thread = Vec::with_capacity(slots.len());

    let mut stack: Vec<(usize, usize)> = roots.into_iter().rev().map(|i| (i, 0)).collect();
    while let Some((index, depth)) = stack.pop() {
        let Some(comment) = slots[index].take() else {
            continue;
        };

        if depth < MAX_THREAD_DEPTH {
            if let Some(replies) = children.get(&comment.comment_id) {
                stack.extend(replies.iter().rev().map(|&i| (i, depth + 1)));
            }
        }

        thread.push(ThreadedComment { comment, depth });
    }

    thread
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn comment(id: i32, parent: Option<i32>) -> CommentView {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, id as u32 % 60)
            .unwrap();
        CommentView {
            comment_id: id,
            user_id: 1,
            paper_id: 1,
            parent_comment_id: parent,
            comment_text: format!("comment {id}"),
            created_at: at,
            updated_at: at,
            user_name: "Reader".to_string(),
        }
    }

    fn ids_and_depths(thread: &[ThreadedComment]) -> Vec<(i32, usize)> {
        thread.iter().map(|c| (c.comment.comment_id, c.depth)).collect()
    }

    #[test]
    fn test_empty() {
        assert!(assemble_thread(Vec::new()).is_empty());
    }

    #[test]
    fn test_preorder_with_creation_order_siblings() {
        // 1 ─┬─ 3 ── 5
        //    └─ 4
        // 2
        let comments = vec![
            comment(1, None),
            comment(2, None),
            comment(3, Some(1)),
            comment(4, Some(1)),
            comment(5, Some(3)),
        ];

        let thread = assemble_thread(comments);
        assert_eq!(
            ids_and_depths(&thread),
            vec![(1, 0), (3, 1), (5, 2), (4, 1), (2, 0)]
        );
    }

    #[test]
    fn test_orphans_dropped() {
        let comments = vec![comment(1, None), comment(2, Some(99)), comment(3, Some(2))];
        assert_eq!(ids_and_depths(&assemble_thread(comments)), vec![(1, 0)]);
    }

    #[test]
    fn test_depth_cutoff_drops_subtree() {
        // Chain 1 <- 2 <- ... <- 13; ids 1..=11 have depths 0..=10.
        let mut comments = vec![comment(1, None)];
        for id in 2..=13 {
            comments.push(comment(id, Some(id - 1)));
        }
        // A sibling branch at depth 1 survives the cut.
        comments.push(comment(20, Some(1)));

        let thread = assemble_thread(comments);
        let depths = ids_and_depths(&thread);

        assert_eq!(depths.len(), 12);
        assert_eq!(depths[10], (11, MAX_THREAD_DEPTH));
        assert_eq!(depths[11], (20, 1));
        assert!(thread.iter().all(|c| c.depth <= MAX_THREAD_DEPTH));
        assert!(!depths.iter().any(|&(id, _)| id == 12 || id == 13));
    }

    #[test]
    fn test_serializes_flat_with_depth() {
        let thread = assemble_thread(vec![comment(1, None)]);
        let json = serde_json::to_value(&thread[0]).unwrap();
        assert_eq!(json["comment_id"], 1);
        assert_eq!(json["user_name"], "Reader");
        assert_eq!(json["depth"], 0);
    }
}
