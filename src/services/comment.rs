use crate::{
    error::{AppError, Result},
    models::blog::Blog,
    models::comment::{AddCommentRequest, Comment, CommentWithReplies},
    models::notification::Notification,
    models::user::{User, UserPreview},
    services::database::update_existing,
    services::{Database, NotificationService},
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl CommentService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService) -> Result<Self> {
        Ok(Self { db, notifications })
    }

    /// Inserts a top-level comment or a reply. The three writes (comment
    /// node, parent child-list, blog counters) plus the notification are
    /// independent operations; there is no cross-step transaction.
    pub async fn add_comment(&self, user_id: &str, request: AddCommentRequest) -> Result<Comment> {
        ensure_comment_body(&request.comment)?;

        let blog: Blog = self
            .db
            .get_by_id("blog", &request.blog_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))?;

        // The wire format carries blog_author, but the stored value is
        // always derived from the blog record itself.
        if request.blog_author != blog.author {
            debug!(
                "Client-sent blog_author {} does not match blog record {}",
                request.blog_author, blog.author
            );
        }

        // Replies only attach to an already-persisted parent, which is
        // what keeps the tree acyclic.
        let parent = match &request.replying_to {
            Some(parent_id) => {
                let parent: Comment = self
                    .db
                    .get_by_id("comment", parent_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent comment"))?;

                if parent.blog_id != request.blog_id {
                    return Err(AppError::validation(
                        "You cannot reply to a comment from another blog.",
                    ));
                }

                Some(parent)
            }
            None => None,
        };

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            blog_id: request.blog_id.clone(),
            // Derived field: the blog's author at creation time, kept so
            // notification routing and the delete permission check never
            // need a join.
            blog_author: blog.author.clone(),
            comment: request.comment,
            commented_by: user_id.to_string(),
            is_reply: parent.is_some(),
            parent: parent.as_ref().map(|p| p.id.clone()),
            children: Vec::new(),
            commented_at: Utc::now(),
        };

        let comment_id = comment.id.clone();
        let created = self.db.create("comment", &comment_id, comment).await?;

        if let Some(parent) = &parent {
            self.db
                .query_with_params(
                    &update_existing("comment", "children += $child"),
                    json!({ "id": parent.id, "child": created.id }),
                )
                .await?;
        }

        self.db
            .query_with_params(
                &update_existing(
                    "blog",
                    "comments += $comment, activity.total_comments += 1, \
                     activity.total_parent_comments += $parent_inc",
                ),
                json!({
                    "id": created.blog_id,
                    "comment": created.id,
                    "parent_inc": if created.is_reply { 0 } else { 1 },
                }),
            )
            .await?;

        match &parent {
            Some(parent) => {
                if let Some(notification_id) = &request.notification_id {
                    self.notifications
                        .attach_reply(notification_id, &created.id)
                        .await?;
                }

                self.notifications
                    .dispatch(Notification::reply(
                        &created.blog_id,
                        &parent.commented_by,
                        user_id,
                        &created.id,
                        &parent.id,
                    ))
                    .await?;
            }
            None => {
                self.notifications
                    .dispatch(Notification::comment(
                        &created.blog_id,
                        &created.blog_author,
                        user_id,
                        &created.id,
                    ))
                    .await?;
            }
        }

        info!(
            "Comment {} added on blog {} (reply: {})",
            created.id, created.blog_id, created.is_reply
        );

        Ok(created)
    }

    /// Paginated top-level comments with every descendant subtree
    /// resolved. Depth is unbounded in the data, so resolution walks the
    /// tree level by level with an explicit frontier instead of
    /// recursing, capped by `max_comment_depth`.
    pub async fn get_blog_comments(
        &self,
        blog_id: &str,
        offset: usize,
    ) -> Result<(Vec<CommentWithReplies>, Option<usize>)> {
        let per_page = self.db.config.comments_per_page;

        let total = self
            .db
            .count(
                "SELECT count() AS count FROM comment \
                 WHERE blog_id = $blog AND isReply = false GROUP ALL",
                json!({ "blog": blog_id }),
            )
            .await?;

        let roots: Vec<Comment> = self
            .db
            .select_with_params(
                &format!(
                    "SELECT * FROM comment WHERE blog_id = $blog AND isReply = false \
                     ORDER BY commentedAt DESC LIMIT {} START {}",
                    per_page, offset
                ),
                json!({ "blog": blog_id }),
            )
            .await?;

        let next = crate::utils::pagination::next_page(total, offset, roots.len());

        let mut levels: Vec<Vec<Comment>> = vec![roots];
        loop {
            if levels.len() > self.db.config.max_comment_depth {
                return Err(AppError::validation("Comment thread is too deeply nested."));
            }

            let frontier: Vec<&str> = levels
                .last()
                .map(|level| level.iter().map(|c| c.id.as_str()).collect())
                .unwrap_or_default();
            if frontier.is_empty() {
                break;
            }

            let children: Vec<Comment> = self
                .db
                .select_with_params(
                    "SELECT * FROM comment WHERE parent IN $parents ORDER BY commentedAt ASC",
                    json!({ "parents": frontier }),
                )
                .await?;

            if children.is_empty() {
                break;
            }
            levels.push(children);
        }

        let previews = self.commenter_previews(&levels).await?;
        Ok((assemble_tree(levels, &previews), next))
    }

    /// Cascading delete of a comment and its full descendant subtree,
    /// allowed to the commenter or the blog's author. Uses an explicit
    /// work list; each step is an independent write, so a failure
    /// partway leaves a partially deleted tree behind (no rollback).
    pub async fn delete_comment(&self, comment_id: &str, user_id: &str) -> Result<usize> {
        let root: Comment = self
            .db
            .get_by_id("comment", comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        if !can_delete_comment(user_id, &root) {
            return Err(AppError::forbidden("You cannot delete this comment."));
        }

        let max_depth = self.db.config.max_comment_depth;
        let mut stack: Vec<(String, usize)> = vec![(root.id.clone(), 0)];
        let mut deleted = 0usize;

        while let Some((id, depth)) = stack.pop() {
            if depth >= max_depth {
                return Err(AppError::validation("Comment thread is too deeply nested."));
            }

            let Some(comment) = self.db.get_by_id::<Comment>("comment", &id).await? else {
                debug!("Comment {} already gone, skipping", id);
                continue;
            };

            self.db.delete_by_id("comment", &id).await?;
            deleted += 1;

            if let Some(parent_id) = &comment.parent {
                self.db
                    .query_with_params(
                        &update_existing("comment", "children -= $child"),
                        json!({ "id": parent_id, "child": id }),
                    )
                    .await?;
            }

            self.notifications.scrub_comment(&id).await?;

            let (comment_delta, parent_delta) = deletion_deltas(&comment);
            self.db
                .query_with_params(
                    &update_existing(
                        "blog",
                        "comments -= $comment, activity.total_comments += $comment_delta, \
                         activity.total_parent_comments += $parent_delta",
                    ),
                    json!({
                        "id": comment.blog_id,
                        "comment": id,
                        "comment_delta": comment_delta,
                        "parent_delta": parent_delta,
                    }),
                )
                .await?;

            for child in comment.children {
                stack.push((child, depth + 1));
            }
        }

        info!("Deleted comment {} and {} descendants", comment_id, deleted - 1);
        Ok(deleted)
    }

    async fn commenter_previews(
        &self,
        levels: &[Vec<Comment>],
    ) -> Result<HashMap<String, UserPreview>> {
        let mut previews = HashMap::new();

        for comment in levels.iter().flatten() {
            if previews.contains_key(&comment.commented_by) {
                continue;
            }
            if let Some(user) = self
                .db
                .get_by_id::<User>("user", &comment.commented_by)
                .await?
            {
                previews.insert(comment.commented_by.clone(), UserPreview::from(&user));
            }
        }

        Ok(previews)
    }
}

/// Comment bodies must contain at least one non-whitespace character.
pub(crate) fn ensure_comment_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(AppError::validation("Please write a comment."));
    }
    Ok(())
}

/// A comment may be deleted by its commenter or by the blog's author.
pub(crate) fn can_delete_comment(user_id: &str, comment: &Comment) -> bool {
    user_id == comment.commented_by || user_id == comment.blog_author
}

/// Counter adjustments for removing one node: `total_comments` always
/// drops by one, `total_parent_comments` only for top-level comments.
pub(crate) fn deletion_deltas(comment: &Comment) -> (i64, i64) {
    (-1, if comment.is_reply { 0 } else { -1 })
}

/// Stitches level-batched comments into trees. Levels hold each node
/// exactly once, children already sorted oldest-first; attaching from
/// the deepest level upward means every parent still sits in the map
/// when its children arrive.
fn assemble_tree(
    levels: Vec<Vec<Comment>>,
    previews: &HashMap<String, UserPreview>,
) -> Vec<CommentWithReplies> {
    let root_order: Vec<String> = levels
        .first()
        .map(|roots| roots.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default();

    let mut nodes: HashMap<String, CommentWithReplies> = levels
        .into_iter()
        .flatten()
        .map(|comment| {
            let commented_by_info = previews.get(&comment.commented_by).cloned();
            (
                comment.id.clone(),
                CommentWithReplies {
                    comment,
                    commented_by_info,
                    replies: Vec::new(),
                },
            )
        })
        .collect();

    let mut by_depth: Vec<(usize, String)> = Vec::new();
    for (id, node) in &nodes {
        let mut depth = 0;
        let mut current = node.comment.parent.clone();
        while let Some(parent_id) = current {
            depth += 1;
            current = nodes
                .get(&parent_id)
                .and_then(|p| p.comment.parent.clone());
        }
        by_depth.push((depth, id.clone()));
    }
    by_depth.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, id) in by_depth {
        let parent_id = match nodes.get(&id).and_then(|n| n.comment.parent.clone()) {
            Some(parent_id) if nodes.contains_key(&parent_id) => parent_id,
            _ => continue,
        };
        if let Some(node) = nodes.remove(&id) {
            if let Some(parent) = nodes.get_mut(&parent_id) {
                parent.replies.push(node);
            }
        }
    }

    let mut roots = Vec::with_capacity(root_order.len());
    for id in root_order {
        if let Some(mut node) = nodes.remove(&id) {
            sort_replies(&mut node);
            roots.push(node);
        }
    }
    roots
}

fn sort_replies(node: &mut CommentWithReplies) {
    node.replies
        .sort_by(|a, b| a.comment.commented_at.cmp(&b.comment.commented_at));
    let mut stack: Vec<&mut CommentWithReplies> = node.replies.iter_mut().collect();
    while let Some(child) = stack.pop() {
        child
            .replies
            .sort_by(|a, b| a.comment.commented_at.cmp(&b.comment.commented_at));
        stack.extend(child.replies.iter_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_comment(id: &str, parent: Option<&str>, children: &[&str], minute: i64) -> Comment {
        Comment {
            id: id.to_string(),
            blog_id: "b1".to_string(),
            blog_author: "author".to_string(),
            comment: format!("body of {id}"),
            commented_by: "commenter".to_string(),
            is_reply: parent.is_some(),
            parent: parent.map(str::to_string),
            children: children.iter().map(|c| c.to_string()).collect(),
            commented_at: Utc::now() + Duration::minutes(minute),
        }
    }

    #[test]
    fn assemble_tree_resolves_nested_reply_chains() {
        // Blog has top-level C1 with replies R1, R2; R1 has reply R3.
        let levels = vec![
            vec![make_comment("c1", None, &["r1", "r2"], 0)],
            vec![
                make_comment("r1", Some("c1"), &["r3"], 1),
                make_comment("r2", Some("c1"), &[], 2),
            ],
            vec![make_comment("r3", Some("r1"), &[], 3)],
        ];

        let tree = assemble_tree(levels, &HashMap::new());

        assert_eq!(tree.len(), 1);
        let c1 = &tree[0];
        assert_eq!(c1.comment.id, "c1");
        assert_eq!(c1.replies.len(), 2);
        assert_eq!(c1.replies[0].comment.id, "r1");
        assert_eq!(c1.replies[1].comment.id, "r2");
        assert_eq!(c1.replies[0].replies.len(), 1);
        assert_eq!(c1.replies[0].replies[0].comment.id, "r3");
        assert!(c1.replies[1].replies.is_empty());
    }

    #[test]
    fn assemble_tree_preserves_page_order_of_top_level_comments() {
        // Newest-first page order must survive assembly.
        let levels = vec![vec![
            make_comment("c2", None, &[], 5),
            make_comment("c1", None, &[], 0),
        ]];

        let tree = assemble_tree(levels, &HashMap::new());
        let ids: Vec<&str> = tree.iter().map(|n| n.comment.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
    }

    #[test]
    fn assemble_tree_orders_replies_oldest_first() {
        let levels = vec![
            vec![make_comment("c1", None, &["r2", "r1"], 0)],
            vec![
                make_comment("r2", Some("c1"), &[], 9),
                make_comment("r1", Some("c1"), &[], 3),
            ],
        ];

        let tree = assemble_tree(levels, &HashMap::new());
        let ids: Vec<&str> = tree[0].replies.iter().map(|n| n.comment.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn empty_or_whitespace_comment_bodies_are_rejected() {
        assert!(ensure_comment_body("nice post").is_ok());
        assert!(ensure_comment_body("").is_err());

        match ensure_comment_body("  \n\t ").unwrap_err() {
            AppError::Validation(msg) => assert_eq!(msg, "Please write a comment."),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn commenter_or_blog_author_may_delete() {
        let comment = make_comment("c1", None, &[], 0);
        assert!(can_delete_comment("commenter", &comment));
        assert!(can_delete_comment("author", &comment));
        assert!(!can_delete_comment("stranger", &comment));
    }

    #[test]
    fn deleting_a_top_level_comment_decrements_both_counters() {
        let top = make_comment("c1", None, &[], 0);
        assert_eq!(deletion_deltas(&top), (-1, -1));
    }

    #[test]
    fn deleting_a_reply_leaves_the_parent_counter_alone() {
        let reply = make_comment("r1", Some("c1"), &[], 0);
        assert_eq!(deletion_deltas(&reply), (-1, 0));
    }

    #[test]
    fn subtree_deletion_deltas_sum_to_n_plus_one() {
        // C1 with replies R1, R2; R1 has reply R3: four nodes total,
        // total_comments drops by 4 and total_parent_comments by 1.
        let nodes = vec![
            make_comment("c1", None, &["r1", "r2"], 0),
            make_comment("r1", Some("c1"), &["r3"], 1),
            make_comment("r2", Some("c1"), &[], 2),
            make_comment("r3", Some("r1"), &[], 3),
        ];

        let (comments, parents) = nodes
            .iter()
            .map(deletion_deltas)
            .fold((0, 0), |(c, p), (dc, dp)| (c + dc, p + dp));

        assert_eq!(comments, -4);
        assert_eq!(parents, -1);
    }
}
