use crate::{
    error::{AppError, Result},
    models::blog::{Blog, BlogWithAuthor, CreateBlogRequest, LikeBlogRequest},
    models::notification::Notification,
    models::user::{User, UserPreview},
    services::auth::AuthUser,
    services::database::{array_membership, update_existing},
    services::{Database, NotificationService},
    utils::pagination::next_page,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct BlogService {
    db: Arc<Database>,
    notifications: NotificationService,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "authorId")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

impl BlogService {
    pub async fn new(db: Arc<Database>, notifications: NotificationService) -> Result<Self> {
        Ok(Self { db, notifications })
    }

    /// Creates a blog, or updates one when `blogId` is present. Editors
    /// only; updating additionally requires being the author or admin.
    /// Draft saves relax validation to non-empty title and banner.
    pub async fn create_or_update(&self, user: &AuthUser, request: CreateBlogRequest) -> Result<Blog> {
        if !user.is_editor {
            return Err(AppError::forbidden(
                "Only editors are allowed to create and update blogs.",
            ));
        }

        if request.draft {
            if request.title.trim().is_empty() {
                return Err(AppError::validation(
                    "You must provide a title before saving this blog as draft",
                ));
            }
            if request.banner.trim().is_empty() {
                return Err(AppError::validation(
                    "You must provide a banner image before saving this blog as draft",
                ));
            }
        } else {
            request.validate()?;
        }

        let admin = self.notifications.admin_identity().await?;

        match request.blog_id.clone() {
            Some(blog_id) => self.update_blog(user, &admin, &blog_id, request).await,
            None => self.create_blog(user, &admin, request).await,
        }
    }

    async fn update_blog(
        &self,
        user: &AuthUser,
        admin: &User,
        blog_id: &str,
        request: CreateBlogRequest,
    ) -> Result<Blog> {
        let old: Blog = self
            .db
            .get_by_id("blog", blog_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))?;

        if !can_edit_blog(user, &old.author) {
            return Err(AppError::forbidden("Only admin and author can edit this blog."));
        }

        let updated: Blog = self
            .db
            .merge_by_id(
                "blog",
                blog_id,
                json!({
                    "title": request.title,
                    "banner": request.banner,
                    "des": request.des,
                    "content": request.content,
                    "tags": request.tags,
                    "author": old.author,
                    "draft": request.draft,
                }),
            )
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))?;

        let notification = if user.is_admin {
            let message = if updated.draft {
                format!("Your draft \"{}\" is edited by admin", updated.title)
            } else {
                format!("Your blog \"{}\" is edited by admin", updated.title)
            };
            Notification::admin(blog_id, &updated.author, &admin.id, message)
        } else {
            let message = if updated.draft {
                format!("Draft \"{}\" is edited by its author", updated.title)
            } else {
                format!("Blog \"{}\" is edited by its author", updated.title)
            };
            Notification::editor(blog_id, &admin.id, &updated.author, message)
        };
        self.notifications.dispatch(notification).await?;

        info!("Blog {} updated by {}", blog_id, user.id);
        Ok(updated)
    }

    async fn create_blog(
        &self,
        user: &AuthUser,
        admin: &User,
        request: CreateBlogRequest,
    ) -> Result<Blog> {
        let blog = Blog {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            banner: request.banner,
            des: request.des,
            content: request.content,
            tags: request.tags,
            author: user.id.clone(),
            draft: request.draft,
            activity: Default::default(),
            comments: Vec::new(),
            published_at: Utc::now(),
        };

        let blog_id = blog.id.clone();
        let created = self.db.create("blog", &blog_id, blog).await?;

        // Drafts do not count towards the author's published posts.
        self.db
            .query_with_params(
                &update_existing("user", "blogs += $blog, account_info.total_posts += $inc"),
                json!({
                    "id": user.id,
                    "blog": created.id,
                    "inc": if created.draft { 0 } else { 1 },
                }),
            )
            .await?;

        if !user.is_admin {
            let message = if created.draft {
                format!("A draft \"{}\" is created", created.title)
            } else {
                format!("A Blog \"{}\" is created", created.title)
            };
            self.notifications
                .dispatch(Notification::editor(&created.id, &admin.id, &user.id, message))
                .await?;
        }

        info!("Blog {} created by {} (draft: {})", created.id, user.id, created.draft);
        Ok(created)
    }

    /// Toggles a like. The counter moves by an atomic ±1, the like
    /// notification is created or removed, and the blog id is set-added
    /// to or pulled from the liker's liked list.
    pub async fn like_blog(&self, user_id: &str, request: LikeBlogRequest) -> Result<bool> {
        let delta: i64 = if request.is_liked_by_user { -1 } else { 1 };

        // The guarded UPDATE touches existing records only, so a stale
        // blog id yields no rows and a clean not-found.
        let blog: Blog = self
            .db
            .select_with_params(
                &format!(
                    "{} RETURN AFTER",
                    update_existing("blog", "activity.total_likes += $delta")
                ),
                json!({ "id": request.blog_id, "delta": delta }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("Blog"))?;

        if request.is_liked_by_user {
            self.notifications
                .remove_like_notification(user_id, &request.blog_id)
                .await?;
            self.db
                .query_with_params(
                    &update_existing("user", &array_membership("liked_blogs", false)),
                    json!({ "id": user_id, "blog": request.blog_id }),
                )
                .await?;
            debug!("User {} unliked blog {}", user_id, request.blog_id);
            Ok(false)
        } else {
            self.notifications
                .dispatch(Notification::like(&request.blog_id, &blog.author, user_id))
                .await?;
            self.db
                .query_with_params(
                    &update_existing("user", &array_membership("liked_blogs", true)),
                    json!({ "id": user_id, "blog": request.blog_id }),
                )
                .await?;
            debug!("User {} liked blog {}", user_id, request.blog_id);
            Ok(true)
        }
    }

    /// Deletes a blog and everything that cannot outlive it. Published
    /// blogs may only be deleted by the admin; drafts by any editor.
    pub async fn delete_blog(&self, user: &AuthUser, blog_id: &str) -> Result<()> {
        let blog: Blog = self
            .db
            .get_by_id("blog", blog_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog"))?;

        if let Some(denial) = delete_blog_denial(user, blog.draft) {
            return Err(AppError::forbidden(denial));
        }

        let admin = self.notifications.admin_identity().await?;

        self.db.delete_by_id("blog", blog_id).await?;

        self.notifications.scrub_blog(blog_id).await?;

        // Flat removal: comments go in one bulk delete, not through the
        // per-comment cascade.
        self.db
            .query_with_params(
                "DELETE comment WHERE blog_id = $blog",
                json!({ "blog": blog_id }),
            )
            .await?;

        self.db
            .query_with_params(
                "UPDATE user SET liked_blogs -= $blog WHERE liked_blogs CONTAINS $blog",
                json!({ "blog": blog_id }),
            )
            .await?;

        self.db
            .query_with_params(
                &update_existing("user", "blogs -= $blog, account_info.total_posts += $inc"),
                json!({
                    "id": blog.author,
                    "blog": blog_id,
                    "inc": if blog.draft { 0 } else { -1 },
                }),
            )
            .await?;

        let notification = if user.is_admin {
            Notification::admin(
                blog_id,
                &blog.author,
                &admin.id,
                format!("Your blog \"{}\" is deleted by admin", blog.title),
            )
        } else {
            Notification::editor(
                blog_id,
                &admin.id,
                &blog.author,
                format!("Blog draft \"{}\" is deleted by its author", blog.title),
            )
        };
        self.notifications.dispatch(notification).await?;

        info!("Blog {} deleted by {}", blog_id, user.id);
        Ok(())
    }

    /// Single blog fetch. Reads bump the blog's and the author's read
    /// counters unless the blog is being opened for editing.
    pub async fn get_blog(
        &self,
        blog_id: &str,
        edit_mode: bool,
        include_draft: bool,
    ) -> Result<BlogWithAuthor> {
        let read_inc: i64 = if edit_mode { 0 } else { 1 };

        let blog: Blog = self
            .db
            .select_with_params(
                &format!(
                    "{} RETURN AFTER",
                    update_existing("blog", "activity.total_reads += $inc")
                ),
                json!({ "id": blog_id, "inc": read_inc }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("Blog"))?;

        self.db
            .query_with_params(
                &update_existing("user", "account_info.total_reads += $inc"),
                json!({ "id": blog.author, "inc": read_inc }),
            )
            .await?;

        if blog.draft && !include_draft {
            return Err(AppError::forbidden("You cannot access draft blogs"));
        }

        let author_info = self
            .db
            .get_by_id::<User>("user", &blog.author)
            .await?
            .as_ref()
            .map(UserPreview::from);

        Ok(BlogWithAuthor { blog, author_info })
    }

    /// Published blogs, newest first, shared pagination convention.
    pub async fn list_blogs(
        &self,
        query: BlogListQuery,
    ) -> Result<(Vec<BlogWithAuthor>, Option<usize>)> {
        let per_page = self.db.config.blogs_per_page;
        let offset = query.page.unwrap_or(0);

        let where_clause = list_filter(query.author_id.as_deref(), query.category.as_deref());

        let params = json!({
            "author": query.author_id,
            "category": query.category,
        });

        let total = self
            .db
            .count(
                &format!("SELECT count() AS count FROM blog {} GROUP ALL", where_clause),
                params.clone(),
            )
            .await?;

        let blogs: Vec<Blog> = self
            .db
            .select_with_params(
                &format!(
                    "SELECT * FROM blog {} ORDER BY publishedAt DESC LIMIT {} START {}",
                    where_clause, per_page, offset
                ),
                params,
            )
            .await?;

        let next = next_page(total, offset, blogs.len());

        Ok((self.with_authors(blogs).await?, next))
    }

    /// Most-read published blogs, likes then recency as tie-breakers.
    pub async fn trending_blogs(&self) -> Result<Vec<BlogWithAuthor>> {
        let blogs: Vec<Blog> = self
            .db
            .select_with_params(
                &format!(
                    "SELECT * FROM blog WHERE draft = false \
                     ORDER BY activity.total_reads DESC, activity.total_likes DESC, \
                     publishedAt DESC LIMIT {}",
                    self.db.config.trending_blogs_limit
                ),
                json!({}),
            )
            .await?;

        self.with_authors(blogs).await
    }

    async fn with_authors(&self, blogs: Vec<Blog>) -> Result<Vec<BlogWithAuthor>> {
        let mut rows = Vec::with_capacity(blogs.len());
        for blog in blogs {
            let author_info = self
                .db
                .get_by_id::<User>("user", &blog.author)
                .await?
                .as_ref()
                .map(UserPreview::from);
            rows.push(BlogWithAuthor { blog, author_info });
        }
        Ok(rows)
    }
}

/// Filter for the published listing. An author filter wins over a
/// category; a category matches either a tag or a title substring,
/// case-insensitively, and "home" means no filter at all.
pub(crate) fn list_filter(author_id: Option<&str>, category: Option<&str>) -> String {
    let mut clause = String::from("WHERE draft = false");
    match (author_id, category) {
        (Some(_), _) => clause.push_str(" AND author = $author"),
        (None, Some(category)) if category != "home" => clause.push_str(
            " AND (tags CONTAINS $category \
             OR string::lowercase(title) CONTAINS string::lowercase($category))",
        ),
        _ => {}
    }
    clause
}

/// Updating requires being the blog's author or holding admin role.
pub(crate) fn can_edit_blog(user: &AuthUser, blog_author: &str) -> bool {
    user.is_admin || user.id == blog_author
}

/// Deleting requires editor role, and admin role once published.
pub(crate) fn delete_blog_denial(user: &AuthUser, is_draft: bool) -> Option<&'static str> {
    if !user.is_admin && !is_draft {
        return Some("Only admin can delete a published blog.");
    }
    if !user.is_editor {
        return Some("Only admin or editor can delete a draft blog.");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, is_admin: bool, is_editor: bool) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            is_admin,
            is_editor,
        }
    }

    #[test]
    fn category_filter_matches_tags_or_title() {
        let clause = list_filter(None, Some("rustlang"));
        assert!(clause.contains("tags CONTAINS $category"));
        assert!(clause.contains("string::lowercase(title) CONTAINS string::lowercase($category)"));
    }

    #[test]
    fn home_category_applies_no_filter() {
        assert_eq!(list_filter(None, Some("home")), "WHERE draft = false");
        assert_eq!(list_filter(None, None), "WHERE draft = false");
    }

    #[test]
    fn author_filter_wins_over_category() {
        assert_eq!(
            list_filter(Some("u1"), Some("rustlang")),
            "WHERE draft = false AND author = $author"
        );
    }

    #[test]
    fn author_or_admin_may_edit() {
        assert!(can_edit_blog(&user("author", false, true), "author"));
        assert!(can_edit_blog(&user("admin", true, true), "author"));
        assert!(!can_edit_blog(&user("other", false, true), "author"));
    }

    #[test]
    fn published_blogs_are_admin_delete_only() {
        let editor = user("e1", false, true);
        assert_eq!(
            delete_blog_denial(&editor, false),
            Some("Only admin can delete a published blog.")
        );
        assert_eq!(delete_blog_denial(&editor, true), None);
    }

    #[test]
    fn admin_may_delete_anything_but_plain_users_nothing() {
        let admin = user("a1", true, true);
        assert_eq!(delete_blog_denial(&admin, false), None);
        assert_eq!(delete_blog_denial(&admin, true), None);

        let reader = user("r1", false, false);
        assert!(delete_blog_denial(&reader, true).is_some());
    }
}
