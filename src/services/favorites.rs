use crate::{
    error::{AppError, Result},
    models::blog::{Blog, BlogWithAuthor},
    models::user::{User, UserPreview},
    services::database::{array_membership, update_existing},
    services::Database,
    utils::pagination::next_page,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Per-user saved-blog lists: the read-later list and the liked list.
#[derive(Clone)]
pub struct FavoritesService {
    db: Arc<Database>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadLaterRequest {
    #[serde(rename = "blogId")]
    pub blog_id: String,
    #[serde(rename = "isReadLaterByUser")]
    pub is_read_later_by_user: bool,
}

#[derive(Debug, Clone, Copy)]
enum SavedList {
    ReadLater,
    Liked,
}

impl FavoritesService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Toggles a blog on the caller's read-later list. As with likes,
    /// the client reports the current state and the service moves to the
    /// opposite one. Returns true when the blog was added.
    pub async fn toggle_read_later(&self, user_id: &str, request: ReadLaterRequest) -> Result<bool> {
        let add = !request.is_read_later_by_user;

        self.db
            .query_with_params(
                &update_existing("user", &array_membership("read_later_blogs", add)),
                json!({ "id": user_id, "blog": request.blog_id }),
            )
            .await?;

        debug!(
            "User {} {} blog {} on read-later list",
            user_id,
            if add { "saved" } else { "removed" },
            request.blog_id
        );
        Ok(add)
    }

    pub async fn read_later_blogs(
        &self,
        user_id: &str,
        offset: usize,
        search: Option<&str>,
    ) -> Result<(Vec<BlogWithAuthor>, Option<usize>)> {
        self.saved_blogs(user_id, offset, search, SavedList::ReadLater)
            .await
    }

    pub async fn liked_blogs(
        &self,
        user_id: &str,
        offset: usize,
        search: Option<&str>,
    ) -> Result<(Vec<BlogWithAuthor>, Option<usize>)> {
        self.saved_blogs(user_id, offset, search, SavedList::Liked)
            .await
    }

    /// Paginated listing of one of the caller's saved lists, newest
    /// first, optionally narrowed by a title search.
    async fn saved_blogs(
        &self,
        user_id: &str,
        offset: usize,
        search: Option<&str>,
        list: SavedList,
    ) -> Result<(Vec<BlogWithAuthor>, Option<usize>)> {
        let per_page = self.db.config.blogs_per_page;

        let user: User = self
            .db
            .get_by_id("user", user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let ids = match list {
            SavedList::ReadLater => user.read_later_blogs,
            SavedList::Liked => user.liked_blogs,
        };

        let where_clause = saved_filter(search);
        let params = json!({ "ids": ids, "search": search });

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

        Ok((rows, next))
    }
}

/// Membership filter for a saved-list listing; ids are the bare record
/// ids stored on the user. A search term narrows by title substring,
/// case-insensitively.
pub(crate) fn saved_filter(search: Option<&str>) -> String {
    let mut clause = String::from("WHERE meta::id(id) IN $ids");
    if search.is_some() {
        clause.push_str(" AND string::lowercase(title) CONTAINS string::lowercase($search)");
    }
    clause
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_listing_is_scoped_to_the_callers_ids() {
        assert_eq!(saved_filter(None), "WHERE meta::id(id) IN $ids");
    }

    #[test]
    fn search_narrows_saved_listing_by_title() {
        let clause = saved_filter(Some("rust"));
        assert!(clause.starts_with("WHERE meta::id(id) IN $ids AND "));
        assert!(clause.contains("string::lowercase(title) CONTAINS string::lowercase($search)"));
    }
}
