use crate::error::{ForumError, Result};
use crate::models::{Comment, NewComment, User};

use super::Domain;

/// Comments must stay strictly under this many characters.
const MAX_COMMENT_CHARS: usize = 2000;

impl Domain {
    /// Add a comment to a post on behalf of the current user.
    pub async fn add_comment(
        &self,
        current_user: Option<&User>,
        input: NewComment,
    ) -> Result<Comment> {
        let user = current_user.ok_or(ForumError::Unauthenticated)?;

        let post = self
            .storage
            .post(&input.post_id)
            .await?
            .ok_or_else(ForumError::post_not_found)?;

        if !post.comments_enabled {
            return Err(ForumError::CommentsDisabled);
        }
        if input.content.chars().count() >= MAX_COMMENT_CHARS {
            return Err(ForumError::ContentTooLarge);
        }

        self.storage.add_comment(&user.id, input).await
    }
}
