use crate::error::{ForumError, Result};
use crate::models::{NewPost, Post, UpdatePostInput, User};

use super::Domain;

impl Domain {
    /// Create a post owned by the current user, comments enabled.
    pub async fn create_post(&self, current_user: Option<&User>, input: NewPost) -> Result<Post> {
        let user = current_user.ok_or(ForumError::Unauthenticated)?;

        if input.title.chars().count() < 2 {
            return Err(ForumError::Validation("title not long enough".to_string()));
        }
        if input.content.chars().count() < 2 {
            return Err(ForumError::Validation("content not long enough".to_string()));
        }

        self.storage.create_post(&user.id, input).await
    }

    /// Flip a post's comments-enabled flag.
    ///
    /// Only the owner may do this, and only to a different value; a no-op
    /// transition is rejected with a message naming the current state.
    pub async fn update_post(
        &self,
        current_user: Option<&User>,
        input: UpdatePostInput,
    ) -> Result<Post> {
        let user = current_user.ok_or(ForumError::Unauthenticated)?;

        let post = self
            .storage
            .post(&input.post_id)
            .await?
            .ok_or_else(ForumError::post_not_found)?;

        if post.user_id != user.id {
            return Err(ForumError::Forbidden);
        }
        if post.comments_enabled == input.enable_comments {
            return Err(if input.enable_comments {
                ForumError::CommentsAlreadyEnabled
            } else {
                ForumError::CommentsAlreadyDisabled
            });
        }

        self.storage.update_post(input).await
    }
}
