use uuid::Uuid;

/// Author fields joined onto echoes and comments.
#[derive(Debug, Clone)]
pub struct EchoAuthor {
    pub user_id: Uuid,
    pub username: String,
    /// Path relative to the upload root, if the author has an avatar.
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Echo {
    pub id: i64,
    pub author: EchoAuthor,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub like_count: i64,
    /// Whether the viewer the echo was loaded for has liked it.
    pub liked_by_viewer: bool,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub echo_id: i64,
    pub author: EchoAuthor,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An echo together with its most recent comments, newest first.
#[derive(Debug, Clone)]
pub struct EchoThread {
    pub echo: Echo,
    pub comments: Vec<Comment>,
}

pub const MAX_FEED_ITEMS: i64 = 20;
pub const MAX_COMMENTS_PER_ECHO: i64 = 20;
