use std::collections::HashMap;

use crate::application::ports::echo_repository::EchoRepository;
use crate::domain::echoes::echo::{Comment, Echo, EchoThread, MAX_COMMENTS_PER_ECHO};

/// Attaches the newest comments to each echo, keeping the echo order.
pub async fn attach_comments<R>(repo: &R, echoes: Vec<Echo>) -> anyhow::Result<Vec<EchoThread>>
where
    R: EchoRepository + ?Sized,
{
    if echoes.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = echoes.iter().map(|e| e.id).collect();
    let comments = repo.recent_comments(&ids, MAX_COMMENTS_PER_ECHO).await?;

    let mut by_echo: HashMap<i64, Vec<Comment>> = HashMap::new();
    for comment in comments {
        by_echo.entry(comment.echo_id).or_default().push(comment);
    }

    Ok(echoes
        .into_iter()
        .map(|echo| {
            let mut comments = by_echo.remove(&echo.id).unwrap_or_default();
            comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            comments.truncate(MAX_COMMENTS_PER_ECHO as usize);
            EchoThread { echo, comments }
        })
        .collect())
}

pub async fn load_thread<R>(
    repo: &R,
    echo_id: i64,
    viewer: Option<uuid::Uuid>,
) -> anyhow::Result<Option<EchoThread>>
where
    R: EchoRepository + ?Sized,
{
    let Some(echo) = repo.find_echo(echo_id, viewer).await? else {
        return Ok(None);
    };
    Ok(attach_comments(repo, vec![echo]).await?.pop())
}
