//! In-memory adapters for unit and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::application::ports::echo_repository::{EchoRepository, FeedQuery};
use crate::application::ports::user_repository::{
    CreateUserOutcome, UniqueField, UserRepository, UserRow,
};
use crate::domain::echoes::echo::{Comment, Echo, EchoAuthor};

#[derive(Default)]
struct State {
    users: Vec<UserRow>,
    echoes: Vec<(i64, Uuid, String, DateTime<Utc>)>,
    comments: Vec<(i64, i64, Uuid, String, DateTime<Utc>)>,
    likes: HashSet<(i64, Uuid)>,
    next_id: i64,
    last_ts: Option<DateTime<Utc>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // Strictly increasing so ordering tests are deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        let mut ts = Utc::now();
        if let Some(last) = self.last_ts {
            if ts <= last {
                ts = last + Duration::microseconds(1);
            }
        }
        self.last_ts = Some(ts);
        ts
    }

    fn author(&self, user_id: Uuid) -> EchoAuthor {
        let user = self.users.iter().find(|u| u.id == user_id);
        EchoAuthor {
            user_id,
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            profile_picture: user.and_then(|u| u.profile_picture.clone()),
        }
    }

    fn echo(&self, idx: usize, viewer: Option<Uuid>) -> Echo {
        let (id, author_id, content, created_at) = &self.echoes[idx];
        Echo {
            id: *id,
            author: self.author(*author_id),
            content: content.clone(),
            created_at: *created_at,
            like_count: self.likes.iter().filter(|(e, _)| e == id).count() as i64,
            liked_by_viewer: viewer.is_some_and(|v| self.likes.contains(&(*id, v))),
        }
    }
}

/// Implements both repository ports over one shared state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Inserts a user directly, bypassing registration.
    pub fn add_user(&self, username: &str) -> Uuid {
        let mut st = self.state.lock().unwrap();
        let id = Uuid::new_v4();
        st.users.push(UserRow {
            id,
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: None,
            profile_picture: None,
        });
        id
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<CreateUserOutcome> {
        let mut st = self.state.lock().unwrap();
        if st.users.iter().any(|u| u.username == username) {
            return Ok(CreateUserOutcome::Duplicate(UniqueField::Username));
        }
        if st.users.iter().any(|u| u.email == email) {
            return Ok(CreateUserOutcome::Duplicate(UniqueField::Email));
        }
        let user = UserRow {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: Some(password_hash.into()),
            profile_picture: None,
        };
        st.users.push(user.clone());
        Ok(CreateUserOutcome::Created(user))
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().any(|u| u.email == email))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().find(|u| u.id == id).map(|u| UserRow {
            password_hash: None,
            ..u.clone()
        }))
    }

    async fn set_profile_picture(
        &self,
        user_id: Uuid,
        relative_path: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut st = self.state.lock().unwrap();
        let user = st
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| anyhow::anyhow!("user not found"))?;
        user.profile_picture = relative_path.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl EchoRepository for MemoryStore {
    async fn create_echo(&self, author_id: Uuid, content: &str) -> anyhow::Result<i64> {
        let mut st = self.state.lock().unwrap();
        let id = st.next_id();
        let ts = st.now();
        st.echoes.push((id, author_id, content.into(), ts));
        Ok(id)
    }

    async fn create_comment(
        &self,
        author_id: Uuid,
        echo_id: i64,
        content: &str,
    ) -> anyhow::Result<Option<i64>> {
        let mut st = self.state.lock().unwrap();
        if !st.echoes.iter().any(|e| e.0 == echo_id) {
            return Ok(None);
        }
        let id = st.next_id();
        let ts = st.now();
        st.comments.push((id, echo_id, author_id, content.into(), ts));
        Ok(Some(id))
    }

    async fn toggle_like(&self, echo_id: i64, user_id: Uuid) -> anyhow::Result<Option<bool>> {
        let mut st = self.state.lock().unwrap();
        if !st.echoes.iter().any(|e| e.0 == echo_id) {
            return Ok(None);
        }
        if st.likes.remove(&(echo_id, user_id)) {
            Ok(Some(false))
        } else {
            st.likes.insert((echo_id, user_id));
            Ok(Some(true))
        }
    }

    async fn find_echo(
        &self,
        echo_id: i64,
        viewer: Option<Uuid>,
    ) -> anyhow::Result<Option<Echo>> {
        let st = self.state.lock().unwrap();
        Ok(st
            .echoes
            .iter()
            .position(|e| e.0 == echo_id)
            .map(|idx| st.echo(idx, viewer)))
    }

    async fn list_recent(&self, query: FeedQuery) -> anyhow::Result<Vec<Echo>> {
        let st = self.state.lock().unwrap();
        let mut out: Vec<Echo> = (0..st.echoes.len())
            .filter(|&idx| match query.liked_by {
                Some(u) => st.likes.contains(&(st.echoes[idx].0, u)),
                None => true,
            })
            .map(|idx| st.echo(idx, query.viewer))
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out.truncate(query.limit.max(0) as usize);
        Ok(out)
    }

    async fn recent_comments(
        &self,
        echo_ids: &[i64],
        per_echo: i64,
    ) -> anyhow::Result<Vec<Comment>> {
        let st = self.state.lock().unwrap();
        let mut grouped: HashMap<i64, Vec<Comment>> = HashMap::new();
        for (id, echo_id, author_id, content, created_at) in &st.comments {
            if echo_ids.contains(echo_id) {
                grouped.entry(*echo_id).or_default().push(Comment {
                    id: *id,
                    echo_id: *echo_id,
                    author: st.author(*author_id),
                    content: content.clone(),
                    created_at: *created_at,
                });
            }
        }
        Ok(grouped
            .into_values()
            .flat_map(|mut comments| {
                comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                comments.truncate(per_echo.max(0) as usize);
                comments
            })
            .collect())
    }
}
