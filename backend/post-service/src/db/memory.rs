use super::{PostRepository, RepoError, RepoResult};
use crate::models::{City, PageRequest, Post, PostId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Post repository held in process memory
///
/// Search is a case-insensitive substring match over company and content.
#[derive(Clone, Default)]
pub struct InMemoryPostRepository {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PostId, Post>> {
        self.posts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PostId, Post>> {
        self.posts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn page_of<F>(&self, page: PageRequest, filter: F) -> (Vec<Post>, u64)
    where
        F: Fn(&Post) -> bool,
    {
        let mut matched: Vec<Post> = self.read().values().filter(|p| filter(p)).cloned().collect();
        matched.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().as_uuid().cmp(&a.id().as_uuid()))
        });

        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(page.page_size as usize)
            .collect();
        (items, total)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn save(&self, post: &Post) -> RepoResult<()> {
        let mut posts = self.write();
        // Upserts keep the original creation time
        let stored = match posts.get(&post.id()) {
            Some(existing) => Post::restore(
                post.id(),
                post.company().clone(),
                post.city().clone(),
                post.content().clone(),
                existing.created_at(),
            ),
            None => post.clone(),
        };
        posts.insert(post.id(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> RepoResult<Post> {
        self.read().get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_city(&self, city: &City, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        Ok(self.page_of(page, |p| p.city().code() == city.code()))
    }

    async fn find_all(&self, page: PageRequest) -> RepoResult<(Vec<Post>, u64)> {
        Ok(self.page_of(page, |_| true))
    }

    async fn search(
        &self,
        keyword: &str,
        city: Option<&City>,
        page: PageRequest,
    ) -> RepoResult<(Vec<Post>, u64)> {
        let needle = keyword.trim().to_lowercase();
        Ok(self.page_of(page, |p| {
            let in_city = city.map_or(true, |c| p.city().code() == c.code());
            in_city
                && (p.company().as_str().to_lowercase().contains(&needle)
                    || p.content().as_str().to_lowercase().contains(&needle))
        }))
    }
}
