//! Scripted in-memory API for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, RoostError};

use super::{RawProfile, RawUser, RelationshipApi, UserPage};

/// Failure a scripted call should produce
#[derive(Debug, Clone, Copy)]
pub(crate) enum Failure {
    Network,
    RateLimited,
    Forbidden,
    Rejected,
    Status(u16),
}

impl Failure {
    fn to_error(self) -> RoostError {
        match self {
            Self::Network => RoostError::network("connection refused"),
            Self::RateLimited => RoostError::RateLimitExceeded {
                retry_after: Duration::from_secs(30),
            },
            Self::Forbidden => RoostError::InsufficientPermission,
            Self::Rejected => RoostError::Unauthenticated,
            Self::Status(code) => RoostError::Remote {
                status_code: Some(code),
                message: format!("status {code}"),
            },
        }
    }
}

#[derive(Default)]
struct State {
    followers: Vec<RawUser>,
    following: Vec<RawUser>,
    list_failure: Option<Failure>,
    mutation_failures: HashMap<String, Failure>,
    list_calls: usize,
    mutation_calls: Vec<String>,
}

/// In-memory stand-in for the remote API
pub(crate) struct FakeApi {
    state: Mutex<State>,
    authenticated: bool,
    page_size: usize,
}

pub(crate) fn user(id: &str, name: &str) -> RawUser {
    RawUser {
        id: id.to_string(),
        display_name: Some(name.to_string()),
        ..RawUser::default()
    }
}

impl FakeApi {
    pub(crate) fn new(followers: Vec<RawUser>, following: Vec<RawUser>) -> Self {
        Self {
            state: Mutex::new(State {
                followers,
                following,
                ..State::default()
            }),
            authenticated: true,
            page_size: 2,
        }
    }

    pub(crate) fn with_ids(followers: &[&str], following: &[&str]) -> Self {
        Self::new(
            followers.iter().map(|id| user(id, id)).collect(),
            following.iter().map(|id| user(id, id)).collect(),
        )
    }

    pub(crate) fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub(crate) fn set_followers(&self, followers: Vec<RawUser>) {
        self.state.lock().unwrap().followers = followers;
    }

    pub(crate) fn fail_lists(&self, failure: Option<Failure>) {
        self.state.lock().unwrap().list_failure = failure;
    }

    pub(crate) fn fail_mutation(&self, user_id: &str, failure: Failure) {
        self.state
            .lock()
            .unwrap()
            .mutation_failures
            .insert(user_id.to_string(), failure);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub(crate) fn mutation_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().mutation_calls.clone()
    }

    fn page(&self, pick: fn(&State) -> &Vec<RawUser>, cursor: Option<&str>) -> Result<UserPage> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(failure) = state.list_failure {
            return Err(failure.to_error());
        }

        let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let all = pick(&state);
        let end = (start + self.page_size).min(all.len());
        Ok(UserPage {
            users: all[start.min(end)..end].to_vec(),
            next_cursor: (end < all.len()).then(|| end.to_string()),
        })
    }

    fn mutate(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.mutation_calls.push(user_id.to_string());
        match state.mutation_failures.get(user_id) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

impl RelationshipApi for FakeApi {
    fn has_credentials(&self) -> bool {
        self.authenticated
    }

    async fn followers_page(&self, cursor: Option<&str>, _limit: usize) -> Result<UserPage> {
        self.page(|s| &s.followers, cursor)
    }

    async fn following_page(&self, cursor: Option<&str>, _limit: usize) -> Result<UserPage> {
        self.page(|s| &s.following, cursor)
    }

    async fn profile(&self) -> Result<RawProfile> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(failure) = state.list_failure {
            return Err(failure.to_error());
        }
        Ok(RawProfile {
            id: "me".to_string(),
            username: Some("owner".to_string()),
            follower_count: Some(state.followers.len() as u64),
            following_count: Some(state.following.len() as u64),
            ..RawProfile::default()
        })
    }

    async fn remove_follower(&self, user_id: &str) -> Result<()> {
        self.mutate(user_id)
    }

    async fn block_user(&self, user_id: &str) -> Result<()> {
        self.mutate(user_id)
    }
}
