//! JSON shapes shared by the HTTP API and the client.

use serde::{Deserialize, Serialize};

use crate::db::{Post, User};

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.uuid,
            username: user.username,
            email: user.email,
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: UserProfile,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for Blog {
    fn from(post: Post) -> Self {
        Self {
            id: post.uuid,
            title: post.title,
            content: post.content,
            author: UserProfile {
                id: post.author_uuid,
                username: post.author_username,
                email: post.author_email,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
