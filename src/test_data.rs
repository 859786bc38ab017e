//! Shared fixtures for tests

use serde_json::{json, Value};

/// A small dataset export: two posts, one draft, one author, and comments
/// for `hello-world` of which two are approved and one is pending
pub fn hello_world_dataset() -> Vec<Value> {
    vec![
        json!({ "_id": "author-1", "_type": "author", "name": "Jane Doe",
                "image": { "asset": { "_ref": "image-face-100x100-png" } } }),
        json!({ "_id": "post-1", "_type": "post", "_createdAt": "2022-03-01T10:00:00Z",
                "title": "Hello World", "description": "First post",
                "slug": { "_type": "slug", "current": "hello-world" },
                "mainImage": { "asset": { "_ref": "image-cover-1200x600-jpg" } },
                "author": { "_type": "reference", "_ref": "author-1" },
                "body": [
                    { "_type": "block", "style": "h1",
                      "children": [{ "_type": "span", "text": "Welcome" }] },
                    { "_type": "block", "style": "normal",
                      "children": [{ "_type": "span", "text": "Glad you are here." }] },
                    { "_type": "youtube", "text": "embedded video" }
                ] }),
        json!({ "_id": "post-2", "_type": "post", "_createdAt": "2022-04-01T10:00:00Z",
                "title": "Second", "slug": { "current": "second" } }),
        json!({ "_id": "drafts.post-3", "_type": "post", "_createdAt": "2022-05-01T10:00:00Z",
                "title": "Draft", "slug": { "current": "draft" } }),
        json!({ "_id": "c1", "_type": "comment", "post": { "_ref": "post-1" },
                "name": "A", "email": "a@example.com", "comment": "first", "approved": true }),
        json!({ "_id": "c2", "_type": "comment", "post": { "_ref": "post-1" },
                "name": "B", "email": "b@example.com", "comment": "pending", "approved": false }),
        json!({ "_id": "c3", "_type": "comment", "post": { "_ref": "post-1" },
                "name": "C", "email": "c@example.com", "comment": "second", "approved": true }),
        json!({ "_id": "c4", "_type": "comment", "post": { "_ref": "post-2" },
                "name": "D", "email": "d@example.com", "comment": "elsewhere", "approved": true }),
    ]
}
