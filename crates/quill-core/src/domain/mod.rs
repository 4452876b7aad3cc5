//! Domain entities - the core business objects.

mod comment;
mod page;
mod post;
mod tag;

pub use comment::{Comment, NewComment};
pub use page::{Page, requested_page};
pub use post::{CommentedPost, Post, PostStatus, SearchHit};
pub use tag::Tag;
