pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod paths;
pub mod render;
pub mod seed;
pub mod store;

pub mod prelude {
    pub use crate::client::Pressroom;
    pub use crate::models::Article;
    pub use crate::render::Renderer;
    pub use crate::seed::SeedData;
    pub use crate::store::ArticleStore;
}
