//! Entity repositories over the catalog pool. Plain CRUD lives here; the
//! scan engine only depends on platform resolution and game insertion.

mod api_keys;
mod collections;
mod games;
mod platforms;
mod users;

pub use api_keys::ApiKeyRepository;
pub use collections::CollectionRepository;
pub use games::GameRepository;
pub use platforms::PlatformRepository;
pub use users::UserRepository;
