use sqlx::{Pool, Postgres};

mod category;
pub use category::CategoryExt;

mod news;
pub use news::NewsExt;

mod review;
pub use review::ReviewExt;

mod tool;
pub use tool::ToolExt;

mod user;
pub use user::UserExt;

/// Handle to the directory tables. Built once in `main` and cloned into
/// `AppState`; every data-access trait is implemented on it.
#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}
impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}
