pub const ARTICLES_PATH: &str = "/articles";

pub fn article_path(article_id: i64) -> String {
    format!("{ARTICLES_PATH}/{article_id}")
}
