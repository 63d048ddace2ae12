#[derive(Debug, Clone)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
}
