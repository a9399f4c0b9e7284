/// Paging and filtering options shared by list queries.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub active: Option<bool>,
    pub name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ListOptions {
    pub const DEFAULT_LIMIT: i64 = 100;

    // LIKE 検索用のパターン。未指定ならすべてにマッチさせる
    // ワイルドカード文字は ESCAPE '\' でリテラルとして扱う
    pub fn name_pattern(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => {
                let mut pattern = String::from("%");
                for c in name.trim().to_lowercase().chars() {
                    if matches!(c, '%' | '_' | '\\') {
                        pattern.push('\\');
                    }
                    pattern.push(c);
                }
                pattern.push('%');
                pattern
            }
            _ => "%".into(),
        }
    }
}
