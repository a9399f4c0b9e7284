use shared::error::AppResult;

// bcrypt は CPU を占有するので、非同期ワーカーではなくブロッキング用スレッドで実行する
pub(crate) async fn hash(password: String) -> AppResult<String> {
    let hashed =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST)).await??;
    Ok(hashed)
}

pub(crate) async fn verify(password: String, password_hash: String) -> AppResult<bool> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??;
    Ok(valid)
}
