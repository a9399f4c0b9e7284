use std::sync::Arc;

use api::model::{
    checkin::{AssignRequest, CheckinListQuery, CheckinRequest, CheckinResponse, CheckinsResponse},
    facility::{FacilitiesResponse, FacilityRequest, FacilityResponse},
    guest::{GuestRequest, GuestResponse, GuestsResponse},
    list::ListQuery,
    log::{ClientLogRequest, LogFilesResponse},
    summary::{SummariesResponse, SummaryResponse},
    template::{TemplateRequest, TemplateResponse, TemplatesResponse},
    user::{CreateUserRequest, UpdateUserRequest, UserResponse, UsersResponse},
};
use chrono::NaiveDate;
use kernel::model::id::{CheckinId, FacilityId, GuestId, TemplateId, UserId};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{ClientError, ClientResult},
    oauth::OAuthClient,
    state::{LoginState, LoginTokens},
};

/// Typed access to the `/api` routes on behalf of the logged-in user.
#[derive(Debug, Clone)]
pub struct FacilityClient {
    http: Client,
    base: Url,
    oauth: OAuthClient,
    state: Arc<LoginState>,
}

async fn check(res: Response) -> ClientResult<Response> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        let body = res.text().await.unwrap_or_default();
        Err(ClientError::from_body(status, &body))
    }
}

impl FacilityClient {
    pub fn new(base_url: &str, state: Arc<LoginState>) -> ClientResult<Self> {
        Self::with_client(Client::new(), base_url, state)
    }

    pub fn with_client(http: Client, base_url: &str, state: Arc<LoginState>) -> ClientResult<Self> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let oauth = OAuthClient::new(http.clone(), base_url);
        Ok(Self {
            http,
            base,
            oauth,
            state,
        })
    }

    pub fn state(&self) -> &Arc<LoginState> {
        &self.state
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let token = self.oauth.password(username, password).await?;
        self.state.login(username, token).await;
        tracing::debug!(username, "logged in");
        Ok(())
    }

    pub async fn logout(&self) -> ClientResult<()> {
        match self.state.logout().await {
            Some(tokens) => self.oauth.revoke(&tokens.access_token).await,
            None => Ok(()),
        }
    }

    // セグメントごとにパーセントエンコードされる
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Sends an authorized request, refreshing the access token once on 401.
    async fn execute<F>(&self, build: F) -> ClientResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let tokens = self.state.tokens().await.ok_or(ClientError::NotLoggedIn)?;
        let res = build(&tokens.access_token).send().await?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return check(res).await;
        }

        let access_token = self.refresh_after(&tokens).await?;
        check(build(&access_token).send().await?).await
    }

    // 同時に失効したリクエストは一つずつリフレッシュを試み、
    // 先に更新されていればそのアクセストークンを使う
    async fn refresh_after(&self, stale: &LoginTokens) -> ClientResult<String> {
        let _refreshing = self.state.lock_refresh().await;
        let current = self.state.tokens().await.ok_or(ClientError::NotLoggedIn)?;
        if current.access_token != stale.access_token {
            return Ok(current.access_token);
        }

        match self.oauth.refresh(&current.refresh_token).await {
            Ok(refreshed) => {
                let access_token = refreshed.access_token.clone();
                self.state.refreshed(refreshed).await;
                tracing::debug!("access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                self.state.logout_if_current(&current.refresh_token).await;
                Err(e)
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let res = self
            .execute(|token| self.http.get(url.clone()).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    async fn get_with<T, Q>(&self, url: Url, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize,
    {
        let res = self
            .execute(|token| self.http.get(url.clone()).query(query).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    async fn post<T, B>(&self, url: Url, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let res = self
            .execute(|token| self.http.post(url.clone()).json(body).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let res = self
            .execute(|token| self.http.post(url.clone()).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    async fn put<T, B>(&self, url: Url, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let res = self
            .execute(|token| self.http.put(url.clone()).json(body).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    async fn delete(&self, url: Url) -> ClientResult<()> {
        self.execute(|token| self.http.delete(url.clone()).bearer_auth(token))
            .await
            .map(|_| ())
    }

    async fn delete_with<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let res = self
            .execute(|token| self.http.delete(url.clone()).bearer_auth(token))
            .await?;
        Ok(res.json().await?)
    }

    pub async fn health(&self) -> ClientResult<bool> {
        let res = self.http.get(self.url(&["health", "db"])).send().await?;
        Ok(res.status().is_success())
    }

    // facilities

    pub async fn facilities(&self, query: &ListQuery) -> ClientResult<Vec<FacilityResponse>> {
        let res: FacilitiesResponse = self.get_with(self.url(&["facilities"]), query).await?;
        Ok(res.items)
    }

    pub async fn facility(&self, facility_id: FacilityId) -> ClientResult<FacilityResponse> {
        self.get(self.url(&["facilities", &facility_id.to_string()]))
            .await
    }

    pub async fn facility_by_name(&self, name: &str) -> ClientResult<FacilityResponse> {
        self.get(self.url(&["facilities", "exact", name])).await
    }

    pub async fn facility_by_scope(&self, scope: &str) -> ClientResult<FacilityResponse> {
        self.get(self.url(&["facilities", "scope", scope])).await
    }

    pub async fn create_facility(&self, req: &FacilityRequest) -> ClientResult<FacilityResponse> {
        self.post(self.url(&["facilities"]), req).await
    }

    pub async fn update_facility(
        &self,
        facility_id: FacilityId,
        req: &FacilityRequest,
    ) -> ClientResult<FacilityResponse> {
        self.put(self.url(&["facilities", &facility_id.to_string()]), req)
            .await
    }

    pub async fn delete_facility(&self, facility_id: FacilityId) -> ClientResult<()> {
        self.delete(self.url(&["facilities", &facility_id.to_string()]))
            .await
    }

    // guests

    pub async fn guests(
        &self,
        facility_id: FacilityId,
        query: &ListQuery,
    ) -> ClientResult<Vec<GuestResponse>> {
        let url = self.url(&["facilities", &facility_id.to_string(), "guests"]);
        let res: GuestsResponse = self.get_with(url, query).await?;
        Ok(res.items)
    }

    pub async fn guest(&self, facility_id: FacilityId, guest_id: GuestId) -> ClientResult<GuestResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "guests",
            &guest_id.to_string(),
        ]))
        .await
    }

    pub async fn guest_by_name(
        &self,
        facility_id: FacilityId,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<GuestResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "guests",
            "exact",
            first_name,
            last_name,
        ]))
        .await
    }

    pub async fn create_guest(
        &self,
        facility_id: FacilityId,
        req: &GuestRequest,
    ) -> ClientResult<GuestResponse> {
        self.post(self.url(&["facilities", &facility_id.to_string(), "guests"]), req)
            .await
    }

    pub async fn update_guest(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
        req: &GuestRequest,
    ) -> ClientResult<GuestResponse> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "guests",
            &guest_id.to_string(),
        ]);
        self.put(url, req).await
    }

    pub async fn delete_guest(&self, facility_id: FacilityId, guest_id: GuestId) -> ClientResult<()> {
        self.delete(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "guests",
            &guest_id.to_string(),
        ]))
        .await
    }

    pub async fn guest_checkins(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
    ) -> ClientResult<Vec<CheckinResponse>> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "guests",
            &guest_id.to_string(),
            "checkins",
        ]);
        let res: CheckinsResponse = self.get(url).await?;
        Ok(res.items)
    }

    // templates

    pub async fn templates(
        &self,
        facility_id: FacilityId,
        query: &ListQuery,
    ) -> ClientResult<Vec<TemplateResponse>> {
        let url = self.url(&["facilities", &facility_id.to_string(), "templates"]);
        let res: TemplatesResponse = self.get_with(url, query).await?;
        Ok(res.items)
    }

    pub async fn template(
        &self,
        facility_id: FacilityId,
        template_id: TemplateId,
    ) -> ClientResult<TemplateResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "templates",
            &template_id.to_string(),
        ]))
        .await
    }

    pub async fn template_by_name(
        &self,
        facility_id: FacilityId,
        name: &str,
    ) -> ClientResult<TemplateResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "templates",
            "exact",
            name,
        ]))
        .await
    }

    pub async fn create_template(
        &self,
        facility_id: FacilityId,
        req: &TemplateRequest,
    ) -> ClientResult<TemplateResponse> {
        self.post(
            self.url(&["facilities", &facility_id.to_string(), "templates"]),
            req,
        )
        .await
    }

    pub async fn update_template(
        &self,
        facility_id: FacilityId,
        template_id: TemplateId,
        req: &TemplateRequest,
    ) -> ClientResult<TemplateResponse> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "templates",
            &template_id.to_string(),
        ]);
        self.put(url, req).await
    }

    pub async fn delete_template(
        &self,
        facility_id: FacilityId,
        template_id: TemplateId,
    ) -> ClientResult<()> {
        self.delete(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "templates",
            &template_id.to_string(),
        ]))
        .await
    }

    // users

    pub async fn users(
        &self,
        facility_id: FacilityId,
        query: &ListQuery,
    ) -> ClientResult<Vec<UserResponse>> {
        let url = self.url(&["facilities", &facility_id.to_string(), "users"]);
        let res: UsersResponse = self.get_with(url, query).await?;
        Ok(res.items)
    }

    pub async fn user(&self, facility_id: FacilityId, user_id: UserId) -> ClientResult<UserResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "users",
            &user_id.to_string(),
        ]))
        .await
    }

    pub async fn user_by_username(&self, username: &str) -> ClientResult<UserResponse> {
        self.get(self.url(&["users", "exact", username])).await
    }

    pub async fn me(&self) -> ClientResult<UserResponse> {
        self.get(self.url(&["users", "me"])).await
    }

    pub async fn create_user(
        &self,
        facility_id: FacilityId,
        req: &CreateUserRequest,
    ) -> ClientResult<UserResponse> {
        self.post(self.url(&["facilities", &facility_id.to_string(), "users"]), req)
            .await
    }

    pub async fn update_user(
        &self,
        facility_id: FacilityId,
        user_id: UserId,
        req: &UpdateUserRequest,
    ) -> ClientResult<UserResponse> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "users",
            &user_id.to_string(),
        ]);
        self.put(url, req).await
    }

    pub async fn delete_user(&self, facility_id: FacilityId, user_id: UserId) -> ClientResult<()> {
        self.delete(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "users",
            &user_id.to_string(),
        ]))
        .await
    }

    // checkins

    pub async fn checkins(
        &self,
        facility_id: FacilityId,
        date: Option<NaiveDate>,
    ) -> ClientResult<Vec<CheckinResponse>> {
        let url = self.url(&["facilities", &facility_id.to_string(), "checkins"]);
        let res: CheckinsResponse = self.get_with(url, &CheckinListQuery { date }).await?;
        Ok(res.items)
    }

    pub async fn checkin(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
    ) -> ClientResult<CheckinResponse> {
        self.get(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
        ]))
        .await
    }

    pub async fn create_checkin(
        &self,
        facility_id: FacilityId,
        req: &CheckinRequest,
    ) -> ClientResult<CheckinResponse> {
        self.post(
            self.url(&["facilities", &facility_id.to_string(), "checkins"]),
            req,
        )
        .await
    }

    pub async fn update_checkin(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
        req: &CheckinRequest,
    ) -> ClientResult<CheckinResponse> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
        ]);
        self.put(url, req).await
    }

    pub async fn delete_checkin(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
    ) -> ClientResult<()> {
        self.delete(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
        ]))
        .await
    }

    pub async fn generate_checkins(
        &self,
        facility_id: FacilityId,
        checkin_date: NaiveDate,
        template_id: TemplateId,
    ) -> ClientResult<Vec<CheckinResponse>> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            "generate",
            &checkin_date.to_string(),
            &template_id.to_string(),
        ]);
        let res: CheckinsResponse = self.post_empty(url).await?;
        Ok(res.items)
    }

    pub async fn assign(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
        req: &AssignRequest,
    ) -> ClientResult<CheckinResponse> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
            "assignment",
        ]);
        self.post(url, req).await
    }

    pub async fn deassign(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
    ) -> ClientResult<CheckinResponse> {
        self.delete_with(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
            "assignment",
        ]))
        .await
    }

    pub async fn reassign(
        &self,
        facility_id: FacilityId,
        checkin_id: CheckinId,
        new_checkin_id: CheckinId,
    ) -> ClientResult<CheckinResponse> {
        self.post_empty(self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            &checkin_id.to_string(),
            "reassignment",
            &new_checkin_id.to_string(),
        ]))
        .await
    }

    pub async fn summaries(
        &self,
        facility_id: FacilityId,
        since: NaiveDate,
        until: NaiveDate,
    ) -> ClientResult<Vec<SummaryResponse>> {
        let url = self.url(&[
            "facilities",
            &facility_id.to_string(),
            "checkins",
            "summaries",
            &since.to_string(),
            &until.to_string(),
        ]);
        let res: SummariesResponse = self.get(url).await?;
        Ok(res.items)
    }

    // logs

    pub async fn log_files(&self) -> ClientResult<Vec<String>> {
        let res: LogFilesResponse = self.get(self.url(&["logs"])).await?;
        Ok(res.items)
    }

    pub async fn log_file(&self, name: &str) -> ClientResult<String> {
        let url = self.url(&["logs", name]);
        let res = self
            .execute(|token| self.http.get(url.clone()).bearer_auth(token))
            .await?;
        Ok(res.text().await?)
    }

    pub async fn log_file_lines(&self, name: &str) -> ClientResult<Vec<String>> {
        self.get(self.url(&["logs", name, "json"])).await
    }

    pub async fn client_log(&self, req: &ClientLogRequest) -> ClientResult<()> {
        let url = self.url(&["logs", "client"]);
        self.execute(|token| self.http.post(url.clone()).json(req).bearer_auth(token))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        net::SocketAddr,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        extract::{Path, State},
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        routing::{get, post},
        Form, Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;

    #[derive(Clone, Default)]
    struct Fake {
        refreshes: Arc<AtomicUsize>,
    }

    fn token_json(access: &str) -> Value {
        json!({
            "access_token": access,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": format!("{access}-refresh"),
            "scope": "main:admin",
        })
    }

    async fn token(
        State(fake): State<Fake>,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        match form.get("grant_type").map(String::as_str) {
            Some("password") if form.get("password").map(String::as_str) == Some("secret") => {
                (StatusCode::OK, Json(token_json("a1")))
            }
            // リフレッシュトークンは一度しか使えない
            Some("refresh_token")
                if form.get("refresh_token").map(String::as_str) == Some("a1-refresh")
                    && fake.refreshes.fetch_add(1, Ordering::SeqCst) == 0 =>
            {
                (StatusCode::OK, Json(token_json("a2")))
            }
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"statusCode": 401, "message": "ログインに失敗しました"})),
            ),
        }
    }

    fn bearer(headers: &HeaderMap) -> &str {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    // a1 は期限切れとして扱い、a2 のみ受け付ける
    async fn facilities(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if bearer(&headers) != "Bearer a2" {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"statusCode": 401, "message": "expired"})),
            );
        }
        let id = FacilityId::new();
        (
            StatusCode::OK,
            Json(json!({"items": [{"id": id.to_string(), "name": "Downtown", "scope": "main", "active": true}]})),
        )
    }

    async fn guest_by_name(
        Path((_facility_id, first, last)): Path<(String, String, String)>,
    ) -> (StatusCode, Json<Value>) {
        (
            StatusCode::OK,
            Json(json!({
                "id": GuestId::new().to_string(),
                "facilityId": FacilityId::new().to_string(),
                "firstName": first,
                "lastName": last,
                "comments": null,
                "favorite": null,
                "active": true,
            })),
        )
    }

    async fn forbidden() -> (StatusCode, Json<Value>) {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"statusCode": 403, "message": "許可されていない操作です"})),
        )
    }

    async fn conflict() -> (StatusCode, Json<Value>) {
        (
            StatusCode::CONFLICT,
            Json(json!({"statusCode": 409, "message": "Checkins already exist"})),
        )
    }

    async fn serve() -> (SocketAddr, Fake) {
        let fake = Fake::default();
        let app = Router::new()
            .route("/oauth/token", post(token))
            .route("/api/facilities", get(facilities))
            .route(
                "/api/facilities/:facility_id/guests/exact/:first_name/:last_name",
                get(guest_by_name),
            )
            .route("/api/logs", get(forbidden))
            .route(
                "/api/facilities/:facility_id/checkins/generate/:checkin_date/:template_id",
                post(conflict),
            )
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (addr, fake)
    }

    async fn logged_in() -> (FacilityClient, Fake) {
        let (addr, fake) = serve().await;
        let client =
            FacilityClient::new(&format!("http://{addr}"), Arc::new(LoginState::new())).unwrap();
        client.login("admin", "secret").await.unwrap();
        (client, fake)
    }

    #[tokio::test]
    async fn requests_need_a_login() {
        let (addr, _) = serve().await;
        let client =
            FacilityClient::new(&format!("http://{addr}"), Arc::new(LoginState::new())).unwrap();
        let res = client.facilities(&ListQuery::default()).await;
        assert!(matches!(res, Err(ClientError::NotLoggedIn)));

        let bad = client.login("admin", "wrong").await;
        assert!(matches!(bad, Err(ClientError::Server { status: 401, .. })));
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed_once() {
        let (client, fake) = logged_in().await;

        let facilities = client.facilities(&ListQuery::default()).await.unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].name, "Downtown");
        assert_eq!(fake.refreshes.load(Ordering::SeqCst), 1);

        let tokens = client.state().tokens().await.unwrap();
        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.username, "admin");
    }

    #[tokio::test]
    async fn concurrent_expired_requests_share_one_refresh() {
        let (client, fake) = logged_in().await;
        let query = ListQuery::default();

        let (first, second) = tokio::join!(client.facilities(&query), client.facilities(&query));
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(fake.refreshes.load(Ordering::SeqCst), 1);
        assert!(client.state().is_logged_in().await);
        assert_eq!(client.state().tokens().await.unwrap().access_token, "a2");
    }

    #[tokio::test]
    async fn path_segments_are_encoded() {
        let (client, _) = logged_in().await;
        let guest = client
            .guest_by_name(FacilityId::new(), "Mary Ann", "O'Neil")
            .await
            .unwrap();
        assert_eq!(guest.first_name, "Mary Ann");
        assert_eq!(guest.last_name, "O'Neil");
    }

    #[tokio::test]
    async fn server_errors_are_unwrapped() {
        let (client, _) = logged_in().await;

        let res = client.log_files().await;
        assert!(matches!(res, Err(ClientError::Forbidden)));

        let res = client
            .generate_checkins(
                FacilityId::new(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                TemplateId::new(),
            )
            .await;
        match res {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Checkins already exist");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
