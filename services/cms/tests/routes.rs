//! End-to-end tests driving the router the way a browser would: form posts,
//! redirects and a session cookie carried between requests.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use cms_lib::{
    adapters::hash_password,
    config::Config,
    web::{
        pages::escape,
        router,
        session::{SessionData, SessionKey, COOKIE_NAME},
        AppState,
    },
};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "integration test secret";

/// Hashing is slow, so the users file is produced once per test binary.
fn users_yaml() -> &'static str {
    static USERS: OnceLock<String> = OnceLock::new();
    USERS.get_or_init(|| {
        format!(
            "admin: '{}'\nnilin: '{}'\n",
            hash_password("secret").unwrap(),
            hash_password("lifeboat").unwrap()
        )
    })
}

struct TestApp {
    router: Router,
    data_dir: PathBuf,
    cookie: Option<String>,
    _root: TempDir,
}

struct Page {
    status: StatusCode,
    location: Option<String>,
    content_type: Option<String>,
    body: String,
}

impl TestApp {
    async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let data_dir = root.path().join("test").join("data");
        let users_file = root.path().join("test").join("users.yml");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(&users_file, users_yaml()).unwrap();

        let config = Config::for_paths(data_dir.clone(), users_file, SECRET);
        let state = AppState::from_config(config).await.unwrap();

        Self {
            router: router(Arc::new(state)),
            data_dir,
            cookie: None,
            _root: root,
        }
    }

    /// Same as a fresh browser whose cookie says `admin` is signed in.
    async fn as_admin() -> Self {
        let mut app = Self::new().await;
        let data = SessionData {
            username: Some("admin".to_string()),
            ..SessionData::default()
        };
        let value = SessionKey::new(SECRET.as_bytes()).unwrap().encode(&data);
        app.cookie = Some(format!("{}={}", COOKIE_NAME, value));
        app
    }

    fn create_document(&self, name: &str, content: &str) {
        std::fs::write(self.data_dir.join(name), content).unwrap();
    }

    fn document_exists(&self, name: &str) -> bool {
        self.data_dir.join(name).exists()
    }

    fn read_document(&self, name: &str) -> String {
        std::fs::read_to_string(self.data_dir.join(name)).unwrap()
    }

    async fn send(&mut self, request: Request<Body>) -> Page {
        let response = self.router.clone().oneshot(request).await.unwrap();
        self.remember_cookie(&response);

        let header_str = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let status = response.status();
        let location = header_str(header::LOCATION);
        let content_type = header_str(header::CONTENT_TYPE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Page {
            status,
            location,
            content_type,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    fn remember_cookie(&mut self, response: &Response) {
        if let Some(set) = response.headers().get(header::SET_COOKIE) {
            let set = set.to_str().unwrap();
            let pair = set.split(';').next().unwrap().trim().to_string();
            self.cookie = Some(pair);
        }
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn get(&mut self, uri: &str) -> Page {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Follows a redirect and returns the page it lands on.
    async fn follow(&mut self, page: &Page) -> Page {
        assert_eq!(page.status, StatusCode::FOUND, "expected a redirect");
        let location = page.location.clone().unwrap();
        self.get(&location).await
    }
}

//=========================================================================================
// Browsing
//=========================================================================================

#[tokio::test]
async fn index_lists_documents() {
    let mut app = TestApp::new().await;
    app.create_document("about.md", "");
    app.create_document("changes.txt", "");

    let page = app.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.content_type.as_deref(), Some("text/html;charset=utf-8"));
    assert!(page.body.contains("about.md"));
    assert!(page.body.contains("changes.txt"));
}

#[tokio::test]
async fn text_document_is_served_raw() {
    let mut app = TestApp::new().await;
    app.create_document("changes.txt", "This is just a test.");

    let page = app.get("/changes.txt").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.content_type.as_deref(), Some("text/plain"));
    assert_eq!(page.body, "This is just a test.");
}

#[tokio::test]
async fn markdown_document_is_rendered() {
    let mut app = TestApp::new().await;
    app.create_document("about.md", "# Ruby is...");

    let page = app.get("/about.md").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.content_type.as_deref(), Some("text/html;charset=utf-8"));
    assert!(page.body.contains("<h1>Ruby is...</h1>"));
}

#[tokio::test]
async fn missing_document_flashes_once() {
    let mut app = TestApp::new().await;

    let redirect = app.get("/nothing.txt").await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(redirect.location.as_deref(), Some("/"));

    let home = app.follow(&redirect).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("nothing.txt does not exist."));

    let again = app.get("/").await;
    assert!(!again.body.contains("nothing.txt does not exist."));
}

#[tokio::test]
async fn path_traversal_is_treated_as_missing() {
    let mut app = TestApp::new().await;

    let redirect = app.get("/..%2Fusers.yml").await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("does not exist."));
}

//=========================================================================================
// Creating
//=========================================================================================

#[tokio::test]
async fn new_document_form() {
    let mut app = TestApp::as_admin().await;

    let page = app.get("/new/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("<input"));
    assert!(page.body.contains(r#"<button type="submit""#));
}

#[tokio::test]
async fn create_document() {
    let mut app = TestApp::as_admin().await;

    let redirect = app.post("/create", &[("docu_name", "  test.txt ")]).await;
    assert_eq!(redirect.status, StatusCode::FOUND);

    let home = app.follow(&redirect).await;
    assert!(home.body.contains("test.txt was created."));

    let listing = app.get("/").await;
    assert!(listing.body.contains("test.txt"));
    assert!(!listing.body.contains("test.txt was created."));
    assert_eq!(app.read_document("test.txt"), "");

    let raw = app.get("/test.txt").await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.body, "");
}

#[tokio::test]
async fn create_requires_extension() {
    let mut app = TestApp::as_admin().await;

    for name in ["", "notes", "picture.png"] {
        let page = app.post("/create", &[("docu_name", name)]).await;
        assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(page
            .body
            .contains("Files must be either plain text (.txt) or markdown (.md)."));
    }
    assert!(!app.document_exists("notes"));
    assert!(!app.document_exists("picture.png"));
}

#[tokio::test]
async fn create_requires_a_base_name() {
    let mut app = TestApp::as_admin().await;

    let page = app.post("/create", &[("docu_name", ".txt")]).await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Filename must have at least one character."));
    assert!(!app.document_exists(".txt"));
}

#[tokio::test]
async fn create_rejects_hidden_names() {
    let mut app = TestApp::as_admin().await;

    let page = app.post("/create", &[("docu_name", ".hidden.md")]).await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Filename must not start with a dot."));
    assert!(!page.body.contains(".hidden.md was created."));
    assert!(!app.document_exists(".hidden.md"));
}

#[tokio::test]
async fn every_created_document_is_listed() {
    let mut app = TestApp::as_admin().await;

    for name in ["a.md", "notes.v2.txt", "with space.txt"] {
        let redirect = app.post("/create", &[("docu_name", name)]).await;
        assert_eq!(redirect.status, StatusCode::FOUND, "{name}");
        app.follow(&redirect).await;

        let listing = app.get("/").await;
        assert!(listing.body.contains(&escape(name)), "{name} not listed");
    }
}

#[tokio::test]
async fn create_does_not_overwrite() {
    let mut app = TestApp::as_admin().await;
    app.create_document("about.md", "# Keep me");

    let page = app.post("/create", &[("docu_name", "about.md")]).await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page
        .body
        .contains("about.md already exists. Please enter a different name."));
    assert_eq!(app.read_document("about.md"), "# Keep me");
}

//=========================================================================================
// Editing and deleting
//=========================================================================================

#[tokio::test]
async fn edit_form_is_prefilled() {
    let mut app = TestApp::as_admin().await;
    app.create_document("changes.txt", "The old content.");

    let page = app.get("/changes.txt/edit").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.content_type.as_deref(), Some("text/html;charset=utf-8"));
    assert!(page.body.contains("<textarea"));
    assert!(page.body.contains("The old content."));
    assert!(page.body.contains(r#"<button type="submit""#));
}

#[tokio::test]
async fn edit_form_for_missing_document() {
    let mut app = TestApp::new().await;

    let redirect = app.get("/ghost.md/edit").await;
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("ghost.md does not exist."));
    assert!(!home.body.contains("You must be signed in to do that."));
}

#[tokio::test]
async fn update_replaces_content() {
    let mut app = TestApp::as_admin().await;
    app.create_document("changes.txt", "The old content.");

    let redirect = app
        .post("/changes.txt", &[("new_content", "Some new content.")])
        .await;
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("The file changes.txt has been updated."));

    let page = app.get("/changes.txt").await;
    assert!(page.body.contains("Some new content."));
    assert!(!page.body.contains("The old content."));
}

#[tokio::test]
async fn update_writes_documents_that_did_not_exist() {
    let mut app = TestApp::as_admin().await;

    let redirect = app.post("/brand-new.txt", &[("new_content", "hi")]).await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(app.read_document("brand-new.txt"), "hi");
}

#[tokio::test]
async fn delete_document() {
    let mut app = TestApp::as_admin().await;
    app.create_document("test.txt", "");

    let redirect = app.post("/test.txt/delete", &[]).await;
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("test.txt has been deleted."));

    let listing = app.get("/").await;
    assert!(!listing.body.contains("test.txt"));
    assert!(!app.document_exists("test.txt"));
}

#[tokio::test]
async fn delete_missing_document() {
    let mut app = TestApp::new().await;

    let redirect = app.post("/ghost.txt/delete", &[]).await;
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("ghost.txt does not exist."));
}

//=========================================================================================
// Sign-in gate
//=========================================================================================

async fn assert_requires_sign_in(app: &mut TestApp, page: Page) {
    assert_eq!(page.status, StatusCode::FOUND);
    assert_eq!(page.location.as_deref(), Some("/"));
    let home = app.follow(&page).await;
    assert!(home.body.contains("You must be signed in to do that."));
}

#[tokio::test]
async fn protected_actions_require_sign_in() {
    let mut app = TestApp::new().await;
    app.create_document("changes.txt", "The old content.");

    let page = app.get("/new/").await;
    assert_requires_sign_in(&mut app, page).await;

    let page = app.post("/create", &[("docu_name", "test.txt")]).await;
    assert_requires_sign_in(&mut app, page).await;
    assert!(!app.document_exists("test.txt"));

    let page = app.get("/changes.txt/edit").await;
    assert_requires_sign_in(&mut app, page).await;

    let page = app
        .post("/changes.txt", &[("new_content", "Some new content.")])
        .await;
    assert_requires_sign_in(&mut app, page).await;
    assert_eq!(app.read_document("changes.txt"), "The old content.");

    let page = app.post("/changes.txt/delete", &[]).await;
    assert_requires_sign_in(&mut app, page).await;
    assert!(app.document_exists("changes.txt"));
}

#[tokio::test]
async fn forged_cookie_is_not_signed_in() {
    let mut app = TestApp::new().await;
    let data = SessionData {
        username: Some("admin".to_string()),
        ..SessionData::default()
    };
    let forged = SessionKey::new(b"wrong key").unwrap().encode(&data);
    app.cookie = Some(format!("{}={}", COOKIE_NAME, forged));

    let page = app.get("/new/").await;
    assert_requires_sign_in(&mut app, page).await;
}

//=========================================================================================
// Signing in and out
//=========================================================================================

#[tokio::test]
async fn signed_out_index_offers_sign_in() {
    let mut app = TestApp::new().await;

    let page = app.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Sign In"));
}

#[tokio::test]
async fn sign_in_form() {
    let mut app = TestApp::new().await;

    let page = app.get("/users/signin").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(r#"<input type="text" name="username""#));
    assert!(page.body.contains(r#"<input type="password" name="password""#));
}

#[tokio::test]
async fn unsuccessful_sign_in() {
    let mut app = TestApp::new().await;

    let page = app
        .post(
            "/users/signin",
            &[("username", "someone"), ("password", "something")],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Invalid Credentials! Try again!"));
    assert!(page.body.contains(r#"<input type="text" name="username" id="username" value="someone">"#));
    assert!(page.body.contains(r#"name="password" id="password" value="""#));

    let page = app.get("/new/").await;
    assert_requires_sign_in(&mut app, page).await;
}

#[tokio::test]
async fn sign_in_with_wrong_password() {
    let mut app = TestApp::new().await;

    let page = app
        .post("/users/signin", &[("username", "admin"), ("password", "wrong")])
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Invalid Credentials! Try again!"));
}

#[tokio::test]
async fn successful_sign_in() {
    let mut app = TestApp::new().await;

    let redirect = app
        .post("/users/signin", &[("username", "admin"), ("password", "secret")])
        .await;
    assert_eq!(redirect.status, StatusCode::FOUND);

    let home = app.follow(&redirect).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Welcome, admin!"));
    assert!(home.body.contains("Signed in as admin"));
    assert!(home.body.contains("Sign Out"));

    let form = app.get("/new/").await;
    assert_eq!(form.status, StatusCode::OK);
}

#[tokio::test]
async fn second_user_from_users_file() {
    let mut app = TestApp::new().await;

    let redirect = app
        .post("/users/signin", &[("username", "nilin"), ("password", "lifeboat")])
        .await;
    let home = app.follow(&redirect).await;
    assert!(home.body.contains("Welcome, nilin!"));
}

#[tokio::test]
async fn sign_out() {
    let mut app = TestApp::new().await;
    let redirect = app
        .post("/users/signin", &[("username", "admin"), ("password", "secret")])
        .await;
    app.follow(&redirect).await;

    let redirect = app.get("/admin/signout").await;
    let home = app.follow(&redirect).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains(&escape("You've been signed out.")));

    let page = app.get("/").await;
    assert!(page.body.contains("Sign In"));
    assert!(!page.body.contains("Signed in as"));

    let page = app.post("/create", &[("docu_name", "test.txt")]).await;
    assert_requires_sign_in(&mut app, page).await;
}
