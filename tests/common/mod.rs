//! In-process stub of the library API for integration tests.
//!
//! Seeds a couple of accounts and books, enforces bearer auth, and records
//! every request so tests can assert on the traffic the client produced.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const ALICE: (&str, &str, &str) = ("u-1", "alice", "password1");
pub const ADMIN: (&str, &str, &str) = ("u-9", "admin", "adminpass");

#[derive(Debug, Clone)]
pub struct StubBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl StubBook {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "genre": self.genre,
            "isbn": self.isbn,
            "total_copies": self.total_copies,
            "available_copies": self.available_copies,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StubUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: String,
    pub borrowed: BTreeSet<String>,
}

impl StubUser {
    fn to_json(&self) -> Value {
        // The wire format keys the identifier as `user_id`
        json!({
            "user_id": self.id,
            "username": self.username,
            "email": self.email,
            "role": self.role,
            "borrowed_books": self.borrowed.iter().collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Default)]
pub struct StubState {
    pub books: Vec<StubBook>,
    pub users: Vec<StubUser>,
    pub requests: Vec<String>,
    /// Artificial latency applied to searches for this exact query
    pub search_delay: Option<(String, Duration)>,
    next_book_id: u32,
}

impl StubState {
    fn seeded() -> Self {
        let book = |id: &str, title: &str, author: &str, total: u32, available: u32| StubBook {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            genre: "Fiction".to_string(),
            isbn: format!("97800000000{}", id.trim_start_matches("b-")),
            total_copies: total,
            available_copies: available,
        };
        let user = |(id, name, password): (&str, &str, &str), role: &str| StubUser {
            id: id.to_string(),
            username: name.to_string(),
            password: password.to_string(),
            email: format!("{}@example.org", name),
            role: role.to_string(),
            borrowed: BTreeSet::new(),
        };
        Self {
            books: vec![
                book("b-1", "Dune", "Frank Herbert", 2, 2),
                book("b-2", "Neuromancer", "William Gibson", 1, 1),
                book("b-3", "Foundation", "Isaac Asimov", 1, 0),
            ],
            users: vec![user(ALICE, "user"), user(ADMIN, "admin")],
            requests: Vec::new(),
            search_delay: None,
            next_book_id: 4,
        }
    }

    fn user_for_token(&self, token: &str) -> Option<&StubUser> {
        let user_id = token.strip_prefix("tok-")?;
        self.users.iter().find(|u| u.id == user_id)
    }
}

type Shared = Arc<Mutex<StubState>>;
type Reply = (StatusCode, Json<Value>);

pub struct StubServer {
    pub base_url: String,
    pub state: Shared,
}

impl StubServer {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::seeded()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            base_url: format!("http://{}/api/v1", addr),
            state,
        }
    }

    /// Every request seen so far, as "METHOD /path[?query]"
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().expect("stub state").requests.clone()
    }

    pub fn set_search_delay(&self, query: &str, delay: Duration) {
        self.state.lock().expect("stub state").search_delay = Some((query.to_string(), delay));
    }

    pub fn available_copies(&self, book_id: &str) -> Option<u32> {
        self.state
            .lock()
            .expect("stub state")
            .books
            .iter()
            .find(|b| b.id == book_id)
            .map(|b| b.available_copies)
    }
}

fn router(state: Shared) -> Router {
    let api_v1 = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/books", get(list_books))
        .route("/books/search", get(search_books))
        .route("/books/:id", get(get_book))
        .route("/books/:id/borrow", post(borrow_book))
        .route("/books/:id/return", post(return_book))
        .route("/mybooks", get(my_books))
        .route("/admin/books", post(create_book))
        .route("/admin/books/:id", put(update_book))
        .route("/admin/books/:id", delete(delete_book))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(change_role))
        .route("/admin/users/:id", delete(delete_user))
        .with_state(state);

    Router::new().nest("/api/v1", api_v1)
}

fn record(state: &Shared, line: String) {
    state.lock().expect("stub state").requests.push(line);
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Not authenticated" })),
    )
}

fn rejected(status: StatusCode, detail: &str) -> Reply {
    (status, Json(json!({ "detail": detail })))
}

fn caller_id(state: &Shared, headers: &HeaderMap) -> Result<String, Reply> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;
    let guard = state.lock().expect("stub state");
    guard
        .user_for_token(token)
        .map(|u| u.id.clone())
        .ok_or_else(unauthorized)
}

fn admin_id(state: &Shared, headers: &HeaderMap) -> Result<String, Reply> {
    let id = caller_id(state, headers)?;
    let guard = state.lock().expect("stub state");
    let caller = guard.users.iter().find(|u| u.id == id);
    match caller {
        Some(u) if u.role == "admin" => Ok(id),
        _ => Err(rejected(StatusCode::FORBIDDEN, "Admins only")),
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    record(&state, "POST /auth/signup".to_string());

    // FastAPI-style structured validation errors
    let mut detail = Vec::new();
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if username.len() < 3 {
        detail.push(json!({
            "loc": ["body", "username"],
            "msg": "ensure this value has at least 3 characters",
            "type": "value_error",
        }));
    }
    if !email.contains('@') {
        detail.push(json!({
            "loc": ["body", "email"],
            "msg": "value is not a valid email address",
            "type": "value_error.email",
        }));
    }
    if password.len() < 6 {
        detail.push(json!({
            "loc": ["body", "password"],
            "msg": "ensure this value has at least 6 characters",
            "type": "value_error",
        }));
    }
    if !detail.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": detail })),
        );
    }

    let mut guard = state.lock().expect("stub state");
    if guard.users.iter().any(|u| u.username == username) {
        return rejected(StatusCode::BAD_REQUEST, "Username already exists");
    }
    let user = StubUser {
        id: format!("u-{}", guard.users.len() + 1),
        username: username.to_string(),
        password: password.to_string(),
        email: email.to_string(),
        role: "user".to_string(),
        borrowed: BTreeSet::new(),
    };
    let reply = user.to_json();
    guard.users.push(user);
    (StatusCode::OK, Json(reply))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    record(&state, "POST /auth/login".to_string());
    let guard = state.lock().expect("stub state");
    let user = guard.users.iter().find(|u| {
        u.username == body["username"].as_str().unwrap_or_default()
            && u.password == body["password"].as_str().unwrap_or_default()
    });
    match user {
        Some(user) => (
            StatusCode::OK,
            Json(json!({
                "access_token": format!("tok-{}", user.id),
                "token_type": "bearer",
                "role": user.role,
                "username": user.username,
                "user_id": user.id,
            })),
        ),
        None => rejected(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn list_books(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET /books".to_string());
    if let Err(reply) = caller_id(&state, &headers) {
        return reply;
    }
    let guard = state.lock().expect("stub state");
    let books: Vec<Value> = guard.books.iter().map(StubBook::to_json).collect();
    (StatusCode::OK, Json(Value::Array(books)))
}

async fn search_books(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Reply {
    let query = params.get("query").cloned().unwrap_or_default();
    record(&state, format!("GET /books/search?query={}", query));
    if let Err(reply) = caller_id(&state, &headers) {
        return reply;
    }

    let delay = {
        let guard = state.lock().expect("stub state");
        guard
            .search_delay
            .as_ref()
            .filter(|(q, _)| *q == query)
            .map(|(_, d)| *d)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let needle = query.to_lowercase();
    let guard = state.lock().expect("stub state");
    let books: Vec<Value> = guard
        .books
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&needle)
                || b.author.to_lowercase().contains(&needle)
                || b.genre.to_lowercase().contains(&needle)
        })
        .map(StubBook::to_json)
        .collect();
    (StatusCode::OK, Json(Value::Array(books)))
}

async fn get_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    record(&state, format!("GET /books/{}", id));
    if let Err(reply) = caller_id(&state, &headers) {
        return reply;
    }
    let guard = state.lock().expect("stub state");
    match guard.books.iter().find(|b| b.id == id) {
        Some(book) => (StatusCode::OK, Json(book.to_json())),
        None => rejected(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn borrow_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    record(&state, format!("POST /books/{}/borrow", id));
    let caller = match caller_id(&state, &headers) {
        Ok(caller) => caller,
        Err(reply) => return reply,
    };
    let mut guard = state.lock().expect("stub state");
    let available = match guard.books.iter().find(|b| b.id == id) {
        Some(book) => book.available_copies,
        None => return rejected(StatusCode::NOT_FOUND, "Book not found"),
    };
    if available == 0 {
        return rejected(StatusCode::BAD_REQUEST, "No copies available");
    }
    let Some(user) = guard.users.iter_mut().find(|u| u.id == caller) else {
        return unauthorized();
    };
    if !user.borrowed.insert(id.clone()) {
        return rejected(StatusCode::BAD_REQUEST, "You have already borrowed this book");
    }
    if let Some(book) = guard.books.iter_mut().find(|b| b.id == id) {
        book.available_copies -= 1;
    }
    (StatusCode::OK, Json(json!({ "detail": "Book borrowed" })))
}

async fn return_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, String) {
    record(&state, format!("POST /books/{}/return", id));
    let caller = match caller_id(&state, &headers) {
        Ok(caller) => caller,
        Err((status, Json(body))) => return (status, body.to_string()),
    };
    let mut guard = state.lock().expect("stub state");
    let Some(user) = guard.users.iter_mut().find(|u| u.id == caller) else {
        return (
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Not authenticated" }).to_string(),
        );
    };
    if !user.borrowed.remove(&id) {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "detail": "You have not borrowed this book" }).to_string(),
        );
    }
    if let Some(book) = guard.books.iter_mut().find(|b| b.id == id) {
        book.available_copies = (book.available_copies + 1).min(book.total_copies);
    }
    // Deliberately empty body: clients must tolerate it
    (StatusCode::OK, String::new())
}

async fn my_books(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET /mybooks".to_string());
    let caller = match caller_id(&state, &headers) {
        Ok(caller) => caller,
        Err(reply) => return reply,
    };
    let guard = state.lock().expect("stub state");
    let borrowed = guard
        .users
        .iter()
        .find(|u| u.id == caller)
        .map(|u| u.borrowed.clone())
        .unwrap_or_default();
    let books: Vec<Value> = guard
        .books
        .iter()
        .filter(|b| borrowed.contains(&b.id))
        .map(StubBook::to_json)
        .collect();
    (StatusCode::OK, Json(Value::Array(books)))
}

async fn create_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, "POST /admin/books".to_string());
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let mut guard = state.lock().expect("stub state");
    let total = body["total_copies"].as_u64().unwrap_or(1) as u32;
    let book = StubBook {
        id: format!("b-{}", guard.next_book_id),
        title: body["title"].as_str().unwrap_or_default().to_string(),
        author: body["author"].as_str().unwrap_or_default().to_string(),
        genre: body["genre"].as_str().unwrap_or_default().to_string(),
        isbn: body["isbn"].as_str().unwrap_or_default().to_string(),
        total_copies: total,
        available_copies: total,
    };
    guard.next_book_id += 1;
    let reply = book.to_json();
    guard.books.push(book);
    (StatusCode::OK, Json(reply))
}

async fn update_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, format!("PUT /admin/books/{}", id));
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let mut guard = state.lock().expect("stub state");
    let Some(book) = guard.books.iter_mut().find(|b| b.id == id) else {
        return rejected(StatusCode::NOT_FOUND, "Book not found");
    };
    let new_total = body["total_copies"].as_u64().unwrap_or(1) as u32;
    let on_loan = book.total_copies - book.available_copies;
    book.title = body["title"].as_str().unwrap_or_default().to_string();
    book.author = body["author"].as_str().unwrap_or_default().to_string();
    book.genre = body["genre"].as_str().unwrap_or_default().to_string();
    book.isbn = body["isbn"].as_str().unwrap_or_default().to_string();
    book.total_copies = new_total;
    book.available_copies = new_total.saturating_sub(on_loan);
    (StatusCode::OK, Json(book.to_json()))
}

async fn delete_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    record(&state, format!("DELETE /admin/books/{}", id));
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let mut guard = state.lock().expect("stub state");
    let before = guard.books.len();
    guard.books.retain(|b| b.id != id);
    if guard.books.len() == before {
        return rejected(StatusCode::NOT_FOUND, "Book not found");
    }
    (StatusCode::OK, Json(json!({ "detail": "Book deleted" })))
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET /admin/users".to_string());
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let guard = state.lock().expect("stub state");
    let users: Vec<Value> = guard.users.iter().map(StubUser::to_json).collect();
    (StatusCode::OK, Json(Value::Array(users)))
}

async fn change_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, format!("PUT /admin/users/{}", id));
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let new_role = body["new_role"].as_str().unwrap_or_default().to_string();
    if new_role != "user" && new_role != "admin" {
        return rejected(StatusCode::BAD_REQUEST, "Invalid role");
    }
    let mut guard = state.lock().expect("stub state");
    let Some(user) = guard.users.iter_mut().find(|u| u.id == id) else {
        return rejected(StatusCode::NOT_FOUND, "User not found");
    };
    user.role = new_role;
    let reply = user.to_json();
    (StatusCode::OK, Json(reply))
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    record(&state, format!("DELETE /admin/users/{}", id));
    if let Err(reply) = admin_id(&state, &headers) {
        return reply;
    }
    let mut guard = state.lock().expect("stub state");
    let before = guard.users.len();
    guard.users.retain(|u| u.id != id);
    if guard.users.len() == before {
        return rejected(StatusCode::NOT_FOUND, "User not found");
    }
    (
        StatusCode::OK,
        Json(json!({ "detail": "User deleted successfully" })),
    )
}
