//! In-memory stand-in for the libris API.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use libris_client::{
    ApiClient, ApiRequest, ApiResponse, Method, Result, RouteNavigator, Session, Transport,
};
use libris_model::{Book, BookDraft, Collection, CollectionDraft, Location, LocationDraft};
use serde_json::{Value, json};

pub const PASSWORD: &str = "secret";

#[derive(Default)]
struct ServerState {
    next_id: i64,
    books: Vec<Book>,
    collections: Vec<Collection>,
    locations: Vec<Location>,
    scripted: VecDeque<ApiResponse>,
    latencies: VecDeque<Duration>,
    requests: Vec<ApiRequest>,
}

/// Fake server keeping books, collections and locations in memory.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<ServerState>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next request with `response` instead of routing it.
    pub fn script(&self, response: ApiResponse) {
        self.state.lock().unwrap().scripted.push_back(response);
    }

    /// Delay the next request by `latency`.
    pub fn delay_next(&self, latency: Duration) {
        self.state.lock().unwrap().latencies.push_back(latency);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn seed_location(&self, name: &str) -> Location {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let location = Location {
            id: Some(state.next_id),
            name: name.to_string(),
            user_id: 1,
        };
        state.locations.push(location.clone());
        location
    }

    pub fn seed_collections(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        for n in 1..=count {
            state.next_id += 1;
            let collection = Collection {
                id: Some(state.next_id),
                name: format!("Collection {n}"),
                user_id: 1,
            };
            state.collections.push(collection);
        }
    }

    pub fn seed_books(&self, count: usize, location: &Location) {
        let mut state = self.state.lock().unwrap();
        for n in 1..=count {
            state.next_id += 1;
            let book = Book {
                id: Some(state.next_id),
                title: format!("Book {n}"),
                authors: Vec::new(),
                publisher: "Publisher".to_string(),
                languages: Vec::new(),
                edition: None,
                isbn: None,
                year: None,
                genres: Vec::new(),
                cover: None,
                collection: None,
                location: location.clone(),
                user_id: 1,
            };
            state.books.push(book);
        }
    }

    fn route(state: &mut ServerState, request: &ApiRequest) -> ApiResponse {
        if let Some(response) = state.scripted.pop_front() {
            return response;
        }
        if request.authorized && request.bearer.is_none() {
            return ApiResponse::json(401, &json!({"msg": "missing token"}));
        }

        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);
        match (request.method, segments.as_slice()) {
            (Method::Post, ["v1", "auth", "login"]) => {
                if body["password"] == PASSWORD {
                    ApiResponse::json(200, &json!({"access_token": token_for(&body["email"])}))
                } else {
                    ApiResponse::json(401, &json!({"msg": "invalid email or password"}))
                }
            }
            (Method::Get, ["v1", "books"]) => list_books(state, request),
            (Method::Get, ["v1", "books", id]) => {
                match state.books.iter().find(|b| b.id == id.parse().ok()) {
                    Some(book) => ApiResponse::json(200, &json!(book)),
                    None => ApiResponse::json(404, &json!({"msg": "book not found"})),
                }
            }
            (Method::Post | Method::Put, ["v1", "books"]) => save_book(state, request.method, body),
            (Method::Delete, ["v1", "books", id]) => {
                let id = id.parse().ok();
                state.books.retain(|b| b.id != id);
                ApiResponse::json(200, &json!({}))
            }
            (Method::Get, ["v1", "collections"]) => {
                ApiResponse::json(200, &json!({"collections": state.collections}))
            }
            (Method::Post | Method::Put, ["v1", "collections"]) => {
                let Ok(draft) = serde_json::from_value::<CollectionDraft>(body) else {
                    return ApiResponse::new(400, "not json");
                };
                if draft.name.trim().is_empty() {
                    return name_required("collection");
                }
                let collection = Collection {
                    id: Some(draft.id.unwrap_or_else(|| allocate(state))),
                    name: draft.name,
                    user_id: draft.user_id,
                };
                state.collections.retain(|c| c.id != collection.id);
                state.collections.push(collection.clone());
                ApiResponse::json(200, &json!({"collection": collection}))
            }
            (Method::Delete, ["v1", "collections", id]) => {
                let id = id.parse().ok();
                state.collections.retain(|c| c.id != id);
                ApiResponse::json(200, &json!({}))
            }
            (Method::Get, ["v1", "locations"]) => {
                ApiResponse::json(200, &json!({"locations": state.locations}))
            }
            (Method::Post | Method::Put, ["v1", "locations"]) => {
                let Ok(draft) = serde_json::from_value::<LocationDraft>(body) else {
                    return ApiResponse::new(400, "not json");
                };
                if draft.name.trim().is_empty() {
                    return name_required("location");
                }
                let location = Location {
                    id: Some(draft.id.unwrap_or_else(|| allocate(state))),
                    name: draft.name,
                    user_id: draft.user_id,
                };
                state.locations.retain(|l| l.id != location.id);
                state.locations.push(location.clone());
                ApiResponse::json(200, &json!({"location": location}))
            }
            _ => ApiResponse::json(404, &json!({"msg": "no such route"})),
        }
    }
}

fn allocate(state: &mut ServerState) -> i64 {
    state.next_id += 1;
    state.next_id
}

fn name_required(entity: &str) -> ApiResponse {
    ApiResponse::json(
        400,
        &json!({
            "code": 1001,
            "field_validations": {"name": "required"},
            "msg": format!("invalid {entity}")
        }),
    )
}

fn token_for(email: &Value) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let username = email.as_str().unwrap_or_default();
    let payload = json!({"id": 1, "exp": 4_102_444_800_i64, "username": username});
    format!(
        "header.{}.signature",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

fn list_books(state: &ServerState, request: &ApiRequest) -> ApiResponse {
    let page: usize = request
        .query_param("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let size: usize = request
        .query_param("pageSize")
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);
    let text = request.query_param("query").map(str::to_lowercase);
    let collection = request
        .query_param("collection_id")
        .and_then(|c| c.parse::<i64>().ok());
    let location = request
        .query_param("location_id")
        .and_then(|l| l.parse::<i64>().ok());

    let matching: Vec<&Book> = state
        .books
        .iter()
        .filter(|b| {
            text.as_deref()
                .is_none_or(|t| b.title.to_lowercase().contains(t))
        })
        .filter(|b| {
            collection.is_none_or(|c| b.collection.as_ref().and_then(|x| x.id) == Some(c))
        })
        .filter(|b| location.is_none_or(|l| b.location.id == Some(l)))
        .collect();
    let items: Vec<&Book> = matching
        .iter()
        .skip((page.max(1) - 1) * size)
        .take(size)
        .copied()
        .collect();
    ApiResponse::json(
        200,
        &json!({"items": items, "totalItems": matching.len(), "currentPage": page}),
    )
}

fn save_book(state: &mut ServerState, method: Method, body: Value) -> ApiResponse {
    let Ok(draft) = serde_json::from_value::<BookDraft>(body) else {
        return ApiResponse::new(400, "not json");
    };
    if draft.title.trim().is_empty() {
        return ApiResponse::json(
            400,
            &json!({
                "code": 1001,
                "field_validations": {"title": "required"},
                "msg": "invalid book"
            }),
        );
    }
    let Some(location) = state
        .locations
        .iter()
        .find(|l| l.id == Some(draft.location_id))
        .cloned()
    else {
        return ApiResponse::json(422, &json!({"msg": "unknown location"}));
    };
    if method == Method::Put && !state.books.iter().any(|b| b.id == draft.id) {
        return ApiResponse::json(404, &json!({"msg": "book not found"}));
    }
    let id = match draft.id {
        Some(id) => id,
        None => allocate(state),
    };
    let collection = draft
        .collection_id
        .and_then(|cid| state.collections.iter().find(|c| c.id == Some(cid)).cloned());
    let book = Book {
        id: Some(id),
        title: draft.title,
        authors: draft.authors,
        publisher: draft.publisher,
        languages: draft.languages,
        edition: draft.edition,
        isbn: draft.isbn,
        year: draft.year,
        genres: draft.genres,
        cover: draft.cover,
        collection,
        location,
        user_id: draft.user_id,
    };
    state.books.retain(|b| b.id != book.id);
    state.books.push(book.clone());
    ApiResponse::json(200, &json!(book))
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let (response, latency) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            let latency = state.latencies.pop_front();
            (Self::route(&mut state, &request), latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(response)
    }
}

/// A logged-in client talking to `server`, currently on the books page.
pub fn client_for(server: &Arc<FakeServer>) -> (ApiClient, Arc<RouteNavigator>) {
    let session = Session::in_memory();
    session
        .set_token(token_for(&json!("reader@example.com")))
        .unwrap();
    let navigator = Arc::new(RouteNavigator::new("/dashboard/books"));
    let client = ApiClient::with_transport(server.clone(), session, Duration::from_secs(30))
        .with_navigator(navigator.clone());
    (client, navigator)
}

pub fn book_draft(title: &str, location: &Location) -> BookDraft {
    BookDraft {
        id: None,
        title: title.to_string(),
        authors: vec![libris_model::Author::new("Clarice Lispector")],
        publisher: "Rocco".to_string(),
        languages: Vec::new(),
        edition: None,
        isbn: None,
        year: Some("1977".to_string()),
        genres: Vec::new(),
        cover: None,
        collection_id: None,
        location_id: location.id.unwrap_or_default(),
        user_id: 1,
    }
}
