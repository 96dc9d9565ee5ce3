//! Debounced list queries and refresh-after-mutation.

mod support;

use std::time::Duration;

use libris_client::{CancellationToken, Method};
use libris_model::{Book, Collection, CollectionDraft, ListQuery, PageLink};
use libris_state::{
    Acknowledgement, EntityStore, ListQueryCoordinator, Mutation, MutationRefresh, QueryEvent,
    RequestState, Status, drive_list_queries,
};
use tokio::sync::mpsc;

use support::{FakeServer, client_for};

#[tokio::test(start_paused = true)]
async fn burst_of_text_edits_issues_one_fetch() {
    let server = FakeServer::new();
    let shelf = server.seed_location("Shelf");
    server.seed_books(30, &shelf);
    let (client, _) = client_for(&server);
    let books = EntityStore::<Book>::new(client);

    let mut coordinator = ListQueryCoordinator::default();
    coordinator.set_page_size(10);
    let (tx, rx) = mpsc::channel(16);
    let driver = drive_list_queries(&books, coordinator, rx, CancellationToken::new());

    let typing = async move {
        for text in ["b", "bo", "boo", "book", "book 1"] {
            tx.send(QueryEvent::Text(text.to_string())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    let (coordinator, ()) = tokio::join!(driver, typing);
    let coordinator = coordinator.unwrap();

    let fetches: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Get && r.path == "/v1/books")
        .collect();
    // The initial page load plus exactly one search.
    assert_eq!(fetches.len(), 2);
    assert_eq!(fetches[0].query_param("query"), None);
    assert_eq!(fetches[1].query_param("query"), Some("book 1"));
    assert_eq!(fetches[1].query_param("page"), Some("1"));

    // "Book 1" and "Book 10".."Book 19".
    assert_eq!(coordinator.pagination().total_items(), 11);
    assert_eq!(coordinator.pagination().total_pages(), 2);
    assert_eq!(coordinator.query().text(), Some("book 1"));
}

#[tokio::test(start_paused = true)]
async fn filter_and_page_changes_fetch_immediately() {
    let server = FakeServer::new();
    let shelf = server.seed_location("Shelf");
    server.seed_books(95, &shelf);
    let (client, _) = client_for(&server);
    let books = EntityStore::<Book>::new(client);

    let (tx, rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let driver = drive_list_queries(&books, ListQueryCoordinator::default(), rx, cancel.clone());

    let clicks = async move {
        tx.send(QueryEvent::PageSize(10)).await.unwrap();
        tx.send(QueryEvent::Page(5)).await.unwrap();
        tx.send(QueryEvent::Location(shelf.id)).await.unwrap();
        tx.send(QueryEvent::Page(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    };
    let (coordinator, ()) = tokio::join!(driver, clicks);
    let coordinator = coordinator.unwrap();

    let last = server.requests().pop().unwrap();
    assert_eq!(last.query_param("page"), Some("5"));
    assert_eq!(last.query_param("location_id"), Some("1"));

    let pagination = coordinator.pagination();
    assert_eq!(pagination.total_pages(), 10);
    assert!(pagination.can_go_first() && pagination.can_go_prev());
    assert!(pagination.can_go_next() && pagination.can_go_last());
    let links = coordinator.page_links();
    assert!(links.contains(&PageLink::Page(5)));
    assert_eq!(links.first(), Some(&PageLink::Ellipsis));
    assert_eq!(links.last(), Some(&PageLink::Ellipsis));
}

#[tokio::test(start_paused = true)]
async fn whole_collection_list_pages_like_books() {
    let server = FakeServer::new();
    server.seed_collections(25);
    let (client, _) = client_for(&server);
    let collections = EntityStore::<Collection>::new(client);

    let (tx, rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let driver = drive_list_queries(
        &collections,
        ListQueryCoordinator::default(),
        rx,
        cancel.clone(),
    );

    let clicks = async move {
        tx.send(QueryEvent::PageSize(10)).await.unwrap();
        tx.send(QueryEvent::Page(3)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
    };
    let (coordinator, ()) = tokio::join!(driver, clicks);
    let coordinator = coordinator.unwrap();

    let pagination = coordinator.pagination();
    assert_eq!(pagination.current_page(), 3);
    assert_eq!(pagination.total_pages(), 3);
    assert!(pagination.can_go_prev() && !pagination.can_go_next());

    let listed = collections.list_state();
    let page = listed.result().unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page.current_page, 3);
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"Collection 21"));
    assert_eq!(names.last(), Some(&"Collection 25"));
}

#[tokio::test]
async fn acknowledged_success_refreshes_then_resets() {
    let server = FakeServer::new();
    let (client, _) = client_for(&server);
    let collections = EntityStore::<Collection>::new(client);
    let current = ListQuery::first_page(10);

    collections.list(current.clone()).await.unwrap();
    assert_eq!(collections.list_state().result().unwrap().len(), 0);

    collections
        .create(CollectionDraft::new("Poetry", 1))
        .await
        .unwrap();
    // Success stays visible until acknowledged.
    assert_eq!(collections.create_state().status(), Status::Success);
    assert_eq!(collections.list_state().result().unwrap().len(), 0);

    let refresh = MutationRefresh::new(&collections);
    let ack = refresh.acknowledge(Mutation::Create, &current).await.unwrap();

    let Acknowledgement::Refreshed(listed) = ack else {
        panic!("expected a refresh, got {ack:?}");
    };
    assert_eq!(listed.result().unwrap().len(), 1);
    assert_eq!(collections.create_state(), RequestState::Idle);
    assert_eq!(server.count(Method::Get, "/v1/collections"), 2);
}

#[tokio::test]
async fn acknowledged_failure_only_resets() {
    let server = FakeServer::new();
    let (client, _) = client_for(&server);
    let collections = EntityStore::<Collection>::new(client);
    let current = ListQuery::first_page(10);

    let failed = collections
        .create(CollectionDraft::new("  ", 1))
        .await
        .unwrap();
    assert_eq!(failed.field_errors().unwrap()["name"], "required");

    let refresh = MutationRefresh::new(&collections);
    let ack = refresh.acknowledge(Mutation::Create, &current).await.unwrap();
    assert_eq!(ack, Acknowledgement::Dismissed);
    assert_eq!(collections.create_state(), RequestState::Idle);
    assert_eq!(server.count(Method::Get, "/v1/collections"), 0);

    let ack = refresh.acknowledge(Mutation::Delete, &current).await.unwrap();
    assert_eq!(ack, Acknowledgement::Pending(Status::Idle));
}
