//! Entity stores: the lifecycle engine instantiated per entity.

use std::future::Future;

use libris_client::{
    ApiClient, CancellationToken, ClientError, Resource, Session, SessionError, TokenClaims,
};
use libris_model::{Book, Collection, Credentials, EntityId, ListQuery, ListResult, Location};
use tokio::sync::watch;

use crate::request_state::{FailureDetail, MutationError, RequestState, Status};
use crate::slot::{LifecycleError, Slot, SlotPolicy, Ticket};

/// Result of one lifecycle operation.
///
/// `Ok` carries the terminal state this request produced. It is also what
/// the slot shows unless a newer request superseded it.
pub type Outcome<T, E> = Result<RequestState<T, E>, LifecycleError>;

pub type ListState<R> = RequestState<ListResult<R>, String>;
pub type ItemState<R> = RequestState<R, String>;
pub type MutationState<R> = RequestState<R, MutationError>;

/// Which one-shot mutation slot an acknowledgement refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

/// Drive `request` through `slot` once a ticket has been issued.
async fn settle<T, E, F>(
    slot: &Slot<T, E>,
    ticket: Result<Ticket, LifecycleError>,
    request: F,
) -> Outcome<T, E>
where
    T: Clone,
    E: FailureDetail,
    F: Future<Output = libris_client::Result<T>>,
{
    let ticket = ticket?;
    match request.await {
        Ok(result) => {
            slot.finish(ticket, Ok(result.clone()));
            Ok(RequestState::Success(result))
        }
        Err(ClientError::SessionExpired) => {
            slot.abandon(ticket);
            Err(LifecycleError::SessionExpired)
        }
        Err(ClientError::Cancelled) => {
            slot.abandon(ticket);
            Err(LifecycleError::Cancelled)
        }
        Err(error) => {
            tracing::debug!(slot = slot.name(), %error, "request failed");
            let detail = E::from_client_error(&error);
            slot.finish(ticket, Err(detail.clone()));
            Ok(RequestState::Failure(detail))
        }
    }
}

/// Lifecycle slots for one entity type.
///
/// Every operation moves its slot to `Loading` before the returned future
/// is first polled, and leaves it in `Success` or `Failure` until someone
/// calls the matching `reset_*`.
#[derive(Debug)]
pub struct EntityStore<R: Resource> {
    client: ApiClient,
    list: Slot<ListResult<R>, String>,
    get: Slot<R, String>,
    create: Slot<R, MutationError>,
    update: Slot<R, MutationError>,
    delete: Slot<R, String>,
}

impl<R: Resource> EntityStore<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            list: Slot::new("list", SlotPolicy::LatestWins),
            get: Slot::new("get", SlotPolicy::LatestWins),
            create: Slot::new("create", SlotPolicy::Exclusive),
            update: Slot::new("update", SlotPolicy::Exclusive),
            delete: Slot::new("delete", SlotPolicy::Exclusive),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Outcome<ListResult<R>, String>> + '_ {
        self.list_with(query, None)
    }

    pub fn list_with(
        &self,
        query: ListQuery,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<ListResult<R>, String>> + '_ {
        let ticket = self.list.begin();
        tracing::debug!(entity = %R::KIND, page = query.page, page_size = query.page_size, "list");
        async move {
            let request = self.client.list::<R>(&query, cancel.as_ref());
            settle(&self.list, ticket, request).await
        }
    }

    pub fn get_one(&self, id: EntityId) -> impl Future<Output = Outcome<R, String>> + '_ {
        self.get_one_with(id, None)
    }

    pub fn get_one_with(
        &self,
        id: EntityId,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<R, String>> + '_ {
        let ticket = self.get.begin();
        async move {
            let request = self.client.get::<R>(id, cancel.as_ref());
            settle(&self.get, ticket, request).await
        }
    }

    pub fn create(&self, draft: R::Draft) -> impl Future<Output = Outcome<R, MutationError>> + '_ {
        self.create_with(draft, None)
    }

    pub fn create_with(
        &self,
        draft: R::Draft,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<R, MutationError>> + '_ {
        let ticket = self.create.begin();
        async move {
            let request = self.client.create::<R>(&draft, cancel.as_ref());
            settle(&self.create, ticket, request).await
        }
    }

    /// The draft must carry the id of the record being edited.
    pub fn update(&self, draft: R::Draft) -> impl Future<Output = Outcome<R, MutationError>> + '_ {
        self.update_with(draft, None)
    }

    pub fn update_with(
        &self,
        draft: R::Draft,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<R, MutationError>> + '_ {
        let ticket = self.update.begin();
        async move {
            let request = self.client.update::<R>(&draft, cancel.as_ref());
            settle(&self.update, ticket, request).await
        }
    }

    pub fn delete(&self, entity: R) -> impl Future<Output = Outcome<R, String>> + '_ {
        self.delete_with(entity, None)
    }

    pub fn delete_with(
        &self,
        entity: R,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<R, String>> + '_ {
        let ticket = self.delete.begin();
        async move {
            let request = self.client.delete::<R>(&entity, cancel.as_ref());
            settle(&self.delete, ticket, request).await
        }
    }

    #[must_use]
    pub fn list_state(&self) -> ListState<R> {
        self.list.state()
    }

    #[must_use]
    pub fn get_state(&self) -> ItemState<R> {
        self.get.state()
    }

    #[must_use]
    pub fn create_state(&self) -> MutationState<R> {
        self.create.state()
    }

    #[must_use]
    pub fn update_state(&self) -> MutationState<R> {
        self.update.state()
    }

    #[must_use]
    pub fn delete_state(&self) -> ItemState<R> {
        self.delete.state()
    }

    #[must_use]
    pub fn subscribe_list(&self) -> watch::Receiver<ListState<R>> {
        self.list.subscribe()
    }

    #[must_use]
    pub fn subscribe_get(&self) -> watch::Receiver<ItemState<R>> {
        self.get.subscribe()
    }

    #[must_use]
    pub fn subscribe_create(&self) -> watch::Receiver<MutationState<R>> {
        self.create.subscribe()
    }

    #[must_use]
    pub fn subscribe_update(&self) -> watch::Receiver<MutationState<R>> {
        self.update.subscribe()
    }

    #[must_use]
    pub fn subscribe_delete(&self) -> watch::Receiver<ItemState<R>> {
        self.delete.subscribe()
    }

    pub fn reset_list(&self) {
        self.list.reset();
    }

    pub fn reset_get(&self) {
        self.get.reset();
    }

    pub fn reset_create(&self) {
        self.create.reset();
    }

    pub fn reset_update(&self) {
        self.update.reset();
    }

    pub fn reset_delete(&self) {
        self.delete.reset();
    }

    /// Status of a mutation slot.
    #[must_use]
    pub fn mutation_status(&self, mutation: Mutation) -> Status {
        match mutation {
            Mutation::Create => self.create.status(),
            Mutation::Update => self.update.status(),
            Mutation::Delete => self.delete.status(),
        }
    }

    pub fn reset_mutation(&self, mutation: Mutation) {
        match mutation {
            Mutation::Create => self.reset_create(),
            Mutation::Update => self.reset_update(),
            Mutation::Delete => self.reset_delete(),
        }
    }

    /// Return every slot to idle.
    pub fn reset_all(&self) {
        self.reset_list();
        self.reset_get();
        self.reset_create();
        self.reset_update();
        self.reset_delete();
    }
}

/// Lifecycle of the login form.
///
/// The one slot whose success has a side effect: the returned token is
/// stored in the [`Session`] before the slot reports `Success`.
#[derive(Debug)]
pub struct LoginStore {
    client: ApiClient,
    slot: Slot<Option<TokenClaims>, String>,
}

pub type LoginState = RequestState<Option<TokenClaims>, String>;

impl LoginStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            slot: Slot::new("login", SlotPolicy::Exclusive),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn login(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Outcome<Option<TokenClaims>, String>> + '_ {
        self.login_with(credentials, None)
    }

    pub fn login_with(
        &self,
        credentials: Credentials,
        cancel: Option<CancellationToken>,
    ) -> impl Future<Output = Outcome<Option<TokenClaims>, String>> + '_ {
        let ticket = self.slot.begin();
        async move {
            let request = async {
                let token = self.client.login(&credentials, cancel.as_ref()).await?;
                let session = self.client.session();
                session.set_token(token.access_token)?;
                tracing::info!(email = %credentials.email, "logged in");
                Ok::<_, ClientError>(session.claims())
            };
            settle(&self.slot, ticket, request).await
        }
    }

    /// Tear the session down and return the form to idle.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.client.session().teardown()?;
        self.slot.reset();
        tracing::info!("logged out");
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> LoginState {
        self.slot.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.slot.subscribe()
    }

    pub fn reset(&self) {
        self.slot.reset();
    }
}

/// Every store of the dashboard over one shared client.
#[derive(Debug)]
pub struct Library {
    pub login: LoginStore,
    pub books: EntityStore<Book>,
    pub collections: EntityStore<Collection>,
    pub locations: EntityStore<Location>,
}

impl Library {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            login: LoginStore::new(client.clone()),
            books: EntityStore::new(client.clone()),
            collections: EntityStore::new(client.clone()),
            locations: EntityStore::new(client.clone()),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.login.session()
    }

    /// Log out and clear every cached state.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.login.logout()?;
        self.books.reset_all();
        self.collections.reset_all();
        self.locations.reset_all();
        Ok(())
    }
}
