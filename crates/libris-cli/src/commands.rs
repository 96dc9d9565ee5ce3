//! Command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use libris_client::{
    ApiClient, FileTokenStore, LOGIN_ROUTE, Resource, RouteNavigator, Session,
};
use libris_model::{
    Book, BookDraft, Collection, CollectionDraft, Credentials, Draft, EntityId, ListQuery,
    ListResult, Location, LocationDraft, Validate,
};
use libris_state::{
    Acknowledgement, EntityStore, FailureDetail, LifecycleError, Library, ListQueryCoordinator,
    Mutation, MutationRefresh, Outcome, RequestState,
};
use tokio::time::Instant;
use tracing::info;

use crate::cli::{
    BookListArgs, BooksCommand, LoginArgs, NamedCommand, NamedListArgs, SettingsCommand,
};
use libris_cli::output;
use libris_cli::settings::{self, Settings};

/// Route shown after a successful login.
const HOME_ROUTE: &str = "/dashboard";

pub struct App {
    library: Library,
    navigator: Arc<RouteNavigator>,
    settings: Settings,
}

impl App {
    /// Connect with the persisted session and the configured host.
    pub fn open(settings: Settings) -> Result<Self> {
        let store = FileTokenStore::new(settings::token_path()?);
        let session = Session::init(store).context("failed to load the stored session")?;
        let navigator = Arc::new(RouteNavigator::new(HOME_ROUTE));
        let client = ApiClient::new(&settings.client_config()?, session)?
            .with_navigator(navigator.clone());
        Ok(Self {
            library: Library::new(&client),
            navigator,
            settings,
        })
    }

    pub async fn login(&self, args: LoginArgs) -> Result<()> {
        self.navigator.navigate(LOGIN_ROUTE);
        let state = self
            .library
            .login
            .login(Credentials::new(args.email, args.password))
            .await
            .map_err(lifecycle_error)?;
        match state {
            RequestState::Success(claims) => {
                self.navigator.navigate(HOME_ROUTE);
                match claims {
                    Some(claims) => println!("Logged in as {}", claims.username),
                    None => println!("Logged in"),
                }
                Ok(())
            }
            RequestState::Failure(message) => {
                self.library.login.reset();
                Err(anyhow!(message))
            }
            other => bail!("login ended in state {}", other.status()),
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.library.logout().context("failed to clear the stored session")?;
        info!("session cleared");
        println!("Logged out");
        Ok(())
    }

    pub fn whoami(&self) -> Result<()> {
        let session = self.library.session();
        if !session.is_logged_in() {
            bail!("not logged in; run `libris login`");
        }
        let claims = session
            .claims()
            .context("stored token has no readable identity")?;
        println!("{}", output::claims_table(&claims));
        Ok(())
    }

    pub async fn books(&self, command: BooksCommand) -> Result<()> {
        let books = &self.library.books;
        match command {
            BooksCommand::List(args) => {
                let mut coordinator = self.book_coordinator(&args);
                let Some(query) = coordinator.poll(Instant::now()) else {
                    bail!("page size must be at least 1");
                };
                let page = success(books.list(query).await, "list books")?;
                coordinator.reconcile(&page);
                print_books(&page, &coordinator);
            }
            BooksCommand::Show { id } => {
                let book = success(books.get_one(id).await, "load book")?;
                println!("{}", output::book_detail(&book));
            }
            BooksCommand::Add(args) => {
                let draft = read_book_draft(&args.file)?.with_user(self.user_id());
                check_draft(&draft)?;
                let outcome = books.create(draft).await;
                let query = self.default_book_query();
                let book = self.acknowledged(books, Mutation::Create, outcome, &query).await?;
                println!("Added book #{}: {}", id_of(&book), book.title);
            }
            BooksCommand::Edit(args) => {
                let draft = read_book_draft(&args.file)?.with_user(self.user_id());
                if draft.id.is_none() {
                    bail!("{} has no \"id\"; edit needs the book to update", args.file.display());
                }
                check_draft(&draft)?;
                let outcome = books.update(draft).await;
                let query = self.default_book_query();
                let book = self.acknowledged(books, Mutation::Update, outcome, &query).await?;
                println!("Updated book #{}: {}", id_of(&book), book.title);
            }
            BooksCommand::Remove { id } => {
                let book = success(books.get_one(id).await, "load book")?;
                let outcome = books.delete(book).await;
                let query = self.default_book_query();
                let book = self.acknowledged(books, Mutation::Delete, outcome, &query).await?;
                println!("Removed book #{id}: {}", book.title);
            }
        }
        Ok(())
    }

    pub async fn collections(&self, command: NamedCommand) -> Result<()> {
        self.named(&self.library.collections, command).await
    }

    pub async fn locations(&self, command: NamedCommand) -> Result<()> {
        self.named(&self.library.locations, command).await
    }

    pub fn settings(&self, command: SettingsCommand) -> Result<()> {
        match command {
            SettingsCommand::Show => println!("{}", output::settings_table(&self.settings)),
            SettingsCommand::Path => println!("{}", settings_file()?.display()),
            SettingsCommand::Init { force } => {
                let path = settings_file()?;
                if path.exists() && !force {
                    bail!("{} already exists; pass --force to replace it", path.display());
                }
                settings::save_settings_to(&path, &self.settings)?;
                info!(path = %path.display(), "settings written");
                println!("Wrote {}", path.display());
            }
        }
        Ok(())
    }

    async fn named<R: NamedResource>(
        &self,
        store: &EntityStore<R>,
        command: NamedCommand,
    ) -> Result<()> {
        let noun = R::KIND.label();
        let first_page = ListQuery::first_page(self.settings.page_size);
        match command {
            NamedCommand::List(args) => {
                let mut coordinator = self.named_coordinator(&args);
                let Some(query) = coordinator.poll(Instant::now()) else {
                    bail!("page size must be at least 1");
                };
                let listed = success(store.list(query).await, "list")?;
                coordinator.reconcile(&listed);
                println!("{}", output::named_table(&listed.items));
                println!("{}", output::count_line(&listed, noun));
                println!(
                    "{}",
                    output::pagination_footer(
                        &coordinator.pagination(),
                        coordinator.config().page_window
                    )
                );
            }
            NamedCommand::Add { name } => {
                let draft = R::draft(name, self.user_id());
                check_draft(&draft)?;
                let outcome = store.create(draft).await;
                let saved = self.acknowledged(store, Mutation::Create, outcome, &first_page).await?;
                println!("Added {noun} #{}: {}", id_of(&saved), saved.display_name());
            }
            NamedCommand::Rename { id, name } => {
                let draft = R::draft(name, self.user_id()).with_id(id);
                check_draft(&draft)?;
                let outcome = store.update(draft).await;
                let saved = self.acknowledged(store, Mutation::Update, outcome, &first_page).await?;
                println!("Renamed {noun} #{id} to {}", saved.display_name());
            }
            NamedCommand::Remove { id } => {
                let existing = find_by_id(store, first_page.clone(), id).await?;
                let outcome = store.delete(existing).await;
                let removed = self.acknowledged(store, Mutation::Delete, outcome, &first_page).await?;
                println!("Removed {noun} #{id}: {}", removed.display_name());
            }
        }
        Ok(())
    }

    /// Report a mutation outcome, then acknowledge it so the list is fetched
    /// again on success and the slot goes back to idle either way.
    async fn acknowledged<R: Resource, E: FailureDetail>(
        &self,
        store: &EntityStore<R>,
        mutation: Mutation,
        outcome: Outcome<R, E>,
        current: &ListQuery,
    ) -> Result<R> {
        let state = outcome.map_err(lifecycle_error)?;
        let refresh = MutationRefresh::new(store);
        let ack = refresh
            .acknowledge(mutation, current)
            .await
            .map_err(lifecycle_error)?;
        if let Acknowledgement::Refreshed(listed) = &ack
            && let Some(message) = listed.error_message()
        {
            tracing::warn!(%message, "refresh after {mutation:?} failed");
        }
        match state {
            RequestState::Success(saved) => {
                info!(kind = %R::KIND, ?mutation, "saved");
                Ok(saved)
            }
            RequestState::Failure(error) => Err(failure(&error)),
            other => bail!("{mutation:?} ended in state {}", other.status()),
        }
    }

    fn book_coordinator(&self, args: &BookListArgs) -> ListQueryCoordinator {
        let mut query = ListQuery::first_page(args.page_size.unwrap_or(self.settings.page_size))
            .with_page(args.page)
            .with_collection(args.collection)
            .with_location(args.location);
        if let Some(text) = &args.query {
            query = query.with_query(text.as_str());
        }
        ListQueryCoordinator::with_query(self.settings.coordinator_config(), query)
    }

    fn named_coordinator(&self, args: &NamedListArgs) -> ListQueryCoordinator {
        let mut query = ListQuery::first_page(args.page_size.unwrap_or(self.settings.page_size))
            .with_page(args.page);
        if let Some(text) = &args.query {
            query = query.with_query(text.as_str());
        }
        ListQueryCoordinator::with_query(self.settings.coordinator_config(), query)
    }

    fn default_book_query(&self) -> ListQuery {
        ListQuery::first_page(self.settings.page_size)
    }

    fn user_id(&self) -> EntityId {
        self.library
            .session()
            .claims()
            .map(|claims| claims.id)
            .unwrap_or_default()
    }
}

/// Collections and locations: records that are just a name.
trait NamedResource: Resource {
    fn draft(name: String, user_id: EntityId) -> Self::Draft;
}

impl NamedResource for Collection {
    fn draft(name: String, user_id: EntityId) -> CollectionDraft {
        CollectionDraft::new(name, user_id)
    }
}

impl NamedResource for Location {
    fn draft(name: String, user_id: EntityId) -> LocationDraft {
        LocationDraft::new(name, user_id)
    }
}

trait WithUser {
    fn with_user(self, user_id: EntityId) -> Self;
}

impl WithUser for BookDraft {
    fn with_user(mut self, user_id: EntityId) -> Self {
        if self.user_id == 0 {
            self.user_id = user_id;
        }
        self
    }
}

fn settings_file() -> Result<PathBuf> {
    settings::settings_path().context("no config directory available for this user")
}

/// Walk the pages of `store` from `query` until the record with `id` turns up.
async fn find_by_id<R: Resource>(
    store: &EntityStore<R>,
    mut query: ListQuery,
    id: EntityId,
) -> Result<R> {
    loop {
        let listed = success(store.list(query.clone()).await, "list")?;
        let next = listed.pagination(query.page_size).next();
        if let Some(found) = listed.items.into_iter().find(|item| item.id() == Some(id)) {
            return Ok(found);
        }
        match next {
            Some(page) => query = query.with_page(page),
            None => bail!("no {} with id {id}", R::KIND.label()),
        }
    }
}

fn read_book_draft(path: &Path) -> Result<BookDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("{} is not a book draft", path.display()))
}

fn check_draft<D: Validate>(draft: &D) -> Result<()> {
    if let Err(errors) = draft.validate() {
        eprintln!("{}", output::field_errors(&errors));
        bail!("the draft has {} invalid field(s)", errors.len());
    }
    Ok(())
}

fn success<T, E: FailureDetail>(outcome: Outcome<T, E>, action: &str) -> Result<T> {
    match outcome.map_err(lifecycle_error)? {
        RequestState::Success(value) => Ok(value),
        RequestState::Failure(error) => Err(failure(&error).context(format!("failed to {action}"))),
        other => bail!("{action} ended in state {}", other.status()),
    }
}

fn failure<E: FailureDetail>(error: &E) -> anyhow::Error {
    if let Some(fields) = error.field_errors() {
        eprintln!("{}", output::field_errors(fields));
    }
    anyhow!(error.message().to_string())
}

fn lifecycle_error(error: LifecycleError) -> anyhow::Error {
    match error {
        LifecycleError::SessionExpired => anyhow!("session expired; run `libris login` again"),
        other => anyhow!(other),
    }
}

fn id_of<R: Resource>(record: &R) -> String {
    record
        .id()
        .map_or_else(|| "?".to_string(), |id| id.to_string())
}

fn print_books(page: &ListResult<Book>, coordinator: &ListQueryCoordinator) {
    if page.is_empty() {
        println!("No books match.");
    } else {
        println!("{}", output::books_table(&page.items));
    }
    println!(
        "{}",
        output::pagination_footer(&coordinator.pagination(), coordinator.config().page_window)
    );
}
