use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use stacksift::api::{ApiClient, HttpTransport};
use stacksift::commands::{self, Command};
use stacksift::config::Config;
use stacksift::error::ApiError;
use stacksift::logging::{self, LogRingBuffer};
use stacksift::models::listing::{parse_tags, CATEGORIES};
use stacksift::models::{
    Collection, Listing, ListingDraft, ListingUpdate, ProfileUpdate, SupportMessage, Upvotes,
};
use stacksift::search::{DebouncedSearch, HybridSearch, SearchOutcome, SearchResults};
use stacksift::services::{ActionOutcome, ListingQuery, PasswordCheck, Services};
use stacksift::session::{FileStorage, LogoutReason, SessionContext, SessionEvent};
use stacksift::utils::app_paths::AppPaths;
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

mod completer;
mod table_display;

use completer::CommandCompleter;
use table_display::{display_collections, display_listings, display_search_results, export_to_csv};

struct ShellPrompt {
    session: SessionContext,
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match self.session.user() {
            Some(user) if user.is_admin() => Cow::Owned(format!("stacksift({}*) ", user.name)),
            Some(user) => Cow::Owned(format!("stacksift({}) ", user.name)),
            None => Cow::Borrowed("stacksift "),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "StackSift - developer tool directory".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  stacksift [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!(
        "  {}  - Initialize configuration with wizard",
        "--init-config".green()
    );
    println!(
        "  {} - Generate config file with defaults",
        "--generate-config".green()
    );
    println!("  {}           - Show this help", "--help".green());
    println!();
    println!("{}", "Account:".yellow());
    println!("  {}  {}  {}", "\\login".green(), "\\register".green(), "\\logout".green());
    println!("  {} - Sign in with a Google ID token", "\\google <credential>".green());
    println!("  {} - Show the signed-in user", "\\whoami".green());
    println!();
    println!("{}", "Browsing:".yellow());
    println!("  {} - Search (bare text searches too)", "search <term>".green());
    println!("  {}  {}  {}", "\\page <n>".green(), "\\next".green(), "\\prev".green());
    println!("  {} - Filter by category", "\\category <name|all>".green());
    println!("  {}  {} - Like or open a row", "\\like <row>".green(), "\\view <row>".green());
    println!("  {} - Submit a tool for review", "\\submit".green());
    println!();
    println!("{}", "Folders:".yellow());
    println!("  {} - List your folders", "\\collections".green());
    println!("  {}", "\\collection new <name>".green());
    println!("  {}", "\\collection add <folder> <row>".green());
    println!("  {}", "\\collection remove <folder> <listing-id>".green());
    println!("  {}", "\\collection delete <folder>".green());
    println!();
    println!("{}", "Profile:".yellow());
    println!("  {}  {}  {}", "\\profile".green(), "\\profile edit".green(), "\\stats".green());
    println!("  {} - Upload a profile picture", "\\avatar <file>".green());
    println!("  {} - Message support", "\\contact".green());
    println!();
    println!("{}", "Admin:".yellow());
    println!("  {} - Moderation queue", "\\pending [page]".green());
    println!(
        "  {}  {}  {}",
        "\\approve <row>".green(),
        "\\edit <row>".green(),
        "\\delete <row>".green()
    );
    println!();
    println!("{}", "Shell:".yellow());
    println!("  {}  {}  {}", "\\help".green(), "\\clear".green(), "\\quit".green());
    println!("  {} - Export the last table to CSV", "\\export <file.csv>".green());
    println!("  {} - Show recent log entries", "\\logs [count]".green());
    println!();
}

fn ask(label: &str) -> Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Restores cooked mode however the password prompt ends
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq)]
enum SecretInput {
    Continue,
    Done,
    Cancelled,
}

/// Apply one key press to a hidden input line
fn apply_secret_key(input: &mut String, key: KeyEvent) -> SecretInput {
    if key.kind != KeyEventKind::Press {
        return SecretInput::Continue;
    }
    match key.code {
        KeyCode::Enter => SecretInput::Done,
        KeyCode::Esc => SecretInput::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretInput::Cancelled
        }
        KeyCode::Backspace => {
            input.pop();
            SecretInput::Continue
        }
        KeyCode::Char(c) => {
            input.push(c);
            SecretInput::Continue
        }
        _ => SecretInput::Continue,
    }
}

/// Read a line without echoing it; Esc or Ctrl-C cancels
fn ask_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush()?;

    let mut input = String::new();
    let outcome = {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_secret_key(&mut input, key) {
                    SecretInput::Continue => continue,
                    done => break done,
                }
            }
        }
    };

    println!();
    match outcome {
        SecretInput::Cancelled => Err(anyhow!("Cancelled")),
        _ => Ok(input),
    }
}

/// Ask with a current value shown; an empty answer keeps it
fn ask_default(label: &str, current: &str) -> Result<String> {
    let answer = ask(&format!("{} [{}]", label, current))?;
    if answer.trim().is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer.trim().to_string())
    }
}

fn confirm(question: &str) -> Result<bool> {
    let answer = ask(&format!("{} (y/n)", question))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn canonical_category(name: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(name.trim()))
}

fn toggle_like(listing: &mut Listing, user_id: &str) {
    match &mut listing.upvotes {
        Upvotes::Voters(voters) => {
            if let Some(pos) = voters.iter().position(|v| v == user_id) {
                voters.remove(pos);
            } else {
                voters.push(user_id.to_string());
            }
        }
        Upvotes::Count(n) => *n += 1,
    }
}

/// What the last printed table showed
#[derive(Default)]
struct View {
    term: String,
    category: Option<String>,
    results: Option<SearchResults>,
    /// Rows addressable by row commands
    rows: Vec<Listing>,
    /// Set while the rows are the moderation queue
    pending_page: Option<u32>,
    collections: Vec<Collection>,
}

struct Shell {
    config: Config,
    runtime: Runtime,
    services: Services,
    session: SessionContext,
    search: DebouncedSearch,
    outcomes: mpsc::UnboundedReceiver<SearchOutcome>,
    events: broadcast::Receiver<SessionEvent>,
    logs: LogRingBuffer,
    view: View,
}

impl Shell {
    fn new(config: Config, logs: LogRingBuffer) -> Result<Self> {
        let runtime = Runtime::new()?;

        let storage = Arc::new(FileStorage::new(AppPaths::session_file()?));
        let session = SessionContext::init(storage)?;
        let events = session.subscribe();

        let transport = Arc::new(HttpTransport::new(&config.api.base_url)?);
        let client = ApiClient::new(transport, session.clone());
        let services = Services::new(client);

        let hybrid = HybridSearch::new(Arc::new(services.listings.clone()))
            .with_page_size(config.search.page_size)
            .with_min_term_len(config.search.ai_min_term_len);
        let (search, outcomes) = DebouncedSearch::new(Arc::new(hybrid), config.search.debounce_ms);

        Ok(Self {
            config,
            runtime,
            services,
            session,
            search,
            outcomes,
            events,
            logs,
            view: View::default(),
        })
    }

    /// Run one command; `Ok(false)` ends the shell
    fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Login => self.login()?,
            Command::Register => self.register()?,
            Command::Google(credential) => {
                let session = self
                    .runtime
                    .block_on(self.services.auth.google(&credential))?;
                println!("{}", format!("Welcome, {}!", session.display_name()).green());
            }
            Command::Logout => {
                if self.session.is_authenticated() {
                    self.services.auth.logout();
                } else {
                    println!("{}", "Not signed in.".yellow());
                }
            }
            Command::WhoAmI => self.whoami(),

            Command::Search(term) => {
                self.view.term = term;
                self.run_search(1)?;
            }
            Command::Page(page) => self.change_page(|_| Some(page))?,
            Command::Next => self.change_page(|r| r.has_next_page().then(|| r.page + 1))?,
            Command::Prev => self.change_page(|r| r.has_prev_page().then(|| r.page - 1))?,
            Command::Category(category) => {
                self.view.category = match category {
                    Some(name) => Some(
                        canonical_category(&name)
                            .ok_or_else(|| {
                                anyhow!("Unknown category '{}'. Choose from: {}", name, CATEGORIES.join(", "))
                            })?
                            .to_string(),
                    ),
                    None => None,
                };
                self.run_search(1)?;
            }

            Command::Like(row) => self.like(row)?,
            Command::View(row) => self.open(row)?,
            Command::Approve(row) => self.approve(row)?,
            Command::Delete(row) => self.delete(row)?,
            Command::Edit(row) => self.edit(row)?,
            Command::Submit => self.submit()?,
            Command::Pending(page) => self.pending(page)?,

            Command::Collections => {
                self.require_login()?;
                self.refresh_collections()?;
                display_collections(&self.view.collections);
            }
            Command::CollectionNew(name) => {
                self.require_login()?;
                self.runtime.block_on(self.services.collections.create(&name))?;
                println!("{}", format!("Created folder '{}'", name.trim()).green());
                self.refresh_collections()?;
            }
            Command::CollectionAdd { folder, row } => self.collection_add(folder, row)?,
            Command::CollectionRemove { folder, listing_id } => {
                self.collection_remove(folder, &listing_id)?
            }
            Command::CollectionDelete(folder) => self.collection_delete(folder)?,

            Command::Profile => self.profile()?,
            Command::ProfileEdit => self.profile_edit()?,
            Command::Avatar(path) => {
                self.require_login()?;
                let user = self
                    .runtime
                    .block_on(self.services.profile.upload_avatar(Path::new(&path)))?;
                println!(
                    "{}",
                    format!(
                        "Avatar updated: {}",
                        user.avatar_url.as_deref().unwrap_or("(uploaded)")
                    )
                    .green()
                );
            }
            Command::Stats => {
                self.require_login()?;
                let stats = self.runtime.block_on(self.services.profile.stats())?;
                println!("Tools submitted: {}", stats.tools);
                println!("Folders:         {}", stats.collections);
            }
            Command::Contact => self.contact()?,

            Command::Logs(count) => {
                for entry in self.logs.get_recent(count) {
                    println!("{}", entry.format_for_display().dark_grey());
                }
            }
            Command::Help => print_help(),
            Command::Clear => print!("{esc}[2J{esc}[1;1H", esc = 27 as char),
            Command::Export(file) => {
                if self.view.rows.is_empty() {
                    return Err(anyhow!("No results to export. Run a search first."));
                }
                export_to_csv(&self.view.rows, &file)?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Report session transitions that happened during the last command
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(SessionEvent::LoggedOut { reason }) => {
                    self.view.pending_page = None;
                    self.view.collections.clear();
                    match reason {
                        LogoutReason::RefreshFailed => println!(
                            "{}",
                            "Your session has expired. Sign in again with \\login.".yellow()
                        ),
                        LogoutReason::UserRequested => println!("{}", "Signed out.".green()),
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn require_login(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(anyhow!("Sign in first with \\login"))
        }
    }

    fn row(&self, row: usize) -> Result<Listing> {
        self.view
            .rows
            .get(row.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound {
                    entity: "Row",
                    id: row.to_string(),
                }
                .into()
            })
    }

    fn replace_row(&mut self, listing: Listing) {
        if let Some(existing) = self.view.rows.iter_mut().find(|l| l.id == listing.id) {
            *existing = listing.clone();
        }
        if let Some(results) = self.view.results.as_mut() {
            if let Some(existing) = results.listings.iter_mut().find(|l| l.id == listing.id) {
                *existing = listing;
            }
        }
    }

    fn remove_row(&mut self, listing_id: &str) {
        self.view.rows.retain(|l| l.id != listing_id);
        if let Some(results) = self.view.results.as_mut() {
            results.listings.retain(|l| l.id != listing_id);
        }
    }

    fn run_search(&mut self, page: u32) -> Result<()> {
        let term = self.view.term.clone();
        let category = self.view.category.clone().unwrap_or_default();

        let Shell {
            runtime,
            search,
            outcomes,
            ..
        } = self;
        let results = runtime.block_on(async {
            search.input(&term, &category, page);
            while let Some(outcome) = outcomes.recv().await {
                if let Some(result) = search.accept(outcome) {
                    return Some(result);
                }
            }
            None
        });

        let results = results.ok_or_else(|| anyhow!("Search was cancelled"))??;
        let user_id = self.session.user_id();
        display_search_results(&results, user_id.as_deref(), &self.config.display);

        self.view.rows = results.listings.clone();
        self.view.pending_page = None;
        self.view.results = Some(results);
        Ok(())
    }

    fn change_page(&mut self, target: impl FnOnce(&SearchResults) -> Option<u32>) -> Result<()> {
        let results = self
            .view
            .results
            .as_ref()
            .ok_or_else(|| anyhow!("Run a search first"))?;
        if results.ai_augmented {
            return Err(anyhow!("These results fit on one page"));
        }

        let page = target(results).ok_or_else(|| anyhow!("No more pages"))?;
        if page == 0 || page > results.total_pages.max(1) {
            return Err(anyhow!("Page must be between 1 and {}", results.total_pages.max(1)));
        }
        self.run_search(page)
    }

    fn login(&mut self) -> Result<()> {
        let email = ask("Email")?;
        let password = ask_secret("Password")?;
        let session = self
            .runtime
            .block_on(self.services.auth.login(&email, &password))?;
        println!("{}", format!("Welcome back, {}!", session.display_name()).green());
        Ok(())
    }

    fn register(&mut self) -> Result<()> {
        let name = ask("Name")?;
        let email = ask("Email")?;
        let password = ask_secret("Password")?;
        let again = ask_secret("Confirm password")?;
        if password != again {
            return Err(anyhow!("Passwords do not match"));
        }

        let session = self
            .runtime
            .block_on(self.services.auth.register(&name, &email, &password))?;
        println!("{}", format!("Welcome, {}!", session.display_name()).green());
        Ok(())
    }

    fn whoami(&self) {
        match self.session.current() {
            Some(session) => {
                println!("{} <{}>", session.display_name().bold(), session.email());
                let roles: Vec<&str> = session.roles().iter().map(String::as_str).collect();
                if !roles.is_empty() {
                    println!("Roles: {}", roles.join(", "));
                }
            }
            None => println!("{}", "Not signed in.".yellow()),
        }
    }

    fn like(&mut self, row: usize) -> Result<()> {
        let mut listing = self.row(row)?;
        if listing.is_ai() {
            println!("{}", "AI suggestions can't be liked.".yellow());
            return Ok(());
        }
        self.require_login()?;

        if self.runtime.block_on(self.services.listings.like(&listing))? == ActionOutcome::Applied {
            if let Some(user_id) = self.session.user_id() {
                toggle_like(&mut listing, &user_id);
                let state = if listing.is_liked_by(&user_id) { "Liked" } else { "Unliked" };
                println!("{}", format!("{} '{}'", state, listing.title).green());
            }
            self.replace_row(listing);
        }
        Ok(())
    }

    fn open(&mut self, row: usize) -> Result<()> {
        let mut listing = self.row(row)?;

        println!("{}", listing.title.clone().bold());
        println!("{}", listing.url.clone().cyan());
        if !listing.description.is_empty() {
            println!("{}", listing.description);
        }
        if !listing.tags.is_empty() {
            println!("Tags: {}", listing.tags.join(", "));
        }
        if listing.is_ai() {
            println!("{}", "Suggested by AI; not part of the directory yet.".dark_grey());
            return Ok(());
        }

        if self.config.behavior.track_views {
            match self.runtime.block_on(self.services.listings.view(&listing)) {
                Ok(ActionOutcome::Applied) => {
                    listing.views += 1;
                    self.replace_row(listing);
                }
                Ok(ActionOutcome::Skipped) => {}
                Err(e) => warn!(target: "api", "Could not record view: {}", e),
            }
        }
        Ok(())
    }

    fn approve(&mut self, row: usize) -> Result<()> {
        let listing = self.row(row)?;
        match self.runtime.block_on(self.services.listings.approve(&listing))? {
            ActionOutcome::Applied => {
                println!("{}", format!("Approved '{}'", listing.title).green());
                if self.view.pending_page.is_some() {
                    self.remove_row(&listing.id);
                } else {
                    let mut listing = listing;
                    listing.approved = true;
                    self.replace_row(listing);
                }
            }
            ActionOutcome::Skipped => {
                println!("{}", "AI suggestions can't be approved.".yellow())
            }
        }
        Ok(())
    }

    fn delete(&mut self, row: usize) -> Result<()> {
        let listing = self.row(row)?;
        if listing.is_ai() {
            println!("{}", "AI suggestions aren't stored, nothing to delete.".yellow());
            return Ok(());
        }
        if self.config.behavior.confirm_deletes
            && !confirm(&format!("Delete '{}'?", listing.title))?
        {
            return Ok(());
        }

        if self.runtime.block_on(self.services.listings.delete(&listing))? == ActionOutcome::Applied {
            println!("{}", format!("Deleted '{}'", listing.title).green());
            self.remove_row(&listing.id);
        }
        Ok(())
    }

    fn edit(&mut self, row: usize) -> Result<()> {
        let mut listing = self.row(row)?;
        if listing.is_ai() {
            println!("{}", "AI suggestions can't be edited.".yellow());
            return Ok(());
        }
        if !self.session.is_admin() {
            return Err(anyhow!("Only admins can edit listings"));
        }

        let changed = |new: String, old: &str| (new != old).then_some(new);
        let tags = listing.tags.join(", ");
        let update = ListingUpdate {
            title: changed(ask_default("Title", &listing.title)?, &listing.title),
            url: changed(ask_default("URL", &listing.url)?, &listing.url),
            description: changed(
                ask_default("Description", &listing.description)?,
                &listing.description,
            ),
            category: changed(ask_default("Category", &listing.category)?, &listing.category),
            tags: changed(ask_default("Tags", &tags)?, &tags).map(|t| parse_tags(&t)),
        };

        match self
            .runtime
            .block_on(self.services.listings.update(&listing, &update))?
        {
            ActionOutcome::Applied => {
                update.apply_to(&mut listing);
                println!("{}", format!("Updated '{}'", listing.title).green());
                self.replace_row(listing);
            }
            ActionOutcome::Skipped => println!("{}", "Nothing changed.".yellow()),
        }
        Ok(())
    }

    fn submit(&mut self) -> Result<()> {
        self.require_login()?;

        let title = ask("Title")?;
        let url = ask("URL")?;
        let description = ask("Description (optional)")?;
        let category = ask(&format!("Category ({})", CATEGORIES.join("/")))?;
        let tags = ask("Tags (comma separated)")?;

        let category = match category.trim() {
            "" => None,
            name => Some(
                canonical_category(name)
                    .ok_or_else(|| anyhow!("Unknown category '{}'", name))?
                    .to_string(),
            ),
        };
        let draft = ListingDraft {
            title: title.trim().to_string(),
            url: url.trim().to_string(),
            description: Some(description.trim().to_string()).filter(|d| !d.is_empty()),
            category,
            tags: parse_tags(&tags),
        };

        let message = self.runtime.block_on(self.services.listings.submit(&draft))?;
        println!("{}", message.green());
        Ok(())
    }

    fn pending(&mut self, page: u32) -> Result<()> {
        if !self.session.is_admin() {
            return Err(anyhow!("Only admins can review submissions"));
        }

        let page_data = self
            .runtime
            .block_on(self.services.listings.list(&ListingQuery::pending(page)))?;
        let user_id = self.session.user_id();
        display_listings(&page_data.listings, user_id.as_deref(), &self.config.display);
        if page_data.total_pages > 1 {
            println!(
                "{}",
                format!("Page {} of {}  \\pending <n>", page, page_data.total_pages).dark_grey()
            );
        }

        self.view.rows = page_data.listings;
        self.view.pending_page = Some(page);
        Ok(())
    }

    fn refresh_collections(&mut self) -> Result<()> {
        self.view.collections = self.runtime.block_on(self.services.collections.list())?;
        Ok(())
    }

    fn folder(&mut self, folder: usize) -> Result<Collection> {
        if self.view.collections.is_empty() {
            self.refresh_collections()?;
        }
        self.view
            .collections
            .get(folder.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound {
                    entity: "Folder",
                    id: folder.to_string(),
                }
                .into()
            })
    }

    fn collection_add(&mut self, folder: usize, row: usize) -> Result<()> {
        self.require_login()?;
        let listing = self.row(row)?;
        let collection = self.folder(folder)?;
        if collection.contains(&listing.id) {
            println!("{}", format!("'{}' is already in '{}'", listing.title, collection.name).yellow());
            return Ok(());
        }

        match self
            .runtime
            .block_on(self.services.collections.add(&collection.id, &listing))?
        {
            ActionOutcome::Applied => {
                println!("{}", format!("Saved '{}' to '{}'", listing.title, collection.name).green());
                self.refresh_collections()?;
            }
            ActionOutcome::Skipped => {
                println!("{}", "AI suggestions can't be saved to folders.".yellow())
            }
        }
        Ok(())
    }

    fn collection_remove(&mut self, folder: usize, listing_id: &str) -> Result<()> {
        self.require_login()?;
        let collection = self.folder(folder)?;
        self.runtime
            .block_on(self.services.collections.remove(&collection.id, listing_id))?;

        if let Some(local) = self
            .view
            .collections
            .iter_mut()
            .find(|c| c.id == collection.id)
        {
            local.remove_local(listing_id);
        }
        println!("{}", format!("Removed from '{}'", collection.name).green());
        Ok(())
    }

    fn collection_delete(&mut self, folder: usize) -> Result<()> {
        self.require_login()?;
        let collection = self.folder(folder)?;
        if self.config.behavior.confirm_deletes
            && !confirm(&format!("Delete folder '{}'?", collection.name))?
        {
            return Ok(());
        }

        self.runtime
            .block_on(self.services.collections.delete(&collection.id))?;
        self.view.collections.retain(|c| c.id != collection.id);
        println!("{}", format!("Deleted folder '{}'", collection.name).green());
        Ok(())
    }

    fn profile(&mut self) -> Result<()> {
        self.require_login()?;
        let (user, stats) = self.runtime.block_on(async {
            tokio::try_join!(self.services.profile.profile(), self.services.profile.stats())
        })?;

        println!("{} <{}>", user.name.clone().bold(), user.email);
        if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
            println!("{}", bio);
        }
        if let Some(avatar) = &user.avatar_url {
            println!("Avatar: {}", avatar);
        }
        println!("Tools submitted: {}  Folders: {}", stats.tools, stats.collections);
        Ok(())
    }

    fn profile_edit(&mut self) -> Result<()> {
        self.require_login()?;
        let user = self
            .session
            .user()
            .ok_or_else(|| anyhow!("Sign in first with \\login"))?;

        let current = ask_secret("Current password")?;
        let check = self
            .runtime
            .block_on(self.services.auth.verify_password(&current))?;

        let name = ask_default("Name", &user.name)?;
        let bio = ask_default("Bio", user.bio.as_deref().unwrap_or(""))?;
        let password = match check {
            PasswordCheck::Verified => {
                Some(ask_secret("New password (blank to keep)")?).filter(|p| !p.is_empty())
            }
            PasswordCheck::ExternalAccount => {
                println!(
                    "{}",
                    "This account signs in with Google; the password can't be changed here."
                        .dark_grey()
                );
                None
            }
        };

        let update = ProfileUpdate { name, bio, password };
        let user = self.runtime.block_on(self.services.profile.update(&update))?;
        println!("{}", format!("Profile saved for {}", user.name).green());
        Ok(())
    }

    fn contact(&mut self) -> Result<()> {
        let user = self.session.user();
        let name = match &user {
            Some(user) => ask_default("Name", &user.name)?,
            None => ask("Name")?,
        };
        let email = match &user {
            Some(user) => ask_default("Email", &user.email)?,
            None => ask("Email")?,
        };
        let subject = ask("Subject")?;
        let message = ask("Message")?;

        let message = SupportMessage {
            name,
            email,
            subject,
            message,
        };
        self.runtime.block_on(self.services.contact.send(&message))?;
        println!("{}", "Thanks! Your message has been sent.".green());
        Ok(())
    }
}

fn main() -> Result<()> {
    let (log_buffer, log_path) = logging::init_tracing(AppPaths::log_dir().ok().as_deref());
    if let Some(path) = &log_path {
        eprintln!("Logs are written to {}", path.display());
    }

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Check for config initialization
    if args.contains(&"--init-config".to_string()) {
        let config = Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        if !config.display.use_glyphs {
            println!("Note: Simple mode enabled (ASCII icons)");
        }
        return Ok(());
    }

    // Check for config file generation
    if args.contains(&"--generate-config".to_string()) {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Config::create_default_with_comments())?;
        println!("Configuration file created at: {:?}", path);
        println!("Edit this file to customize StackSift.");
        return Ok(());
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Could not load config ({}), using defaults", e).yellow());
        Config::default()
    });

    let mut shell = Shell::new(config, log_buffer)?;
    info!(target: "system", "Connected to {}", shell.config.api.base_url);
    println!(
        "{}",
        format!("StackSift - connected to {}. Type \\help for commands.", shell.config.api.base_url)
            .cyan()
    );
    if let Some(session) = shell.session.current() {
        println!("Signed in as {}", session.display_name().bold());
    }

    let history = Box::new(FileBackedHistory::with_file(200, AppPaths::history_file()?)?);

    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("command_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_history(history)
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ShellPrompt {
        session: shell.session.clone(),
    };

    loop {
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                match commands::parse(&buffer) {
                    Ok(Some(command)) => match shell.handle(command) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
                shell.drain_events();
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    shell.search.cancel();
    println!("\nGoodbye!");
    Ok(())
}
