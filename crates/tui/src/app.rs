use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use qkart_core::{
    api::{ApiClient, SearchOutcome},
    cart::{AddKind, CartOutcome, CartService},
    config::AppConfig,
    error::ApiError,
    models::{Product, Session},
    search::{Debouncer, SearchRequest},
    session::SessionStore,
};

const TICK_RATE: Duration = Duration::from_millis(250);

const CART_FETCH_FAILED: &str =
    "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";
const LOGIN_TO_ADD: &str = "Login to add an item to the Cart";
const ALREADY_IN_CART: &str =
    "Item already in cart. Use the cart sidebar to update quantity or remove item.";

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Catalog,
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogFocus {
    Search,
    Products,
    Cart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Text-input form shared by the login and register screens.
struct AuthForm {
    username: String,
    password: String,
    confirm: String,
    has_confirm: bool,
    focus: usize,
}

impl AuthForm {
    fn login() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            confirm: String::new(),
            has_confirm: false,
            focus: 0,
        }
    }

    fn register() -> Self {
        Self {
            has_confirm: true,
            ..Self::login()
        }
    }

    fn field_count(&self) -> usize {
        if self.has_confirm {
            3
        } else {
            2
        }
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.field_count();
    }

    fn prev_field(&mut self) {
        self.focus = (self.focus + self.field_count() - 1) % self.field_count();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.username,
            1 => &mut self.password,
            _ => &mut self.confirm,
        }
    }

    fn insert(&mut self, ch: char) {
        if !ch.is_control() {
            self.focused_mut().push(ch);
        }
    }

    fn backspace(&mut self) {
        self.focused_mut().pop();
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    ProductsLoaded(Result<Vec<Product>, ApiError>),
    SearchCompleted {
        seq: u64,
        result: Result<SearchOutcome, ApiError>,
    },
    CartRefreshed(Result<(), ApiError>),
    CartChanged(Result<CartOutcome, ApiError>),
    LoginFinished(Result<Session, ApiError>),
    RegisterFinished(Result<(), ApiError>),
}

/// High-level application state for the QKart terminal client.
pub struct QkartApp {
    config: AppConfig,
    api: ApiClient,
    sessions: SessionStore,
    cart: CartService,
    screen: Screen,
    focus: CatalogFocus,
    login_form: AuthForm,
    register_form: AuthForm,
    products: Vec<Product>,
    catalog_cursor: usize,
    catalog_offset: usize,
    list_height: usize,
    cart_cursor: usize,
    search_input: String,
    last_applied_search: u64,
    loading_products: bool,
    no_products_found: bool,
    pending_auth: bool,
    status: String,
    status_level: StatusLevel,
    should_quit: bool,
    theme: Theme,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    debouncer: Option<Debouncer>,
}

impl QkartApp {
    pub fn new(
        config: AppConfig,
        api: ApiClient,
        sessions: SessionStore,
        cart: CartService,
    ) -> Self {
        Self {
            config,
            api,
            sessions,
            cart,
            screen: Screen::Catalog,
            focus: CatalogFocus::Products,
            login_form: AuthForm::login(),
            register_form: AuthForm::register(),
            products: Vec::new(),
            catalog_cursor: 0,
            catalog_offset: 0,
            list_height: 1,
            cart_cursor: 0,
            search_input: String::new(),
            last_applied_search: 0,
            loading_products: false,
            no_products_found: false,
            pending_auth: false,
            status: "Ready".to_string(),
            status_level: StatusLevel::Info,
            should_quit: false,
            theme: Theme::default(),
            event_tx: None,
            debouncer: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx.clone());
        self.attach_search_pipeline(event_tx);

        self.load_products();
        if let Some(session) = self.sessions.current() {
            self.set_status(
                StatusLevel::Info,
                format!("Welcome back, {}", session.username),
            );
            self.refresh_cart();
        }

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        self.debouncer = None;
        Ok(())
    }

    /// Wire the debouncer to a task that runs searches and posts the
    /// outcome back into the app event channel, tagged with the request
    /// sequence number.
    fn attach_search_pipeline(&mut self, event_tx: mpsc::Sender<AppEvent>) {
        let (search_tx, mut search_rx) = mpsc::channel::<SearchRequest>(16);
        let api = self.api.clone();
        spawn(async move {
            while let Some(request) = search_rx.recv().await {
                let result = if request.query.trim().is_empty() {
                    // Cleared input falls back to the full catalog.
                    api.products().await.map(SearchOutcome::Found)
                } else {
                    api.search_products(&request.query).await
                };
                let event = AppEvent::SearchCompleted {
                    seq: request.seq,
                    result,
                };
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        self.debouncer = Some(Debouncer::new(self.config.search_debounce(), search_tx));
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::ProductsLoaded(result)) => {
                self.loading_products = false;
                match result {
                    Ok(products) => {
                        info!(total = products.len(), "catalog loaded");
                        self.products = products;
                        self.no_products_found = false;
                        self.clamp_catalog_cursor();
                    }
                    Err(err) => {
                        error!(%err, "catalog load failed");
                        self.set_status(StatusLevel::Error, err.user_message());
                    }
                }
                true
            }
            Some(AppEvent::SearchCompleted { seq, result }) => {
                if seq < self.last_applied_search {
                    // An older in-flight response finished after a newer
                    // one was already applied.
                    debug!(seq, latest = self.last_applied_search, "stale search result dropped");
                    return true;
                }
                self.last_applied_search = seq;
                match result {
                    Ok(SearchOutcome::Found(products)) => {
                        self.products = products;
                        self.no_products_found = false;
                        self.clamp_catalog_cursor();
                    }
                    Ok(SearchOutcome::NoMatches) => {
                        self.no_products_found = true;
                    }
                    Err(err) => {
                        // Prior results stay on screen; only notify.
                        error!(%err, "search failed");
                        self.set_status(StatusLevel::Error, err.user_message());
                    }
                }
                true
            }
            Some(AppEvent::CartRefreshed(result)) => {
                if let Err(err) = result {
                    error!(%err, "cart fetch failed");
                    let message = match &err {
                        ApiError::Client { message, .. } => message.clone(),
                        _ => CART_FETCH_FAILED.to_string(),
                    };
                    self.set_status(StatusLevel::Error, message);
                }
                self.clamp_cart_cursor();
                true
            }
            Some(AppEvent::CartChanged(result)) => {
                match result {
                    Ok(CartOutcome::Updated) => {
                        self.set_status(StatusLevel::Success, "Cart updated");
                        self.clamp_cart_cursor();
                    }
                    Ok(CartOutcome::MustAuthenticate) => {
                        self.set_status(StatusLevel::Warning, LOGIN_TO_ADD);
                    }
                    Ok(CartOutcome::Duplicate) => {
                        self.set_status(StatusLevel::Warning, ALREADY_IN_CART);
                    }
                    Err(err) => {
                        error!(%err, "cart update failed");
                        self.set_status(StatusLevel::Error, err.user_message());
                    }
                }
                true
            }
            Some(AppEvent::LoginFinished(result)) => {
                self.pending_auth = false;
                match result {
                    Ok(session) => {
                        self.set_status(StatusLevel::Success, "Logged in successfully");
                        self.login_form = AuthForm::login();
                        self.screen = Screen::Catalog;
                        self.focus = CatalogFocus::Products;
                        info!(username = %session.username, "session established");
                        self.refresh_cart();
                    }
                    Err(err) => {
                        self.set_status(StatusLevel::Error, err.user_message());
                    }
                }
                true
            }
            Some(AppEvent::RegisterFinished(result)) => {
                self.pending_auth = false;
                match result {
                    Ok(()) => {
                        self.set_status(StatusLevel::Success, "Registered successfully");
                        // Route to login with the username carried over.
                        self.login_form = AuthForm::login();
                        self.login_form.username = self.register_form.username.clone();
                        self.register_form = AuthForm::register();
                        self.screen = Screen::Login;
                    }
                    Err(err) => {
                        self.set_status(StatusLevel::Error, err.user_message());
                    }
                }
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Input handling
    // =========================================================================

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Catalog => self.handle_catalog_key(key),
            Screen::Login => self.handle_login_key(key),
            Screen::Register => self.handle_register_key(key),
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) {
        if self.focus == CatalogFocus::Search {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.focus = CatalogFocus::Products,
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.schedule_search();
                }
                KeyCode::Char(ch) => {
                    self.search_input.push(ch);
                    self.schedule_search();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.focus = CatalogFocus::Search,
            KeyCode::Char('l') => {
                if !self.sessions.is_authenticated() {
                    self.screen = Screen::Login;
                }
            }
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('r') => {
                self.load_products();
                self.refresh_cart();
            }
            KeyCode::Tab => self.toggle_catalog_focus(),
            _ => match self.focus {
                CatalogFocus::Products => self.handle_product_list_key(key),
                CatalogFocus::Cart => self.handle_cart_key(key),
                CatalogFocus::Search => {}
            },
        }
    }

    fn handle_product_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_catalog_cursor(-1),
            KeyCode::Down => self.move_catalog_cursor(1),
            KeyCode::PageUp => self.move_catalog_cursor(-(self.list_height as isize)),
            KeyCode::PageDown => self.move_catalog_cursor(self.list_height as isize),
            KeyCode::Home => self.move_catalog_cursor(isize::MIN / 2),
            KeyCode::End => self.move_catalog_cursor(isize::MAX / 2),
            KeyCode::Enter | KeyCode::Char('a') => {
                if let Some(product) = self.products.get(self.catalog_cursor) {
                    let id = product.id.clone();
                    self.request_cart_change(id, 1, AddKind::Add);
                }
            }
            _ => {}
        }
    }

    fn handle_cart_key(&mut self, key: KeyEvent) {
        let items = self.cart.line_items(&self.products);
        match key.code {
            KeyCode::Up => {
                self.cart_cursor = self.cart_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if !items.is_empty() {
                    self.cart_cursor = (self.cart_cursor + 1).min(items.len() - 1);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if let Some(item) = items.get(self.cart_cursor) {
                    let id = item.product.id.clone();
                    let qty = item.quantity + 1;
                    self.request_cart_change(id, qty, AddKind::SetQuantity);
                }
            }
            KeyCode::Char('-') => {
                if let Some(item) = items.get(self.cart_cursor) {
                    let id = item.product.id.clone();
                    // Zero removes the line server-side.
                    let qty = item.quantity.saturating_sub(1);
                    self.request_cart_change(id, qty, AddKind::SetQuantity);
                }
            }
            _ => {}
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.screen = Screen::Register;
            return;
        }
        match key.code {
            KeyCode::Esc => self.screen = Screen::Catalog,
            KeyCode::Tab | KeyCode::Down => self.login_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.prev_field(),
            KeyCode::Backspace => self.login_form.backspace(),
            KeyCode::Enter => self.submit_login(),
            KeyCode::Char(ch) => self.login_form.insert(ch),
            _ => {}
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.screen = Screen::Login,
            KeyCode::Tab | KeyCode::Down => self.register_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.register_form.prev_field(),
            KeyCode::Backspace => self.register_form.backspace(),
            KeyCode::Enter => self.submit_register(),
            KeyCode::Char(ch) => self.register_form.insert(ch),
            _ => {}
        }
    }

    fn toggle_catalog_focus(&mut self) {
        self.focus = match self.focus {
            CatalogFocus::Products if self.sessions.is_authenticated() => CatalogFocus::Cart,
            CatalogFocus::Cart => CatalogFocus::Products,
            other => other,
        };
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn schedule_search(&mut self) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.submit(self.search_input.clone());
        }
    }

    fn load_products(&mut self) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.loading_products = true;
        let api = self.api.clone();
        spawn(async move {
            let result = api.products().await;
            let _ = tx.send(AppEvent::ProductsLoaded(result)).await;
        });
    }

    fn refresh_cart(&mut self) {
        let Some(token) = self.sessions.token() else {
            return;
        };
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let cart = self.cart.clone();
        spawn(async move {
            let result = cart.refresh(&token).await;
            let _ = tx.send(AppEvent::CartRefreshed(result)).await;
        });
    }

    fn request_cart_change(&mut self, product_id: String, qty: u32, kind: AddKind) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let token = self.sessions.token();
        let cart = self.cart.clone();
        let products = self.products.clone();
        spawn(async move {
            let result = cart
                .add(token.as_deref(), &products, &product_id, qty, kind)
                .await;
            let _ = tx.send(AppEvent::CartChanged(result)).await;
        });
    }

    fn submit_login(&mut self) {
        if self.pending_auth {
            return;
        }
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.pending_auth = true;
        self.set_status(StatusLevel::Info, "Logging in…");
        let sessions = self.sessions.clone();
        let username = self.login_form.username.clone();
        let password = self.login_form.password.clone();
        spawn(async move {
            let result = sessions.login(&username, &password).await;
            let _ = tx.send(AppEvent::LoginFinished(result)).await;
        });
    }

    fn submit_register(&mut self) {
        if self.pending_auth {
            return;
        }
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        self.pending_auth = true;
        self.set_status(StatusLevel::Info, "Registering…");
        let sessions = self.sessions.clone();
        let username = self.register_form.username.clone();
        let password = self.register_form.password.clone();
        let confirm = self.register_form.confirm.clone();
        spawn(async move {
            let result = sessions.register(&username, &password, &confirm).await;
            let _ = tx.send(AppEvent::RegisterFinished(result)).await;
        });
    }

    fn logout(&mut self) {
        if !self.sessions.is_authenticated() {
            return;
        }
        self.sessions.logout();
        self.cart.clear();
        self.cart_cursor = 0;
        self.focus = CatalogFocus::Products;
        self.set_status(StatusLevel::Info, "Logged out");
    }

    // =========================================================================
    // Cursor bookkeeping
    // =========================================================================

    fn move_catalog_cursor(&mut self, delta: isize) {
        if self.products.is_empty() {
            self.catalog_cursor = 0;
            self.catalog_offset = 0;
            return;
        }
        let len = self.products.len() as isize;
        let idx = (self.catalog_cursor as isize).saturating_add(delta).clamp(0, len - 1);
        self.catalog_cursor = idx as usize;
        self.ensure_catalog_cursor_visible();
    }

    fn clamp_catalog_cursor(&mut self) {
        if self.products.is_empty() {
            self.catalog_cursor = 0;
            self.catalog_offset = 0;
        } else if self.catalog_cursor >= self.products.len() {
            self.catalog_cursor = self.products.len() - 1;
        }
        self.ensure_catalog_cursor_visible();
    }

    fn ensure_catalog_cursor_visible(&mut self) {
        if self.products.is_empty() || self.list_height == 0 {
            self.catalog_offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.products.len().saturating_sub(height);
        if self.catalog_cursor < self.catalog_offset {
            self.catalog_offset = self.catalog_cursor;
        } else if self.catalog_cursor >= self.catalog_offset + height {
            self.catalog_offset = self.catalog_cursor + 1 - height;
        }
        if self.catalog_offset > max_offset {
            self.catalog_offset = max_offset;
        }
    }

    fn clamp_cart_cursor(&mut self) {
        let len = self.cart.line_items(&self.products).len();
        if len == 0 {
            self.cart_cursor = 0;
        } else if self.cart_cursor >= len {
            self.cart_cursor = len - 1;
        }
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = message.into();
        self.status_level = level;
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.size());

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Catalog => self.draw_catalog(frame, chunks[1]),
            Screen::Login => self.draw_auth(frame, chunks[1], false),
            Screen::Register => self.draw_auth(frame, chunks[1], true),
        }
        self.draw_status(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let right = match self.sessions.current() {
            Some(session) => format!("{}  •  balance ${}", session.username, session.balance),
            None => "guest — press l to login".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(
                " QKart ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("— fastest delivery to your doorstep", Style::default().fg(self.theme.muted)),
            Span::raw("   "),
            Span::raw(right),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_catalog(&mut self, frame: &mut Frame, area: Rect) {
        let show_cart = self.sessions.is_authenticated();
        let columns = if show_cart {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(area)
        } else {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(100)])
                .split(area)
        };

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(columns[0]);

        self.draw_search_box(frame, left[0]);
        self.draw_product_list(frame, left[1]);
        if show_cart {
            self.draw_cart(frame, columns[1]);
        }
    }

    fn draw_search_box(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == CatalogFocus::Search;
        let style = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };
        let content = if self.search_input.is_empty() && !focused {
            Span::styled(
                "Search for items/categories (press /)",
                Style::default().fg(self.theme.muted),
            )
        } else {
            Span::raw(self.search_input.as_str())
        };
        let search = Paragraph::new(Line::from(content)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(style),
        );
        frame.render_widget(search, area);
    }

    fn draw_product_list(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == CatalogFocus::Products;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Products ")
            .border_style(if focused {
                Style::default().fg(self.theme.accent)
            } else {
                Style::default()
            });

        if self.no_products_found {
            let empty = Paragraph::new("No products found")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.muted))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
        if self.loading_products {
            let loading = Paragraph::new("Loading Products…")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.muted))
                .block(block);
            frame.render_widget(loading, area);
            return;
        }

        self.list_height = area.height.saturating_sub(2) as usize;
        self.ensure_catalog_cursor_visible();

        let end = (self.catalog_offset + self.list_height).min(self.products.len());
        let items: Vec<ListItem> = self.products[self.catalog_offset..end]
            .iter()
            .enumerate()
            .map(|(row, product)| {
                let selected = self.catalog_offset + row == self.catalog_cursor;
                let style = if selected && focused {
                    Style::default()
                        .bg(self.theme.selection_bg)
                        .fg(self.theme.selection_fg)
                } else {
                    Style::default()
                };
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:<28}", truncate(&product.name, 28)),
                        style.add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<12}", truncate(&product.category, 12)),
                        style.fg(self.theme.muted),
                    ),
                    Span::styled(format!("${:<6}", product.cost), style),
                    Span::styled(rating_stars(product.rating), style.fg(self.theme.warning)),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }

    fn draw_cart(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == CatalogFocus::Cart;
        let items = self.cart.line_items(&self.products);
        let total = self.cart.total_cost(&self.products);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Cart ")
            .border_style(if focused {
                Style::default().fg(self.theme.accent)
            } else {
                Style::default()
            });

        let mut lines: Vec<Line> = Vec::with_capacity(items.len() + 2);
        if items.is_empty() {
            lines.push(Line::from(Span::styled(
                "Cart is empty. Add more items to the cart.",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            for (row, item) in items.iter().enumerate() {
                let selected = focused && row == self.cart_cursor;
                let style = if selected {
                    Style::default()
                        .bg(self.theme.selection_bg)
                        .fg(self.theme.selection_fg)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{:<20}", truncate(&item.product.name, 20)), style),
                    Span::styled(format!("×{:<3}", item.quantity), style),
                    Span::styled(format!("${}", item.line_cost()), style),
                ]));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!("Order total: ${total}"),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }

        let cart = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
        frame.render_widget(cart, area);
    }

    fn draw_auth(&self, frame: &mut Frame, area: Rect, register: bool) {
        let form = if register {
            &self.register_form
        } else {
            &self.login_form
        };
        let title = if register { " Register " } else { " Login " };

        let box_area = centered_rect(area, 46, if register { 11 } else { 9 });
        let mut lines = vec![Line::default()];
        lines.push(auth_field_line(
            "Username",
            &form.username,
            false,
            form.focus == 0,
            &self.theme,
        ));
        lines.push(auth_field_line(
            "Password",
            &form.password,
            true,
            form.focus == 1,
            &self.theme,
        ));
        if register {
            lines.push(auth_field_line(
                "Confirm ",
                &form.confirm,
                true,
                form.focus == 2,
                &self.theme,
            ));
        }
        lines.push(Line::default());
        let hint = if register {
            "Enter submit • Esc back to login"
        } else {
            "Enter submit • Ctrl+R register • Esc browse as guest"
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(self.theme.muted),
        )));
        if self.pending_auth {
            lines.push(Line::from(Span::styled(
                "Working…",
                Style::default().fg(self.theme.accent),
            )));
        }

        let panel = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(panel, box_area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let color = match self.status_level {
            StatusLevel::Info => self.theme.muted,
            StatusLevel::Success => self.theme.success,
            StatusLevel::Warning => self.theme.warning,
            StatusLevel::Error => self.theme.danger,
        };
        let status = Paragraph::new(Line::from(vec![Span::styled(
            self.status.as_str(),
            Style::default().fg(color),
        )]));
        frame.render_widget(status, area);
    }
}

fn auth_field_line<'a>(
    label: &'a str,
    value: &'a str,
    mask: bool,
    focused: bool,
    theme: &Theme,
) -> Line<'a> {
    let shown = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▏" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!(" {label}: "), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("{shown}{cursor}"), style),
    ])
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn rating_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to leave raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to restore cursor")?;
    Ok(())
}
