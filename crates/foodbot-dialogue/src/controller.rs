//! The per-user dialogue state machine.
//!
//! Messages of one user are processed strictly in order: each user owns a
//! session lock that is held for the whole step, including ledger calls.
//! Different users never contend on the same lock.

use crate::clock::{Clock, SystemClock};
use crate::command::Command;
use crate::error::{DialogueError, DialogueResult};
use crate::reply::{QuickChoice, Reply};
use crate::selection::Selection;
use crate::state::DialogueState;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use foodbot_common::{normalize, parse_quantity, Product, Report, User};
use foodbot_ledger::{Ledger, LedgerResult, ProductCatalog, Store};
use foodbot_stats::{render_today, render_week, ReportAggregator};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const LIMIT_PROMPT: &str = "Enter your daily limit (kcal)";
const GRAMS_PROMPT: &str = "Enter how many grams you've eaten";

/// Largest accepted energy value per 100 g.
pub const MAX_KCAL_PER_100G: u32 = 10_000;

/// Largest accepted portion in grams.
pub const MAX_GRAMS: u32 = 100_000;

/// Tunables of the dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSettings {
    /// Recency cache capacity and number of quick choices on `/add`.
    pub recent_products: usize,
    /// Offset given to users registered through `/start`.
    pub default_timezone_offset_seconds: i32,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            recent_products: 5,
            default_timezone_offset_seconds: 0,
        }
    }
}

type Session = Arc<Mutex<DialogueState>>;

/// Drives every user's conversation.
#[derive(Debug)]
pub struct DialogueController {
    ledger: Arc<Ledger>,
    catalog: Arc<ProductCatalog>,
    aggregator: ReportAggregator,
    clock: Arc<dyn Clock>,
    settings: DialogueSettings,
    sessions: DashMap<String, Session>,
}

impl DialogueController {
    /// Creates a controller over already opened components.
    pub fn new(
        ledger: Arc<Ledger>,
        catalog: Arc<ProductCatalog>,
        clock: Arc<dyn Clock>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            aggregator: ReportAggregator::new(Arc::clone(&ledger)),
            ledger,
            catalog,
            clock,
            settings,
            sessions: DashMap::new(),
        }
    }

    /// Opens the ledger over `store` and rebuilds the product catalog.
    pub async fn bootstrap(store: Arc<dyn Store>, settings: DialogueSettings) -> LedgerResult<Self> {
        Self::bootstrap_with_clock(store, settings, Arc::new(SystemClock)).await
    }

    /// Same as [`DialogueController::bootstrap`] with an explicit clock.
    pub async fn bootstrap_with_clock(
        store: Arc<dyn Store>,
        settings: DialogueSettings,
        clock: Arc<dyn Clock>,
    ) -> LedgerResult<Self> {
        let ledger = Arc::new(Ledger::open(store).await?);

        let catalog =
            ProductCatalog::from_products(ledger.load_products().await, settings.recent_products);
        catalog.seed_recent(ledger.recent_products(settings.recent_products).await);
        info!(
            products = catalog.len(),
            recent = catalog.recent().len(),
            "Dialogue controller ready"
        );

        Ok(Self::new(ledger, Arc::new(catalog), clock, settings))
    }

    /// The ledger this controller writes to.
    pub const fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// The product catalog.
    pub const fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    /// Current state of `name`, if a conversation was ever started.
    pub async fn state_of(&self, name: &str) -> Option<DialogueState> {
        let session = self.sessions.get(name).map(|entry| Arc::clone(entry.value()))?;
        let state = session.lock().await;
        Some(state.clone())
    }

    fn session(&self, name: &str) -> Session {
        Arc::clone(
            self.sessions
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(DialogueState::Idle)))
                .value(),
        )
    }

    /// Handles one text message from `name`.
    ///
    /// Unknown users get [`DialogueError::UserNotFound`] unless the message is
    /// `/start`, which registers them.
    pub async fn handle(&self, name: &str, text: &str) -> DialogueResult<Reply> {
        let command = Command::parse(text);

        match self.ledger.find_user(name).await {
            Ok(_) => {}
            Err(e) if e.is_user_not_found() && command == Command::Start => {
                self.ledger
                    .register_user(name, self.settings.default_timezone_offset_seconds)
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        let session = self.session(name);
        let mut state = session.lock().await;
        // Re-read under the lock so a limit saved by the previous step is visible.
        let user = self.ledger.find_user(name).await?;

        debug!(user = name, state = state.name(), ?command, "Handling message");
        let result = self.step(&user, &mut state, command, text).await;
        debug!(user = name, state = state.name(), ok = result.is_ok(), "Message handled");
        result
    }

    /// Handles an inline choice from `name`.
    ///
    /// Only valid while the user is choosing a product or its energy value.
    pub async fn handle_selection(&self, name: &str, payload: &str) -> DialogueResult<Reply> {
        let user = self.ledger.find_user(name).await?;
        let session = self.session(&user.name);
        let mut state = session.lock().await;

        let selection = Selection::decode(payload).map_err(|e| {
            warn!(user = name, "Rejected selection payload: {}", e);
            DialogueError::from(e)
        })?;

        let started_at = match &*state {
            DialogueState::AwaitingProduct { started_at }
            | DialogueState::AwaitingKcal { started_at, .. } => *started_at,
            DialogueState::Idle
            | DialogueState::AwaitingLimit
            | DialogueState::AwaitingGrams { .. } => {
                return Err(DialogueError::UnexpectedSelection);
            }
        };

        if selection.kcal_per_100g > MAX_KCAL_PER_100G {
            warn!(user = name, kcal = selection.kcal_per_100g, "Rejected selection energy value");
            return Err(DialogueError::out_of_range(
                &selection.kcal_per_100g.to_string(),
                "an integer up to 10000",
                kcal_retry_prompt(&selection.product),
            ));
        }

        debug!(user = name, product = %selection.product, kcal = selection.kcal_per_100g, "Selection accepted");
        let reply = grams_prompt(&selection.product);
        *state = DialogueState::AwaitingGrams {
            started_at,
            product: selection.product,
            kcal_per_100g: selection.kcal_per_100g,
        };
        Ok(reply)
    }

    async fn step(
        &self,
        user: &User,
        state: &mut DialogueState,
        command: Command,
        text: &str,
    ) -> DialogueResult<Reply> {
        if command == Command::Cancel {
            return Ok(cancel(user, state));
        }

        match state.clone() {
            DialogueState::Idle => self.idle(user, state, command).await,
            DialogueState::AwaitingLimit => self.accept_limit(user, state, text).await,
            DialogueState::AwaitingProduct { started_at } => {
                self.accept_product(state, started_at, text)
            }
            DialogueState::AwaitingKcal {
                started_at,
                product,
            } => accept_kcal(state, started_at, product, text),
            DialogueState::AwaitingGrams {
                started_at,
                product,
                kcal_per_100g,
            } => {
                self.accept_grams(user, state, started_at, product, kcal_per_100g, text)
                    .await
            }
        }
    }

    async fn idle(
        &self,
        user: &User,
        state: &mut DialogueState,
        command: Command,
    ) -> DialogueResult<Reply> {
        match command {
            Command::Start => {
                *state = DialogueState::AwaitingLimit;
                Ok(Reply::plain("Hi! What's your daily limit (kcal)?"))
            }
            Command::Limit => {
                *state = DialogueState::AwaitingLimit;
                Ok(Reply::plain("Ok, what's your new daily limit (kcal)?"))
            }
            Command::Add => {
                *state = DialogueState::AwaitingProduct {
                    started_at: self.clock.now(),
                };
                Ok(self.add_prompt())
            }
            Command::Stat => {
                let summary = self.aggregator.today(user, self.clock.now()).await;
                Ok(Reply::structured(render_today(
                    &summary,
                    user.timezone_offset_seconds,
                )))
            }
            Command::Stat7 => {
                let summary = self.aggregator.week(user, self.clock.now()).await;
                Ok(Reply::structured(render_week(&summary)))
            }
            Command::Cancel => Ok(cancel(user, state)),
            Command::Text(text) => Err(DialogueError::UnrecognizedCommand(text)),
        }
    }

    fn add_prompt(&self) -> Reply {
        let choices: Vec<QuickChoice> = self
            .catalog
            .recent()
            .into_iter()
            .take(self.settings.recent_products)
            .filter_map(|product| {
                let payload = Selection::new(&product.name, product.kcal_per_100g).encode()?;
                Some(QuickChoice {
                    label: product.to_string(),
                    payload,
                })
            })
            .collect();

        if choices.is_empty() {
            return Reply::plain("All right! Tell me, what have you eaten?");
        }
        Reply::plain(
            "These products were recently reported to the bot. \
             Choose one of them, or enter what have you eaten.",
        )
        .with_choices(choices)
    }

    async fn accept_limit(
        &self,
        user: &User,
        state: &mut DialogueState,
        text: &str,
    ) -> DialogueResult<Reply> {
        let limit =
            parse_quantity(text).ok_or_else(|| DialogueError::not_an_integer(text, LIMIT_PROMPT))?;

        self.ledger.set_daily_limit(user, limit).await?;
        *state = DialogueState::Idle;
        info!(user = %user.name, limit, "Daily limit saved");
        Ok(Reply::plain(
            "Limit saved, thanks! Now you can /add food or see /stat for today.",
        ))
    }

    fn accept_product(
        &self,
        state: &mut DialogueState,
        started_at: DateTime<Utc>,
        text: &str,
    ) -> DialogueResult<Reply> {
        let product = normalize(text);
        if product.is_empty() {
            return Err(DialogueError::EmptyProductName);
        }

        let known = self.catalog.lookup(&product);
        let reply = kcal_prompt(&product, &known);
        *state = DialogueState::AwaitingKcal {
            started_at,
            product,
        };
        Ok(reply)
    }

    async fn accept_grams(
        &self,
        user: &User,
        state: &mut DialogueState,
        started_at: DateTime<Utc>,
        product: String,
        kcal_per_100g: u32,
        text: &str,
    ) -> DialogueResult<Reply> {
        let grams = match parse_quantity(text) {
            None => return Err(DialogueError::not_an_integer(text, GRAMS_PROMPT)),
            Some(0) => return Err(DialogueError::not_positive(text, GRAMS_PROMPT)),
            Some(grams) if grams > MAX_GRAMS => {
                return Err(DialogueError::out_of_range(
                    text,
                    "a positive integer up to 100000",
                    GRAMS_PROMPT,
                ))
            }
            Some(grams) => grams,
        };

        let report = Report {
            timestamp: started_at,
            product_name: product,
            kcal_per_100g,
            grams,
        };
        self.ledger.append_report(user.id, &report).await?;
        *state = DialogueState::Idle;
        info!(
            user = %user.name,
            product = %report.product_name,
            kcal = kcal_per_100g,
            grams,
            "Report saved"
        );

        if self.catalog.upsert(&report.product_name, kcal_per_100g) {
            if let Err(e) = self.ledger.save_product(&report.product()).await {
                warn!(product = %report.product_name, "Failed to persist new product: {}", e);
            }
        }

        let today = self.aggregator.today(user, self.clock.now()).await;
        let limit = u64::from(user.daily_limit_kcal);
        let text = if today.in_limit {
            format!(
                "Noted\\. *{} kcal* left for today 😋\nLet's /add more food\\.",
                limit - today.total_kcal
            )
        } else {
            format!(
                "Noted\\. You ate *{} kcal* over the limit 😱\nYou can see /stat7 for the last week\\.",
                today.total_kcal - limit
            )
        };
        Ok(Reply::structured(text))
    }
}

fn cancel(user: &User, state: &mut DialogueState) -> Reply {
    let reply = match state {
        DialogueState::Idle => {
            Reply::plain("Nothing to cancel... Maybe /add food or see /stat for today?")
        }
        DialogueState::AwaitingLimit => Reply::plain(format!(
            "Ok. Your limit is still {} kcal.",
            user.daily_limit_kcal
        )),
        DialogueState::AwaitingProduct { .. }
        | DialogueState::AwaitingKcal { .. }
        | DialogueState::AwaitingGrams { .. } => {
            Reply::plain("All right, no food has been reported.")
        }
    };
    *state = DialogueState::Idle;
    reply
}

fn accept_kcal(
    state: &mut DialogueState,
    started_at: DateTime<Utc>,
    product: String,
    text: &str,
) -> DialogueResult<Reply> {
    let kcal_per_100g = match parse_quantity(text) {
        None => return Err(DialogueError::not_an_integer(text, kcal_retry_prompt(&product))),
        Some(kcal) if kcal > MAX_KCAL_PER_100G => {
            return Err(DialogueError::out_of_range(
                text,
                "an integer up to 10000",
                kcal_retry_prompt(&product),
            ))
        }
        Some(kcal) => kcal,
    };

    let reply = grams_prompt(&product);
    *state = DialogueState::AwaitingGrams {
        started_at,
        product,
        kcal_per_100g,
    };
    Ok(reply)
}

fn kcal_retry_prompt(product: &str) -> String {
    format!("Enter kcal per 💯g for {product:?}")
}

fn kcal_prompt(product: &str, known: &[u32]) -> Reply {
    if known.is_empty() {
        return Reply::plain(format!(
            "How many calories (kcal per 💯g) are there in {product:?}?"
        ));
    }

    let shortcuts: Vec<String> = known.iter().map(|kcal| format!("/{kcal}")).collect();
    let choices = known
        .iter()
        .filter_map(|kcal| {
            let payload = Selection::new(product, *kcal).encode()?;
            Some(QuickChoice {
                label: Product::new(product, *kcal).to_string(),
                payload,
            })
        })
        .collect();

    Reply::plain(format!(
        "Choose one of the products from the list or enter new calorie amount \
         (kcal per 💯g) for {product:?}.\nKnown values: {}",
        shortcuts.join(" ")
    ))
    .with_choices(choices)
}

fn grams_prompt(product: &str) -> Reply {
    Reply::plain(format!("How many grams of {product:?} have you eaten?"))
}
