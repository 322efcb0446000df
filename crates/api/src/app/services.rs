//! Store and engine wiring behind the HTTP handlers.
//!
//! Stores are type-erased behind `Arc<dyn …>` so one `AppServices` value
//! serves both the in-memory and the Postgres backends.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument};

use wallet_auth::{
    AuthorizationGuard, IdentityDirectory, IssuedToken, RevocationStore, Scope, TokenCodec,
};
use wallet_core::{Account, Identity, Receipt, StoreError, TransactionRecord};
use wallet_infra::{
    AccountStore, InMemoryAccountStore, InMemoryRevocationStore, InMemoryTransactionLog,
    InMemoryUserStore, LedgerEngine, NewUser, Page, PasswordHashing, PostgresAccountStore,
    PostgresRevocationStore, PostgresTransactionLog, PostgresUserStore, TransactionLog,
    UserProfile, UserRecord, UserStore, WalletConfig,
};
use wallet_ledger::{TransferError, TransferRequest};

use crate::app::errors::ApiError;

pub type DynLedger = LedgerEngine<Arc<dyn AccountStore>, Arc<dyn TransactionLog>>;
pub type DynGuard = AuthorizationGuard<Arc<dyn RevocationStore>, Arc<dyn IdentityDirectory>>;

pub struct AppServices {
    ledger: DynLedger,
    guard: DynGuard,
    accounts: Arc<dyn AccountStore>,
    users: Arc<dyn UserStore>,
    revocations: Arc<dyn RevocationStore>,
    codec: Arc<TokenCodec>,
    passwords: PasswordHashing,
}

impl AppServices {
    fn assemble<A>(
        config: &WalletConfig,
        accounts: Arc<A>,
        log: Arc<dyn TransactionLog>,
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self
    where
        A: AccountStore + IdentityDirectory + 'static,
    {
        let codec = Arc::new(TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl));
        let directory: Arc<dyn IdentityDirectory> = accounts.clone();
        let accounts: Arc<dyn AccountStore> = accounts;

        let guard = AuthorizationGuard::new(codec.clone(), revocations.clone(), directory)
            .with_store_timeout(config.store_timeout);
        let ledger = LedgerEngine::new(accounts.clone(), log).with_store_timeout(config.store_timeout);

        Self {
            ledger,
            guard,
            accounts,
            users,
            revocations,
            codec,
            passwords: PasswordHashing::new(config.password_pepper.as_deref()),
        }
    }

    /// Process-local stores (dev/tests).
    pub fn in_memory(config: &WalletConfig) -> Self {
        Self::assemble(
            config,
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTransactionLog::new()),
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRevocationStore::new()),
        )
    }

    /// Postgres-backed stores sharing one pool.
    pub fn postgres(config: &WalletConfig, pool: sqlx::PgPool) -> Self {
        Self::assemble(
            config,
            Arc::new(PostgresAccountStore::new(pool.clone())),
            Arc::new(PostgresTransactionLog::new(pool.clone())),
            Arc::new(PostgresUserStore::new(pool.clone())),
            Arc::new(PostgresRevocationStore::new(pool)),
        )
    }

    pub fn guard(&self) -> &DynGuard {
        &self.guard
    }

    pub fn ledger(&self) -> &DynLedger {
        &self.ledger
    }

    pub fn accounts(&self) -> &Arc<dyn AccountStore> {
        &self.accounts
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create the user row and an empty wallet.
    #[instrument(skip_all, fields(email = %user.email), err(level = "debug"))]
    pub async fn register(&self, user: NewUser) -> Result<Identity, ApiError> {
        if self.users.find_by_email(&user.email).await?.is_some()
            || self.users.find_by_username(&user.username).await?.is_some()
        {
            return Err(ApiError::UserExists);
        }

        let password_hash = self.hash_password(user.password.clone()).await?;
        let record = UserRecord {
            email: user.email.clone(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash,
            created_at: Utc::now(),
        };

        match self.users.insert(record).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(ApiError::UserExists),
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.accounts.open(&user.email).await {
            error!(error = %e, "user registered but wallet could not be opened");
            return Err(e.into());
        }

        info!("user registered");
        Ok(user.email)
    }

    /// Check credentials and issue a token with the default user scopes.
    #[instrument(skip_all, err(level = "debug"))]
    pub async fn login(
        &self,
        login: &str,
        password: &str,
    ) -> Result<(IssuedToken, UserProfile), ApiError> {
        let user = self
            .users
            .find_by_login(login)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(ApiError::WrongPassword);
        }

        let issued = self
            .codec
            .issue(&user.email, &Scope::default_user_scopes())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok((issued, user.profile()))
    }

    /// Argon2 is CPU-bound; it runs on the blocking pool.
    async fn hash_password(&self, password: String) -> Result<String, ApiError> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(ApiError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, ApiError> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(ApiError::from)
    }

    /// Revoke the presented token and any extra token the caller names.
    pub async fn logout(&self, presented: &str, extra: Option<&str>) -> Result<(), ApiError> {
        self.revocations.revoke_token(presented).await?;
        if let Some(extra) = extra.filter(|t| !t.trim().is_empty() && *t != presented) {
            self.revocations.revoke_token(extra.trim()).await?;
        }
        Ok(())
    }

    pub async fn pay(
        &self,
        sender: &Identity,
        recipient: &str,
        amount: i64,
    ) -> Result<Receipt, TransferError> {
        self.ledger
            .transfer(TransferRequest::new(sender.clone(), recipient, amount))
            .await
    }

    pub async fn balance(&self, owner: &Identity) -> Result<Account, TransferError> {
        self.ledger.balance(owner).await
    }

    pub async fn transactions(
        &self,
        owner: &Identity,
        page: Page,
    ) -> Result<Vec<TransactionRecord>, TransferError> {
        self.ledger.history(owner, page).await
    }

    pub async fn details(&self, owner: &Identity) -> Result<UserProfile, ApiError> {
        self.users
            .find_by_email(owner)
            .await?
            .map(|u| u.profile())
            .ok_or(ApiError::UserNotFound)
    }
}

/// Build services from configuration: Postgres when `DATABASE_URL` is set,
/// otherwise in-memory stores.
pub async fn build_services(config: &WalletConfig) -> Result<AppServices, StoreError> {
    match &config.database {
        Some(db) => {
            let pool = wallet_infra::postgres::connect(db).await?;
            wallet_infra::postgres::ensure_schema(&pool).await?;
            Ok(AppServices::postgres(config, pool))
        }
        None => {
            info!("DATABASE_URL not set; using in-memory stores");
            Ok(AppServices::in_memory(config))
        }
    }
}
