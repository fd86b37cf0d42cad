//! User and token operations.
//!
//! Services hold configuration only. Every operation takes the connection to
//! run on, so callers decide between a pooled client and a transaction.

use crate::auth::{Claims, PasswordHasher, TokenKind, TokenSigner, parse_bearer};
use crate::config::{AppConfig, PaginationConfig, TokenConfig};
use crate::dto::{
    FieldErrors, LoginRequest, LoginTokens, Page, RegisterRequest, UsersParams, pages_count,
};
use crate::error::{Action, ErrorCode, ServiceError, ServiceResult};
use crate::models::{Token, User, UserSummary};
use chrono::Utc;
use querygen::{Entity, Filter, Generator, GeneratorConfig, GenericClient};


/// Read side: lookups and listings.
#[derive(Debug, Clone)]
pub struct UserService {
    generators: GeneratorConfig,
    pagination: PaginationConfig,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            generators: config.generator_config(),
            pagination: config.pagination.clone(),
        }
    }

    pub fn with_parts(generators: GeneratorConfig, pagination: PaginationConfig) -> Self {
        Self {
            generators,
            pagination,
        }
    }

    pub(crate) fn generator<E: Entity>(&self, row: E) -> Generator<E> {
        Generator::for_entity_with(row, self.generators.clone())
    }

    /// Whether no user is registered with `phone`.
    pub async fn phone_is_unique(
        &self,
        conn: &impl GenericClient,
        phone: &str,
    ) -> ServiceResult<bool> {
        let mut users = self.generator(User::default());
        match users
            .select(Filter::new().eq("phone_number", phone))
            .try_exec_single_row(conn)
            .await
        {
            Ok(()) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(ServiceError::new(
                ErrorCode::ServiceUnavailable,
                Action::Resend,
                "InternalServerError",
                e.to_string(),
            )),
        }
    }

    /// Load a user by id.
    pub async fn me(&self, conn: &impl GenericClient, user_id: i64) -> ServiceResult<User> {
        let mut users = self.generator(User::with_id(user_id));
        match users.get_me().try_exec_single_row(conn).await {
            Ok(()) => Ok(users.into_row()),
            Err(e) if e.is_not_found() => Err(ServiceError::new(
                ErrorCode::NotFound,
                Action::DoNothing,
                "UserNotFound",
                e.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// One page of users, optionally filtered by a search term matched
    /// against display name and phone number.
    pub async fn list_users(
        &self,
        conn: &impl GenericClient,
        params: &UsersParams,
    ) -> ServiceResult<Page<UserSummary>> {
        let query = params.resolve(&self.pagination)?;
        let mut users = self.generator(UserSummary::default());

        let predicate = match &query.search {
            Some(term) => users.like_where_clause([
                ("display_name", term.as_str()),
                ("phone_number", term.as_str()),
            ]),
            None => String::new(),
        };

        let all_count = users
            .select_count_where(&predicate)
            .exec_count(conn)
            .await?;
        let pages = pages_count(all_count, query.per_page);
        if query.page > pages {
            return Err(ServiceError::new(
                ErrorCode::NotFound,
                Action::DoNothing,
                "PageNotFound",
                format!("page {} requested but we have {pages} pages", query.page),
            ));
        }

        let mut data = Vec::new();
        users
            .select_where(&predicate)
            .order_by(&query.order_by, query.order)?
            .paginate(query.per_page, query.page)?;
        users.exec_multi_row(conn, &mut data).await?;

        Ok(Page::new(all_count, query.per_page, query.page, data))
    }
}

/// Credential side: registration, login and bearer checks.
pub struct AuthService<H, S> {
    users: UserService,
    tokens: TokenConfig,
    hasher: H,
    signer: S,
}

impl<H: PasswordHasher, S: TokenSigner> AuthService<H, S> {
    pub fn new(config: &AppConfig, hasher: H, signer: S) -> Self {
        Self {
            users: UserService::new(config),
            tokens: config.tokens.clone(),
            hasher,
            signer,
        }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Create an active user and return it as stored.
    pub async fn register(
        &self,
        conn: &impl GenericClient,
        req: &RegisterRequest,
    ) -> ServiceResult<User> {
        let mut errors = req.validate();
        if errors.get("phone_number").is_none()
            && !self.users.phone_is_unique(conn, &req.phone_number).await?
        {
            errors.add("phone_number", "PhoneIsUnique");
        }
        errors.into_body_result()?;

        let mut user = User::new();
        user.summary.display_name = req.display_name.clone();
        user.phone_number = req.phone_number.clone();
        user.password = self
            .hasher
            .hash(&req.password)
            .map_err(ServiceError::internal)?;
        user.is_active = true;

        let mut users = self.users.generator(user);
        if let Err(e) = users.insert_into().try_exec_mutation(conn).await {
            // Lost a race with another registration of the same phone.
            if e.is_unique_violation() {
                let mut errors = FieldErrors::new();
                errors.add("phone_number", "PhoneIsUnique");
                return Err(errors.into_body_error());
            }
            return Err(ServiceError::internal(e));
        }

        users
            .select(Filter::new().eq("phone_number", req.phone_number.as_str()))
            .exec_single_row(conn)
            .await?;
        let user = users.into_row();
        tracing::info!(user_id = user.id(), "user registered");
        Ok(user)
    }

    /// Check credentials and issue an access and a refresh token.
    pub async fn login(
        &self,
        conn: &impl GenericClient,
        req: &LoginRequest,
    ) -> ServiceResult<LoginTokens> {
        req.validate().into_body_result()?;

        let mut users = self.users.generator(User::default());
        match users
            .select(Filter::new().eq("phone_number", req.phone_number.as_str()))
            .try_exec_single_row(conn)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                return Err(ServiceError::new(
                    ErrorCode::Invalid,
                    Action::ReSignIn,
                    "UserWithPhoneNumberNotFound",
                    e.to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
        let user = users.into_row();

        if !self.hasher.verify(&req.password, &user.password) {
            return Err(ServiceError::new(
                ErrorCode::Invalid,
                Action::ReSignIn,
                "PasswordOrPhoneNumberDoNotMatch",
                "password didn't match",
            ));
        }

        let access = self.issue(conn, user.id(), TokenKind::Access).await?;
        let refresh = self.issue(conn, user.id(), TokenKind::Refresh).await?;
        tracing::info!(user_id = user.id(), "user logged in");

        Ok(LoginTokens {
            access_token: access.bearer(),
            refresh_token: refresh.bearer(),
        })
    }

    /// Sign a token of `kind` for `user_id` and store it.
    pub async fn issue(
        &self,
        conn: &impl GenericClient,
        user_id: i64,
        kind: TokenKind,
    ) -> ServiceResult<Token> {
        let lifetime = match kind {
            TokenKind::Access => self.tokens.access_lifetime(),
            TokenKind::Refresh => self.tokens.refresh_lifetime(),
        };
        let claims = Claims {
            user_id,
            kind,
            expires_at: Utc::now() + lifetime,
        };
        let signed = self.signer.sign(&claims).map_err(ServiceError::internal)?;

        let mut tokens = self.users.generator(Token::new(
            signed,
            kind.is_refresh(),
            claims.expires_at,
            user_id,
        ));
        tokens.insert_into().exec_mutation(conn).await?;
        Ok(tokens.into_row())
    }

    /// Resolve an `<id>|<signed>` access token to its user.
    pub async fn authenticate(
        &self,
        conn: &impl GenericClient,
        header: &str,
    ) -> ServiceResult<User> {
        let (token_id, signed) =
            parse_bearer(header).ok_or_else(|| ServiceError::login_please("sent token is not valid"))?;

        let claims = self
            .signer
            .verify(signed)
            .map_err(|e| ServiceError::login_please(e.to_string()))?;
        if claims.is_expired(Utc::now()) {
            return Err(ServiceError::login_please("token is expired"));
        }
        if claims.kind != TokenKind::Access {
            return Err(ServiceError::login_please("token is not access token"));
        }

        let mut tokens = self.users.generator(Token::with_id(token_id));
        match tokens.get_me().try_exec_single_row(conn).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Err(ServiceError::login_please(e.to_string())),
            Err(e) => return Err(e.into()),
        }
        let stored = tokens.into_row();
        if stored.token != signed || stored.user_id != claims.user_id {
            return Err(ServiceError::login_please("token does not match its record"));
        }

        match self.users.me(conn, claims.user_id).await {
            Ok(user) => Ok(user),
            Err(e) if e.code == ErrorCode::NotFound => Err(ServiceError::login_please(e.detail)),
            Err(e) => Err(e),
        }
    }
}
