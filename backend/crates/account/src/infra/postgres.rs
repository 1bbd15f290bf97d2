//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entity::{
    authentication_account::AuthenticationAccount,
    registration_confirmation::RegistrationConfirmation,
};
use crate::domain::repository::{
    AccountRepository, ConfirmationRepository, PendingWrite, UnitOfWork, WriteSet,
};
use crate::domain::value_object::{
    account_status::{UnsubscribeStatus, VerificationStatus},
    email::UserEmail,
    login_restriction::{LoginRestriction, LoginRestrictionStatus},
    one_time_password::OneTimePassword,
    one_time_token::{OneTimeToken, OneTimeTokenValue},
    user_id::UserId,
    user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AccountError, AccountResult};

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AccountResult<()> {
        sqlx::migrate!("../../../database/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AccountError::Transaction(format!("migration failed: {}", e)))?;

        tracing::info!("Account migrations applied");
        Ok(())
    }

    /// Remove confirmations whose token has expired
    ///
    /// Pending accounts left without one get a new pair on resend.
    pub async fn cleanup_expired_confirmations(&self, now: DateTime<Utc>) -> AccountResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM registration_confirmations WHERE one_time_token_expiration <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(
            confirmations_deleted = deleted,
            "Cleaned up expired registration confirmations"
        );

        Ok(deleted)
    }
}

/// Failed writes, constraint violations included, are transaction errors
fn storage_error(e: sqlx::Error) -> AccountError {
    AccountError::Transaction(e.to_string())
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAccountRepository {
    fn next_user_id(&self) -> UserId {
        UserId::new()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<AuthenticationAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                user_id,
                email,
                user_name,
                password_hash,
                verification_status,
                unsubscribe_status,
                failed_login_count,
                login_restriction_status,
                next_login_allowed_at
            FROM authentication_accounts
            WHERE user_id = $1
              AND unsubscribe_status = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(UnsubscribeStatus::Subscribed.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(
        &self,
        email: &UserEmail,
    ) -> AccountResult<Option<AuthenticationAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                user_id,
                email,
                user_name,
                password_hash,
                verification_status,
                unsubscribe_status,
                failed_login_count,
                login_restriction_status,
                next_login_allowed_at
            FROM authentication_accounts
            WHERE email = $1
              AND unsubscribe_status = $2
            "#,
        )
        .bind(email.as_str())
        .bind(UnsubscribeStatus::Subscribed.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn save(&self, account: &AuthenticationAccount) -> AccountResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_account(&mut *conn, account).await
    }
}

// ============================================================================
// Confirmation Repository Implementation
// ============================================================================

impl ConfirmationRepository for PgAccountRepository {
    async fn find_by_token_value(
        &self,
        token: &OneTimeTokenValue,
    ) -> AccountResult<Option<RegistrationConfirmation>> {
        let row = sqlx::query_as::<_, ConfirmationRow>(
            r#"
            SELECT
                user_id,
                one_time_token_value,
                one_time_token_expiration,
                one_time_password
            FROM registration_confirmations
            WHERE one_time_token_value = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_confirmation()).transpose()
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> AccountResult<Option<RegistrationConfirmation>> {
        let row = sqlx::query_as::<_, ConfirmationRow>(
            r#"
            SELECT
                user_id,
                one_time_token_value,
                one_time_token_expiration,
                one_time_password
            FROM registration_confirmations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_confirmation()).transpose()
    }

    async fn save(&self, confirmation: &RegistrationConfirmation) -> AccountResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_confirmation(&mut *conn, confirmation).await
    }

    async fn delete(&self, user_id: &UserId) -> AccountResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_confirmation(&mut *conn, user_id).await
    }
}

// ============================================================================
// Unit of Work Implementation
// ============================================================================

impl UnitOfWork for PgAccountRepository {
    async fn perform_transaction<F>(&self, work: F) -> AccountResult<()>
    where
        F: FnOnce(&mut WriteSet) -> AccountResult<()> + Send,
    {
        let write_set = WriteSet::record(work)?;

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // Dropping `tx` before commit rolls back
        for write in write_set.into_writes() {
            match write {
                PendingWrite::SaveAccount(account) => upsert_account(&mut *tx, &account).await?,
                PendingWrite::SaveConfirmation(confirmation) => {
                    upsert_confirmation(&mut *tx, &confirmation).await?
                }
                PendingWrite::DeleteConfirmation(user_id) => {
                    delete_confirmation(&mut *tx, &user_id).await?
                }
            }
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }
}

// ============================================================================
// Statements
// ============================================================================

async fn upsert_account(
    conn: &mut PgConnection,
    account: &AuthenticationAccount,
) -> AccountResult<()> {
    let restriction = account.login_restriction();
    let failed_login_count = i32::try_from(restriction.failed_login_count())
        .map_err(|_| AccountError::Internal("failed_login_count out of range".to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO authentication_accounts (
            user_id,
            email,
            user_name,
            password_hash,
            verification_status,
            unsubscribe_status,
            failed_login_count,
            login_restriction_status,
            next_login_allowed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id) DO UPDATE SET
            email = EXCLUDED.email,
            user_name = EXCLUDED.user_name,
            password_hash = EXCLUDED.password_hash,
            verification_status = EXCLUDED.verification_status,
            unsubscribe_status = EXCLUDED.unsubscribe_status,
            failed_login_count = EXCLUDED.failed_login_count,
            login_restriction_status = EXCLUDED.login_restriction_status,
            next_login_allowed_at = EXCLUDED.next_login_allowed_at,
            updated_at = now()
        "#,
    )
    .bind(account.id().as_uuid())
    .bind(account.email().as_str())
    .bind(account.name().as_str())
    .bind(account.password().as_phc_string())
    .bind(account.verification_status().id())
    .bind(account.unsubscribe_status().id())
    .bind(failed_login_count)
    .bind(restriction.status().id())
    .bind(restriction.next_login_allowed_at())
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(())
}

async fn upsert_confirmation(
    conn: &mut PgConnection,
    confirmation: &RegistrationConfirmation,
) -> AccountResult<()> {
    let token = confirmation.one_time_token();

    sqlx::query(
        r#"
        INSERT INTO registration_confirmations (
            user_id,
            one_time_token_value,
            one_time_token_expiration,
            one_time_password
        ) VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE SET
            one_time_token_value = EXCLUDED.one_time_token_value,
            one_time_token_expiration = EXCLUDED.one_time_token_expiration,
            one_time_password = EXCLUDED.one_time_password,
            updated_at = now()
        "#,
    )
    .bind(confirmation.user_id().as_uuid())
    .bind(token.value().as_str())
    .bind(token.expiration())
    .bind(confirmation.one_time_password().as_str())
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(())
}

async fn delete_confirmation(conn: &mut PgConnection, user_id: &UserId) -> AccountResult<()> {
    sqlx::query("DELETE FROM registration_confirmations WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .execute(&mut *conn)
        .await
        .map_err(storage_error)?;

    Ok(())
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    user_id: Uuid,
    email: String,
    user_name: String,
    password_hash: String,
    verification_status: i16,
    unsubscribe_status: i16,
    failed_login_count: i32,
    login_restriction_status: i16,
    next_login_allowed_at: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_account(self) -> AccountResult<AuthenticationAccount> {
        let verification_status = VerificationStatus::from_id(self.verification_status)
            .ok_or_else(|| invalid_column("verification_status", self.verification_status))?;
        let unsubscribe_status = UnsubscribeStatus::from_id(self.unsubscribe_status)
            .ok_or_else(|| invalid_column("unsubscribe_status", self.unsubscribe_status))?;
        let restriction_status = LoginRestrictionStatus::from_id(self.login_restriction_status)
            .ok_or_else(|| {
                invalid_column("login_restriction_status", self.login_restriction_status)
            })?;
        let failed_login_count = u32::try_from(self.failed_login_count)
            .map_err(|_| invalid_column("failed_login_count", self.failed_login_count))?;

        let login_restriction = LoginRestriction::reconstruct(
            failed_login_count,
            restriction_status,
            self.next_login_allowed_at,
        )?;

        AuthenticationAccount::reconstruct(
            UserId::from_uuid(self.user_id),
            UserEmail::from_db(self.email),
            UserName::from_db(self.user_name),
            UserPassword::from_phc_string(self.password_hash)?,
            verification_status,
            unsubscribe_status,
            login_restriction,
        )
    }
}

#[derive(sqlx::FromRow)]
struct ConfirmationRow {
    user_id: Uuid,
    one_time_token_value: String,
    one_time_token_expiration: DateTime<Utc>,
    one_time_password: String,
}

impl ConfirmationRow {
    fn into_confirmation(self) -> AccountResult<RegistrationConfirmation> {
        Ok(RegistrationConfirmation::reconstruct(
            UserId::from_uuid(self.user_id),
            OneTimeToken::reconstruct(
                OneTimeTokenValue::from_db(self.one_time_token_value),
                self.one_time_token_expiration,
            ),
            OneTimePassword::reconstruct(self.one_time_password)?,
        ))
    }
}

fn invalid_column(column: &str, value: impl std::fmt::Display) -> AccountError {
    AccountError::InvariantViolation(format!("invalid {}: {}", column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::authentication_account::tests::hashed;

    fn account_row() -> AccountRow {
        AccountRow {
            user_id: Uuid::now_v7(),
            email: "test@example.com".to_string(),
            user_name: "Taro".to_string(),
            password_hash: hashed("ABCabc123_").as_phc_string().to_string(),
            verification_status: VerificationStatus::Verified.id(),
            unsubscribe_status: UnsubscribeStatus::Subscribed.id(),
            failed_login_count: 3,
            login_restriction_status: LoginRestrictionStatus::Unrestricted.id(),
            next_login_allowed_at: None,
        }
    }

    #[test]
    fn test_account_row_conversion() {
        let row = account_row();
        let user_id = row.user_id;

        let account = row.into_account().unwrap();
        assert_eq!(account.id().as_uuid(), &user_id);
        assert_eq!(account.email().as_str(), "test@example.com");
        assert_eq!(account.name().as_str(), "Taro");
        assert!(account.is_verified());
        assert_eq!(account.login_restriction().failed_login_count(), 3);
    }

    #[test]
    fn test_account_row_rejects_bad_columns() {
        let row = AccountRow {
            verification_status: 9,
            ..account_row()
        };
        assert!(matches!(
            row.into_account(),
            Err(AccountError::InvariantViolation(_))
        ));

        let row = AccountRow {
            failed_login_count: -1,
            ..account_row()
        };
        assert!(matches!(
            row.into_account(),
            Err(AccountError::InvariantViolation(_))
        ));

        let row = AccountRow {
            login_restriction_status: LoginRestrictionStatus::Restricted.id(),
            ..account_row()
        };
        assert!(matches!(
            row.into_account(),
            Err(AccountError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_unsubscribed_row_is_rejected() {
        let row = AccountRow {
            unsubscribe_status: UnsubscribeStatus::Unsubscribed.id(),
            ..account_row()
        };
        assert!(matches!(row.into_account(), Err(AccountError::Unsubscribed)));
    }

    #[test]
    fn test_confirmation_row_conversion() {
        let expiration = Utc::now();
        let row = ConfirmationRow {
            user_id: Uuid::now_v7(),
            one_time_token_value: "abcdefghijklmnopqrstuvwxyz".to_string(),
            one_time_token_expiration: expiration,
            one_time_password: "012345".to_string(),
        };

        let confirmation = row.into_confirmation().unwrap();
        assert_eq!(
            confirmation.one_time_token().value().as_str(),
            "abcdefghijklmnopqrstuvwxyz"
        );
        assert_eq!(confirmation.one_time_token().expiration(), expiration);
        assert_eq!(confirmation.one_time_password().as_str(), "012345");

        let bad = ConfirmationRow {
            user_id: Uuid::now_v7(),
            one_time_token_value: "abcdefghijklmnopqrstuvwxyz".to_string(),
            one_time_token_expiration: expiration,
            one_time_password: "12ab".to_string(),
        };
        assert!(bad.into_confirmation().is_err());
    }
}
