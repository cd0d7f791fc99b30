//! [`EntityStore`] over a `PostgreSQL` pool.

use crate::db_error;
use crate::query::render;
use crate::rows::{
    conference_from_row, profile_from_row, session_from_row, websafe_conference_keys,
    websafe_session_keys,
};
use async_stream::try_stream;
use chrono::NaiveDate;
use conference_core::filter::ConferenceQuery;
use conference_core::registration::RegistrationState;
use conference_core::store::{
    BoxFuture, ConferenceStream, ConferenceTxn, EntityStore, ProfileTxn, RegistrationTxn,
};
use conference_core::{
    Conference, ConferenceError, ConferenceKey, NewConference, NewSession, Profile, Result,
    Session, SessionId, SessionKey, UserId,
};
use futures::TryStreamExt;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// `PostgreSQL`-backed entity store.
#[derive(Clone, Debug)]
pub struct PostgresEntityStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PostgresEntityStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Bound how long a transaction waits for a row lock before giving up
    /// with [`ConferenceError::TransactionConflict`].
    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::Storage`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ConferenceError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let millis = self.lock_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL lock_timeout = '{millis}ms'"))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        Ok(tx)
    }
}

// ============================================================================
// Row writes shared by the transactions
// ============================================================================

async fn lock_profile(conn: &mut PgConnection, user_id: &UserId) -> Result<Profile> {
    let row = sqlx::query(
        r"
        SELECT user_id, display_name, main_email, tee_shirt_size,
               conference_keys_to_attend, session_keys_wishlist
        FROM profiles
        WHERE user_id = $1
        FOR UPDATE
        ",
    )
    .bind(user_id.as_str())
    .fetch_optional(conn)
    .await
    .map_err(db_error)?
    .ok_or_else(|| ConferenceError::not_found("profile", user_id.as_str()))?;

    profile_from_row(&row)
}

async fn lock_conference(conn: &mut PgConnection, key: &ConferenceKey) -> Result<Conference> {
    let row = sqlx::query(
        r"
        SELECT id, organizer_user_id, name, description, topics, city,
               start_date, end_date, month, max_attendees, seats_available
        FROM conferences
        WHERE id = $1 AND organizer_user_id = $2
        FOR UPDATE
        ",
    )
    .bind(key.id.get())
    .bind(key.organizer.as_str())
    .fetch_optional(conn)
    .await
    .map_err(db_error)?
    .ok_or_else(|| ConferenceError::not_found("conference", key.to_websafe()))?;

    conference_from_row(&row)
}

async fn write_profile(conn: &mut PgConnection, profile: &Profile) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO profiles (
            user_id, display_name, main_email, tee_shirt_size,
            conference_keys_to_attend, session_keys_wishlist
        ) VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            display_name = EXCLUDED.display_name,
            main_email = EXCLUDED.main_email,
            tee_shirt_size = EXCLUDED.tee_shirt_size,
            conference_keys_to_attend = EXCLUDED.conference_keys_to_attend,
            session_keys_wishlist = EXCLUDED.session_keys_wishlist,
            updated_at = now()
        ",
    )
    .bind(profile.user_id.as_str())
    .bind(&profile.display_name)
    .bind(&profile.main_email)
    .bind(profile.tee_shirt_size.as_str())
    .bind(websafe_conference_keys(profile))
    .bind(websafe_session_keys(profile))
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn write_conference(conn: &mut PgConnection, conference: &Conference) -> Result<()> {
    sqlx::query(
        r"
        UPDATE conferences SET
            name = $3,
            description = $4,
            topics = $5,
            city = $6,
            start_date = $7,
            end_date = $8,
            month = $9,
            max_attendees = $10,
            seats_available = $11,
            updated_at = now()
        WHERE id = $1 AND organizer_user_id = $2
        ",
    )
    .bind(conference.key.id.get())
    .bind(conference.organizer_user_id().as_str())
    .bind(&conference.name)
    .bind(&conference.description)
    .bind(&conference.topics)
    .bind(&conference.city)
    .bind(conference.start_date)
    .bind(conference.end_date)
    .bind(conference.month)
    .bind(conference.max_attendees)
    .bind(conference.seats_available)
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

// ============================================================================
// EntityStore
// ============================================================================

impl EntityStore for PostgresEntityStore {
    // ── Profiles ──────────────────────────────────────────────

    fn get_profile(&self, user_id: UserId) -> BoxFuture<'_, Result<Option<Profile>>> {
        Box::pin(async move {
            sqlx::query(
                r"
                SELECT user_id, display_name, main_email, tee_shirt_size,
                       conference_keys_to_attend, session_keys_wishlist
                FROM profiles
                WHERE user_id = $1
                ",
            )
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(|row| profile_from_row(&row))
            .transpose()
        })
    }

    fn get_profiles(&self, user_ids: Vec<UserId>) -> BoxFuture<'_, Result<Vec<Profile>>> {
        Box::pin(async move {
            let ids: Vec<String> = user_ids.iter().map(|id| id.as_str().to_string()).collect();
            let rows = sqlx::query(
                r"
                SELECT user_id, display_name, main_email, tee_shirt_size,
                       conference_keys_to_attend, session_keys_wishlist
                FROM profiles
                WHERE user_id = ANY($1)
                ",
            )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            let mut by_id: HashMap<UserId, Profile> = rows
                .iter()
                .map(|row| profile_from_row(row).map(|p| (p.user_id.clone(), p)))
                .collect::<Result<_>>()?;
            Ok(user_ids.iter().filter_map(|id| by_id.remove(id)).collect())
        })
    }

    fn put_profile(&self, profile: Profile) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.pool.acquire().await.map_err(db_error)?;
            write_profile(&mut *conn, &profile).await
        })
    }

    fn transact_profile(&self, user_id: UserId, txn: ProfileTxn) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut tx = self.begin().await?;
            let mut profile = lock_profile(&mut *tx, &user_id).await?;

            // Err drops the transaction, which rolls it back
            let changed = txn(&mut profile)?;

            write_profile(&mut *tx, &profile).await?;
            tx.commit().await.map_err(db_error)?;
            Ok(changed)
        })
    }

    // ── Conferences ───────────────────────────────────────────

    fn insert_conference(&self, conference: NewConference) -> BoxFuture<'_, Result<Conference>> {
        Box::pin(async move {
            let id: i64 = sqlx::query_scalar(
                r"
                INSERT INTO conferences (
                    organizer_user_id, name, description, topics, city,
                    start_date, end_date, month, max_attendees, seats_available
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id
                ",
            )
            .bind(conference.organizer_user_id.as_str())
            .bind(&conference.name)
            .bind(&conference.description)
            .bind(&conference.topics)
            .bind(&conference.city)
            .bind(conference.start_date)
            .bind(conference.end_date)
            .bind(conference.month)
            .bind(conference.max_attendees)
            .bind(conference.seats_available)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

            tracing::debug!(conference_id = id, "Conference inserted");
            Ok(conference.into_conference(conference_core::ConferenceId::new(id)))
        })
    }

    fn get_conference(&self, key: ConferenceKey) -> BoxFuture<'_, Result<Option<Conference>>> {
        Box::pin(async move {
            sqlx::query(
                r"
                SELECT id, organizer_user_id, name, description, topics, city,
                       start_date, end_date, month, max_attendees, seats_available
                FROM conferences
                WHERE id = $1 AND organizer_user_id = $2
                ",
            )
            .bind(key.id.get())
            .bind(key.organizer.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(|row| conference_from_row(&row))
            .transpose()
        })
    }

    fn get_conferences(&self, keys: Vec<ConferenceKey>) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let ids: Vec<i64> = keys.iter().map(|key| key.id.get()).collect();
            let rows = sqlx::query(
                r"
                SELECT id, organizer_user_id, name, description, topics, city,
                       start_date, end_date, month, max_attendees, seats_available
                FROM conferences
                WHERE id = ANY($1)
                ",
            )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            let mut by_key: HashMap<ConferenceKey, Conference> = rows
                .iter()
                .map(|row| conference_from_row(row).map(|c| (c.key.clone(), c)))
                .collect::<Result<_>>()?;
            Ok(keys.iter().filter_map(|key| by_key.remove(key)).collect())
        })
    }

    fn update_conference(
        &self,
        key: ConferenceKey,
        txn: ConferenceTxn,
    ) -> BoxFuture<'_, Result<Conference>> {
        Box::pin(async move {
            let mut tx = self.begin().await?;
            let mut conference = lock_conference(&mut *tx, &key).await?;

            txn(&mut conference)?;

            write_conference(&mut *tx, &conference).await?;
            tx.commit().await.map_err(db_error)?;
            Ok(conference)
        })
    }

    fn conferences_by_organizer(&self, organizer: UserId) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r#"
                SELECT id, organizer_user_id, name, description, topics, city,
                       start_date, end_date, month, max_attendees, seats_available
                FROM conferences
                WHERE organizer_user_id = $1
                ORDER BY name COLLATE "C", id
                "#,
            )
            .bind(organizer.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            rows.iter().map(conference_from_row).collect()
        })
    }

    fn query_conferences(&self, query: ConferenceQuery) -> ConferenceStream<'_> {
        Box::pin(try_stream! {
            let mut builder = render(&query);
            let mut rows = builder.build().fetch(&self.pool);
            while let Some(row) = rows.try_next().await.map_err(db_error)? {
                yield conference_from_row(&row)?;
            }
        })
    }

    fn conferences_with_seats_between(
        &self,
        min: i32,
        max: i32,
    ) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r#"
                SELECT id, organizer_user_id, name, description, topics, city,
                       start_date, end_date, month, max_attendees, seats_available
                FROM conferences
                WHERE seats_available BETWEEN $1 AND $2
                ORDER BY name COLLATE "C", id
                "#,
            )
            .bind(min)
            .bind(max)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            rows.iter().map(conference_from_row).collect()
        })
    }

    // ── Sessions ──────────────────────────────────────────────

    fn insert_session(&self, session: NewSession) -> BoxFuture<'_, Result<Session>> {
        Box::pin(async move {
            // Inserting through the parent row checks its key in the same statement
            let id: Option<i64> = sqlx::query_scalar(
                r"
                INSERT INTO sessions (
                    conference_id, name, highlights, speaker, duration,
                    type_of_session, date, start_time
                )
                SELECT c.id, $3, $4, $5, $6, $7, $8, $9
                FROM conferences c
                WHERE c.id = $1 AND c.organizer_user_id = $2
                RETURNING id
                ",
            )
            .bind(session.conference.id.get())
            .bind(session.conference.organizer.as_str())
            .bind(&session.name)
            .bind(&session.highlights)
            .bind(&session.speaker)
            .bind(session.duration)
            .bind(&session.type_of_session)
            .bind(session.date)
            .bind(session.start_time)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

            let id = id.ok_or_else(|| {
                ConferenceError::not_found("conference", session.conference.to_websafe())
            })?;
            tracing::debug!(session_id = id, "Session inserted");
            Ok(session.into_session(SessionId::new(id)))
        })
    }

    fn get_session(&self, key: SessionKey) -> BoxFuture<'_, Result<Option<Session>>> {
        Box::pin(async move {
            sqlx::query(
                r"
                SELECT s.id, s.conference_id, c.organizer_user_id, s.name,
                       s.highlights, s.speaker, s.duration, s.type_of_session,
                       s.date, s.start_time
                FROM sessions s
                JOIN conferences c ON c.id = s.conference_id
                WHERE s.id = $1 AND c.id = $2 AND c.organizer_user_id = $3
                ",
            )
            .bind(key.id.get())
            .bind(key.conference.id.get())
            .bind(key.conference.organizer.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(|row| session_from_row(&row))
            .transpose()
        })
    }

    fn get_sessions(&self, keys: Vec<SessionKey>) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let ids: Vec<i64> = keys.iter().map(|key| key.id.get()).collect();
            let rows = sqlx::query(
                r"
                SELECT s.id, s.conference_id, c.organizer_user_id, s.name,
                       s.highlights, s.speaker, s.duration, s.type_of_session,
                       s.date, s.start_time
                FROM sessions s
                JOIN conferences c ON c.id = s.conference_id
                WHERE s.id = ANY($1)
                ",
            )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            let mut by_key: HashMap<SessionKey, Session> = rows
                .iter()
                .map(|row| session_from_row(row).map(|s| (s.key.clone(), s)))
                .collect::<Result<_>>()?;
            Ok(keys.iter().filter_map(|key| by_key.remove(key)).collect())
        })
    }

    fn put_session(&self, session: Session) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE sessions s SET
                    name = $4,
                    highlights = $5,
                    speaker = $6,
                    duration = $7,
                    type_of_session = $8,
                    date = $9,
                    start_time = $10,
                    updated_at = now()
                FROM conferences c
                WHERE s.id = $1
                  AND c.id = s.conference_id
                  AND c.id = $2
                  AND c.organizer_user_id = $3
                ",
            )
            .bind(session.key.id.get())
            .bind(session.key.conference.id.get())
            .bind(session.organizer_user_id().as_str())
            .bind(&session.name)
            .bind(&session.highlights)
            .bind(&session.speaker)
            .bind(session.duration)
            .bind(&session.type_of_session)
            .bind(session.date)
            .bind(session.start_time)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

            if result.rows_affected() == 0 {
                return Err(ConferenceError::not_found("session", session.key.to_websafe()));
            }
            Ok(())
        })
    }

    fn delete_session(&self, key: SessionKey) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                DELETE FROM sessions s
                USING conferences c
                WHERE s.id = $1
                  AND c.id = s.conference_id
                  AND c.id = $2
                  AND c.organizer_user_id = $3
                ",
            )
            .bind(key.id.get())
            .bind(key.conference.id.get())
            .bind(key.conference.organizer.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn sessions_for_conference(
        &self,
        conference: ConferenceKey,
        type_of_session: Option<String>,
    ) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT s.id, s.conference_id, c.organizer_user_id, s.name,
                       s.highlights, s.speaker, s.duration, s.type_of_session,
                       s.date, s.start_time
                FROM sessions s
                JOIN conferences c ON c.id = s.conference_id
                WHERE c.id = $1
                  AND c.organizer_user_id = $2
                  AND ($3::TEXT IS NULL OR $3 = ANY(s.type_of_session))
                ORDER BY s.id
                ",
            )
            .bind(conference.id.get())
            .bind(conference.organizer.as_str())
            .bind(type_of_session)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            rows.iter().map(session_from_row).collect()
        })
    }

    fn sessions_by_speaker(&self, speaker: String) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT s.id, s.conference_id, c.organizer_user_id, s.name,
                       s.highlights, s.speaker, s.duration, s.type_of_session,
                       s.date, s.start_time
                FROM sessions s
                JOIN conferences c ON c.id = s.conference_id
                WHERE s.speaker = $1
                ORDER BY s.id
                ",
            )
            .bind(speaker)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            rows.iter().map(session_from_row).collect()
        })
    }

    fn sessions_in_date_range(
        &self,
        conference: Option<ConferenceKey>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT s.id, s.conference_id, c.organizer_user_id, s.name,
                       s.highlights, s.speaker, s.duration, s.type_of_session,
                       s.date, s.start_time
                FROM sessions s
                JOIN conferences c ON c.id = s.conference_id
                WHERE s.date BETWEEN $1 AND $2
                  AND ($3::BIGINT IS NULL OR (c.id = $3 AND c.organizer_user_id = $4))
                ORDER BY s.date, s.id
                ",
            )
            .bind(start)
            .bind(end)
            .bind(conference.as_ref().map(|key| key.id.get()))
            .bind(conference.as_ref().map(|key| key.organizer.as_str().to_string()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

            rows.iter().map(session_from_row).collect()
        })
    }

    // ── Transactions ──────────────────────────────────────────

    fn transact_registration(
        &self,
        user_id: UserId,
        conference: ConferenceKey,
        txn: RegistrationTxn,
    ) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut tx = self.begin().await?;

            // Profile first, then conference: every writer takes them in this order
            let profile = lock_profile(&mut *tx, &user_id).await?;
            let stored = lock_conference(&mut *tx, &conference).await?;

            let mut state = RegistrationState::new(profile, stored);
            let changed = txn(&mut state)?;

            write_profile(&mut *tx, &state.profile).await?;
            write_conference(&mut *tx, &state.conference).await?;
            tx.commit().await.map_err(db_error)?;

            tracing::debug!(
                user_id = %user_id,
                conference_id = %conference.id,
                seats_available = state.conference.seats_available,
                changed,
                "Registration transaction committed"
            );
            Ok(changed)
        })
    }
}
