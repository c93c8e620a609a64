use std::time::Duration;

use chrono::Utc;
use floodgate_common::FloodgateError;
use floodgate_db_entities::{Action, Limiter};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::window::window_start;

/// Handle to a persisted fixed-window rate limiter.
///
/// `capacity` and `interval` are a snapshot of the stored configuration.
/// The stored row is authoritative: every operation re-reads it, so a
/// concurrent [`save`](Self::save) from another process takes effect on the
/// next [`take`](Self::take), not on some cached value. Any number of
/// handles (across threads or processes) may refer to the same limiter; the
/// store is the only synchronization point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimiter {
    id: Uuid,
    pub capacity: u32,
    pub interval: Duration,
}

fn validate_id(id: &Uuid) -> Result<(), FloodgateError> {
    if id.is_nil() {
        return Err(FloodgateError::InvalidLimiterId);
    }
    Ok(())
}

fn validate_limits(capacity: u32, interval: Duration) -> Result<(i32, i64), FloodgateError> {
    if capacity == 0 || interval.is_zero() {
        return Err(FloodgateError::InvalidLimiterConfig);
    }
    let capacity = i32::try_from(capacity).map_err(|_| FloodgateError::InvalidLimiterConfig)?;
    let interval_ns =
        i64::try_from(interval.as_nanos()).map_err(|_| FloodgateError::InvalidLimiterConfig)?;
    Ok((capacity, interval_ns))
}

fn stored_interval(interval_ns: i64) -> Duration {
    Duration::from_nanos(interval_ns.max(0) as u64)
}

impl From<Limiter::Model> for RateLimiter {
    fn from(model: Limiter::Model) -> Self {
        Self {
            id: model.id,
            capacity: model.capacity.max(0) as u32,
            interval: stored_interval(model.interval_ns),
        }
    }
}

impl RateLimiter {
    /// Creates a limiter admitting up to `capacity` actions per `interval`
    /// and persists it under a fresh identity.
    pub async fn create(
        db: &DatabaseConnection,
        capacity: u32,
        interval: Duration,
    ) -> Result<Self, FloodgateError> {
        let (capacity_db, interval_ns) = validate_limits(capacity, interval)?;
        let id = Uuid::new_v4();
        Limiter::ActiveModel {
            id: Set(id),
            capacity: Set(capacity_db),
            interval_ns: Set(interval_ns),
        }
        .insert(db)
        .await?;
        info!(limiter=%id, capacity, interval=?interval, "Created limiter");
        Ok(Self {
            id,
            capacity,
            interval,
        })
    }

    /// Fetches the limiter with this identity from the store.
    pub async fn by_id(db: &DatabaseConnection, id: Uuid) -> Result<Self, FloodgateError> {
        validate_id(&id)?;
        let limiter = Limiter::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(FloodgateError::LimiterNotFound(id))?;
        Ok(limiter.into())
    }

    /// Rehydrates a handle for a known identity without a store round-trip,
    /// e.g. in a process that only holds the id. The snapshot values are
    /// advisory; every operation defers to the stored configuration.
    pub fn handle(id: Uuid, capacity: u32, interval: Duration) -> Self {
        Self {
            id,
            capacity,
            interval,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Attempts to admit one action "now".
    ///
    /// Runs as a single transaction: the limiter row is re-read under an
    /// exclusive row lock, the current window's actions are counted, and the
    /// new action is only inserted while the lock is held. Concurrent takes
    /// on the same limiter serialize on the lock, so the stored capacity is
    /// never exceeded within a window; takes on other limiters do not
    /// contend. (SQLite has no row locks; its single-writer transaction
    /// lock gives the same guarantee.)
    ///
    /// Returns the number of actions admitted in the current window
    /// including this one, or [`FloodgateError::RateLimitExceeded`] carrying
    /// the unchanged count when the window is full. Nothing is written on
    /// rejection or on any store failure.
    pub async fn take(&self, db: &DatabaseConnection) -> Result<u64, FloodgateError> {
        validate_id(&self.id)?;

        let txn = db.begin().await?;

        let Some(limiter) = Limiter::Entity::find_by_id(self.id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Err(FloodgateError::LimiterNotFound(self.id));
        };

        let now = Utc::now();
        let start = window_start(now, stored_interval(limiter.interval_ns));

        let count = Action::Entity::find()
            .filter(Action::Column::LimiterId.eq(self.id))
            .filter(Action::Column::Timestamp.gte(start))
            .count(&txn)
            .await?;

        if count >= limiter.capacity.max(0) as u64 {
            txn.rollback().await?;
            debug!(limiter=%self.id, count, "Rate limit exceeded");
            return Err(FloodgateError::RateLimitExceeded { count });
        }

        Action::ActiveModel {
            id: Set(Uuid::new_v4()),
            timestamp: Set(now),
            limiter_id: Set(self.id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        debug!(limiter=%self.id, count = count + 1, "Admitted action");
        Ok(count + 1)
    }

    /// Deletes this limiter's actions recorded strictly before the current
    /// window start and returns how many were removed.
    ///
    /// An action exactly at the boundary belongs to the current window and
    /// is kept. Only rows already excluded from the admission count are
    /// touched, so this is safe to run concurrently with [`take`](Self::take).
    pub async fn cleanup(&self, db: &DatabaseConnection) -> Result<u64, FloodgateError> {
        validate_id(&self.id)?;
        let limiter = Limiter::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or(FloodgateError::LimiterNotFound(self.id))?;
        let start = window_start(Utc::now(), stored_interval(limiter.interval_ns));

        let result = Action::Entity::delete_many()
            .filter(Action::Column::LimiterId.eq(self.id))
            .filter(Action::Column::Timestamp.lt(start))
            .exec(db)
            .await?;
        debug!(limiter=%self.id, removed = result.rows_affected, "Cleaned up expired actions");
        Ok(result.rows_affected)
    }

    /// Rewrites the stored capacity and interval with this handle's values.
    pub async fn save(&self, db: &DatabaseConnection) -> Result<(), FloodgateError> {
        validate_id(&self.id)?;
        let (capacity, interval_ns) = validate_limits(self.capacity, self.interval)?;
        let result = Limiter::Entity::update_many()
            .set(Limiter::ActiveModel {
                capacity: Set(capacity),
                interval_ns: Set(interval_ns),
                ..Default::default()
            })
            .filter(Limiter::Column::Id.eq(self.id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(FloodgateError::LimiterNotFound(self.id));
        }
        info!(limiter=%self.id, capacity, interval=?self.interval, "Updated limiter configuration");
        Ok(())
    }

    /// Removes the limiter and all of its actions in one transaction; a
    /// crash cannot leave one without the other. The actions go first since
    /// the store rejects deleting a still-referenced limiter row.
    pub async fn delete(&self, db: &DatabaseConnection) -> Result<(), FloodgateError> {
        validate_id(&self.id)?;
        let txn = db.begin().await?;
        Action::Entity::delete_many()
            .filter(Action::Column::LimiterId.eq(self.id))
            .exec(&txn)
            .await?;
        Limiter::Entity::delete_by_id(self.id).exec(&txn).await?;
        txn.commit().await?;
        info!(limiter=%self.id, "Deleted limiter");
        Ok(())
    }
}

/// Runs [`RateLimiter::cleanup`] for every persisted limiter, sequentially.
///
/// Best-effort: the first failure aborts the sweep and later limiters stay
/// un-swept until the next invocation. Not transactional across limiters.
pub async fn cleanup_all(db: &DatabaseConnection) -> Result<(), FloodgateError> {
    let limiters = Limiter::Entity::find().all(db).await?;
    let total = limiters.len();
    for limiter in limiters {
        RateLimiter::from(limiter).cleanup(db).await?;
    }
    debug!(limiters = total, "Completed cleanup sweep");
    Ok(())
}
