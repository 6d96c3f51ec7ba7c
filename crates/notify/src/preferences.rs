//! Effective notification preferences.
//!
//! [`PreferenceResolver::resolve`] merges the stored row (if any) over the
//! category defaults and applies the security override: the `security`
//! category always reads as enabled, email on, immediate — enforced here at
//! the read boundary, not by forbidding writes.

use std::fmt;
use std::str::FromStr;

use helpdesk_core::channels::{CHANNEL_CHAT, CHANNEL_EMAIL, CHANNEL_IN_APP};
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::notification::NotificationPreferenceRow;
use helpdesk_db::repositories::NotificationPreferenceRepo;
use helpdesk_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::category::NotificationCategory;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Immediate,
    DailyDigest,
    WeeklyDigest,
    None,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Immediate => "immediate",
            Frequency::DailyDigest => "daily_digest",
            Frequency::WeeklyDigest => "weekly_digest",
            Frequency::None => "none",
        }
    }

    /// Digest frequencies queue the event for batch delivery instead of an
    /// inline send.
    pub fn is_digest(&self) -> bool {
        match self {
            Frequency::DailyDigest | Frequency::WeeklyDigest => true,
            Frequency::Immediate | Frequency::None => false,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Frequency::Immediate),
            "daily_digest" => Ok(Frequency::DailyDigest),
            "weekly_digest" => Ok(Frequency::WeeklyDigest),
            "none" => Ok(Frequency::None),
            other => Err(CoreError::Validation(format!(
                "unknown notification frequency: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// EffectivePreference
// ---------------------------------------------------------------------------

/// The settings that actually govern delivery for one (user, category)
/// pair, after defaults and the security override have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectivePreference {
    pub category: NotificationCategory,
    pub is_enabled: bool,
    pub channel_email: bool,
    pub channel_chat: bool,
    pub channel_in_app: bool,
    pub frequency: Frequency,
}

impl EffectivePreference {
    /// The documented defaults for a category (what a user gets before they
    /// ever touch their settings).
    pub fn defaults(category: NotificationCategory) -> Self {
        match category {
            NotificationCategory::Security => Self {
                category,
                is_enabled: true,
                channel_email: true,
                channel_chat: false,
                channel_in_app: true,
                frequency: Frequency::Immediate,
            },
            NotificationCategory::SlaAlerts => Self {
                category,
                is_enabled: true,
                channel_email: true,
                channel_chat: true,
                channel_in_app: true,
                frequency: Frequency::Immediate,
            },
            NotificationCategory::TicketActivity => Self {
                category,
                is_enabled: true,
                channel_email: false,
                channel_chat: false,
                channel_in_app: true,
                frequency: Frequency::Immediate,
            },
        }
    }

    /// Merge a stored row (if any) over the category defaults and apply the
    /// security override.
    pub fn from_row(
        category: NotificationCategory,
        row: Option<&NotificationPreferenceRow>,
    ) -> Self {
        let mut effective = match row {
            Some(row) => Self {
                category,
                is_enabled: row.is_enabled,
                channel_email: row.channel_email,
                channel_chat: row.channel_chat,
                channel_in_app: row.channel_in_app,
                frequency: row
                    .frequency
                    .parse()
                    .unwrap_or(Self::defaults(category).frequency),
            },
            None => Self::defaults(category),
        };

        // Security notifications cannot be silenced, whatever is stored.
        if category == NotificationCategory::Security {
            effective.is_enabled = true;
            effective.channel_email = true;
            effective.frequency = Frequency::Immediate;
        }

        effective
    }

    /// Whether an inline send on the given channel is allowed.
    ///
    /// `false` when the category is disabled outright or the frequency is
    /// `none`; otherwise the stored/defaulted flag for that channel.
    pub fn should_send(&self, channel: &str) -> bool {
        if !self.is_enabled || self.frequency == Frequency::None {
            return false;
        }
        match channel {
            CHANNEL_EMAIL => self.channel_email,
            CHANNEL_CHAT => self.channel_chat,
            CHANNEL_IN_APP => self.channel_in_app,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// PreferenceResolver
// ---------------------------------------------------------------------------

/// Resolves the effective preference for a (user, category) pair.
///
/// Never fails with "not found": an absent row simply yields the category
/// defaults.
pub struct PreferenceResolver;

impl PreferenceResolver {
    pub async fn resolve(
        pool: &DbPool,
        user_id: DbId,
        category: NotificationCategory,
    ) -> Result<EffectivePreference, sqlx::Error> {
        let row = NotificationPreferenceRepo::get(pool, user_id, category.as_str()).await?;
        Ok(EffectivePreference::from_row(category, row.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn stored_row(category: NotificationCategory) -> NotificationPreferenceRow {
        NotificationPreferenceRow {
            id: 1,
            user_id: 42,
            category: category.as_str().to_string(),
            is_enabled: false,
            channel_email: false,
            channel_chat: true,
            channel_in_app: false,
            frequency: "none".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn absent_row_yields_category_defaults() {
        let effective = EffectivePreference::from_row(NotificationCategory::SlaAlerts, None);
        assert_eq!(
            effective,
            EffectivePreference::defaults(NotificationCategory::SlaAlerts)
        );
        assert!(effective.should_send(CHANNEL_EMAIL));
        assert!(effective.should_send(CHANNEL_IN_APP));
    }

    #[test]
    fn stored_row_overrides_defaults() {
        let row = stored_row(NotificationCategory::TicketActivity);
        let effective =
            EffectivePreference::from_row(NotificationCategory::TicketActivity, Some(&row));
        assert!(!effective.is_enabled);
        assert!(effective.channel_chat);
        assert_eq!(effective.frequency, Frequency::None);
    }

    #[test]
    fn security_cannot_be_silenced() {
        // A stored row that disables everything is overridden on read.
        let row = stored_row(NotificationCategory::Security);
        let effective = EffectivePreference::from_row(NotificationCategory::Security, Some(&row));

        assert!(effective.is_enabled);
        assert!(effective.channel_email);
        assert_eq!(effective.frequency, Frequency::Immediate);
        assert!(effective.should_send(CHANNEL_EMAIL));
        // Channels the user never enabled stay off; only silencing is blocked.
        assert!(!effective.should_send(CHANNEL_IN_APP));
    }

    #[test]
    fn disabled_category_sends_nothing() {
        let mut effective = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
        effective.is_enabled = false;
        assert!(!effective.should_send(CHANNEL_EMAIL));
        assert!(!effective.should_send(CHANNEL_CHAT));
        assert!(!effective.should_send(CHANNEL_IN_APP));
    }

    #[test]
    fn frequency_none_sends_nothing() {
        let mut effective = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
        effective.frequency = Frequency::None;
        assert!(!effective.should_send(CHANNEL_EMAIL));
    }

    #[test]
    fn unknown_channel_is_never_sent() {
        let effective = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
        assert!(!effective.should_send("pager"));
    }

    #[test]
    fn digest_frequencies() {
        assert!(Frequency::DailyDigest.is_digest());
        assert!(Frequency::WeeklyDigest.is_digest());
        assert!(!Frequency::Immediate.is_digest());
        assert!(!Frequency::None.is_digest());
    }

    #[test]
    fn malformed_stored_frequency_falls_back_to_default() {
        let mut row = stored_row(NotificationCategory::SlaAlerts);
        row.frequency = "fortnightly".to_string();
        row.is_enabled = true;
        let effective = EffectivePreference::from_row(NotificationCategory::SlaAlerts, Some(&row));
        assert_eq!(effective.frequency, Frequency::Immediate);
    }
}
