//! Character mood and daily message selection.
//!
//! Both are pure functions of today's exercised time and recent history.
//! The message is picked from a fixed pool using the day number as a seed,
//! so it stays the same all day and changes from one day to the next.

use crate::WorkoutHistoryItem;
use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const GENTLE_THRESHOLD_SEC: u64 = 5 * 60;
const STEADY_THRESHOLD_SEC: u64 = 20 * 60;
const MS_PER_DAY: i64 = 86_400_000;

/// Placeholder replaced by the most recent playlist's name
const PLAYLIST_PLACEHOLDER: &str = "{playlist}";

/// Visual tone of the character on the home screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterMood {
    Idle,
    Gentle,
    Positive,
}

/// Pick the character's mood
///
/// Idle with no history or nothing done today, gentle under five minutes
/// today, positive from five minutes on.
pub fn character_mood(today_total_sec: u64, recent_sessions_count: usize) -> CharacterMood {
    if recent_sessions_count == 0 || today_total_sec == 0 {
        return CharacterMood::Idle;
    }
    if today_total_sec < GENTLE_THRESHOLD_SEC {
        return CharacterMood::Gentle;
    }
    CharacterMood::Positive
}

/// Message pool category, in priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageBucket {
    NoHistory,
    NotToday,
    LightToday,
    SteadyToday,
    LongToday,
}

impl MessageBucket {
    /// Offset added to the day number so buckets do not rotate in lockstep
    fn offset(&self) -> i64 {
        match self {
            MessageBucket::NoHistory => 0,
            MessageBucket::NotToday => 1,
            MessageBucket::LightToday => 2,
            MessageBucket::SteadyToday => 3,
            MessageBucket::LongToday => 4,
        }
    }

    pub fn select(today_total_sec: u64, has_history: bool) -> Self {
        if !has_history {
            MessageBucket::NoHistory
        } else if today_total_sec == 0 {
            MessageBucket::NotToday
        } else if today_total_sec < GENTLE_THRESHOLD_SEC {
            MessageBucket::LightToday
        } else if today_total_sec < STEADY_THRESHOLD_SEC {
            MessageBucket::SteadyToday
        } else {
            MessageBucket::LongToday
        }
    }
}

/// Fixed message pools, one per bucket
#[derive(Debug)]
pub struct MessagePools {
    pub no_history: Vec<&'static str>,
    pub not_today: Vec<&'static str>,
    pub light_today: Vec<&'static str>,
    pub steady_today: Vec<&'static str>,
    pub long_today: Vec<&'static str>,
}

impl MessagePools {
    pub fn pool(&self, bucket: MessageBucket) -> &[&'static str] {
        match bucket {
            MessageBucket::NoHistory => &self.no_history,
            MessageBucket::NotToday => &self.not_today,
            MessageBucket::LightToday => &self.light_today,
            MessageBucket::SteadyToday => &self.steady_today,
            MessageBucket::LongToday => &self.long_today,
        }
    }
}

static MESSAGE_POOLS: Lazy<MessagePools> = Lazy::new(|| MessagePools {
    no_history: vec![
        "We haven't worked out together yet. How about three easy minutes today?",
        "It's your first day. Pick a short routine, no pressure.",
        "A fresh start. Slow and comfortable is the way to begin.",
        "Day one! Five minutes is plenty.",
        "Shall we move a little? One light routine is a great start.",
    ],
    not_today: vec![
        "Last time we did \"{playlist}\" together. Keep it going gently today?",
        "Remember \"{playlist}\"? Starting light today is perfectly fine.",
        "Which routine feels right today? Go with whatever you like.",
        "You did \"{playlist}\" before. Same again or something new, both are good.",
        "How does your body feel today? Pick a comfortable routine.",
        "Taking a break and coming back is a good rhythm too. Take it slow.",
    ],
    light_today: vec![
        "You woke your body up gently today. That's enough.",
        "Even a short session counts. Your body will remember.",
        "This much is good for today. No need to push.",
        "A light start. Days like this matter too.",
        "That was time to wake up your body. Well done.",
    ],
    steady_today: vec![
        "Nice routine today. Let's stack up days like this one by one.",
        "Steady again today. The rhythm is building.",
        "Just the right amount. Not overdoing it is how you keep going.",
        "Routine done for today. This pace is a good one.",
        "A steady day. Days like this turn into a habit.",
        "We did it together again today. Slow and steady goes far.",
    ],
    long_today: vec![
        "We spent quite a while together today. Feel free to rest the remainder of the day.",
        "You moved plenty today. Time to relax.",
        "That was a lot today. Going lighter tomorrow is fine.",
        "A long session together. Your body needs time to recover too.",
        "That's enough for today. Rest well.",
    ],
});

/// The built-in message pools
pub fn message_pools() -> &'static MessagePools {
    &MESSAGE_POOLS
}

/// Inputs for [`character_message`]
#[derive(Clone, Debug)]
pub struct MessageContext<'a, Tz: TimeZone> {
    pub today_total_sec: u64,
    /// Recent sessions, newest first
    pub recent_sessions: &'a [WorkoutHistoryItem],
    pub now: DateTime<Tz>,
}

/// Days between the Unix epoch and the start of `now`'s local day
pub fn days_since_epoch<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let start_ms = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .map(|start| start.timestamp_millis())
        // Midnight skipped by a DST change; the current instant is on the same day
        .unwrap_or_else(|| now.timestamp_millis());
    start_ms.div_euclid(MS_PER_DAY)
}

/// Pick today's message for the character
///
/// The message depends only on the bucket and the local calendar day, so
/// repeated calls within a day agree.
pub fn character_message<Tz: TimeZone>(ctx: &MessageContext<'_, Tz>) -> String {
    let bucket = MessageBucket::select(ctx.today_total_sec, !ctx.recent_sessions.is_empty());
    let pool = message_pools().pool(bucket);
    if pool.is_empty() {
        return String::new();
    }

    let len = pool.len() as i64;
    let index = (days_since_epoch(&ctx.now) + bucket.offset()).rem_euclid(len) as usize;
    let template = pool[index];

    let playlist_name = ctx
        .recent_sessions
        .first()
        .map(|s| s.playlist_name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or("your routine");
    template.replace(PLAYLIST_PLACEHOLDER, playlist_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};
    use uuid::Uuid;

    fn session(name: &str) -> WorkoutHistoryItem {
        WorkoutHistoryItem {
            id: Uuid::new_v4(),
            playlist_id: "custom-1".into(),
            playlist_name: name.into(),
            total_duration_sec: 300,
            actual_duration_sec: 300,
            completed_at: Utc::now(),
        }
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn message(today: u64, sessions: &[WorkoutHistoryItem], now: DateTime<Utc>) -> String {
        character_message(&MessageContext {
            today_total_sec: today,
            recent_sessions: sessions,
            now,
        })
    }

    #[test]
    fn test_mood() {
        assert_eq!(character_mood(0, 0), CharacterMood::Idle);
        assert_eq!(character_mood(400, 0), CharacterMood::Idle);
        assert_eq!(character_mood(0, 3), CharacterMood::Idle);
        assert_eq!(character_mood(120, 1), CharacterMood::Gentle);
        assert_eq!(character_mood(299, 1), CharacterMood::Gentle);
        assert_eq!(character_mood(300, 1), CharacterMood::Positive);
        assert_eq!(character_mood(400, 2), CharacterMood::Positive);
    }

    #[test]
    fn test_bucket_selection() {
        assert_eq!(MessageBucket::select(0, false), MessageBucket::NoHistory);
        assert_eq!(MessageBucket::select(900, false), MessageBucket::NoHistory);
        assert_eq!(MessageBucket::select(0, true), MessageBucket::NotToday);
        assert_eq!(MessageBucket::select(299, true), MessageBucket::LightToday);
        assert_eq!(MessageBucket::select(300, true), MessageBucket::SteadyToday);
        assert_eq!(MessageBucket::select(1199, true), MessageBucket::SteadyToday);
        assert_eq!(MessageBucket::select(1200, true), MessageBucket::LongToday);
    }

    #[test]
    fn test_days_since_epoch() {
        assert_eq!(days_since_epoch(&at("1970-01-01T23:59:59Z")), 0);
        assert_eq!(days_since_epoch(&at("1970-01-02T00:00:00Z")), 1);
        assert_eq!(days_since_epoch(&at("2024-01-01T12:00:00Z")), 19_723);

        // Local midnight at UTC+9 is 15:00 UTC the previous day
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = at("2024-01-01T12:00:00Z").with_timezone(&seoul);
        assert_eq!(days_since_epoch(&local), 19_722);
    }

    #[test]
    fn test_message_follows_day_seed() {
        let now = at("2024-01-01T09:00:00Z");
        let pool = message_pools().pool(MessageBucket::NoHistory);
        let expected = pool[(19_723 % pool.len() as i64) as usize];
        assert_eq!(message(0, &[], now), expected);
    }

    #[test]
    fn test_message_stable_within_day() {
        let morning = at("2024-05-10T00:05:00Z");
        let night = at("2024-05-10T23:55:00Z");
        let sessions = vec![session("Morning stretch")];
        for today in [0u64, 100, 600, 2000] {
            assert_eq!(
                message(today, &sessions, morning),
                message(today, &sessions, night)
            );
        }
    }

    #[test]
    fn test_message_changes_next_day() {
        let day = at("2024-05-10T12:00:00Z");
        let next = day + Duration::days(1);
        assert_ne!(message(0, &[], day), message(0, &[], next));
        assert_ne!(message(600, &[session("x")], day), message(600, &[session("x")], next));
    }

    #[test]
    fn test_message_comes_from_bucket_pool() {
        let now = at("2024-05-10T12:00:00Z");
        let sessions = vec![session("Evening flow")];

        let light = message(100, &sessions, now);
        assert!(message_pools().light_today.iter().any(|m| *m == light));

        let long = message(1800, &sessions, now);
        assert!(message_pools().long_today.iter().any(|m| *m == long));
    }

    #[test]
    fn test_not_today_messages_mention_last_playlist() {
        let sessions = vec![session("Evening flow"), session("Older")];
        let pool_len = message_pools().not_today.len() as i64;
        let mut mentioned = false;
        for day in 0..pool_len {
            let now = at("2024-05-10T12:00:00Z") + Duration::days(day);
            let text = message(0, &sessions, now);
            assert!(!text.contains(PLAYLIST_PLACEHOLDER));
            assert!(!text.contains("Older"));
            mentioned |= text.contains("\"Evening flow\"");
        }
        assert!(mentioned);
    }
}
