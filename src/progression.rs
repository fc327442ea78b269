//! Character progression and daily challenges.
//!
//! Completions feed experience into a character: 10 XP per task, 50 XP for
//! the daily challenge. Leaving level `n` costs `n * 100` cumulative XP
//! (experience is never reset), and specific levels unlock items from a
//! fixed reward table. The daily challenge regenerates once per calendar
//! day, compared by date-key string.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::date_key::DateKey;
use crate::error::{Mutation, Result};
use crate::kv::{self, KeyValueStore};

pub const XP_PER_TASK: u64 = 10;
pub const XP_PER_CHALLENGE: u64 = 50;
/// XP required to leave level `n` is `n * XP_LEVEL_STEP`.
pub const XP_LEVEL_STEP: u64 = 100;

pub const CHARACTER_KEY: &str = "focuspresso.character";
pub const CHALLENGE_KEY: &str = "focuspresso.daily_challenge";

const DAILY_CHALLENGES: [&str; 4] = [
    "Complete 3 tasks in a row without a break",
    "Complete a task within 30 minutes of adding it",
    "Complete 5 tasks today",
    "Add and complete a difficult task",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Accessory,
    Pet,
    House,
}

/// An unlockable item from the reward table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub id: String,
    pub name: String,
}

/// Item unlocked on reaching `level`, if the table has an entry for it.
fn reward_for_level(level: u32) -> Option<Reward> {
    let (kind, id, name) = match level {
        2 => (RewardKind::Accessory, "hat1", "Basic Hat"),
        3 => (RewardKind::Pet, "pet1", "Pixel Puppy"),
        5 => (RewardKind::Accessory, "glasses1", "Cool Glasses"),
        7 => (RewardKind::Pet, "pet2", "Digital Cat"),
        10 => (RewardKind::House, "house1", "Starter House"),
        _ => return None,
    };
    Some(Reward {
        kind,
        id: id.to_string(),
        name: name.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub level: u32,
    pub experience: u64,
    pub accessories: Vec<Reward>,
    pub pets: Vec<Reward>,
    pub unlocked_items: Vec<Reward>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            accessories: Vec::new(),
            pets: Vec::new(),
            unlocked_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub challenge: Option<String>,
    /// Date key of the day this challenge was generated for.
    pub last_updated: Option<String>,
    pub completed: bool,
}

/// What one experience grant changed.
#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub experience: u64,
    pub level: u32,
    pub levels_gained: u32,
    pub unlocked: Vec<Reward>,
}

#[derive(Debug, Clone, Default)]
struct GameState {
    character: Character,
    challenge: DailyChallenge,
}

pub struct Progression<S> {
    kv: Arc<S>,
    state: Mutex<GameState>,
}

impl<S: KeyValueStore> Progression<S> {
    /// Cold start: load persisted character and challenge, defaulting each
    /// absent key.
    pub async fn load(kv: Arc<S>) -> Result<Self> {
        let character: Character = kv::load_json_or_default(kv.as_ref(), CHARACTER_KEY).await?;
        let challenge: DailyChallenge =
            kv::load_json_or_default(kv.as_ref(), CHALLENGE_KEY).await?;
        debug!(level = character.level, xp = character.experience, "progression loaded");
        Ok(Self {
            kv,
            state: Mutex::new(GameState {
                character,
                challenge,
            }),
        })
    }

    pub async fn character(&self) -> Character {
        self.state.lock().await.character.clone()
    }

    pub async fn daily_challenge(&self) -> DailyChallenge {
        self.state.lock().await.challenge.clone()
    }

    /// Credits one task completion.
    pub async fn record_completion(&self) -> Result<LevelReport> {
        self.grant(XP_PER_TASK).await
    }

    async fn grant(&self, xp: u64) -> Result<LevelReport> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let report = apply_xp(&mut next.character, xp);
        kv::store_json(self.kv.as_ref(), CHARACTER_KEY, &next.character).await?;
        *state = next;
        if report.levels_gained > 0 {
            info!(level = report.level, unlocked = report.unlocked.len(), "level up");
        }
        Ok(report)
    }

    /// Regenerates the challenge when none exists for `today`; an existing
    /// challenge for today is returned untouched.
    pub async fn refresh_daily_challenge(&self, today: NaiveDate) -> Result<DailyChallenge> {
        let today_key = DateKey::from_date(today);
        let mut state = self.state.lock().await;
        if state.challenge.last_updated.as_deref() == Some(today_key.as_str()) {
            return Ok(state.challenge.clone());
        }
        let mut next = state.clone();
        next.challenge = DailyChallenge {
            challenge: Some(pick_challenge(today_key.as_str()).to_string()),
            last_updated: Some(today_key.as_str().to_string()),
            completed: false,
        };
        kv::store_json(self.kv.as_ref(), CHALLENGE_KEY, &next.challenge).await?;
        *state = next;
        Ok(state.challenge.clone())
    }

    /// Marks the current challenge done and grants the flat bonus.
    pub async fn complete_daily_challenge(&self) -> Result<LevelReport> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.challenge.completed = true;
        let report = apply_xp(&mut next.character, XP_PER_CHALLENGE);
        // Character first: an interrupted completion can drop the flag and
        // be retried, but never loses already-credited XP.
        kv::store_json(self.kv.as_ref(), CHARACTER_KEY, &next.character).await?;
        kv::store_json(self.kv.as_ref(), CHALLENGE_KEY, &next.challenge).await?;
        *state = next;
        Ok(report)
    }

    /// Equips an already-unlocked accessory. Unknown ids and wrong kinds are
    /// clean no-ops; re-equipping is idempotent.
    pub async fn equip_accessory(&self, id: &str) -> Result<Mutation> {
        self.claim(id, RewardKind::Accessory).await
    }

    /// Adopts an already-unlocked pet.
    pub async fn adopt_pet(&self, id: &str) -> Result<Mutation> {
        self.claim(id, RewardKind::Pet).await
    }

    async fn claim(&self, id: &str, kind: RewardKind) -> Result<Mutation> {
        let mut state = self.state.lock().await;
        let Some(item) = state
            .character
            .unlocked_items
            .iter()
            .find(|item| item.id == id && item.kind == kind)
            .cloned()
        else {
            return Ok(Mutation::NotFound);
        };
        let owned = if kind == RewardKind::Accessory {
            &state.character.accessories
        } else {
            &state.character.pets
        };
        if owned.iter().any(|existing| existing.id == id) {
            return Ok(Mutation::Applied);
        }
        let mut next = state.clone();
        if kind == RewardKind::Accessory {
            next.character.accessories.push(item);
        } else {
            next.character.pets.push(item);
        }
        kv::store_json(self.kv.as_ref(), CHARACTER_KEY, &next.character).await?;
        *state = next;
        Ok(Mutation::Applied)
    }
}

/// Applies `xp` and loops level-ups until the next threshold holds, so a
/// grant crossing several thresholds unlocks each crossed level exactly
/// once.
fn apply_xp(character: &mut Character, xp: u64) -> LevelReport {
    character.experience += xp;
    let mut unlocked = Vec::new();
    let mut levels_gained = 0;
    while character.experience >= u64::from(character.level) * XP_LEVEL_STEP {
        character.level += 1;
        levels_gained += 1;
        if let Some(reward) = reward_for_level(character.level) {
            character.unlocked_items.push(reward.clone());
            unlocked.push(reward);
        }
    }
    LevelReport {
        experience: character.experience,
        level: character.level,
        levels_gained,
        unlocked,
    }
}

/// Stable pick from the fixed challenge list: varies day to day, constant
/// within a day.
fn pick_challenge(date_key: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    date_key.hash(&mut hasher);
    DAILY_CHALLENGES[(hasher.finish() % DAILY_CHALLENGES.len() as u64) as usize]
}
