//! Built-in bestiary, abilities, items, skills and bosses.

use crate::character::stats::{CombatTraits, Stat};
use crate::combat::abilities::{AbilityDefinition, AbilityEffect};
use crate::combat::skills::{SkillDefinition, SkillEffect};
use crate::core::config::ContentTables;
use crate::core::constants::RAID_PHASE_THRESHOLDS_PERCENT;
use crate::enemies::types::{EnemyDefinition, RareSpawn, RewardRange, SpecialAbility};
use crate::items::types::{ItemDefinition, ItemSlot, Rarity};
use crate::raid::types::{BossDefinition, BossPhase};

/// Returns the built-in content tables.
pub fn default_content() -> ContentTables {
    ContentTables {
        enemies: enemies(),
        abilities: abilities(),
        items: items(),
        skills: skills(),
        bosses: bosses(),
    }
}

fn enemy(id: &str, name: &str, rarity: Rarity, level: u32, stats: [u32; 3]) -> EnemyDefinition {
    let [max_health, strength, defense] = stats;
    EnemyDefinition {
        id: id.to_string(),
        name: name.to_string(),
        rarity,
        level,
        max_health,
        strength,
        defense,
        charm: 0,
        traits: CombatTraits::default(),
        xp_reward: RewardRange::new(level as u64 * 10, level as u64 * 15),
        gold_reward: RewardRange::new(level as u64 * 2, level as u64 * 5),
        ability: None,
        drop_table: Vec::new(),
        guaranteed_drop: false,
        rare_spawn: None,
    }
}

fn with_ability(mut enemy: EnemyDefinition, id: &str, trigger_chance: f64) -> EnemyDefinition {
    enemy.ability = Some(SpecialAbility {
        id: id.to_string(),
        trigger_chance,
    });
    enemy
}

fn with_drops(mut enemy: EnemyDefinition, items: &[&str]) -> EnemyDefinition {
    enemy.drop_table = items.iter().map(|i| i.to_string()).collect();
    enemy
}

pub fn enemies() -> Vec<EnemyDefinition> {
    let mut golden_slime = with_drops(
        enemy("golden_slime", "Golden Slime", Rarity::Epic, 5, [40, 4, 12]),
        &["lucky_coin"],
    );
    golden_slime.gold_reward = RewardRange::new(200, 400);
    golden_slime.guaranteed_drop = true;
    golden_slime.rare_spawn = Some(RareSpawn {
        spawn_chance: 2.0,
        min_player_level: 5,
    });
    let golden_slime = with_ability(golden_slime, "slip_away", 100.0);

    let mut thornback = with_ability(
        enemy("thornback", "Thornback Tortoise", Rarity::Uncommon, 6, [70, 9, 10]),
        "shell_up",
        25.0,
    );
    thornback.traits.reflect_percent = 20.0;

    let mut shade = with_ability(
        enemy("shade", "Hollow Shade", Rarity::Rare, 8, [55, 14, 3]),
        "life_drain",
        30.0,
    );
    shade.traits.dodge_chance = 15.0;

    vec![
        with_drops(
            with_ability(enemy("goblin", "Goblin Scout", Rarity::Common, 1, [30, 6, 2]), "cheap_shot", 15.0),
            &["iron_sword", "leather_vest"],
        ),
        with_drops(
            with_ability(enemy("dire_wolf", "Dire Wolf", Rarity::Common, 3, [45, 9, 3]), "howl", 20.0),
            &["wolf_pelt"],
        ),
        with_drops(
            with_ability(enemy("marsh_spider", "Marsh Spider", Rarity::Uncommon, 4, [35, 8, 2]), "venom", 30.0),
            &["vampiric_fang"],
        ),
        with_drops(thornback, &["chain_mail"]),
        with_drops(
            with_ability(enemy("ogre_brute", "Ogre Brute", Rarity::Uncommon, 5, [90, 11, 5]), "crushing_blow", 15.0),
            &["chain_mail", "iron_sword"],
        ),
        with_drops(
            with_ability(enemy("bog_witch", "Bog Witch", Rarity::Rare, 7, [60, 12, 4]), "hex", 25.0),
            &["hex_charm", "vampiric_fang"],
        ),
        with_drops(shade, &["shadow_blade"]),
        golden_slime,
    ]
}

fn ability(id: &str, name: &str, effect: AbilityEffect, replaces_attack: bool, message: &str) -> AbilityDefinition {
    AbilityDefinition {
        id: id.to_string(),
        name: name.to_string(),
        effect,
        replaces_attack,
        message: message.to_string(),
    }
}

pub fn abilities() -> Vec<AbilityDefinition> {
    vec![
        ability(
            "cheap_shot",
            "Cheap Shot",
            AbilityEffect::Empower { multiplier: 1.5 },
            false,
            "{enemy} goes for a cheap shot!",
        ),
        ability(
            "howl",
            "Howl",
            AbilityEffect::Weaken {
                stat: Stat::Strength,
                amount: 2,
            },
            false,
            "{enemy} howls. {player} feels weaker.",
        ),
        ability(
            "venom",
            "Venom",
            AbilityEffect::Poison { damage: 3, turns: 3 },
            false,
            "{enemy} sinks its fangs in. {player} is poisoned!",
        ),
        ability(
            "shell_up",
            "Shell Up",
            AbilityEffect::Mend { amount: 10 },
            true,
            "{enemy} retreats into its shell and recovers {amount} health.",
        ),
        ability(
            "hex",
            "Hex",
            AbilityEffect::Sap { percent: 10 },
            false,
            "{enemy} curses {player}, sapping their vitality.",
        ),
        ability(
            "life_drain",
            "Life Drain",
            AbilityEffect::Drain { amount: 8 },
            true,
            "{enemy} drains {amount} health from {player}.",
        ),
        ability(
            "slip_away",
            "Slip Away",
            AbilityEffect::Escape {
                health_threshold_percent: 25.0,
            },
            true,
            "{enemy} slips away with its treasure!",
        ),
        ability(
            "crushing_blow",
            "Crushing Blow",
            AbilityEffect::Stun { turns: 1 },
            false,
            "{enemy} lands a crushing blow. {player} is stunned!",
        ),
    ]
}

fn item(id: &str, name: &str, rarity: Rarity, slot: ItemSlot, power: u32, traits: CombatTraits) -> ItemDefinition {
    ItemDefinition {
        id: id.to_string(),
        name: name.to_string(),
        rarity,
        slot,
        power,
        traits,
    }
}

pub fn items() -> Vec<ItemDefinition> {
    let none = CombatTraits::default();
    vec![
        item("iron_sword", "Iron Sword", Rarity::Common, ItemSlot::Weapon, 3, none),
        item("leather_vest", "Leather Vest", Rarity::Common, ItemSlot::Armor, 2, none),
        item("wolf_pelt", "Wolf Pelt Cloak", Rarity::Common, ItemSlot::Armor, 3, none),
        item("chain_mail", "Chain Mail", Rarity::Uncommon, ItemSlot::Armor, 5, none),
        item(
            "vampiric_fang",
            "Vampiric Fang",
            Rarity::Rare,
            ItemSlot::Trinket,
            0,
            CombatTraits {
                healing_on_hit: 3,
                ..none
            },
        ),
        item(
            "hex_charm",
            "Hex Charm",
            Rarity::Rare,
            ItemSlot::Trinket,
            0,
            CombatTraits {
                critical_chance: 5.0,
                ..none
            },
        ),
        item(
            "shadow_blade",
            "Shadow Blade",
            Rarity::Epic,
            ItemSlot::Weapon,
            8,
            CombatTraits {
                armor_penetration: 4,
                ..none
            },
        ),
        item(
            "lucky_coin",
            "Lucky Coin",
            Rarity::Epic,
            ItemSlot::Trinket,
            0,
            CombatTraits {
                dodge_chance: 5.0,
                ..none
            },
        ),
        item(
            "wardens_crown",
            "Warden's Crown",
            Rarity::Boss,
            ItemSlot::Armor,
            12,
            CombatTraits {
                reflect_percent: 10.0,
                ..none
            },
        ),
        item(
            "wardens_glaive",
            "Warden's Glaive",
            Rarity::Boss,
            ItemSlot::Weapon,
            14,
            CombatTraits {
                critical_chance: 5.0,
                ..none
            },
        ),
    ]
}

pub fn skills() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition {
            id: "power_strike".to_string(),
            name: "Power Strike".to_string(),
            cooldown: 2,
            effect: SkillEffect::Strike { multiplier: 2.0 },
        },
        SkillDefinition {
            id: "second_wind".to_string(),
            name: "Second Wind".to_string(),
            cooldown: 4,
            effect: SkillEffect::Heal { amount: 25 },
        },
        SkillDefinition {
            id: "shield_bash".to_string(),
            name: "Shield Bash".to_string(),
            cooldown: 3,
            effect: SkillEffect::Stun { turns: 1 },
        },
    ]
}

pub fn bosses() -> Vec<BossDefinition> {
    let [enraged, barrier] = RAID_PHASE_THRESHOLDS_PERCENT;
    vec![BossDefinition {
        id: "hollow_warden".to_string(),
        name: "The Hollow Warden".to_string(),
        level: 12,
        max_health: 2000,
        strength: 24,
        defense: 8,
        traits: CombatTraits::default(),
        phases: vec![
            BossPhase {
                health_threshold_percent: enraged,
                damage_reduction_percent: 0,
                strength_bonus: 6,
                message: "The Hollow Warden's eyes burn brighter.".to_string(),
            },
            BossPhase {
                health_threshold_percent: barrier,
                damage_reduction_percent: 30,
                strength_bonus: 10,
                message: "The Hollow Warden raises a barrier of bone.".to_string(),
            },
        ],
        xp_reward: RewardRange::new(400, 600),
        gold_reward: RewardRange::new(150, 250),
        drop_table: vec!["wardens_crown".to_string(), "wardens_glaive".to_string()],
    }]
}
