//! Bounded inventory with a single pending-drop slot.
//!
//! A drop that arrives while the inventory is full is parked in `pending`;
//! the list is not considered valid until the pending item is kept,
//! discarded, or swapped for an existing item.

use serde::{Deserialize, Serialize};

use super::types::{InventoryItem, ItemSlot};
use crate::core::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Stored,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropDecision {
    /// Store the pending item. Only succeeds if a slot has been freed.
    Keep,
    Discard,
    /// Replace the item at `slot` with the pending item.
    Replace { slot: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<InventoryItem>,
    pub max_slots: usize,
    #[serde(default)]
    pub pending: Option<InventoryItem>,
}

impl Inventory {
    pub fn new(max_slots: usize) -> Self {
        Self::with_items(Vec::new(), max_slots)
    }

    pub fn with_items(items: Vec<InventoryItem>, max_slots: usize) -> Self {
        Self {
            items,
            max_slots,
            pending: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_slots
    }

    /// Length bound holds and nothing is waiting for a decision.
    pub fn is_valid(&self) -> bool {
        self.items.len() <= self.max_slots && self.pending.is_none()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stores a dropped item, or parks it if the inventory is full.
    ///
    /// The engine refuses to start a session while a drop is pending, so the
    /// pending slot is always empty when this is called from a kill.
    pub fn receive(&mut self, item: InventoryItem) -> Placement {
        if self.is_full() || self.pending.is_some() {
            self.pending = Some(item);
            Placement::Pending
        } else {
            self.items.push(item);
            Placement::Stored
        }
    }

    pub fn resolve_pending(&mut self, decision: DropDecision) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Err(EngineError::NoPendingDrop);
        };

        match decision {
            DropDecision::Discard => Ok(()),
            DropDecision::Keep => {
                if self.is_full() {
                    self.pending = Some(pending);
                    return Err(EngineError::InventoryFull);
                }
                self.items.push(pending);
                Ok(())
            }
            DropDecision::Replace { slot } => {
                if slot >= self.items.len() {
                    self.pending = Some(pending);
                    return Err(EngineError::InventorySlotOutOfRange(slot));
                }
                self.items[slot] = pending;
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, slot: usize) -> Result<InventoryItem> {
        if slot >= self.items.len() {
            return Err(EngineError::InventorySlotOutOfRange(slot));
        }
        Ok(self.items.remove(slot))
    }

    /// Equips the item at `slot`, unequipping anything in the same item slot.
    ///
    /// `slot_of` maps an item id to its equipment slot kind.
    pub fn equip(&mut self, slot: usize, slot_of: impl Fn(&str) -> Option<ItemSlot>) -> Result<()> {
        let target = self
            .items
            .get(slot)
            .ok_or(EngineError::InventorySlotOutOfRange(slot))?;
        let kind = slot_of(&target.item_id)
            .ok_or_else(|| EngineError::UnknownItem(target.item_id.clone()))?;

        for item in self.items.iter_mut() {
            if item.equipped && slot_of(&item.item_id) == Some(kind) {
                item.equipped = false;
            }
        }
        self.items[slot].equipped = true;
        Ok(())
    }

    pub fn equipped(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.iter().filter(|i| i.equipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::types::Rarity;

    fn item(id: &str) -> InventoryItem {
        InventoryItem::new(id, Rarity::Common)
    }

    fn full_inventory() -> Inventory {
        Inventory::with_items(vec![item("a"), item("b")], 2)
    }

    #[test]
    fn test_receive_stores_when_space() {
        let mut inventory = Inventory::new(2);
        assert_eq!(inventory.receive(item("a")), Placement::Stored);
        assert!(inventory.is_valid());
    }

    #[test]
    fn test_receive_when_full_goes_pending() {
        let mut inventory = full_inventory();
        assert_eq!(inventory.receive(item("c")), Placement::Pending);
        assert_eq!(inventory.items.len(), 2);
        assert!(!inventory.is_valid());
    }

    #[test]
    fn test_discard_restores_validity() {
        let mut inventory = full_inventory();
        inventory.receive(item("c"));
        inventory.resolve_pending(DropDecision::Discard).unwrap();
        assert!(inventory.is_valid());
        assert_eq!(inventory.items, vec![item("a"), item("b")]);
    }

    #[test]
    fn test_replace_swaps_slot() {
        let mut inventory = full_inventory();
        inventory.receive(item("c"));
        inventory
            .resolve_pending(DropDecision::Replace { slot: 0 })
            .unwrap();
        assert_eq!(inventory.items, vec![item("c"), item("b")]);
        assert!(inventory.is_valid());
    }

    #[test]
    fn test_keep_needs_free_slot() {
        let mut inventory = full_inventory();
        inventory.receive(item("c"));
        assert_eq!(
            inventory.resolve_pending(DropDecision::Keep),
            Err(EngineError::InventoryFull)
        );
        assert!(inventory.has_pending());

        inventory.remove(1).unwrap();
        inventory.resolve_pending(DropDecision::Keep).unwrap();
        assert_eq!(inventory.items, vec![item("a"), item("c")]);
    }

    #[test]
    fn test_bad_replace_slot_keeps_pending() {
        let mut inventory = full_inventory();
        inventory.receive(item("c"));
        assert_eq!(
            inventory.resolve_pending(DropDecision::Replace { slot: 9 }),
            Err(EngineError::InventorySlotOutOfRange(9))
        );
        assert!(inventory.has_pending());
    }

    #[test]
    fn test_resolve_without_pending_fails() {
        let mut inventory = Inventory::new(2);
        assert_eq!(
            inventory.resolve_pending(DropDecision::Discard),
            Err(EngineError::NoPendingDrop)
        );
    }

    #[test]
    fn test_equip_swaps_within_slot_kind() {
        let mut inventory = Inventory::with_items(vec![item("sword"), item("axe"), item("mail")], 5);
        let slot_of = |id: &str| match id {
            "sword" | "axe" => Some(ItemSlot::Weapon),
            "mail" => Some(ItemSlot::Armor),
            _ => None,
        };
        inventory.equip(0, slot_of).unwrap();
        inventory.equip(2, slot_of).unwrap();
        inventory.equip(1, slot_of).unwrap();
        let equipped: Vec<&str> = inventory.equipped().map(|i| i.item_id.as_str()).collect();
        assert_eq!(equipped, vec!["axe", "mail"]);
    }
}
