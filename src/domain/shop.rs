/// Shop catalog: everything that can be bought with diamonds.
///
/// Consumables arm a one-shot buff; themes unlock a palette for the rest
/// of the session.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Consumable,
    Theme,
}

/// Buff kinds armed by consumables. One unit of each may be armed at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Buff {
    Shield,
    DoublePoints,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub icon: &'static str,
    pub desc: &'static str,
    pub category: Category,
}

impl ShopItem {
    /// The buff this item arms, if it is a consumable.
    pub fn buff(&self) -> Option<Buff> {
        match (self.category, self.id) {
            (Category::Consumable, "shield") => Some(Buff::Shield),
            (Category::Consumable, "double_points") => Some(Buff::DoublePoints),
            _ => None,
        }
    }
}

pub const SHOP_ITEMS: &[ShopItem] = &[
    ShopItem {
        id: "shield",
        name: "Mistake Shield",
        price: 150,
        icon: "🛡️",
        desc: "Protects you from 1 mistake.",
        category: Category::Consumable,
    },
    ShopItem {
        id: "double_points",
        name: "Double Points",
        price: 300,
        icon: "⚡",
        desc: "2x Points for the next round.",
        category: Category::Consumable,
    },
    ShopItem {
        id: "theme_neon",
        name: "Neon Theme",
        price: 1000,
        icon: "🌈",
        desc: "Cyberpunk neon vibes.",
        category: Category::Theme,
    },
    ShopItem {
        id: "theme_ocean",
        name: "Ocean Theme",
        price: 1000,
        icon: "🌊",
        desc: "Deep blue tones.",
        category: Category::Theme,
    },
    ShopItem {
        id: "theme_fire",
        name: "Fire Theme",
        price: 1000,
        icon: "🔥",
        desc: "Hot and energetic.",
        category: Category::Theme,
    },
    ShopItem {
        id: "theme_nature",
        name: "Nature Theme",
        price: 1000,
        icon: "🌿",
        desc: "Green and peaceful.",
        category: Category::Theme,
    },
    ShopItem {
        id: "theme_space",
        name: "Space Theme",
        price: 1000,
        icon: "🌌",
        desc: "Dark and starry.",
        category: Category::Theme,
    },
];

pub fn lookup(id: &str) -> Option<&'static ShopItem> {
    SHOP_ITEMS.iter().find(|item| item.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::theme;

    #[test]
    fn consumables_map_to_buffs() {
        assert_eq!(lookup("shield").and_then(|i| i.buff()), Some(Buff::Shield));
        assert_eq!(lookup("double_points").and_then(|i| i.buff()), Some(Buff::DoublePoints));
        assert_eq!(lookup("theme_fire").and_then(|i| i.buff()), None);
    }

    #[test]
    fn every_theme_item_has_a_palette() {
        for item in SHOP_ITEMS.iter().filter(|i| i.category == Category::Theme) {
            assert!(theme::lookup(item.id).is_some(), "{} has no palette", item.id);
        }
    }

    #[test]
    fn unknown_item() {
        assert!(lookup("extra_life").is_none());
    }
}
