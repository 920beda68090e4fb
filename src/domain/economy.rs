/// Economy: diamond balance, owned themes, armed buffs, selected theme.
///
/// Every operation is all-or-nothing. A rejected purchase or theme change
/// returns a `Rejection` and leaves the balance, inventory and buffs exactly
/// as they were. The balance is unsigned and only ever reduced after the
/// price check, so it cannot go negative.

use super::rejection::Rejection;
use super::shop::{self, Buff, Category, ShopItem};
use super::theme::{self, DEFAULT_THEME};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ActiveBuffs {
    pub shield: bool,
    pub double_points: bool,
}

impl ActiveBuffs {
    pub fn is_armed(&self, buff: Buff) -> bool {
        match buff {
            Buff::Shield => self.shield,
            Buff::DoublePoints => self.double_points,
        }
    }

    fn set(&mut self, buff: Buff, armed: bool) {
        match buff {
            Buff::Shield => self.shield = armed,
            Buff::DoublePoints => self.double_points = armed,
        }
    }

    pub fn any(&self) -> bool {
        self.shield || self.double_points
    }
}

#[derive(Clone, Debug)]
pub struct Economy {
    diamonds: u32,
    /// Purchased themes in purchase order. Never contains `default`.
    inventory: Vec<&'static str>,
    buffs: ActiveBuffs,
    current_theme: &'static str,
}

impl Economy {
    pub fn new(initial_diamonds: u32) -> Self {
        Economy {
            diamonds: initial_diamonds,
            inventory: Vec::new(),
            buffs: ActiveBuffs::default(),
            current_theme: DEFAULT_THEME,
        }
    }

    pub fn diamonds(&self) -> u32 {
        self.diamonds
    }

    pub fn inventory(&self) -> &[&'static str] {
        &self.inventory
    }

    pub fn buffs(&self) -> ActiveBuffs {
        self.buffs
    }

    pub fn current_theme(&self) -> &'static str {
        self.current_theme
    }

    pub fn owns_theme(&self, id: &str) -> bool {
        id == DEFAULT_THEME || self.inventory.iter().any(|t| *t == id)
    }

    /// Owned themes in catalog order, `default` first.
    pub fn owned_themes(&self) -> impl Iterator<Item = &'static theme::Theme> + '_ {
        theme::THEMES.iter().filter(move |t| self.owns_theme(t.id))
    }

    /// Buy an item from the shop catalog.
    ///
    /// Checks, in order: unknown item, theme already owned, buff already
    /// armed, insufficient balance.
    pub fn purchase(&mut self, item_id: &str) -> Result<&'static ShopItem, Rejection> {
        let item = shop::lookup(item_id).ok_or_else(|| Rejection::UnknownItem(item_id.to_string()))?;

        match item.category {
            Category::Theme if self.owns_theme(item.id) => return Err(Rejection::ThemeOwned),
            Category::Consumable => {
                if item.buff().map_or(false, |b| self.buffs.is_armed(b)) {
                    return Err(Rejection::BuffArmed);
                }
            }
            _ => {}
        }

        if self.diamonds < item.price {
            return Err(Rejection::InsufficientDiamonds { price: item.price, balance: self.diamonds });
        }

        self.diamonds -= item.price;
        match item.category {
            Category::Theme => {
                self.inventory.push(item.id);
                self.current_theme = item.id;
            }
            Category::Consumable => {
                if let Some(buff) = item.buff() {
                    self.buffs.set(buff, true);
                }
            }
        }
        Ok(item)
    }

    pub fn set_theme(&mut self, theme_id: &str) -> Result<(), Rejection> {
        let theme = theme::lookup(theme_id).ok_or_else(|| Rejection::UnknownTheme(theme_id.to_string()))?;
        if !self.owns_theme(theme.id) {
            return Err(Rejection::ThemeLocked);
        }
        self.current_theme = theme.id;
        Ok(())
    }

    /// Disarm the shield. Returns whether one was armed.
    pub fn consume_shield(&mut self) -> bool {
        self.consume(Buff::Shield)
    }

    /// Disarm double points. Returns whether it was armed.
    pub fn consume_double_points(&mut self) -> bool {
        self.consume(Buff::DoublePoints)
    }

    fn consume(&mut self, buff: Buff) -> bool {
        let was_armed = self.buffs.is_armed(buff);
        self.buffs.set(buff, false);
        was_armed
    }

    pub fn credit(&mut self, diamonds: u32) {
        self.diamonds = self.diamonds.saturating_add(diamonds);
    }
}
