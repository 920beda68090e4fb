pub mod economy;
pub mod rejection;
pub mod rules;
pub mod shop;
pub mod theme;
