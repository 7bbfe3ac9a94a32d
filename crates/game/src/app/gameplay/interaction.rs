use engine::{Rect, Vec2};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::app::planning::FLOOR_MARGIN_PX;

/// A single click waits this long so a double click can cancel it.
pub(crate) const CLICK_RESOLVE_DELAY_MS: u64 = 300;
pub(crate) const CAT_HITBOX_WIDTH_PX: f32 = 159.0;
pub(crate) const CAT_HITBOX_HEIGHT_PX: f32 = 163.5;

pub(crate) const GREETING_TEXT: &str = "Meow~ I'm the birthday cat!";
pub(crate) const GREETING_MS: u64 = 4_000;
pub(crate) const ONLY_BELOW_CAKE_TEXT: &str = "Meow~ I can only play below the cake!";
pub(crate) const NOT_ON_CAKE_TEXT: &str = "Meow~ I can't walk onto the cake!";
pub(crate) const COMING_TEXT: &str = "Meow~ coming!";
pub(crate) const CANT_GET_THERE_TEXT: &str = "Meow~ I can't get there!";
pub(crate) const WISH_MS: u64 = 3_000;
pub(crate) const HINT_MS: u64 = 2_000;
pub(crate) const COMING_MS: u64 = 1_500;

pub(crate) const BIRTHDAY_MESSAGES: [&str; 5] = [
    "🎂 Happy birthday! May every day be full of sunshine and laughter!",
    "🎉 Happy birthday! May this special day bring you endless joy!",
    "🎈 On this lovely day, may all your wishes come true!",
    "🌟 Happy birthday! May your life be as sweet as this cake!",
    "🎁 Happy birthday! May happiness stay with you always!",
];

pub(crate) const CAT_MESSAGES: [&str; 6] = [
    "Meow~ Happy birthday! I'm your cutest little cat!",
    "Meow meow~ May you be this happy every day!",
    "Meow~ I'll always be by your side and bring you luck!",
    "Meow meow meow~ May your life be as free as a cat's!",
    "Meow~ Today is special, let's celebrate together!",
    "Meow meow~ You're the best human in the world! Happy birthday!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClickReaction {
    BirthdayWish,
    CatChat,
    OnlyBelowCake,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DoubleClickReaction {
    OnCake,
    OnlyBelowCake,
    Navigate,
}

pub(crate) fn allowed_floor_y(cake: Rect) -> f32 {
    cake.bottom() + FLOOR_MARGIN_PX
}

pub(crate) fn cat_hitbox(cat: Vec2) -> Rect {
    Rect::new(
        cat.x - CAT_HITBOX_WIDTH_PX / 2.0,
        cat.y - CAT_HITBOX_HEIGHT_PX / 2.0,
        CAT_HITBOX_WIDTH_PX,
        CAT_HITBOX_HEIGHT_PX,
    )
}

/// Checked in order: cake, cat, floor line.
pub(crate) fn classify_click(pos: Vec2, cake: Rect, cat: Vec2) -> ClickReaction {
    if cake.contains_strict(pos) {
        ClickReaction::BirthdayWish
    } else if cat_hitbox(cat).contains_inclusive(pos) {
        ClickReaction::CatChat
    } else if pos.y < allowed_floor_y(cake) {
        ClickReaction::OnlyBelowCake
    } else {
        ClickReaction::Nothing
    }
}

pub(crate) fn classify_double_click(pos: Vec2, cake: Rect) -> DoubleClickReaction {
    if cake.contains_strict(pos) {
        DoubleClickReaction::OnCake
    } else if pos.y < allowed_floor_y(cake) {
        DoubleClickReaction::OnlyBelowCake
    } else {
        DoubleClickReaction::Navigate
    }
}

pub(crate) fn birthday_message(rng: &mut impl Rng) -> &'static str {
    BIRTHDAY_MESSAGES.choose(rng).copied().unwrap_or(BIRTHDAY_MESSAGES[0])
}

pub(crate) fn cat_message(rng: &mut impl Rng) -> &'static str {
    CAT_MESSAGES.choose(rng).copied().unwrap_or(CAT_MESSAGES[0])
}
