mod character;
mod dialogue;
mod executor;
mod interaction;
mod scene;

pub(crate) use scene::{PartyScene, CAKE_ASSET, CAT_ASSET};

#[cfg(test)]
mod tests;
